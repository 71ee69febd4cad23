use std::collections::HashMap;
use std::sync::Arc;

use crate::async_handle::AsyncHandle;
use crate::invocation::{InvocationId, InvocationState};
use crate::stream::InputSource;

/// Read-only view of the request, handed to the handler under test.
#[derive(Debug, Clone)]
pub struct MockRequest {
    state: Arc<InvocationState>,
}

impl MockRequest {
    pub(crate) fn new(state: Arc<InvocationState>) -> Self {
        Self { state }
    }

    #[inline]
    pub fn invocation_id(&self) -> InvocationId {
        self.state.id()
    }

    #[inline]
    pub fn method(&self) -> &http::Method {
        &self.state.request().method
    }

    /// Request URL without the query string.
    #[inline]
    pub fn url(&self) -> &str {
        &self.state.request().url
    }

    #[inline]
    pub fn scheme(&self) -> &str {
        &self.state.request().scheme
    }

    #[inline]
    pub fn host(&self) -> &str {
        &self.state.request().host
    }

    #[inline]
    pub fn port(&self) -> u16 {
        self.state.request().port
    }

    #[inline]
    pub fn path(&self) -> &str {
        &self.state.request().path
    }

    #[inline]
    pub fn query_string(&self) -> Option<&str> {
        self.state.request().query.as_deref()
    }

    /// Header value as supplied at construction. An exact name match wins;
    /// otherwise names are compared ASCII case-insensitively, and among several
    /// such matches the name that sorts first wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        let headers = &self.state.request().headers;
        headers
            .get(name)
            .or_else(|| {
                headers
                    .iter()
                    .filter(|(k, _)| k.eq_ignore_ascii_case(name))
                    .min_by(|(a, _), (b, _)| a.cmp(b))
                    .map(|(_, v)| v)
            })
            .map(String::as_str)
    }

    /// Sorted header names.
    pub fn header_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.state.request().headers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    #[inline]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.state.request().headers
    }

    /// The request body. Every call returns a handle on the same underlying
    /// stream, so the body can be read exactly once.
    pub fn input_stream(&self) -> InputSource {
        InputSource::new(self.state.clone())
    }

    /// Switches the invocation into async mode and returns its handle.
    pub fn start_async(&self) -> AsyncHandle {
        self.state.mark_async_started();
        AsyncHandle::new(self.state.clone())
    }

    /// The async handle without switching into async mode.
    pub fn async_handle(&self) -> AsyncHandle {
        AsyncHandle::new(self.state.clone())
    }

    pub fn is_async_started(&self) -> bool {
        self.state.is_async_started()
    }
}
