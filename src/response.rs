// src/response.rs
//! Response facade.
//!
//! [`MockResponse`] is the mutable view a handler writes its answer through.
//! It follows the hosted-handler contract closely enough for tests:
//!
//! - status defaults to `0` and the last `set_status`/`send_error` wins;
//! - `set_header` and `add_header` both overwrite, so the final mapping holds
//!   the last value written per name. `add_header` calls are additionally kept
//!   in an ordered log (see [`MockResponse::added_headers`]);
//! - `flush_buffer` commits the response, and a commit is never undone;
//! - the body is written through [`MockResponse::output_stream`], whose
//!   `flush` completes the invocation.

use std::collections::HashMap;
use std::sync::Arc;

use crate::invocation::{InvocationId, InvocationState};
use crate::stream::OutputSink;

const CONTENT_LENGTH: &str = "Content-Length";
const CONTENT_TYPE: &str = "Content-Type";

#[derive(Debug, Clone)]
pub struct MockResponse {
    state: Arc<InvocationState>,
}

impl MockResponse {
    pub(crate) fn new(state: Arc<InvocationState>) -> Self {
        Self { state }
    }

    #[inline]
    pub fn invocation_id(&self) -> InvocationId {
        self.state.id()
    }

    pub fn set_status(&self, status: u16) {
        self.state.response().status = status;
    }

    pub fn status(&self) -> u16 {
        self.state.response().status
    }

    pub fn set_header(&self, name: &str, value: &str) {
        self.state
            .response()
            .headers
            .insert(name.to_string(), value.to_string());
    }

    /// Records the value and, like `set_header`, replaces any previous value.
    pub fn add_header(&self, name: &str, value: &str) {
        let mut response = self.state.response();
        response
            .added_headers
            .entry(name.to_string())
            .or_default()
            .push(value.to_string());
        response.headers.insert(name.to_string(), value.to_string());
    }

    pub fn set_int_header(&self, name: &str, value: i32) {
        self.set_header(name, &value.to_string());
    }

    pub fn add_int_header(&self, name: &str, value: i32) {
        self.add_header(name, &value.to_string());
    }

    pub fn set_content_type(&self, content_type: &str) {
        self.set_header(CONTENT_TYPE, content_type);
    }

    pub fn set_content_length(&self, len: i32) {
        self.set_content_length_long(i64::from(len));
    }

    pub fn set_content_length_long(&self, len: i64) {
        let mut response = self.state.response();
        response.content_length = len;
        response.headers.insert(CONTENT_LENGTH.to_string(), len.to_string());
    }

    pub fn content_length(&self) -> i64 {
        self.state.response().content_length
    }

    /// Sets the status and appends `message` to the body. Does not flush.
    pub fn send_error(&self, status: u16, message: &str) {
        let mut response = self.state.response();
        response.status = status;
        response.body.extend_from_slice(message.as_bytes());
        log::debug!("Invocation[{}]: send_error {}", self.state.id(), status);
    }

    /// `send_error` with the configured default message.
    pub fn send_error_default(&self, status: u16) {
        self.send_error(status, self.state.default_error_message());
    }

    /// Commits the response. Does not complete the invocation.
    pub fn flush_buffer(&self) {
        self.state.commit();
    }

    pub fn is_committed(&self) -> bool {
        self.state.response().committed
    }

    pub fn buffer_size(&self) -> usize {
        self.state.reported_buffer_size()
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.state.response().headers.get(name).cloned()
    }

    pub fn contains_header(&self, name: &str) -> bool {
        self.state.response().headers.contains_key(name)
    }

    /// Snapshot of the current header mapping.
    pub fn headers(&self) -> HashMap<String, String> {
        self.state.response().headers.clone()
    }

    /// Sorted snapshot of the header names.
    pub fn header_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state.response().headers.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Snapshot of every `add_header` value, per name, in call order.
    pub fn added_headers(&self) -> HashMap<String, Vec<String>> {
        self.state.response().added_headers.clone()
    }

    pub fn output_stream(&self) -> OutputSink {
        OutputSink::new(self.state.clone())
    }
}
