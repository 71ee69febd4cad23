use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::invocation::capture::CapturedResponse;
use crate::invocation::completion::CompletionSignal;
use crate::invocation::id::InvocationId;

/// Request attributes fixed at construction.
#[derive(Debug, Clone)]
pub(crate) struct RequestLine {
    pub url: String,
    pub method: http::Method,
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub path: String,
    pub query: Option<String>,
    pub headers: HashMap<String, String>,
}

/// Everything a handler can change about the response.
#[derive(Debug, Default)]
pub(crate) struct ResponseState {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub added_headers: HashMap<String, Vec<String>>,
    pub content_length: i64,
    pub committed: bool,
    pub body: Vec<u8>,
}

/// Shared state of a single request/response cycle.
///
/// The driver's [`Invocation`](crate::invocation::Invocation) and every facade
/// handed to the handler point at the same `InvocationState`. Response fields
/// sit behind one lock for memory safety only; drivers must still wait on the
/// completion signal before trusting the final values.
pub struct InvocationState {
    id: InvocationId,
    request: RequestLine,
    /// Consumed by whichever `InputSource` reads first; `None` once closed
    request_body: Mutex<Option<Box<dyn Read + Send>>>,
    response: Mutex<ResponseState>,
    async_started: AtomicBool,
    completion: CompletionSignal,
    reported_buffer_size: usize,
    default_error_message: String,
}

impl std::fmt::Debug for InvocationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvocationState")
            .field("id", &self.id)
            .field("request", &self.request)
            .field("request_body", &"Mutex<Option<Box<dyn Read>>>")
            .field("response", &self.response)
            .field("async_started", &self.async_started)
            .field("completion", &self.completion)
            .finish()
    }
}

impl InvocationState {
    pub(crate) fn new(
        request: RequestLine,
        body: Box<dyn Read + Send>,
        response_buffer_capacity: usize,
        reported_buffer_size: usize,
        default_error_message: String,
    ) -> Self {
        Self {
            id: InvocationId::new(),
            request,
            request_body: Mutex::new(Some(body)),
            response: Mutex::new(ResponseState {
                body: Vec::with_capacity(response_buffer_capacity),
                ..ResponseState::default()
            }),
            async_started: AtomicBool::new(false),
            completion: CompletionSignal::new(),
            reported_buffer_size,
            default_error_message,
        }
    }

    #[inline]
    pub fn id(&self) -> InvocationId {
        self.id
    }

    #[inline]
    pub(crate) fn request(&self) -> &RequestLine {
        &self.request
    }

    pub(crate) fn request_body(&self) -> MutexGuard<'_, Option<Box<dyn Read + Send>>> {
        self.request_body.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn response(&self) -> MutexGuard<'_, ResponseState> {
        self.response.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    pub(crate) fn reported_buffer_size(&self) -> usize {
        self.reported_buffer_size
    }

    #[inline]
    pub(crate) fn default_error_message(&self) -> &str {
        &self.default_error_message
    }

    pub(crate) fn mark_async_started(&self) {
        if !self.async_started.swap(true, Ordering::AcqRel) {
            log::debug!("Invocation[{}]: async processing started", self.id);
        }
    }

    pub fn is_async_started(&self) -> bool {
        self.async_started.load(Ordering::Acquire)
    }

    /// Marks the response committed. One-way; never reset.
    pub(crate) fn commit(&self) {
        let mut response = self.response();
        if !response.committed {
            response.committed = true;
            log::debug!("Invocation[{}]: response committed (status {})", self.id, response.status);
        }
    }

    /// Fires the completion signal. Repeated calls are harmless.
    pub fn complete(&self) {
        if self.completion.fire() {
            log::debug!("Invocation[{}]: completed", self.id);
        } else {
            log::trace!("Invocation[{}]: already completed, ignoring", self.id);
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completion.is_fired()
    }

    /// Blocks until the handler completes or `timeout` elapses. Returns false on timeout.
    pub fn wait_for_completion(&self, timeout: Duration) -> bool {
        let completed = self.completion.wait(timeout);
        if !completed {
            log::debug!("Invocation[{}]: no completion within {:?}", self.id, timeout);
        }
        completed
    }

    pub async fn wait_for_completion_async(&self, timeout: Duration) -> bool {
        let completed = self.completion.wait_async(timeout).await;
        if !completed {
            log::debug!("Invocation[{}]: no completion within {:?}", self.id, timeout);
        }
        completed
    }

    /// Snapshot of the response as it stands right now.
    pub fn capture(&self) -> CapturedResponse {
        let completed = self.is_completed();
        let response = self.response();

        CapturedResponse {
            id: self.id,
            status: response.status,
            headers: response
                .headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<BTreeMap<_, _>>(),
            added_headers: response
                .added_headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<BTreeMap<_, _>>(),
            body: response.body.clone(),
            committed: response.committed,
            content_length: response.content_length,
            completed,
        }
    }
}
