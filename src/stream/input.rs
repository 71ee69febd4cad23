use std::io::{self, Read};
use std::sync::Arc;

use crate::invocation::InvocationState;

/// Request body as seen by the handler.
///
/// Reads delegate to the stream supplied at construction. All handles of one
/// invocation share that stream. `is_finished` and `is_ready` are fixed
/// answers: nothing here does non-blocking I/O.
#[derive(Debug, Clone)]
pub struct InputSource {
    state: Arc<InvocationState>,
}

impl InputSource {
    pub(crate) fn new(state: Arc<InvocationState>) -> Self {
        Self { state }
    }

    /// Always false.
    pub fn is_finished(&self) -> bool {
        false
    }

    /// Always true.
    pub fn is_ready(&self) -> bool {
        true
    }

    /// Drops the underlying stream. Later reads report end-of-stream.
    pub fn close(&mut self) {
        if self.state.request_body().take().is_some() {
            log::trace!("Invocation[{}]: request body closed", self.state.id());
        }
    }
}

impl Read for InputSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.state.request_body().as_mut() {
            Some(body) => body.read(buf),
            None => Ok(0),
        }
    }
}
