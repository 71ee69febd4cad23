//! Invocations: one request/response cycle driven through a handler.
//!
//! An [`Invocation`] is what the driver holds. It owns the shared
//! [`InvocationState`] and hands out the facades the handler works with:
//!
//! - [`MockRequest`]: read-only request view
//! - [`MockResponse`]: status, headers and body
//! - [`AsyncHandle`]: explicit completion for handlers that finish later
//!
//! The handler signals that the response is complete by flushing the
//! response's [`OutputSink`](crate::stream::OutputSink) or by calling
//! [`AsyncHandle::complete`]. The driver blocks on
//! [`Invocation::wait_for_completion`] and then reads a [`CapturedResponse`].
//!
//! ```rust
//! use std::io::Write;
//! use std::time::Duration;
//! use mock_container::config::ContainerConfig;
//! use mock_container::invocation::Invocation;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let invocation = Invocation::builder("GET", "/hi")
//!     .empty_body()
//!     .build(&ContainerConfig::default())?;
//!
//! let response = invocation.response();
//! response.set_status(200);
//! let mut out = response.output_stream();
//! out.write_all(b"ok")?;
//! out.flush()?;
//!
//! assert!(invocation.wait_for_completion(Duration::from_millis(1000)));
//! let captured = invocation.capture();
//! assert_eq!(captured.status, 200);
//! assert_eq!(captured.body_text(), "ok");
//! # Ok(()) }
//! ```

mod builder;
mod capture;
mod completion;
mod id;
mod state;

use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::async_handle::AsyncHandle;
use crate::request::MockRequest;
use crate::response::MockResponse;

pub use builder::InvocationBuilder;
pub use capture::CapturedResponse;
pub use completion::CompletionSignal;
pub use id::InvocationId;
pub use state::InvocationState;

/// Driver-side owner of a single invocation.
#[derive(Debug)]
pub struct Invocation {
    state: Arc<InvocationState>,
    request: MockRequest,
    response: MockResponse,
}

impl Invocation {
    pub fn builder(method: impl Into<String>, path: impl Into<String>) -> InvocationBuilder {
        InvocationBuilder::new(method, path)
    }

    pub fn builder_from_url(method: impl Into<String>, url: &Url) -> InvocationBuilder {
        InvocationBuilder::from_url(method, url)
    }

    pub(crate) fn from_state(state: Arc<InvocationState>) -> Self {
        Self {
            request: MockRequest::new(state.clone()),
            response: MockResponse::new(state.clone()),
            state,
        }
    }

    #[inline]
    pub fn id(&self) -> InvocationId {
        self.state.id()
    }

    #[inline]
    pub fn state(&self) -> &Arc<InvocationState> {
        &self.state
    }

    #[inline]
    pub fn request(&self) -> &MockRequest {
        &self.request
    }

    #[inline]
    pub fn response(&self) -> &MockResponse {
        &self.response
    }

    pub fn async_handle(&self) -> AsyncHandle {
        AsyncHandle::new(self.state.clone())
    }

    pub fn complete(&self) {
        self.state.complete();
    }

    pub fn is_completed(&self) -> bool {
        self.state.is_completed()
    }

    pub fn wait_for_completion(&self, timeout: Duration) -> bool {
        self.state.wait_for_completion(timeout)
    }

    pub async fn wait_for_completion_async(&self, timeout: Duration) -> bool {
        self.state.wait_for_completion_async(timeout).await
    }

    pub fn capture(&self) -> CapturedResponse {
        self.state.capture()
    }
}
