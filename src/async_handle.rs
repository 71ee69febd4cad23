use std::sync::Arc;

use crate::invocation::InvocationState;
use crate::request::MockRequest;
use crate::response::MockResponse;

/// Listener for async lifecycle events.
///
/// Accepted by [`AsyncHandle::add_listener`] for API shape only; the mock never
/// invokes it.
pub trait AsyncListener: Send + Sync {
    fn on_complete(&self) {}
    fn on_timeout(&self) {}
    fn on_error(&self) {}
    fn on_start_async(&self) {}
}

/// Stand-in for the async dispatch controls of a hosted handler.
///
/// Only [`AsyncHandle::complete`] does anything: it fires the invocation's
/// completion signal, same as flushing the output stream. Dispatching,
/// listeners and timeouts are accepted and ignored.
#[derive(Debug, Clone)]
pub struct AsyncHandle {
    state: Arc<InvocationState>,
}

impl AsyncHandle {
    pub(crate) fn new(state: Arc<InvocationState>) -> Self {
        Self { state }
    }

    pub fn request(&self) -> MockRequest {
        MockRequest::new(self.state.clone())
    }

    pub fn response(&self) -> MockResponse {
        MockResponse::new(self.state.clone())
    }

    /// Always false.
    pub fn has_original_request_and_response(&self) -> bool {
        false
    }

    pub fn complete(&self) {
        self.state.complete();
    }

    pub fn dispatch(&self) {}

    pub fn dispatch_to(&self, _path: &str) {}

    /// The task is dropped without running.
    pub fn start<F: FnOnce() + Send + 'static>(&self, _task: F) {}

    pub fn add_listener(&self, _listener: Arc<dyn AsyncListener>) {}

    pub fn set_timeout(&self, _millis: u64) {}

    pub fn timeout(&self) -> u64 {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContainerConfig;
    use crate::invocation::Invocation;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct Counting(AtomicUsize);

    impl AsyncListener for Counting {
        fn on_complete(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn invocation() -> Invocation {
        Invocation::builder("GET", "/async")
            .empty_body()
            .build(&ContainerConfig::default())
            .unwrap()
    }

    #[test]
    fn facades_share_the_invocation() {
        let inv = invocation();
        let handle = inv.async_handle();

        handle.response().set_status(418);
        assert_eq!(inv.response().status(), 418);
        assert_eq!(handle.request().path(), "/async");
        assert!(!handle.has_original_request_and_response());
    }

    #[test]
    fn complete_fires_signal_without_commit() {
        let inv = invocation();
        inv.async_handle().complete();

        assert!(inv.wait_for_completion(Duration::from_millis(100)));
        assert!(!inv.response().is_committed());
    }

    #[test]
    fn dispatch_controls_are_no_ops() {
        let inv = invocation();
        let handle = inv.async_handle();
        let listener = Arc::new(Counting::default());
        let ran = Arc::new(AtomicUsize::new(0));

        handle.dispatch();
        handle.dispatch_to("/elsewhere");
        handle.set_timeout(30_000);
        handle.add_listener(listener.clone());
        let r = ran.clone();
        handle.start(move || {
            r.fetch_add(1, Ordering::SeqCst);
        });
        handle.complete();

        assert_eq!(handle.timeout(), 0);
        assert_eq!(ran.load(Ordering::SeqCst), 0);
        assert_eq!(listener.0.load(Ordering::SeqCst), 0);
        assert_eq!(inv.request().path(), "/async");
    }
}
