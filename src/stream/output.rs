use std::io::{self, Write};
use std::sync::Arc;

use crate::invocation::InvocationState;

/// Buffered response body.
///
/// `write` only appends. `flush` commits the response and fires the
/// invocation's completion signal; it is the normal way a handler says it is
/// done. A handler that flushes more than once completes on the first flush,
/// and anything written afterwards is still buffered but may not be seen by a
/// driver that already resumed.
#[derive(Debug, Clone)]
pub struct OutputSink {
    state: Arc<InvocationState>,
}

impl OutputSink {
    pub(crate) fn new(state: Arc<InvocationState>) -> Self {
        Self { state }
    }

    /// Always true.
    pub fn is_ready(&self) -> bool {
        true
    }

    /// Closing is not flushing: it neither commits nor completes.
    pub fn close(&mut self) {
        log::trace!("Invocation[{}]: output stream closed", self.state.id());
    }
}

impl Write for OutputSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.state.response().body.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.state.commit();
        self.state.complete();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ContainerConfig;
    use crate::invocation::Invocation;
    use std::io::Write;
    use std::time::Duration;

    fn invocation() -> Invocation {
        Invocation::builder("GET", "/")
            .empty_body()
            .build(&ContainerConfig::default())
            .unwrap()
    }

    #[test]
    fn writes_append_without_completing() {
        let inv = invocation();
        let mut out = inv.response().output_stream();

        out.write_all(b"a").unwrap();
        write!(out, "{}-{}", 1, 2).unwrap();
        out.write_all(&[b'!']).unwrap();

        assert_eq!(inv.capture().body_text(), "a1-2!");
        assert!(!inv.is_completed());
        assert!(!inv.response().is_committed());
    }

    #[test]
    fn close_does_not_complete() {
        let inv = invocation();
        let mut out = inv.response().output_stream();

        out.write_all(b"x").unwrap();
        out.close();

        assert!(out.is_ready());
        assert!(!inv.wait_for_completion(Duration::from_millis(10)));
    }

    #[test]
    fn flush_from_any_handle_completes() {
        let inv = invocation();
        let mut writer = inv.response().output_stream();
        let mut flusher = writer.clone();

        writer.write_all(b"shared").unwrap();
        flusher.flush().unwrap();

        assert!(inv.wait_for_completion(Duration::from_millis(100)));
        assert_eq!(inv.capture().body, b"shared");
    }
}
