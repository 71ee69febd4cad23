//! Body streams.
//!
//! - [`InputSource`]: the request body, a pass-through over the byte stream
//!   supplied when the invocation was built.
//! - [`OutputSink`]: the buffered response body. Flushing it completes the
//!   invocation.

mod input;
mod output;

pub use input::InputSource;
pub use output::OutputSink;
