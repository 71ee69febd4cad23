//! Captured result of an invocation.
//!
//! This struct is what the driver inspects once the handler has completed. It
//! is a plain copy of the shared state, so it stays valid after the
//! invocation itself is dropped.
//!
//! ## Notes
//! - `status` is `0` when the handler never set one.
//! - `headers` holds the last value written per name. `added_headers` keeps
//!   every `add_header` call in order, for suites that care about repeats.
//! - The body is stored as raw bytes. For text responses use
//!   [`CapturedResponse::body_text`].
use std::borrow::Cow;
use std::collections::BTreeMap;

use http::StatusCode;
use serde::Serialize;

use crate::invocation::id::InvocationId;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapturedResponse {
    /// Invocation this capture was taken from.
    pub id: InvocationId,

    /// Numeric status code, `0` if unset.
    pub status: u16,

    /// Final header mapping (name → last written value).
    pub headers: BTreeMap<String, String>,

    /// Every value passed to `add_header`, per name, in call order.
    pub added_headers: BTreeMap<String, Vec<String>>,

    /// Accumulated response body.
    pub body: Vec<u8>,

    /// True once the response was flushed.
    pub committed: bool,

    /// Last value passed to either content-length setter.
    pub content_length: i64,

    /// True when the completion signal had fired at capture time.
    pub completed: bool,
}

impl CapturedResponse {
    /// Body decoded as UTF-8, lossy.
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Status as an `http::StatusCode`; `None` when unset or out of range.
    pub fn status_code(&self) -> Option<StatusCode> {
        StatusCode::from_u16(self.status).ok()
    }

    /// Pretty JSON dump, handy in assertion messages.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture(status: u16, body: &[u8]) -> CapturedResponse {
        CapturedResponse {
            id: InvocationId::new(),
            status,
            headers: BTreeMap::from([("Content-Type".to_string(), "text/plain".to_string())]),
            added_headers: BTreeMap::new(),
            body: body.to_vec(),
            committed: true,
            content_length: body.len() as i64,
            completed: true,
        }
    }

    #[test]
    fn unset_status_has_no_status_code() {
        assert_eq!(capture(0, b"").status_code(), None);
        assert_eq!(capture(404, b"").status_code(), Some(StatusCode::NOT_FOUND));
    }

    #[test]
    fn body_text_is_lossy() {
        let c = capture(200, b"\xff\xfeok");
        assert!(c.body_text().ends_with("ok"));
    }

    #[test]
    fn json_dump_contains_fields() {
        let c = capture(201, b"made");
        let json = c.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["status"], 201);
        assert_eq!(value["headers"]["Content-Type"], "text/plain");
        assert_eq!(value["content_length"], 4);
        assert_eq!(value["id"], c.id.to_string());
    }
}
