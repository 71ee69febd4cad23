//! Container configuration.
//!
//! `ContainerConfig` controls how a [`MockContainer`](crate::container::MockContainer)
//! and the invocations it builds behave: how long the driver waits for a
//! handler to complete, how large the response buffer starts out, and what a
//! handler sees when it asks for the buffer size or sends an error without a
//! message.
//!
//! # Examples
//!
//! ## Use defaults
//! ```rust
//! use mock_container::config::ContainerConfig;
//! let cfg = ContainerConfig::default();
//! assert_eq!(cfg.completion_timeout.as_millis(), 1000);
//! ```
//!
//! ## Customize with the builder
//! ```rust
//! use std::time::Duration;
//! use mock_container::config::ContainerConfig;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = ContainerConfig::builder()
//!     .completion_timeout(Duration::from_millis(250))
//!     .default_error_message("Boom")
//!     .build()?; // returns Result<ContainerConfig, ContainerConfigError>
//! # Ok(()) }
//! ```
//!
//! # Errors
//!
//! Builder validation returns [`ContainerConfigError`] for a zero timeout,
//! zero-sized buffers, or a response buffer above [`MAX_RESPONSE_BUFFER_CAPACITY`].

use std::fmt;
use std::time::Duration;

const DEFAULT_COMPLETION_TIMEOUT: Duration = Duration::from_millis(1000);
const DEFAULT_RESPONSE_BUFFER_CAPACITY: usize = 1000;
const DEFAULT_REPORTED_BUFFER_SIZE: usize = 1500;
const DEFAULT_ERROR_MESSAGE: &str = "Server Error";
/// Largest initial body reservation accepted for one invocation (16 MiB).
pub const MAX_RESPONSE_BUFFER_CAPACITY: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ContainerConfig {
    /// How long `MockContainer::response_for` waits for the handler to complete
    pub completion_timeout: Duration,
    /// Initial capacity of the captured response body
    pub response_buffer_capacity: usize,
    /// Value handlers see from `MockResponse::buffer_size`
    pub reported_buffer_size: usize,
    /// Body written by `MockResponse::send_error_default`
    pub default_error_message: String,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            completion_timeout: DEFAULT_COMPLETION_TIMEOUT,
            response_buffer_capacity: DEFAULT_RESPONSE_BUFFER_CAPACITY,
            reported_buffer_size: DEFAULT_REPORTED_BUFFER_SIZE,
            default_error_message: DEFAULT_ERROR_MESSAGE.to_string(),
        }
    }
}

impl ContainerConfig {
    pub fn builder() -> ContainerConfigBuilder {
        ContainerConfigBuilder::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContainerConfigBuilder {
    inner: ContainerConfig,
}

impl ContainerConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut ContainerConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn completion_timeout(self, timeout: Duration) -> Self { self.map(|c| c.completion_timeout = timeout) }
    pub fn response_buffer_capacity(self, bytes: usize) -> Self { self.map(|c| c.response_buffer_capacity = bytes) }
    pub fn reported_buffer_size(self, bytes: usize) -> Self { self.map(|c| c.reported_buffer_size = bytes) }
    pub fn default_error_message<S: Into<String>>(self, msg: S) -> Self { self.map(|c| c.default_error_message = msg.into()) }

    /// Apply multiple changes in one go.
    pub fn with(self, f: impl FnOnce(&mut ContainerConfig)) -> Self { self.map(f) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<ContainerConfig, ContainerConfigError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

// ---------- Validation ----------

#[derive(Debug, Clone, PartialEq)]
pub enum ContainerConfigError {
    ZeroTimeout,
    ZeroBufferSize { field: &'static str },
    BufferTooLarge { field: &'static str, max: usize },
}

impl fmt::Display for ContainerConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerConfigError::ZeroTimeout =>
                write!(f, "completion_timeout must be greater than zero"),
            ContainerConfigError::ZeroBufferSize { field } =>
                write!(f, "{field} must be at least 1 byte"),
            ContainerConfigError::BufferTooLarge { field, max } =>
                write!(f, "{field} must not exceed {max} bytes"),
        }
    }
}
impl std::error::Error for ContainerConfigError {}

/// Checks a config however it was built; struct literals skip the builder.
pub(crate) fn validate(c: &ContainerConfig) -> Result<(), ContainerConfigError> {
    if c.completion_timeout.is_zero() {
        return Err(ContainerConfigError::ZeroTimeout);
    }
    if c.response_buffer_capacity == 0 {
        return Err(ContainerConfigError::ZeroBufferSize { field: "response_buffer_capacity" });
    }
    if c.response_buffer_capacity > MAX_RESPONSE_BUFFER_CAPACITY {
        return Err(ContainerConfigError::BufferTooLarge {
            field: "response_buffer_capacity",
            max: MAX_RESPONSE_BUFFER_CAPACITY,
        });
    }
    if c.reported_buffer_size == 0 {
        return Err(ContainerConfigError::ZeroBufferSize { field: "reported_buffer_size" });
    }
    Ok(())
}
