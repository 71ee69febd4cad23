pub mod async_handle;
pub mod config;
pub mod container;
pub mod dispatch;
pub mod endpoint;
pub mod errors;
pub mod invocation;
pub mod logging;
pub mod request;
pub mod response;
pub mod stream;

pub use async_handle::{AsyncHandle, AsyncListener};
pub use config::ContainerConfig;
pub use container::MockContainer;
pub use dispatch::{ConnectorHandler, FnHandler, Handler, HandlerConfig, HandlerRegistry, VarHandler};
pub use endpoint::{EndpointCallback, EndpointEvent, FnEndpoint};
pub use errors::{ContainerError, DispatchError, EndpointError};
pub use invocation::{CapturedResponse, Invocation, InvocationBuilder, InvocationId};
pub use request::MockRequest;
pub use response::MockResponse;
