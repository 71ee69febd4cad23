//! Handler adapters hosted by the mock container.
//!
//! [`FnHandler`] is built from function handles directly. [`VarHandler`] and
//! [`ConnectorHandler`] are configured by name and resolve their handles from a
//! [`HandlerRegistry`] once, in [`Handler::init`].

mod connector;
mod handler;
mod registry;
mod var_handler;

pub use connector::{BridgeFactory, ConnectorBridge, ConnectorHandler, CREATE_BRIDGE_PARAM};
pub use handler::{DestroyFn, FnHandler, Handler, HandlerConfig, InitFn, ServiceFn};
pub use registry::{HandleFn, HandleKind, HandlerRegistry};
pub use var_handler::{VarHandler, DESTROY_PARAM, INIT_PARAM, SERVICE_PARAM};
