use std::time::Duration;

use crate::config::ContainerConfigError;
use crate::dispatch::HandleKind;
use crate::invocation::{CapturedResponse, InvocationId};

#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    #[error("Invalid request method: {0:?}")]
    InvalidMethod(String),

    #[error("No request body supplied; use an empty body for bodiless requests")]
    MissingBody,

    #[error("Invalid container configuration: {0}")]
    InvalidConfig(#[from] ContainerConfigError),

    #[error("Invocation {id} did not complete within {timeout:?}")]
    CompletionTimeout {
        id: InvocationId,
        timeout: Duration,
        /// Whatever the handler managed to write before the wait gave up
        partial: Box<CapturedResponse>,
    },

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Missing required parameter '{0}'")]
    MissingParameter(String),

    #[error("Invalid namespace-qualified symbol '{0}'")]
    InvalidSymbol(String),

    #[error("Failed to load namespace '{0}'")]
    NamespaceNotFound(String),

    #[error("Unable to resolve '{symbol}'")]
    Unresolved { symbol: String },

    #[error("'{symbol}' is a {found} handle, expected a {expected} handle")]
    WrongKind {
        symbol: String,
        expected: HandleKind,
        found: HandleKind,
    },

    #[error("Bridge factory '{symbol}' failed")]
    Bridge {
        symbol: String,
        #[source]
        source: anyhow::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    #[error("No endpoint callback under user property '{0}'")]
    MissingCallback(String),
}
