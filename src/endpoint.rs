//! Event-driven endpoint adapter.
//!
//! [`FnEndpoint`] forwards open, close and error notifications to a single
//! [`EndpointCallback`]. The callback is normally handed to
//! [`FnEndpoint::new`]. Hosts that can only build endpoints through
//! `Default` may instead put the callback into the endpoint configuration under
//! [`USER_PROPERTY_KEY`]; it is picked up on open.

use std::any::Any;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::Display;
use std::sync::Arc;

use uuid::Uuid;

use crate::errors::EndpointError;

/// User property that carries the callback for default-constructed endpoints.
pub const USER_PROPERTY_KEY: &str = "mock_container.endpoint.FnEndpoint";

type UserProperty = Arc<dyn Any + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: Uuid,
    request_uri: String,
}

impl Session {
    pub fn new(request_uri: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            request_uri: request_uri.into(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn request_uri(&self) -> &str {
        &self.request_uri
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseReason {
    pub code: u16,
    pub phrase: String,
}

impl CloseReason {
    pub const NORMAL_CLOSURE: u16 = 1000;

    pub fn new(code: u16, phrase: impl Into<String>) -> Self {
        Self {
            code,
            phrase: phrase.into(),
        }
    }

    pub fn normal() -> Self {
        Self::new(Self::NORMAL_CLOSURE, "")
    }
}

impl Display for CloseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.phrase.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{} {}", self.code, self.phrase)
        }
    }
}

#[derive(Default, Clone)]
pub struct EndpointConfig {
    user_properties: HashMap<String, UserProperty>,
}

impl std::fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&String> = self.user_properties.keys().collect();
        keys.sort();
        f.debug_struct("EndpointConfig")
            .field("user_properties", &keys)
            .finish()
    }
}

impl EndpointConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user_property<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.user_properties.insert(key.into(), Arc::new(value));
    }

    pub fn user_property<T: Any + Send + Sync>(&self, key: &str) -> Option<&T> {
        self.user_properties.get(key)?.downcast_ref::<T>()
    }

    pub fn contains_user_property(&self, key: &str) -> bool {
        self.user_properties.contains_key(key)
    }

    /// Stores `callback` under [`USER_PROPERTY_KEY`].
    pub fn with_callback(mut self, callback: Arc<dyn EndpointCallback>) -> Self {
        self.insert_user_property(USER_PROPERTY_KEY, callback);
        self
    }
}

#[derive(Debug, Clone, Copy)]
pub enum EndpointEvent<'a> {
    Open { config: &'a EndpointConfig },
    Close { reason: &'a CloseReason },
    Error { error: &'a (dyn Error + 'a) },
}

impl EndpointEvent<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            EndpointEvent::Open { .. } => "on-open",
            EndpointEvent::Close { .. } => "on-close",
            EndpointEvent::Error { .. } => "on-error",
        }
    }
}

pub trait EndpointCallback: Send + Sync {
    fn on_event(&self, session: &Session, event: EndpointEvent<'_>);
}

impl<F> EndpointCallback for F
where
    F: Fn(&Session, EndpointEvent<'_>) + Send + Sync,
{
    fn on_event(&self, session: &Session, event: EndpointEvent<'_>) {
        self(session, event)
    }
}

#[derive(Default, Clone)]
pub struct FnEndpoint {
    callback: Option<Arc<dyn EndpointCallback>>,
}

impl std::fmt::Debug for FnEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnEndpoint")
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

impl FnEndpoint {
    pub fn new(callback: Arc<dyn EndpointCallback>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&Session, EndpointEvent<'_>) + Send + Sync + 'static,
    {
        Self::new(Arc::new(f))
    }

    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    /// Forwards the open event.
    ///
    /// An endpoint built without a callback captures it from `config` first;
    /// if none is stored there (or it has another type) the open fails.
    pub fn on_open(&mut self, session: &Session, config: &EndpointConfig) -> Result<(), EndpointError> {
        if self.callback.is_none() {
            let captured = config
                .user_property::<Arc<dyn EndpointCallback>>(USER_PROPERTY_KEY)
                .cloned()
                .ok_or_else(|| EndpointError::MissingCallback(USER_PROPERTY_KEY.to_string()))?;
            log::debug!("Session {}: endpoint callback captured from user properties", session.id());
            self.callback = Some(captured);
        }

        if let Some(callback) = &self.callback {
            callback.on_event(session, EndpointEvent::Open { config });
        }
        Ok(())
    }

    pub fn on_close(&self, session: &Session, reason: &CloseReason) {
        if let Some(callback) = &self.callback {
            callback.on_event(session, EndpointEvent::Close { reason });
        }
    }

    pub fn on_error(&self, session: &Session, error: &dyn Error) {
        match &self.callback {
            Some(callback) => callback.on_event(session, EndpointEvent::Error { error }),
            None => log::warn!("Session {}: error before open: {}", session.id(), error),
        }
    }
}
