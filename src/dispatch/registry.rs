//! Table of named function handles.
//!
//! Handlers configured by name (see [`VarHandler`](super::VarHandler) and
//! [`ConnectorHandler`](super::ConnectorHandler)) look their functions up here,
//! once, while they are initialised. Names are namespace-qualified symbols of
//! the form `namespace/name`.
//!
//! Resolution failures are reported precisely:
//!
//! | situation                              | error                                |
//! |----------------------------------------|--------------------------------------|
//! | required parameter not configured      | [`DispatchError::MissingParameter`]  |
//! | value is not `namespace/name`          | [`DispatchError::InvalidSymbol`]     |
//! | namespace never registered             | [`DispatchError::NamespaceNotFound`] |
//! | namespace known, name not              | [`DispatchError::Unresolved`]        |
//! | handle registered with another kind    | [`DispatchError::WrongKind`]         |

use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;

use crate::dispatch::connector::{BridgeFactory, ConnectorBridge};
use crate::dispatch::handler::{DestroyFn, HandlerConfig, InitFn, ServiceFn};
use crate::errors::DispatchError;
use crate::request::MockRequest;
use crate::response::MockResponse;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HandleKind {
    Init,
    Service,
    Destroy,
    BridgeFactory,
}

impl Display for HandleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandleKind::Init => write!(f, "init"),
            HandleKind::Service => write!(f, "service"),
            HandleKind::Destroy => write!(f, "destroy"),
            HandleKind::BridgeFactory => write!(f, "bridge factory"),
        }
    }
}

#[derive(Clone)]
pub enum HandleFn {
    Init(InitFn),
    Service(ServiceFn),
    Destroy(DestroyFn),
    BridgeFactory(BridgeFactory),
}

impl HandleFn {
    pub fn kind(&self) -> HandleKind {
        match self {
            HandleFn::Init(_) => HandleKind::Init,
            HandleFn::Service(_) => HandleKind::Service,
            HandleFn::Destroy(_) => HandleKind::Destroy,
            HandleFn::BridgeFactory(_) => HandleKind::BridgeFactory,
        }
    }
}

impl std::fmt::Debug for HandleFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HandleFn::{:?}", self.kind())
    }
}

/// Splits `namespace/name`. Both parts must be non-empty.
fn parse_symbol(symbol: &str) -> Result<(&str, &str), DispatchError> {
    match symbol.split_once('/') {
        Some((ns, name)) if !ns.is_empty() && !name.is_empty() => Ok((ns, name)),
        _ => Err(DispatchError::InvalidSymbol(symbol.to_string())),
    }
}

#[derive(Debug, Default, Clone)]
pub struct HandlerRegistry {
    namespaces: HashMap<String, HashMap<String, HandleFn>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handle` under `symbol`, replacing any earlier registration.
    pub fn register(&mut self, symbol: &str, handle: HandleFn) -> Result<(), DispatchError> {
        let (ns, name) = parse_symbol(symbol)?;
        log::debug!("Registering {} handle '{}'", handle.kind(), symbol);
        self.namespaces
            .entry(ns.to_string())
            .or_default()
            .insert(name.to_string(), handle);
        Ok(())
    }

    pub fn register_init<F>(&mut self, symbol: &str, f: F) -> Result<(), DispatchError>
    where
        F: Fn(&HandlerConfig) + Send + Sync + 'static,
    {
        self.register(symbol, HandleFn::Init(Arc::new(f)))
    }

    pub fn register_service<F>(&mut self, symbol: &str, f: F) -> Result<(), DispatchError>
    where
        F: Fn(&MockRequest, &MockResponse) + Send + Sync + 'static,
    {
        self.register(symbol, HandleFn::Service(Arc::new(f)))
    }

    pub fn register_destroy<F>(&mut self, symbol: &str, f: F) -> Result<(), DispatchError>
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.register(symbol, HandleFn::Destroy(Arc::new(f)))
    }

    pub fn register_bridge<F>(&mut self, symbol: &str, f: F) -> Result<(), DispatchError>
    where
        F: Fn(&HandlerConfig) -> anyhow::Result<Box<dyn ConnectorBridge>> + Send + Sync + 'static,
    {
        self.register(symbol, HandleFn::BridgeFactory(Arc::new(f)))
    }

    pub fn contains(&self, symbol: &str) -> bool {
        parse_symbol(symbol)
            .ok()
            .and_then(|(ns, name)| self.namespaces.get(ns)?.get(name))
            .is_some()
    }

    /// Looks up a symbol directly.
    pub fn resolve_symbol(&self, symbol: &str) -> Result<&HandleFn, DispatchError> {
        let (ns, name) = parse_symbol(symbol)?;
        let namespace = self
            .namespaces
            .get(ns)
            .ok_or_else(|| DispatchError::NamespaceNotFound(ns.to_string()))?;

        namespace.get(name).ok_or_else(|| DispatchError::Unresolved {
            symbol: symbol.to_string(),
        })
    }

    /// Looks up the symbol named by config parameter `param`.
    fn lookup<'a>(
        &'a self,
        config: &'a HandlerConfig,
        param: &str,
        required: bool,
    ) -> Result<Option<(&'a str, &'a HandleFn)>, DispatchError> {
        let Some(symbol) = config.get(param) else {
            if required {
                return Err(DispatchError::MissingParameter(param.to_string()));
            }
            return Ok(None);
        };

        Ok(Some((symbol, self.resolve_symbol(symbol)?)))
    }

    pub fn resolve_init(&self, config: &HandlerConfig, param: &str) -> Result<Option<InitFn>, DispatchError> {
        match self.lookup(config, param, false)? {
            None => Ok(None),
            Some((_, HandleFn::Init(f))) => Ok(Some(f.clone())),
            Some((symbol, other)) => Err(wrong_kind(symbol, HandleKind::Init, other)),
        }
    }

    pub fn resolve_service(&self, config: &HandlerConfig, param: &str) -> Result<ServiceFn, DispatchError> {
        match self.lookup(config, param, true)? {
            Some((_, HandleFn::Service(f))) => Ok(f.clone()),
            Some((symbol, other)) => Err(wrong_kind(symbol, HandleKind::Service, other)),
            None => Err(DispatchError::MissingParameter(param.to_string())),
        }
    }

    pub fn resolve_destroy(&self, config: &HandlerConfig, param: &str) -> Result<Option<DestroyFn>, DispatchError> {
        match self.lookup(config, param, false)? {
            None => Ok(None),
            Some((_, HandleFn::Destroy(f))) => Ok(Some(f.clone())),
            Some((symbol, other)) => Err(wrong_kind(symbol, HandleKind::Destroy, other)),
        }
    }

    /// Returns the factory together with the symbol it was registered under.
    pub fn resolve_bridge_factory(
        &self,
        config: &HandlerConfig,
        param: &str,
    ) -> Result<(String, BridgeFactory), DispatchError> {
        match self.lookup(config, param, true)? {
            Some((symbol, HandleFn::BridgeFactory(f))) => Ok((symbol.to_string(), f.clone())),
            Some((symbol, other)) => Err(wrong_kind(symbol, HandleKind::BridgeFactory, other)),
            None => Err(DispatchError::MissingParameter(param.to_string())),
        }
    }
}

fn wrong_kind(symbol: &str, expected: HandleKind, found: &HandleFn) -> DispatchError {
    DispatchError::WrongKind {
        symbol: symbol.to_string(),
        expected,
        found: found.kind(),
    }
}
