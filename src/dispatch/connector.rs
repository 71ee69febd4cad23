use std::sync::Arc;

use crate::dispatch::handler::{Handler, HandlerConfig};
use crate::dispatch::registry::HandlerRegistry;
use crate::errors::DispatchError;
use crate::request::MockRequest;
use crate::response::MockResponse;

/// Init parameter naming the bridge factory.
pub const CREATE_BRIDGE_PARAM: &str = "create-bridge";

/// Object that actually serves requests for a [`ConnectorHandler`].
pub trait ConnectorBridge: Send + Sync {
    fn service(&self, request: &MockRequest, response: &MockResponse);

    fn destroy(&mut self) {}
}

/// Builds a bridge from the handler's configuration. User code, so it may fail
/// with anything.
pub type BridgeFactory =
    Arc<dyn Fn(&HandlerConfig) -> anyhow::Result<Box<dyn ConnectorBridge>> + Send + Sync>;

/// Handler that delegates to a bridge object created at init time.
pub struct ConnectorHandler {
    registry: Arc<HandlerRegistry>,
    factory_symbol: Option<String>,
    bridge: Option<Box<dyn ConnectorBridge>>,
}

impl std::fmt::Debug for ConnectorHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectorHandler")
            .field("factory_symbol", &self.factory_symbol)
            .field("bridge", &self.bridge.is_some())
            .finish()
    }
}

impl ConnectorHandler {
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self {
            registry,
            factory_symbol: None,
            bridge: None,
        }
    }

    pub fn has_bridge(&self) -> bool {
        self.bridge.is_some()
    }
}

impl Handler for ConnectorHandler {
    fn init(&mut self, config: &HandlerConfig) -> Result<(), DispatchError> {
        let (symbol, factory) = self
            .registry
            .resolve_bridge_factory(config, CREATE_BRIDGE_PARAM)
            .inspect_err(|e| log::error!("Handler '{}': {}", config.name(), e))?;

        let bridge = factory(config).map_err(|source| {
            log::error!("Handler '{}': bridge factory '{}' failed: {:#}", config.name(), symbol, source);
            DispatchError::Bridge {
                symbol: symbol.clone(),
                source,
            }
        })?;

        log::debug!("Handler '{}': bridge created by '{}'", config.name(), symbol);
        self.factory_symbol = Some(symbol);
        self.bridge = Some(bridge);
        Ok(())
    }

    fn service(&self, request: &MockRequest, response: &MockResponse) {
        match &self.bridge {
            Some(bridge) => bridge.service(request, response),
            None => log::warn!("ConnectorHandler: service called without a bridge"),
        }
    }

    fn destroy(&mut self) {
        if let Some(mut bridge) = self.bridge.take() {
            bridge.destroy();
        }
    }

    fn info(&self) -> String {
        match &self.factory_symbol {
            Some(symbol) => format!("ConnectorHandler bridging through {}", symbol),
            None => "ConnectorHandler (uninitialised)".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContainerConfig;
    use crate::invocation::Invocation;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Greeter {
        greeting: String,
        destroyed: Arc<AtomicUsize>,
    }

    impl ConnectorBridge for Greeter {
        fn service(&self, _request: &MockRequest, response: &MockResponse) {
            response.set_status(200);
            response.set_header("X-Greeting", &self.greeting);
        }

        fn destroy(&mut self) {
            self.destroyed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn registry(destroyed: Arc<AtomicUsize>) -> Arc<HandlerRegistry> {
        let mut r = HandlerRegistry::new();
        r.register_bridge("app.bridge/create", move |cfg| {
            Ok(Box::new(Greeter {
                greeting: cfg.get("greeting").unwrap_or("hello").to_string(),
                destroyed: destroyed.clone(),
            }) as Box<dyn ConnectorBridge>)
        })
        .unwrap();
        r.register_bridge("app.bridge/broken", |_| Err(anyhow::anyhow!("no backend")))
            .unwrap();
        r.register_service("app.bridge/plain", |_, _| {}).unwrap();
        Arc::new(r)
    }

    fn invocation() -> Invocation {
        Invocation::builder("GET", "/bridge")
            .empty_body()
            .build(&ContainerConfig::default())
            .unwrap()
    }

    #[test]
    fn forwards_to_bridge_and_destroys_once() {
        let destroyed = Arc::new(AtomicUsize::new(0));
        let mut handler = ConnectorHandler::new(registry(destroyed.clone()));
        let cfg = HandlerConfig::new("bridged")
            .param(CREATE_BRIDGE_PARAM, "app.bridge/create")
            .param("greeting", "hi");

        handler.init(&cfg).unwrap();
        assert!(handler.has_bridge());
        assert_eq!(handler.info(), "ConnectorHandler bridging through app.bridge/create");

        let inv = invocation();
        handler.service(inv.request(), inv.response());
        assert_eq!(inv.response().status(), 200);
        assert_eq!(inv.response().header("X-Greeting").as_deref(), Some("hi"));

        handler.destroy();
        handler.destroy();
        assert!(!handler.has_bridge());
        assert_eq!(destroyed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn missing_factory_parameter() {
        let mut handler = ConnectorHandler::new(registry(Arc::new(AtomicUsize::new(0))));
        let err = handler.init(&HandlerConfig::new("bridged")).unwrap_err();
        assert!(matches!(err, DispatchError::MissingParameter(p) if p == CREATE_BRIDGE_PARAM));
    }

    #[test]
    fn factory_failure_keeps_the_cause() {
        let mut handler = ConnectorHandler::new(registry(Arc::new(AtomicUsize::new(0))));
        let cfg = HandlerConfig::new("bridged").param(CREATE_BRIDGE_PARAM, "app.bridge/broken");

        let err = handler.init(&cfg).unwrap_err();
        assert_eq!(err.to_string(), "Bridge factory 'app.bridge/broken' failed");
        let cause = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(cause.as_deref(), Some("no backend"));
        assert!(!handler.has_bridge());
    }

    #[test]
    fn wrong_kind_for_factory() {
        let mut handler = ConnectorHandler::new(registry(Arc::new(AtomicUsize::new(0))));
        let cfg = HandlerConfig::new("bridged").param(CREATE_BRIDGE_PARAM, "app.bridge/plain");

        assert!(matches!(handler.init(&cfg).unwrap_err(), DispatchError::WrongKind { .. }));
    }

    #[test]
    fn service_without_bridge_is_ignored() {
        let handler = ConnectorHandler::new(Arc::new(HandlerRegistry::new()));
        let inv = invocation();
        handler.service(inv.request(), inv.response());
        assert_eq!(inv.response().status(), 0);
    }
}
