use std::sync::Arc;

use crate::dispatch::handler::{DestroyFn, Handler, HandlerConfig, InitFn, ServiceFn};
use crate::dispatch::registry::HandlerRegistry;
use crate::errors::DispatchError;
use crate::request::MockRequest;
use crate::response::MockResponse;

pub const INIT_PARAM: &str = "init";
pub const SERVICE_PARAM: &str = "service";
pub const DESTROY_PARAM: &str = "destroy";

/// Handler configured by name.
///
/// At `init` the `init`, `service` and `destroy` parameters are resolved against
/// the registry; only `service` is required. The resolved `init` handle runs
/// right away. After that, no lookups happen per request.
pub struct VarHandler {
    registry: Arc<HandlerRegistry>,
    service: Option<ServiceFn>,
    destroy: Option<DestroyFn>,
    service_symbol: Option<String>,
}

impl std::fmt::Debug for VarHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VarHandler")
            .field("service_symbol", &self.service_symbol)
            .field("destroy", &self.destroy.is_some())
            .finish()
    }
}

impl VarHandler {
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self {
            registry,
            service: None,
            destroy: None,
            service_symbol: None,
        }
    }

    pub fn is_initialised(&self) -> bool {
        self.service.is_some()
    }

    fn resolve(&self, config: &HandlerConfig) -> Result<(Option<InitFn>, ServiceFn, Option<DestroyFn>), DispatchError> {
        let init = self.registry.resolve_init(config, INIT_PARAM)?;
        let service = self.registry.resolve_service(config, SERVICE_PARAM)?;
        let destroy = self.registry.resolve_destroy(config, DESTROY_PARAM)?;
        Ok((init, service, destroy))
    }
}

impl Handler for VarHandler {
    fn init(&mut self, config: &HandlerConfig) -> Result<(), DispatchError> {
        let (init, service, destroy) = self
            .resolve(config)
            .inspect_err(|e| log::error!("Handler '{}': {}", config.name(), e))?;

        if let Some(init) = init {
            init(config);
        }

        self.service = Some(service);
        self.destroy = destroy;
        self.service_symbol = config.get(SERVICE_PARAM).map(str::to_string);
        log::debug!("Handler '{}' initialised", config.name());
        Ok(())
    }

    fn service(&self, request: &MockRequest, response: &MockResponse) {
        match &self.service {
            Some(service) => service(request, response),
            None => log::warn!("VarHandler: service called before init"),
        }
    }

    fn destroy(&mut self) {
        if let Some(destroy) = self.destroy.take() {
            destroy();
        }
        self.service = None;
    }

    fn info(&self) -> String {
        match &self.service_symbol {
            Some(symbol) => format!("VarHandler serving {}", symbol),
            None => "VarHandler (uninitialised)".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContainerConfig;
    use crate::invocation::Invocation;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counters {
        init: Arc<AtomicUsize>,
        destroy: Arc<AtomicUsize>,
    }

    fn registry() -> (Arc<HandlerRegistry>, Counters) {
        let counters = Counters {
            init: Arc::new(AtomicUsize::new(0)),
            destroy: Arc::new(AtomicUsize::new(0)),
        };

        let mut r = HandlerRegistry::new();
        let init = counters.init.clone();
        r.register_init("app.handlers/setup", move |_| {
            init.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
        let destroy = counters.destroy.clone();
        r.register_destroy("app.handlers/teardown", move || {
            destroy.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
        r.register_service("app.handlers/hello", |_, resp| {
            resp.set_status(200);
            let mut out = resp.output_stream();
            let _ = out.write_all(b"hello");
            let _ = out.flush();
        })
        .unwrap();

        (Arc::new(r), counters)
    }

    fn invocation() -> Invocation {
        Invocation::builder("GET", "/hello")
            .empty_body()
            .build(&ContainerConfig::default())
            .unwrap()
    }

    #[test]
    fn resolves_all_handles_and_runs_them() {
        let (registry, counters) = registry();
        let mut handler = VarHandler::new(registry);
        let cfg = HandlerConfig::new("hello")
            .param(INIT_PARAM, "app.handlers/setup")
            .param(SERVICE_PARAM, "app.handlers/hello")
            .param(DESTROY_PARAM, "app.handlers/teardown");

        handler.init(&cfg).unwrap();
        assert!(handler.is_initialised());
        assert_eq!(counters.init.load(Ordering::SeqCst), 1);
        assert_eq!(handler.info(), "VarHandler serving app.handlers/hello");

        let inv = invocation();
        handler.service(inv.request(), inv.response());
        let captured = inv.capture();
        assert_eq!(captured.status, 200);
        assert_eq!(captured.body_text(), "hello");

        handler.destroy();
        handler.destroy();
        assert_eq!(counters.destroy.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn service_is_required() {
        let (registry, counters) = registry();
        let mut handler = VarHandler::new(registry);
        let cfg = HandlerConfig::new("hello").param(INIT_PARAM, "app.handlers/setup");

        let err = handler.init(&cfg).unwrap_err();
        assert!(matches!(err, DispatchError::MissingParameter(p) if p == SERVICE_PARAM));
        // nothing runs when resolution fails
        assert_eq!(counters.init.load(Ordering::SeqCst), 0);
        assert!(!handler.is_initialised());
    }

    #[test]
    fn unresolvable_optional_handle_still_fails() {
        let (registry, _) = registry();
        let mut handler = VarHandler::new(registry);
        let cfg = HandlerConfig::new("hello")
            .param(SERVICE_PARAM, "app.handlers/hello")
            .param(DESTROY_PARAM, "app.handlers/missing");

        assert!(matches!(handler.init(&cfg).unwrap_err(), DispatchError::Unresolved { .. }));
    }

    #[test]
    fn service_before_init_does_nothing() {
        let (registry, _) = registry();
        let handler = VarHandler::new(registry);
        let inv = invocation();

        handler.service(inv.request(), inv.response());
        assert_eq!(inv.response().status(), 0);
        assert!(!inv.is_completed());
        assert_eq!(handler.info(), "VarHandler (uninitialised)");
    }
}
