use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::DispatchError;
use crate::request::MockRequest;
use crate::response::MockResponse;

/// Called once with the handler's configuration.
pub type InitFn = Arc<dyn Fn(&HandlerConfig) + Send + Sync>;
/// Called for every request.
pub type ServiceFn = Arc<dyn Fn(&MockRequest, &MockResponse) + Send + Sync>;
/// Called once when the handler is taken out of service.
pub type DestroyFn = Arc<dyn Fn() + Send + Sync>;

/// Lifecycle of a request handler hosted by the mock container.
pub trait Handler: Send {
    fn init(&mut self, config: &HandlerConfig) -> Result<(), DispatchError>;

    fn service(&self, request: &MockRequest, response: &MockResponse);

    fn destroy(&mut self);

    fn info(&self) -> String {
        String::new()
    }
}

/// Name plus init parameters, as a hosting container would hand them over.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HandlerConfig {
    name: String,
    params: HashMap<String, String>,
}

impl HandlerConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: HashMap::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }
}

/// Handler whose lifecycle calls go straight to the handles it was built with.
pub struct FnHandler {
    label: String,
    init: Option<InitFn>,
    service: ServiceFn,
    destroy: Option<DestroyFn>,
}

impl std::fmt::Debug for FnHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnHandler")
            .field("label", &self.label)
            .field("init", &self.init.is_some())
            .field("destroy", &self.destroy.is_some())
            .finish()
    }
}

impl FnHandler {
    pub fn new<F>(service: F) -> Self
    where
        F: Fn(&MockRequest, &MockResponse) + Send + Sync + 'static,
    {
        Self::from_parts(None, Arc::new(service), None)
    }

    pub fn from_parts(init: Option<InitFn>, service: ServiceFn, destroy: Option<DestroyFn>) -> Self {
        Self {
            label: "service function".to_string(),
            init,
            service,
            destroy,
        }
    }

    /// Name used by [`Handler::info`].
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_init<F>(mut self, init: F) -> Self
    where
        F: Fn(&HandlerConfig) + Send + Sync + 'static,
    {
        self.init = Some(Arc::new(init));
        self
    }

    pub fn with_destroy<F>(mut self, destroy: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.destroy = Some(Arc::new(destroy));
        self
    }
}

impl Handler for FnHandler {
    fn init(&mut self, config: &HandlerConfig) -> Result<(), DispatchError> {
        if let Some(init) = &self.init {
            init(config);
        }
        Ok(())
    }

    fn service(&self, request: &MockRequest, response: &MockResponse) {
        (self.service)(request, response);
    }

    fn destroy(&mut self) {
        if let Some(destroy) = &self.destroy {
            destroy();
        }
    }

    fn info(&self) -> String {
        format!("FnHandler dispatching to {}", self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContainerConfig;
    use crate::invocation::Invocation;
    use std::sync::Mutex;

    #[test]
    fn config_params_round_trip() {
        let cfg = HandlerConfig::new("app")
            .param("service", "app/handle")
            .param("mode", "test");

        assert_eq!(cfg.name(), "app");
        assert_eq!(cfg.get("service"), Some("app/handle"));
        assert_eq!(cfg.get("missing"), None);
        assert_eq!(cfg.params().len(), 2);
    }

    #[test]
    fn fn_handler_forwards_lifecycle_calls() {
        let calls = Arc::new(Mutex::new(Vec::<String>::new()));

        let c_init = calls.clone();
        let c_service = calls.clone();
        let c_destroy = calls.clone();
        let mut handler = FnHandler::new(move |req, resp| {
            c_service.lock().unwrap().push(format!("service {}", req.path()));
            resp.set_status(200);
        })
        .with_init(move |cfg| c_init.lock().unwrap().push(format!("init {}", cfg.name())))
        .with_destroy(move || c_destroy.lock().unwrap().push("destroy".into()))
        .label("echo");

        let inv = Invocation::builder("GET", "/x")
            .empty_body()
            .build(&ContainerConfig::default())
            .unwrap();

        handler.init(&HandlerConfig::new("h")).unwrap();
        handler.service(inv.request(), inv.response());
        handler.destroy();

        assert_eq!(
            *calls.lock().unwrap(),
            vec!["init h".to_string(), "service /x".to_string(), "destroy".to_string()]
        );
        assert_eq!(inv.response().status(), 200);
        assert_eq!(handler.info(), "FnHandler dispatching to echo");
    }

    #[test]
    fn optional_handles_are_skipped() {
        let mut handler = FnHandler::from_parts(None, Arc::new(|_, _| {}), None);
        assert!(handler.init(&HandlerConfig::default()).is_ok());
        handler.destroy();
    }
}
