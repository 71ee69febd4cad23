use crate::config::{validate, ContainerConfig};
use crate::dispatch::{Handler, HandlerConfig};
use crate::errors::ContainerError;
use crate::invocation::{CapturedResponse, Invocation, InvocationBuilder};

/// Hosts a single [`Handler`] and drives invocations through it.
pub struct MockContainer {
    config: ContainerConfig,                // Timeouts and buffer settings for every invocation
    handler_config: HandlerConfig,          // Handed to the handler at init
    handler: Box<dyn Handler>,
    destroyed: bool,
}

impl std::fmt::Debug for MockContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockContainer")
            .field("config", &self.config)
            .field("handler_config", &self.handler_config)
            .field("handler", &self.handler.info())
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

impl MockContainer {
    // Initializes the handler and takes ownership of it. Fails when the handler cannot resolve
    // what it needs from its configuration.
    pub fn new<H: Handler + 'static>(
        handler: H,
        handler_config: HandlerConfig,
        config: ContainerConfig,
    ) -> Result<Self, ContainerError> {
        Self::from_boxed(Box::new(handler), handler_config, config)
    }

    pub fn from_boxed(
        mut handler: Box<dyn Handler>,
        handler_config: HandlerConfig,
        config: ContainerConfig,
    ) -> Result<Self, ContainerError> {
        validate(&config)?;
        handler.init(&handler_config)?;
        log::debug!("Container started for handler '{}': {}", handler_config.name(), handler.info());

        Ok(Self {
            config,
            handler_config,
            handler,
            destroyed: false,
        })
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    pub fn handler_config(&self) -> &HandlerConfig {
        &self.handler_config
    }

    pub fn handler_info(&self) -> String {
        self.handler.info()
    }

    pub fn is_shut_down(&self) -> bool {
        self.destroyed
    }

    // Builds the invocation and runs the handler against it. Does not wait: the handler may
    // still be completing on another thread when this returns.
    pub fn invoke(&self, builder: InvocationBuilder) -> Result<Invocation, ContainerError> {
        let invocation = builder.build(&self.config)?;
        log::debug!(
            "Invocation[{}]: {} {}",
            invocation.id(),
            invocation.request().method(),
            invocation.request().url()
        );

        self.handler.service(invocation.request(), invocation.response());
        Ok(invocation)
    }

    // Runs the handler and waits up to the configured completion timeout
    pub fn response_for(&self, builder: InvocationBuilder) -> Result<CapturedResponse, ContainerError> {
        let invocation = self.invoke(builder)?;
        let timeout = self.config.completion_timeout;

        if invocation.wait_for_completion(timeout) {
            return Ok(invocation.capture());
        }
        Err(self.timed_out(&invocation))
    }

    // Same as `response_for`, but waits without blocking the executor
    pub async fn response_for_async(&self, builder: InvocationBuilder) -> Result<CapturedResponse, ContainerError> {
        let invocation = self.invoke(builder)?;
        let timeout = self.config.completion_timeout;

        if invocation.wait_for_completion_async(timeout).await {
            return Ok(invocation.capture());
        }
        Err(self.timed_out(&invocation))
    }

    fn timed_out(&self, invocation: &Invocation) -> ContainerError {
        let timeout = self.config.completion_timeout;
        log::warn!("Invocation[{}]: no completion within {:?}", invocation.id(), timeout);

        ContainerError::CompletionTimeout {
            id: invocation.id(),
            timeout,
            partial: Box::new(invocation.capture()),
        }
    }

    // Destroys the handler. Only the first call has any effect.
    pub fn shutdown(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.handler.destroy();
        log::debug!("Container for handler '{}' shut down", self.handler_config.name());
    }
}

impl Drop for MockContainer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
