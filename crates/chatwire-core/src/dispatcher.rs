//! Chat dispatcher
//!
//! Routes each call to the backend serving the model's category and owns the
//! cancellation registry consulted by `cancel_stream`.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chatwire_core::{AiModel, ChatDispatcher, ChatMessage, ConsoleLogger, DispatchSettings};
//!
//! # async fn run() -> chatwire_core::StreamResult<()> {
//! let logger = Arc::new(ConsoleLogger::new());
//! let dispatcher = ChatDispatcher::new(DispatchSettings::default(), logger)?;
//! let model = AiModel::local("llama", "llama3.2", "http://localhost:11434");
//! let messages = vec![ChatMessage::user("1", "llama", "Hi")];
//!
//! let mut on_progress = |content: &str| println!("{}", content);
//! let response = dispatcher.send_message(&model, &messages, Some(&mut on_progress)).await;
//! println!("{:?}", response.into_result());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use crate::config::{ConfigError, ConfigProvider, ConfigResult, DispatchSettings};
use crate::logging::SharedLogger;
use crate::providers::{
    build_http_client, ChatBackend, ChatResponse, CommercialBackend, CommercialProtocol,
    LocalBackend, LocalProtocol, ProgressFn, StreamResult,
};
use crate::types::{AiModel, CancellationRegistry, CancellationToken, ChatMessage};
use crate::{log_debug, log_info};

/// Clears the registry slot when the call ends, including when its future is dropped
struct Registration<'a> {
    registry: &'a CancellationRegistry,
    token: CancellationToken,
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        self.registry.finish(&self.token);
    }
}

/// Entry point for streaming chat calls
///
/// Clones share the backends and the cancellation registry.
#[derive(Clone)]
pub struct ChatDispatcher {
    commercial: Arc<dyn ChatBackend>,
    local: Arc<dyn ChatBackend>,
    registry: CancellationRegistry,
    logger: SharedLogger,
}

impl ChatDispatcher {
    /// Create a dispatcher with HTTP backends sharing one client
    pub fn new(settings: DispatchSettings, logger: SharedLogger) -> StreamResult<Self> {
        let client = build_http_client(&settings)?;
        let commercial = CommercialBackend::new(
            CommercialProtocol,
            client.clone(),
            settings.clone(),
            logger.clone(),
        );
        let local = LocalBackend::new(LocalProtocol, client, settings, logger.clone());
        Ok(Self::with_backends(Arc::new(commercial), Arc::new(local), logger))
    }

    /// Create a dispatcher over explicit backends
    pub fn with_backends(
        commercial: Arc<dyn ChatBackend>,
        local: Arc<dyn ChatBackend>,
        logger: SharedLogger,
    ) -> Self {
        Self {
            commercial,
            local,
            registry: CancellationRegistry::new(),
            logger,
        }
    }

    /// Create a dispatcher from the settings held by a config provider
    pub async fn from_config(
        config: &dyn ConfigProvider,
        logger: SharedLogger,
    ) -> ConfigResult<Self> {
        let settings = config.settings().await?;
        Self::new(settings, logger).map_err(|e| ConfigError::Other(e.to_string()))
    }

    /// Backend serving `model`
    ///
    /// Only the `commercial` category selects the commercial backend.
    pub fn backend_for(&self, model: &AiModel) -> &Arc<dyn ChatBackend> {
        if model.category.is_commercial() {
            &self.commercial
        } else {
            &self.local
        }
    }

    /// The registry `cancel_stream` acts on
    pub fn registry(&self) -> &CancellationRegistry {
        &self.registry
    }

    /// Stream a reply, registering the call as the one `cancel_stream` aborts
    ///
    /// A call started while another is registered takes over the slot; the
    /// earlier call keeps running but can no longer be cancelled here.
    pub async fn send_message(
        &self,
        model: &AiModel,
        messages: &[ChatMessage],
        on_progress: Option<ProgressFn<'_>>,
    ) -> ChatResponse {
        let token = CancellationToken::new();
        if self.registry.register(token.clone()).is_some() {
            log_debug!(self.logger, "Replacing the registered stream; it is no longer cancelable");
        }
        let _registration = Registration {
            registry: &self.registry,
            token: token.clone(),
        };

        self.send_message_with_token(model, messages, &token, on_progress).await
    }

    /// Stream a reply under a caller-owned token
    ///
    /// The call is not registered, so `cancel_stream` never reaches it.
    pub async fn send_message_with_token(
        &self,
        model: &AiModel,
        messages: &[ChatMessage],
        cancel: &CancellationToken,
        on_progress: Option<ProgressFn<'_>>,
    ) -> ChatResponse {
        let backend = self.backend_for(model);
        log_debug!(
            self.logger,
            "Dispatching model {} ({}) to {} backend",
            model.id,
            model.category.as_str(),
            backend.name()
        );
        backend.stream_chat(model, messages, cancel, on_progress).await
    }

    /// Abort the registered stream, if any
    ///
    /// Returns whether a stream was signalled.
    pub fn cancel_stream(&self) -> bool {
        let cancelled = self.registry.cancel();
        if cancelled {
            log_info!(self.logger, "Stream cancellation requested");
        }
        cancelled
    }
}

impl std::fmt::Debug for ChatDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatDispatcher")
            .field("commercial", &self.commercial.name())
            .field("local", &self.local.name())
            .field("registry", &self.registry)
            .finish()
    }
}
