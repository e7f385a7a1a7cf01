//! Reply dispatcher
//!
//! Holds the one backend selected at startup and routes every reply request
//! to it, logging the outcome.

use super::{
    GraphQlService, LlmError, MockService, PlainRestService, Protocol, ReplyService,
    WorkerRestService,
};
use crate::config::{ChatConfig, ConfigError, Endpoint};
use crate::conversation::Conversation;
use std::time::Instant;

/// The built service for the one backend in use
pub enum Backend {
    Mock(MockService),
    PlainRest(PlainRestService),
    WorkerRest(WorkerRestService),
    GraphQl(GraphQlService),
}

impl Backend {
    fn service(&self) -> &dyn ReplyService {
        match self {
            Backend::Mock(service) => service,
            Backend::PlainRest(service) => service,
            Backend::WorkerRest(service) => service,
            Backend::GraphQl(service) => service,
        }
    }
}

pub struct Dispatcher {
    backend: Backend,
}

impl Dispatcher {
    #[must_use]
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// Mock-only dispatcher with the default delay
    #[must_use]
    pub fn mock() -> Self {
        Self::new(Backend::Mock(MockService::default()))
    }

    /// Select and build the backend named by `config`
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client for a live backend cannot be built.
    pub fn from_config(config: &ChatConfig) -> Result<Self, ConfigError> {
        let backend = match &config.endpoint {
            None => {
                let mock = MockService::new(config.mock_delay);
                tracing::debug!(delay_ms = %mock.delay().as_millis(), "Mock backend selected");
                Backend::Mock(mock)
            }
            Some(Endpoint::PlainRest(url)) => {
                Backend::PlainRest(PlainRestService::new(url, config.rest.clone())?)
            }
            Some(Endpoint::WorkerRest(url)) => Backend::WorkerRest(WorkerRestService::new(url)?),
            Some(Endpoint::GraphQl(url)) => Backend::GraphQl(GraphQlService::new(url)?),
        };
        Ok(Self::new(backend))
    }

    #[must_use]
    pub fn is_backend_configured(&self) -> bool {
        self.protocol().is_live()
    }

    #[must_use]
    pub fn protocol(&self) -> Protocol {
        self.backend.service().protocol()
    }

    /// Get a reply for `conversation` from whichever backend is active
    ///
    /// # Errors
    ///
    /// Passes on the backend's classified failure unchanged.
    pub async fn request_reply(&self, conversation: &Conversation) -> Result<String, LlmError> {
        let protocol = self.protocol();
        let start = Instant::now();
        let result = self.backend.service().complete(conversation).await;
        let duration = start.elapsed();

        match &result {
            Ok(reply) => {
                tracing::info!(
                    protocol = %protocol,
                    duration_ms = %duration.as_millis(),
                    history = conversation.messages().len(),
                    reply_chars = reply.chars().count(),
                    "Reply received"
                );
            }
            Err(e) => {
                tracing::error!(
                    protocol = %protocol,
                    duration_ms = %duration.as_millis(),
                    kind = %e.kind,
                    status = ?e.status,
                    error = %e.message,
                    "Reply request failed"
                );
            }
        }

        result
    }
}
