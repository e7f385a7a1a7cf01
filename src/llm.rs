//! Assistant backend abstraction
//!
//! Provides one reply contract over the mock generator and the three wire
//! protocols (plain REST, worker REST, GraphQL).

mod dispatcher;
mod error;
mod graphql;
mod mock;
mod plain_rest;
mod transport;
mod types;
mod worker_rest;

#[cfg(test)]
pub(crate) mod testing;

pub use dispatcher::{Backend, Dispatcher};
pub use error::{normalize, LlmError, LlmErrorKind, DEFAULT_ERROR_MESSAGE};
pub use graphql::{GraphQlService, ASK_MUTATION};
pub use mock::{MockService, MOCK_PLACEHOLDER};
pub use plain_rest::PlainRestService;
pub use types::{Protocol, WireMessage};
pub use worker_rest::WorkerRestService;

use crate::conversation::Conversation;
use async_trait::async_trait;

/// Common interface for reply backends
#[async_trait]
pub trait ReplyService: Send + Sync {
    /// Produce the assistant's reply to a conversation snapshot.
    ///
    /// The returned text is trimmed and non-empty.
    ///
    /// # Errors
    ///
    /// Returns an [`LlmError`] classified by where the exchange broke down.
    async fn complete(&self, conversation: &Conversation) -> Result<String, LlmError>;

    /// Which protocol this backend speaks
    fn protocol(&self) -> Protocol;
}
