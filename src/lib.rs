//! Chat exchange engine
//!
//! Holds a multi-turn conversation with an assistant backend that may be a
//! local mock, a plain REST endpoint, a serverless worker endpoint, or a
//! GraphQL mutation endpoint, without the session knowing which.

pub mod config;
pub mod conversation;
pub mod llm;
pub mod session;
pub mod state_machine;

pub use config::{ChatConfig, ConfigError, Endpoint, RestParams};
pub use conversation::{Conversation, Message, Role};
pub use llm::{normalize, Backend, Dispatcher, LlmError, LlmErrorKind, Protocol, ReplyService};
pub use session::{Session, SessionSnapshot, SubmitOutcome};
pub use state_machine::SessionState;
