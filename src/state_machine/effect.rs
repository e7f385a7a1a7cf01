//! Effects produced by state transitions

use crate::conversation::Role;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append a new message to the conversation
    AppendMessage { role: Role, content: String },

    /// Replace the conversation with the seed state
    ResetConversation,

    /// Ask the dispatcher for a reply to the current conversation
    RequestReply,

    /// Set the error shown to the user
    RecordError { message: String },

    ClearError,
}

impl Effect {
    #[must_use]
    pub fn append_user(content: impl Into<String>) -> Self {
        Effect::AppendMessage {
            role: Role::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn append_assistant(content: impl Into<String>) -> Self {
        Effect::AppendMessage {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
