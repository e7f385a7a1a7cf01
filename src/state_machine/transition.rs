//! Pure state transition function

use super::{Effect, Event, SessionState};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug, PartialEq, Eq)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    #[must_use]
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Why an event was not accepted. The session drops these silently.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("A reply is already being requested")]
    Busy,
    #[error("Message is blank")]
    BlankInput,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs, with no I/O.
///
/// # Errors
///
/// Rejects blank input, input while a request is outstanding, and reply
/// outcomes arriving while idle. None of these change the state.
pub fn transition(state: SessionState, event: Event) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // User input
        // ============================================================

        // Idle + Submit -> Sending
        (SessionState::Idle, Event::Submit { text }) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Err(TransitionError::BlankInput);
            }
            Ok(TransitionResult::new(SessionState::Sending)
                .with_effect(Effect::append_user(trimmed))
                .with_effect(Effect::ClearError)
                .with_effect(Effect::RequestReply))
        }

        // Single flight: nothing is queued behind an outstanding request
        (SessionState::Sending, Event::Submit { .. } | Event::Reset) => {
            Err(TransitionError::Busy)
        }

        (SessionState::Idle, Event::Reset) => Ok(TransitionResult::new(SessionState::Idle)
            .with_effect(Effect::ResetConversation)
            .with_effect(Effect::ClearError)),

        // ============================================================
        // Backend outcome
        // ============================================================

        (SessionState::Sending, Event::ReplyReceived { text }) => {
            Ok(TransitionResult::new(SessionState::Idle).with_effect(Effect::append_assistant(text)))
        }

        // The user message stays; only the error is recorded
        (SessionState::Sending, Event::ReplyFailed { error }) => {
            Ok(TransitionResult::new(SessionState::Idle)
                .with_effect(Effect::RecordError { message: error }))
        }

        (SessionState::Idle, event @ (Event::ReplyReceived { .. } | Event::ReplyFailed { .. })) => {
            Err(TransitionError::InvalidTransition(format!(
                "{event:?} while idle"
            )))
        }
    }
}
