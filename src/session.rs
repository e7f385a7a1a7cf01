//! Conversation session
//!
//! Owns the conversation, the single-flight send guard and the last error.
//! Input is run through the pure state machine. The reply request runs on its
//! own task, so it finishes and records its outcome even if the caller stops
//! waiting; the lock is never held across it.

use crate::config::{ChatConfig, ConfigError};
use crate::conversation::{Conversation, Message};
use crate::llm::{normalize, Dispatcher, Protocol, DEFAULT_ERROR_MESSAGE};
use crate::state_machine::{transition, Effect, Event, SessionState, TransitionError};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// What became of a submitted message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The assistant reply that was appended
    Replied(String),
    /// The normalized error now held in `last_error`
    Failed(String),
    /// Blank input, or a request was already in flight
    Ignored,
}

/// Immutable view for rendering
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub conversation: Conversation,
    pub last_error: Option<String>,
}

pub struct Session {
    dispatcher: Arc<Dispatcher>,
    inner: Arc<Mutex<SessionInner>>,
}

#[derive(Debug, Default)]
struct SessionInner {
    state: SessionState,
    conversation: Conversation,
    last_error: Option<String>,
}

impl SessionInner {
    /// Run one transition and apply its effects.
    ///
    /// Returns whether a reply request should now be made.
    fn apply(&mut self, event: Event) -> Result<bool, TransitionError> {
        let result = transition(self.state, event)?;
        self.state = result.new_state;

        let mut request_reply = false;
        for effect in result.effects {
            match effect {
                Effect::AppendMessage { role, content } => {
                    self.conversation = self.conversation.append(Message::new(role, content));
                }
                Effect::ResetConversation => self.conversation = Conversation::seed(),
                Effect::RequestReply => request_reply = true,
                Effect::RecordError { message } => self.last_error = Some(message),
                Effect::ClearError => self.last_error = None,
            }
        }
        Ok(request_reply)
    }
}

fn lock_inner(inner: &Mutex<SessionInner>) -> MutexGuard<'_, SessionInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Ask the backend and fold the result back into the session
async fn run_request(
    dispatcher: Arc<Dispatcher>,
    inner: Arc<Mutex<SessionInner>>,
    snapshot: Conversation,
) -> SubmitOutcome {
    let (event, outcome) = match dispatcher.request_reply(&snapshot).await {
        Ok(reply) => (
            Event::ReplyReceived {
                text: reply.clone(),
            },
            SubmitOutcome::Replied(reply),
        ),
        Err(e) => {
            let message = normalize(&e);
            (
                Event::ReplyFailed {
                    error: message.clone(),
                },
                SubmitOutcome::Failed(message),
            )
        }
    };

    if let Err(e) = lock_inner(&inner).apply(event) {
        // Only this task leaves Sending, so the outcome always applies
        tracing::error!(error = %e, "Reply outcome rejected");
    }
    outcome
}

impl Session {
    /// Start idle with the seed conversation
    #[must_use]
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            inner: Arc::new(Mutex::new(SessionInner::default())),
        }
    }

    /// # Errors
    ///
    /// Fails if the configured backend's HTTP client cannot be built.
    pub fn from_config(config: &ChatConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(Dispatcher::from_config(config)?))
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        lock_inner(&self.inner)
    }

    #[must_use]
    pub fn is_backend_configured(&self) -> bool {
        self.dispatcher.is_backend_configured()
    }

    #[must_use]
    pub fn protocol(&self) -> Protocol {
        self.dispatcher.protocol()
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let inner = self.lock();
        SessionSnapshot {
            state: inner.state,
            conversation: inner.conversation.clone(),
            last_error: inner.last_error.clone(),
        }
    }

    #[must_use]
    pub fn conversation(&self) -> Conversation {
        self.lock().conversation.clone()
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    /// Submit user input and wait for the outcome.
    ///
    /// Blank input and input arriving while a request is outstanding are
    /// dropped without touching the conversation or the error. Dropping the
    /// returned future does not cancel an accepted request: it still runs to
    /// completion and its reply or error lands in the session.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let snapshot = {
            let mut inner = self.lock();
            match inner.apply(Event::Submit {
                text: text.to_string(),
            }) {
                Ok(true) => inner.conversation.clone(),
                Ok(false) => return SubmitOutcome::Ignored,
                Err(e) => {
                    tracing::debug!(reason = %e, "Submit ignored");
                    return SubmitOutcome::Ignored;
                }
            }
        };

        let request = tokio::spawn(run_request(
            Arc::clone(&self.dispatcher),
            Arc::clone(&self.inner),
            snapshot,
        ));

        match request.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "Reply task ended without an outcome");
                let message = DEFAULT_ERROR_MESSAGE.to_string();
                let mut inner = self.lock();
                if inner.state.is_busy() {
                    if let Err(e) = inner.apply(Event::ReplyFailed {
                        error: message.clone(),
                    }) {
                        tracing::error!(error = %e, "Reply outcome rejected");
                    }
                }
                SubmitOutcome::Failed(message)
            }
        }
    }

    /// Back to the seed conversation with no error.
    ///
    /// Returns false, changing nothing, while a request is outstanding.
    #[must_use]
    pub fn reset(&self) -> bool {
        match self.lock().apply(Event::Reset) {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(reason = %e, "Reset ignored");
                false
            }
        }
    }

    /// Drop the displayed error, leaving the conversation alone
    pub fn clear_error(&self) {
        self.lock().last_error = None;
    }
}
