//! Common types for backend wire formats

use crate::conversation::{Conversation, Message};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// The closed set of reply strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Mock,
    PlainRest,
    WorkerRest,
    GraphQl,
}

impl Protocol {
    /// Whether a real backend answers (anything but mock)
    #[must_use]
    pub fn is_live(self) -> bool {
        !matches!(self, Protocol::Mock)
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Protocol::Mock => "mock",
            Protocol::PlainRest => "rest",
            Protocol::WorkerRest => "worker",
            Protocol::GraphQl => "graphql",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// `{role, content}` pair as every protocol sends it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireMessage {
    pub role: &'static str,
    pub content: String,
}

impl From<&Message> for WireMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role().as_str(),
            content: message.content().to_string(),
        }
    }
}

/// Full dialogue history in chronological order
pub(crate) fn wire_messages(conversation: &Conversation) -> Vec<WireMessage> {
    conversation.messages().iter().map(WireMessage::from).collect()
}

/// Path segment into a JSON response
#[derive(Debug, Clone, Copy)]
pub(crate) enum Seg {
    Key(&'static str),
    Index(usize),
}

pub(crate) fn lookup<'a>(value: &'a Value, path: &[Seg]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, seg| match seg {
        Seg::Key(key) => current.get(*key),
        Seg::Index(i) => current.get(*i),
    })
}

/// First candidate path holding a non-blank string, trimmed
pub(crate) fn first_text(value: &Value, candidates: &[&[Seg]]) -> Option<String> {
    candidates.iter().find_map(|path| {
        lookup(value, path)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

/// Coerce a JSON scalar to reply text, trimmed. Null and blank are absent.
pub(crate) fn coerce_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    };
    (!text.is_empty()).then_some(text)
}
