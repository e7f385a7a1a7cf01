//! Conversation model
//!
//! Messages are immutable values identified by an opaque id. A conversation
//! is an ordered, append-only sequence that always starts from the seed
//! welcome message.

use chrono::Utc;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::Serialize;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

/// Id of the seed message
pub const WELCOME_ID: &str = "welcome";

/// Content of the seed message
pub const WELCOME_TEXT: &str =
    "Hi, I'm your AI assistant and ready to chat. Type a question to get started.";

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single chat message. Equality and hashing use the id only.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    id: String,
    role: Role,
    content: String,
}

impl Message {
    /// Create a message with a freshly minted id
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: new_message_id(),
            role,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    fn welcome() -> Self {
        Self {
            id: WELCOME_ID.to_string(),
            role: Role::Assistant,
            content: WELCOME_TEXT.to_string(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Message {}

impl Hash for Message {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Ordered message history, never empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// The single-message seed conversation
    #[must_use]
    pub fn seed() -> Self {
        Self {
            messages: vec![Message::welcome()],
        }
    }

    /// Return a new conversation with `message` at the end
    #[must_use]
    pub fn append(&self, message: Message) -> Self {
        self.extend([message])
    }

    /// Return a new conversation with `messages` appended in order
    #[must_use]
    pub fn extend(&self, messages: impl IntoIterator<Item = Message>) -> Self {
        let mut next = self.messages.clone();
        for message in messages {
            debug_assert!(
                !next.contains(&message),
                "duplicate message id {}",
                message.id
            );
            next.push(message);
        }
        Self { messages: next }
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Content of the most recent user-authored message
    #[must_use]
    pub fn latest_user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }

    /// Whether this is exactly the seed state
    #[must_use]
    pub fn is_seed(&self) -> bool {
        matches!(self.messages.as_slice(), [only] if only.id == WELCOME_ID)
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::seed()
    }
}

static FALLBACK_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Mint a message id.
///
/// Uses a random v4 UUID from the OS random source. If that source is
/// unavailable, falls back to a time-based id that stays unique within the
/// process thanks to a monotonically increasing counter.
#[must_use]
pub fn new_message_id() -> String {
    let mut bytes = [0u8; 16];
    match OsRng.try_fill_bytes(&mut bytes) {
        Ok(()) => uuid::Builder::from_random_bytes(bytes)
            .into_uuid()
            .to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "OS random source unavailable, using time-based message id");
            fallback_message_id()
        }
    }
}

fn fallback_message_id() -> String {
    let millis = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
    let counter = FALLBACK_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}", to_base36(millis), to_base36(counter))
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        // n % 36 < 36, so the index is always in bounds
        #[allow(clippy::cast_possible_truncation)]
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_seed_is_single_welcome_message() {
        let conv = Conversation::seed();
        assert_eq!(conv.messages().len(), 1);
        let welcome = &conv.messages()[0];
        assert_eq!(welcome.id(), WELCOME_ID);
        assert_eq!(welcome.role(), Role::Assistant);
        assert_eq!(welcome.content(), WELCOME_TEXT);
        assert!(conv.is_seed());
    }

    #[test]
    fn test_append_is_pure() {
        let original = Conversation::seed();
        let next = original.append(Message::user("hello"));
        assert_eq!(original.messages().len(), 1);
        assert_eq!(next.messages().len(), 2);
        assert_eq!(next.messages()[1].content(), "hello");
        assert!(!next.is_seed());
    }

    #[test]
    fn test_latest_user_text() {
        let conv = Conversation::seed();
        assert_eq!(conv.latest_user_text(), None);

        let conv = conv
            .append(Message::user("first"))
            .append(Message::assistant("reply"))
            .append(Message::user("second"))
            .append(Message::assistant("another reply"));
        assert_eq!(conv.latest_user_text(), Some("second"));
    }

    #[test]
    fn test_message_equality_is_by_id() {
        let a = Message::user("same text");
        let b = Message::user("same text");
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_message_ids_are_unique() {
        let ids: HashSet<String> = (0..10_000).map(|_| new_message_id()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_fallback_ids_are_unique() {
        let ids: HashSet<String> = (0..10_000).map(|_| fallback_message_id()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_to_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_295), "zz");
    }

    #[test]
    fn test_conversation_serializes_as_message_list() {
        let conv = Conversation::seed().append(Message::user("hi"));
        let value = serde_json::to_value(&conv).unwrap();
        let list = value.as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1]["role"], "user");
        assert_eq!(list[1]["content"], "hi");
    }

    fn arb_message() -> impl Strategy<Value = Message> {
        (any::<bool>(), "[a-zA-Z0-9 ]{1,40}").prop_map(|(is_user, text)| {
            if is_user {
                Message::user(text)
            } else {
                Message::assistant(text)
            }
        })
    }

    proptest! {
        #[test]
        fn prop_append_then_append_equals_extend(a in arb_message(), b in arb_message()) {
            let base = Conversation::seed();
            let stepwise = base.append(a.clone()).append(b.clone());
            let batched = base.extend([a, b]);
            prop_assert_eq!(stepwise, batched);
        }

        #[test]
        fn prop_history_keeps_seed_first(history in proptest::collection::vec(arb_message(), 0..20)) {
            let conv = Conversation::seed().extend(history);
            prop_assert!(!conv.messages().is_empty());
            prop_assert_eq!(conv.messages()[0].id(), WELCOME_ID);
        }
    }
}
