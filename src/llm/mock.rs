//! Placeholder replies for running without a backend

use super::{LlmError, Protocol, ReplyService};
use crate::conversation::Conversation;
use async_trait::async_trait;
use std::time::Duration;

/// Echoed when the conversation holds no user message yet
pub const MOCK_PLACEHOLDER: &str = "(nothing entered yet)";

/// Shortest allowed artificial delay
pub const MIN_MOCK_DELAY: Duration = Duration::from_millis(600);
/// Longest allowed artificial delay, also the default
pub const MAX_MOCK_DELAY: Duration = Duration::from_millis(800);

/// Deterministic stand-in for a backend. Never fails.
#[derive(Debug, Clone)]
pub struct MockService {
    delay: Duration,
}

impl MockService {
    /// `delay` is clamped into the 600-800 ms latency window
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay: delay.clamp(MIN_MOCK_DELAY, MAX_MOCK_DELAY),
        }
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Build the placeholder reply for a conversation
    #[must_use]
    pub fn reply_for(conversation: &Conversation) -> String {
        let said = conversation.latest_user_text().unwrap_or(MOCK_PLACEHOLDER);
        [
            "This is a placeholder reply. Once a real API is connected, the AI's answer will appear here.",
            "",
            "You just said:",
            said,
            "",
            "Tip: set CHAT_API_URL, CHAT_WORKER_URL or CHAT_GRAPHQL_URL to switch to a real backend.",
        ]
        .join("\n")
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new(MAX_MOCK_DELAY)
    }
}

#[async_trait]
impl ReplyService for MockService {
    async fn complete(&self, conversation: &Conversation) -> Result<String, LlmError> {
        tokio::time::sleep(self.delay).await;
        Ok(Self::reply_for(conversation))
    }

    fn protocol(&self) -> Protocol {
        Protocol::Mock
    }
}
