//! GraphQL adapter
//!
//! Sends a fixed `ask` mutation. A non-empty top-level `errors` list wins
//! over any `data` in the same response.

use super::transport::{build_client, post_json};
use super::types::{coerce_text, lookup, wire_messages, Seg, WireMessage};
use super::{LlmError, Protocol, ReplyService};
use crate::conversation::Conversation;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

/// The mutation document sent with every request
pub const ASK_MUTATION: &str = "\
mutation Ask($question: String!, $messages: [ChatMessageInput!]!) {
  ask(question: $question, messages: $messages) {
    reply
  }
}";

/// Raised when `data.ask.reply` is absent and no errors were reported
pub const MISSING_REPLY_MESSAGE: &str = "GraphQL response is missing data.ask.reply";

/// Used when the first error has no usable `message`
const UNDESCRIBED_ERROR_MESSAGE: &str = "GraphQL request returned an error";

const REPLY_PATH: &[Seg] = &[Seg::Key("data"), Seg::Key("ask"), Seg::Key("reply")];

pub struct GraphQlService {
    client: Client,
    endpoint: String,
}

impl GraphQlService {
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_client()?,
            endpoint: endpoint.into(),
        })
    }

    /// Map a parsed GraphQL response body to reply text
    fn normalize_response(response: &Value) -> Result<String, LlmError> {
        if let Some(first) = response
            .get("errors")
            .and_then(Value::as_array)
            .and_then(|errors| errors.first())
        {
            let message = first
                .get("message")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .unwrap_or(UNDESCRIBED_ERROR_MESSAGE);
            return Err(LlmError::protocol(message));
        }

        lookup(response, REPLY_PATH)
            .and_then(coerce_text)
            .ok_or_else(|| LlmError::protocol(MISSING_REPLY_MESSAGE))
    }
}

#[async_trait]
impl ReplyService for GraphQlService {
    async fn complete(&self, conversation: &Conversation) -> Result<String, LlmError> {
        let body = GraphQlRequest {
            query: ASK_MUTATION,
            variables: AskVariables {
                question: conversation.latest_user_text().unwrap_or_default(),
                messages: wire_messages(conversation),
            },
        };

        let response = post_json(self.client.post(&self.endpoint), &body).await?;
        Self::normalize_response(&response)
    }

    fn protocol(&self) -> Protocol {
        Protocol::GraphQl
    }
}

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'static str,
    variables: AskVariables<'a>,
}

#[derive(Debug, Serialize)]
struct AskVariables<'a> {
    question: &'a str,
    messages: Vec<WireMessage>,
}
