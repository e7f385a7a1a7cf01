//! Plain REST adapter
//!
//! Sends the whole dialogue plus model parameters and accepts the reply under
//! any of the field names common chat-completion servers use.

use super::transport::{build_client, post_json};
use super::types::{first_text, wire_messages, Seg, WireMessage};
use super::{LlmError, Protocol, ReplyService};
use crate::config::RestParams;
use crate::conversation::Conversation;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

/// Raised when none of the reply fields is present
pub const MISSING_REPLY_MESSAGE: &str = "No usable reply was found in the API response";

/// Reply fields, highest priority first
const REPLY_PATHS: &[&[Seg]] = &[
    &[Seg::Key("reply")],
    &[Seg::Key("message")],
    &[
        Seg::Key("choices"),
        Seg::Index(0),
        Seg::Key("message"),
        Seg::Key("content"),
    ],
    &[Seg::Key("choices"), Seg::Index(0), Seg::Key("text")],
];

pub struct PlainRestService {
    client: Client,
    endpoint: String,
    params: RestParams,
}

impl PlainRestService {
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>, params: RestParams) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_client()?,
            endpoint: endpoint.into(),
            params,
        })
    }

    fn translate_request<'a>(&'a self, conversation: &Conversation) -> PlainRestRequest<'a> {
        PlainRestRequest {
            messages: wire_messages(conversation),
            model: &self.params.model,
            temperature: self.params.temperature,
            max_tokens: self.params.max_tokens,
        }
    }
}

#[async_trait]
impl ReplyService for PlainRestService {
    async fn complete(&self, conversation: &Conversation) -> Result<String, LlmError> {
        let body = self.translate_request(conversation);

        let mut request = self.client.post(&self.endpoint);
        if let Some(key) = &self.params.api_key {
            request = request.bearer_auth(key);
        }

        let response = post_json(request, &body).await?;
        first_text(&response, REPLY_PATHS).ok_or_else(|| LlmError::protocol(MISSING_REPLY_MESSAGE))
    }

    fn protocol(&self) -> Protocol {
        Protocol::PlainRest
    }
}

#[derive(Debug, Serialize)]
struct PlainRestRequest<'a> {
    messages: Vec<WireMessage>,
    model: &'a str,
    temperature: f64,
    max_tokens: u32,
}
