//! Serverless worker REST adapter
//!
//! Sends the latest question alongside the full history and reads a narrower
//! set of reply fields than the plain REST adapter.

use super::plain_rest::MISSING_REPLY_MESSAGE;
use super::transport::{build_client, post_json};
use super::types::{first_text, wire_messages, Seg, WireMessage};
use super::{LlmError, Protocol, ReplyService};
use crate::conversation::Conversation;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

const REPLY_PATHS: &[&[Seg]] = &[
    &[Seg::Key("reply")],
    &[Seg::Key("message")],
    &[
        Seg::Key("choices"),
        Seg::Index(0),
        Seg::Key("message"),
        Seg::Key("content"),
    ],
];

pub struct WorkerRestService {
    client: Client,
    endpoint: String,
}

impl WorkerRestService {
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_client()?,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl ReplyService for WorkerRestService {
    async fn complete(&self, conversation: &Conversation) -> Result<String, LlmError> {
        let body = WorkerRequest {
            question: conversation.latest_user_text().unwrap_or_default(),
            messages: wire_messages(conversation),
        };

        let response = post_json(self.client.post(&self.endpoint), &body).await?;
        first_text(&response, REPLY_PATHS).ok_or_else(|| LlmError::protocol(MISSING_REPLY_MESSAGE))
    }

    fn protocol(&self) -> Protocol {
        Protocol::WorkerRest
    }
}

#[derive(Debug, Serialize)]
struct WorkerRequest<'a> {
    question: &'a str,
    messages: Vec<WireMessage>,
}
