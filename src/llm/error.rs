//! Reply error types and the display normalizer

use std::fmt;
use thiserror::Error;

/// Shown when a failure carries nothing more specific to say
pub const DEFAULT_ERROR_MESSAGE: &str =
    "Send failed, please check the network or the API configuration.";

/// Shown for response bodies that are not valid JSON
pub const PARSE_ERROR_MESSAGE: &str = "Could not parse the response from the assistant backend.";

/// Longest body excerpt carried into a transport error message
const BODY_EXCERPT_CHARS: usize = 500;

/// Reply error with classification
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct LlmError {
    pub kind: LlmErrorKind,
    /// Raw body for `Transport`, detail text otherwise
    pub message: String,
    /// HTTP status, set for `Transport`
    pub status: Option<u16>,
}

impl LlmError {
    #[must_use]
    pub fn new(kind: LlmErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    /// Non-success HTTP status with the raw response text
    #[must_use]
    pub fn transport(status: u16, body: impl Into<String>) -> Self {
        Self {
            kind: LlmErrorKind::Transport,
            message: body.into(),
            status: Some(status),
        }
    }

    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Parse, message)
    }

    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Protocol, message)
    }

    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Network, message)
    }
}

/// Failure classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// Non-2xx HTTP status
    Transport,
    /// Body was not valid JSON
    Parse,
    /// JSON without the expected reply, or a backend-reported error
    Protocol,
    /// Connection or read failure below HTTP
    Network,
}

impl fmt::Display for LlmErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LlmErrorKind::Transport => "transport error",
            LlmErrorKind::Parse => "parse error",
            LlmErrorKind::Protocol => "protocol error",
            LlmErrorKind::Network => "network error",
        };
        f.write_str(label)
    }
}

/// Turn any reply failure into the single string shown to the user
#[must_use]
pub fn normalize(error: &LlmError) -> String {
    match error.kind {
        LlmErrorKind::Transport => {
            let status = error
                .status
                .map_or_else(|| "unknown status".to_string(), |s| s.to_string());
            let excerpt = excerpt(error.message.trim());
            if excerpt.is_empty() {
                format!("Request failed: {status}")
            } else {
                format!("Request failed: {status} {excerpt}")
            }
        }
        LlmErrorKind::Parse => PARSE_ERROR_MESSAGE.to_string(),
        LlmErrorKind::Protocol => {
            let message = error.message.trim();
            if message.is_empty() {
                DEFAULT_ERROR_MESSAGE.to_string()
            } else {
                message.to_string()
            }
        }
        LlmErrorKind::Network => DEFAULT_ERROR_MESSAGE.to_string(),
    }
}

fn excerpt(body: &str) -> String {
    let mut chars = body.chars();
    let head: String = chars.by_ref().take(BODY_EXCERPT_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}
