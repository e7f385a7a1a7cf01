//! Backend configuration
//!
//! Read once at startup from the environment and handed to the dispatcher;
//! adapters never look at process state themselves.

use crate::llm::Protocol;
use std::time::Duration;
use thiserror::Error;

pub const ENV_API_URL: &str = "CHAT_API_URL";
pub const ENV_WORKER_URL: &str = "CHAT_WORKER_URL";
pub const ENV_GRAPHQL_URL: &str = "CHAT_GRAPHQL_URL";
pub const ENV_API_KEY: &str = "CHAT_API_KEY";
pub const ENV_MODEL: &str = "CHAT_MODEL";
pub const ENV_TEMPERATURE: &str = "CHAT_TEMPERATURE";
pub const ENV_MAX_TOKENS: &str = "CHAT_MAX_TOKENS";
pub const ENV_MOCK_DELAY_MS: &str = "CHAT_MOCK_DELAY_MS";

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 512;
pub const DEFAULT_MOCK_DELAY_MS: u64 = 800;
pub const DEFAULT_MOCK_DELAY: Duration = Duration::from_millis(DEFAULT_MOCK_DELAY_MS);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Only one backend endpoint may be configured, found: {}", .0.join(", "))]
    ConflictingEndpoints(Vec<&'static str>),
    #[error("{var} is not a valid number: {value:?}")]
    InvalidNumber { var: &'static str, value: String },
    #[error("Failed to create HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Which backend answers, and where
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    PlainRest(String),
    WorkerRest(String),
    GraphQl(String),
}

impl Endpoint {
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Endpoint::PlainRest(url) | Endpoint::WorkerRest(url) | Endpoint::GraphQl(url) => url,
        }
    }

    #[must_use]
    pub fn protocol(&self) -> Protocol {
        match self {
            Endpoint::PlainRest(_) => Protocol::PlainRest,
            Endpoint::WorkerRest(_) => Protocol::WorkerRest,
            Endpoint::GraphQl(_) => Protocol::GraphQl,
        }
    }
}

/// Model parameters, only sent by the plain REST adapter
#[derive(Debug, Clone, PartialEq)]
pub struct RestParams {
    /// Static bearer credential
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for RestParams {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// `None` selects mock mode
    pub endpoint: Option<Endpoint>,
    pub rest: RestParams,
    pub mock_delay: Duration,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            rest: RestParams::default(),
            mock_delay: DEFAULT_MOCK_DELAY,
        }
    }
}

impl ChatConfig {
    /// # Errors
    ///
    /// See [`ChatConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Values are trimmed and blank ones ignored.
    ///
    /// # Errors
    ///
    /// Returns `ConflictingEndpoints` when more than one endpoint variable is
    /// set, and `InvalidNumber` when a numeric variable does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut endpoints = Vec::new();
        if let Some(url) = get(ENV_API_URL) {
            endpoints.push((ENV_API_URL, Endpoint::PlainRest(url)));
        }
        if let Some(url) = get(ENV_WORKER_URL) {
            endpoints.push((ENV_WORKER_URL, Endpoint::WorkerRest(url)));
        }
        if let Some(url) = get(ENV_GRAPHQL_URL) {
            endpoints.push((ENV_GRAPHQL_URL, Endpoint::GraphQl(url)));
        }
        if endpoints.len() > 1 {
            return Err(ConfigError::ConflictingEndpoints(
                endpoints.into_iter().map(|(var, _)| var).collect(),
            ));
        }
        let endpoint = endpoints.pop().map(|(_, endpoint)| endpoint);

        let rest = RestParams {
            api_key: get(ENV_API_KEY),
            model: get(ENV_MODEL).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: parse_or(ENV_TEMPERATURE, get(ENV_TEMPERATURE), DEFAULT_TEMPERATURE)?,
            max_tokens: parse_or(ENV_MAX_TOKENS, get(ENV_MAX_TOKENS), DEFAULT_MAX_TOKENS)?,
        };

        let mock_delay = parse_or(ENV_MOCK_DELAY_MS, get(ENV_MOCK_DELAY_MS), DEFAULT_MOCK_DELAY_MS)
            .map(Duration::from_millis)?;

        Ok(Self {
            endpoint,
            rest,
            mock_delay,
        })
    }

    #[must_use]
    pub fn is_backend_configured(&self) -> bool {
        self.endpoint.is_some()
    }
}

fn parse_or<T: std::str::FromStr>(
    var: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { var, value }),
    }
}
