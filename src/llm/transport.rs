//! Shared JSON-over-HTTP round trip

use super::LlmError;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde_json::Value;

/// Build the HTTP client used by an adapter.
///
/// No request timeout is configured: a dispatched request is awaited until
/// the transport resolves it.
pub(crate) fn build_client() -> Result<Client, reqwest::Error> {
    Client::builder().build()
}

/// POST `body` as JSON and return the parsed response body.
///
/// Non-2xx statuses become `Transport` errors carrying the raw text, bodies
/// that are not JSON become `Parse` errors.
pub(crate) async fn post_json<T: Serialize + ?Sized>(
    request: RequestBuilder,
    body: &T,
) -> Result<Value, LlmError> {
    let response = request
        .header("Content-Type", "application/json")
        .json(body)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                LlmError::network(format!("Request timeout: {e}"))
            } else if e.is_connect() {
                LlmError::network(format!("Connection failed: {e}"))
            } else {
                LlmError::network(format!("Request failed: {e}"))
            }
        })?;

    let status = response.status();
    let text = response.text().await;

    if !status.is_success() {
        // An unreadable error body still reports the status
        return Err(LlmError::transport(
            status.as_u16(),
            text.unwrap_or_default(),
        ));
    }

    let text = text.map_err(|e| LlmError::network(format!("Failed to read response: {e}")))?;

    serde_json::from_str(&text).map_err(|e| {
        tracing::debug!(error = %e, body = %text, "Response body is not JSON");
        LlmError::parse(format!("Failed to parse response: {e}"))
    })
}
