//! Completion service client.
//!
//! Dispatches one turn to the chat endpoint and hands back the raw
//! response byte stream. Non-success responses are inspected here: the
//! quota gate's structured refusal becomes
//! [`EngineError::LimitExceeded`], everything else becomes a backend
//! error carrying a human-readable summary.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use socratic_protocol::{ApiErrorBody, CompletionRequest};

use crate::error::{EngineError, Result};
use crate::http_client;

/// Raw response body stream for one dispatched turn.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Transport for dispatching completion requests.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send one turn. Returns the streaming body, or an immediate
    /// structured error.
    async fn dispatch(&self, request: CompletionRequest) -> Result<ByteStream>;
}

/// HTTP transport against the completion service.
pub struct HttpCompletionClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCompletionClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: http_client::create_streaming_client()?,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn dispatch(&self, request: CompletionRequest) -> Result<ByteStream> {
        let url = format!("{}/api/chat", self.base_url);

        tracing::debug!(
            url = %url,
            history_len = request.history.len(),
            has_image = request.image.is_some(),
            tier = %request.tier,
            "Dispatching turn"
        );

        let resp = self
            .client
            .post(&url)
            .header("Accept", "text/event-stream")
            .json(&request)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(refusal_or_backend_error(status, &body));
        }

        Ok(Box::pin(
            resp.bytes_stream().map(|chunk| chunk.map_err(EngineError::from)),
        ))
    }
}

/// Map a non-success response body to the right terminal error.
fn refusal_or_backend_error(status: reqwest::StatusCode, body: &str) -> EngineError {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) {
        if parsed.is_limit_exceeded() {
            let usage = parsed.usage.unwrap_or_default();
            tracing::info!(
                count = usage.count,
                limit = usage.limit,
                "Quota gate refused the turn"
            );
            return EngineError::LimitExceeded {
                message: parsed
                    .message
                    .unwrap_or_else(|| "Usage limit reached".to_string()),
                count: usage.count,
                limit: usage.limit,
            };
        }
        if let Some(message) = parsed.message {
            return EngineError::Backend { message };
        }
    }

    let body_preview = if body.len() > 200 {
        format!("{}...", &body[..200])
    } else {
        body.to_string()
    };
    tracing::error!(status = %status, body = %body_preview, "Completion request failed");
    EngineError::Backend {
        message: format!("HTTP {status}: {body_preview}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_exceeded_body_maps_to_refusal() {
        let err = refusal_or_backend_error(
            reqwest::StatusCode::FORBIDDEN,
            r#"{"error":"limit_exceeded","usage":{"count":3,"limit":3}}"#,
        );
        match err {
            EngineError::LimitExceeded { count, limit, .. } => {
                assert_eq!(count, 3);
                assert_eq!(limit, 3);
            }
            other => panic!("expected LimitExceeded, got {other:?}"),
        }
    }

    #[test]
    fn test_other_json_error_uses_its_message() {
        let err = refusal_or_backend_error(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error":"internal","message":"model overloaded"}"#,
        );
        match err {
            EngineError::Backend { message } => assert_eq!(message, "model overloaded"),
            other => panic!("expected Backend, got {other:?}"),
        }
    }

    #[test]
    fn test_non_json_body_gets_preview() {
        let err =
            refusal_or_backend_error(reqwest::StatusCode::BAD_GATEWAY, "upstream unavailable");
        match err {
            EngineError::Backend { message } => {
                assert!(message.contains("502"));
                assert!(message.contains("upstream unavailable"));
            }
            other => panic!("expected Backend, got {other:?}"),
        }
    }
}
