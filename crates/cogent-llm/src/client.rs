// SPDX-FileCopyrightText: 2026 Cogent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for OpenAI-compatible chat-completions endpoints.
//!
//! Provides [`ChatClient`] which handles request construction, bearer
//! authentication, transient error retry, and rate-limit classification.

use std::time::Duration;

use async_trait::async_trait;
use cogent_core::{ChatMessage, CogentError, ModelProvider, ModelTurn, ToolSpec};
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, warn};

use crate::types::{
    turn_from_response, wire_messages, wire_tools, ApiErrorDetail, ApiErrorResponse, ChatRequest,
    ChatResponse,
};

/// HTTP client for chat-completions API communication.
///
/// Manages authentication headers, connection pooling, and retry logic for
/// transient server errors (500, 502, 503, 529). Rate limits and exhausted
/// quotas are never retried here: they surface as
/// [`CogentError::RateLimited`] so the agent loop can abort the run.
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    max_retries: u32,
}

impl ChatClient {
    /// Creates a new chat-completions client.
    ///
    /// # Arguments
    /// * `api_key` - Bearer token for authentication
    /// * `base_url` - Endpoint base, e.g. `https://api.openai.com/v1`
    /// * `model` - Model identifier to request
    pub fn new(api_key: &str, base_url: String, model: String) -> Result<Self, CogentError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| {
                CogentError::Config(format!("invalid API key header value: {e}"))
            })?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| CogentError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            max_retries: 1,
        })
    }

    /// Returns the configured model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Sends a request and returns the parsed response.
    ///
    /// On transient server errors (500, 502, 503, 529), retries once after a
    /// 1-second delay. Rate limits abort immediately.
    pub async fn complete_chat(&self, request: &ChatRequest) -> Result<ChatResponse, CogentError> {
        let url = format!("{}/chat/completions", self.base_url);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying completion request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(&url)
                .json(request)
                .send()
                .await
                .map_err(|e| CogentError::Provider {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, "completion response received");

            if status.is_success() {
                let body = response.text().await.map_err(|e| CogentError::Provider {
                    message: format!("failed to read response body: {e}"),
                    source: Some(Box::new(e)),
                })?;
                let chat_response: ChatResponse =
                    serde_json::from_str(&body).map_err(|e| CogentError::Provider {
                        message: format!("failed to parse API response: {e}"),
                        source: Some(Box::new(e)),
                    })?;
                return Ok(chat_response);
            }

            let body = response.text().await.unwrap_or_default();
            let detail = parse_error_detail(&body);

            if is_rate_limited(status, detail.as_ref()) {
                let message = detail
                    .map(|d| d.message)
                    .unwrap_or_else(|| format!("API returned {status}"));
                return Err(CogentError::RateLimited(message));
            }

            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(CogentError::Provider {
                    message: format!("API returned {status}: {body}"),
                    source: None,
                });
                continue;
            }

            // Non-transient error or exhausted retries.
            let error_msg = match detail {
                Some(d) => format!(
                    "API error ({}): {}",
                    d.kind.as_deref().unwrap_or("unknown"),
                    d.message
                ),
                None => format!("API returned {status}: {body}"),
            };
            return Err(CogentError::Provider {
                message: error_msg,
                source: None,
            });
        }

        Err(last_error.unwrap_or_else(|| CogentError::Provider {
            message: "completion request failed after retries".into(),
            source: None,
        }))
    }
}

#[async_trait]
impl ModelProvider for ChatClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
        temperature: f32,
    ) -> Result<ModelTurn, CogentError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: wire_messages(messages),
            tools: wire_tools(tools),
            temperature,
        };
        let response = self.complete_chat(&request).await?;
        turn_from_response(response)
    }
}

fn parse_error_detail(body: &str) -> Option<ApiErrorDetail> {
    serde_json::from_str::<ApiErrorResponse>(body)
        .ok()
        .map(|e| e.error)
}

/// Rate limits and exhausted quotas are fatal to the run: HTTP 429, or an
/// error body whose type/code names a rate limit or insufficient quota.
fn is_rate_limited(status: reqwest::StatusCode, detail: Option<&ApiErrorDetail>) -> bool {
    if status.as_u16() == 429 {
        return true;
    }
    detail.is_some_and(|d| {
        d.kind.as_deref().is_some_and(|k| k.contains("rate_limit"))
            || d.code
                .as_deref()
                .is_some_and(|c| c.contains("rate_limit") || c.contains("insufficient_quota"))
    })
}

/// Returns true for HTTP status codes that indicate transient server errors
/// worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 500 | 502 | 503 | 529)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> ChatClient {
        ChatClient::new("test-api-key", "https://unused.invalid/v1".into(), "gpt-4o-mini".into())
            .unwrap()
            .with_base_url(base_url.to_string())
    }

    fn success_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-test",
            "choices": [{
                "message": {"role": "assistant", "content": text},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        })
    }

    #[tokio::test]
    async fn complete_returns_final_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("Hi there!")))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let turn = client
            .complete(&[ChatMessage::user("Hello")], &[], 0.2)
            .await
            .unwrap();
        assert_eq!(turn.final_text(), Some("Hi there!"));
        assert!(turn.tool_calls.is_empty());
    }

    #[tokio::test]
    async fn rate_limit_is_fatal_and_not_retried() {
        let server = MockServer::start().await;
        let error_body = serde_json::json!({
            "error": {"type": "rate_limit_error", "message": "Rate limit reached", "code": "rate_limit_exceeded"}
        });
        // expect(1) proves the client does not retry a 429.
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(&error_body))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.complete(&[ChatMessage::user("Hello")], &[], 0.2).await;
        assert!(matches!(result, Err(CogentError::RateLimited(_))));
    }

    #[tokio::test]
    async fn quota_error_body_is_fatal_regardless_of_status() {
        let server = MockServer::start().await;
        let error_body = serde_json::json!({
            "error": {"type": "insufficient_quota", "message": "You exceeded your current quota", "code": "insufficient_quota"}
        });
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(403).set_body_json(&error_body))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.complete(&[ChatMessage::user("Hello")], &[], 0.2).await;
        assert!(matches!(result, Err(CogentError::RateLimited(_))));
    }

    #[tokio::test]
    async fn retries_once_on_503_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("After retry")))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let turn = client
            .complete(&[ChatMessage::user("Hello")], &[], 0.2)
            .await
            .unwrap();
        assert_eq!(turn.final_text(), Some("After retry"));
    }

    #[tokio::test]
    async fn exhausts_retries_on_persistent_500() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(2)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.complete(&[ChatMessage::user("Hello")], &[], 0.2).await;
        assert!(matches!(result, Err(CogentError::Provider { .. })));
    }

    #[tokio::test]
    async fn fails_fast_on_400() {
        let server = MockServer::start().await;
        let error_body = serde_json::json!({
            "error": {"type": "invalid_request_error", "message": "Unknown model"}
        });
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(&error_body))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.complete(&[ChatMessage::user("Hello")], &[], 0.2).await;
        let err = result.unwrap_err().to_string();
        assert!(err.contains("invalid_request_error"), "got: {err}");
    }

    #[tokio::test]
    async fn client_sends_bearer_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-api-key"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("ok")))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.complete(&[ChatMessage::user("Hello")], &[], 0.2).await;
        assert!(result.is_ok(), "headers should match: {result:?}");
    }
}
