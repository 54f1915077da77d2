// SPDX-FileCopyrightText: 2026 Cogent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in HTTP fetch tool.
//!
//! Makes HTTP requests using reqwest. Only http/https URLs are accepted and
//! response bodies are truncated to 50KB to prevent excessive token usage.

use async_trait::async_trait;
use cogent_core::CogentError;

use crate::registry::{Tool, ToolOutput};

/// Maximum response body size in bytes (50KB).
const MAX_RESPONSE_SIZE: usize = 50 * 1024;

/// Makes HTTP requests and returns the response.
pub struct FetchTool {
    client: reqwest::Client,
}

impl FetchTool {
    /// Creates a new FetchTool with a default reqwest Client.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for FetchTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for FetchTool {
    fn name(&self) -> &str {
        "fetch"
    }

    fn description(&self) -> &str {
        "Make an HTTP request and return the response"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "The URL to request"
                },
                "method": {
                    "type": "string",
                    "enum": ["GET", "POST", "PUT", "DELETE", "PATCH"],
                    "default": "GET",
                    "description": "HTTP method to use"
                },
                "headers": {
                    "type": "object",
                    "description": "HTTP headers as key-value pairs"
                },
                "body": {
                    "type": "string",
                    "description": "Request body (for POST, PUT, PATCH)"
                }
            },
            "required": ["url"]
        })
    }

    async fn invoke(&self, input: serde_json::Value) -> Result<ToolOutput, CogentError> {
        let url = input["url"].as_str().ok_or_else(|| CogentError::Tool {
            message: "missing required 'url' parameter".to_string(),
            source: None,
        })?;

        // Validate URL scheme (http/https only).
        let parsed_url = match reqwest::Url::parse(url) {
            Ok(u) => u,
            Err(e) => return Ok(ToolOutput::failure(format!("invalid URL: {e}"))),
        };

        let scheme = parsed_url.scheme();
        if scheme != "http" && scheme != "https" {
            return Ok(ToolOutput::failure(format!(
                "URL scheme '{scheme}' not allowed; only http and https are supported"
            )));
        }

        let method_str = input["method"].as_str().unwrap_or("GET");
        let method = match method_str.parse::<reqwest::Method>() {
            Ok(m) => m,
            Err(e) => {
                return Ok(ToolOutput::failure(format!(
                    "invalid HTTP method '{method_str}': {e}"
                )));
            }
        };

        let mut request_builder = self.client.request(method, url);

        // Add optional headers.
        if let Some(headers) = input["headers"].as_object() {
            for (key, value) in headers {
                if let Some(val_str) = value.as_str() {
                    request_builder = request_builder.header(key.as_str(), val_str);
                }
            }
        }

        // Add optional body.
        if let Some(body) = input["body"].as_str() {
            request_builder = request_builder.body(body.to_string());
        }

        let response = match request_builder.send().await {
            Ok(r) => r,
            Err(e) => {
                return Ok(ToolOutput::failure(format!("HTTP request failed: {e}")));
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => {
                return Ok(ToolOutput::failure(format!(
                    "failed to read response body: {e}"
                )));
            }
        };

        // Truncate response body if too large, on a char boundary.
        let truncated = if body.len() > MAX_RESPONSE_SIZE {
            let mut end = MAX_RESPONSE_SIZE;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!(
                "{}...\n\n[Response truncated from {} to {end} bytes]",
                &body[..end],
                body.len(),
            )
        } else {
            body
        };

        let content = format!("HTTP {status}\n\n{truncated}");
        let is_error = status.is_client_error() || status.is_server_error();

        Ok(ToolOutput { content, is_error })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_schema_has_required_url() {
        let tool = FetchTool::new();
        let schema = tool.parameters_schema();
        let required = schema["required"].as_array().unwrap();
        assert!(required.iter().any(|v| v == "url"));
        assert!(schema["properties"]["url"].is_object());
    }

    #[tokio::test]
    async fn invalid_scheme_is_structured_failure() {
        let tool = FetchTool::new();
        let input = serde_json::json!({"url": "ftp://example.com/file"});
        let output = tool.invoke(input).await.unwrap();
        assert!(output.is_error);
        assert!(output.content.contains("not allowed"));
    }

    #[tokio::test]
    async fn malformed_url_is_structured_failure() {
        let tool = FetchTool::new();
        let input = serde_json::json!({"url": "not a url"});
        let output = tool.invoke(input).await.unwrap();
        assert!(output.is_error);
        assert!(output.content.contains("invalid URL"));
    }

    #[tokio::test]
    async fn missing_url_returns_error() {
        let tool = FetchTool::new();
        let result = tool.invoke(serde_json::json!({})).await;
        assert!(result.is_err());
    }
}
