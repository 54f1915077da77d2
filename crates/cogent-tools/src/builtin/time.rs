// SPDX-FileCopyrightText: 2026 Cogent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in current-time tool.

use async_trait::async_trait;
use chrono::Utc;
use cogent_core::CogentError;

use crate::registry::{Tool, ToolOutput};

/// Reports the current UTC time in one of several formats.
pub struct TimeTool;

#[async_trait]
impl Tool for TimeTool {
    fn name(&self) -> &str {
        "time"
    }

    fn description(&self) -> &str {
        "Get the current UTC date and time"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "format": {
                    "type": "string",
                    "enum": ["iso", "human", "unix"],
                    "default": "iso",
                    "description": "Output format"
                }
            }
        })
    }

    async fn invoke(&self, input: serde_json::Value) -> Result<ToolOutput, CogentError> {
        let format = input["format"].as_str().unwrap_or("iso");
        let now = Utc::now();

        let value = match format {
            "iso" => now.to_rfc3339(),
            "human" => now.format("%A, %B %-d, %Y at %H:%M:%S UTC").to_string(),
            "unix" => now.timestamp().to_string(),
            other => {
                return Ok(ToolOutput::failure(format!(
                    "unknown format '{other}'; supported formats: iso, human, unix"
                )));
            }
        };

        let body = serde_json::json!({"format": format, "time": value});
        Ok(ToolOutput::success(body.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn defaults_to_iso() {
        let tool = TimeTool;
        let output = tool.invoke(serde_json::json!({})).await.unwrap();
        assert!(!output.is_error);
        let body: serde_json::Value = serde_json::from_str(&output.content).unwrap();
        assert_eq!(body["format"], "iso");
        // RFC 3339 timestamps always carry a 'T' separator.
        assert!(body["time"].as_str().unwrap().contains('T'));
    }

    #[tokio::test]
    async fn unix_format_is_numeric() {
        let tool = TimeTool;
        let output = tool
            .invoke(serde_json::json!({"format": "unix"}))
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_str(&output.content).unwrap();
        assert!(body["time"].as_str().unwrap().parse::<i64>().is_ok());
    }

    #[tokio::test]
    async fn unknown_format_is_structured_failure() {
        let tool = TimeTool;
        let output = tool
            .invoke(serde_json::json!({"format": "stardate"}))
            .await
            .unwrap();
        assert!(output.is_error);
    }
}
