// SPDX-FileCopyrightText: 2026 Cogent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in file I/O tool.
//!
//! Reads and writes files on the filesystem. Read contents are truncated to
//! 100KB to prevent excessive token usage.

use async_trait::async_trait;
use cogent_core::CogentError;

use crate::registry::{Tool, ToolOutput};

/// Maximum file read size in bytes (100KB).
const MAX_READ_SIZE: usize = 100 * 1024;

/// Reads and writes files on the filesystem.
pub struct FileTool;

#[async_trait]
impl Tool for FileTool {
    fn name(&self) -> &str {
        "file"
    }

    fn description(&self) -> &str {
        "Read or write files on the filesystem"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "action": {
                    "type": "string",
                    "enum": ["read", "write"],
                    "description": "Whether to read or write the file"
                },
                "path": {
                    "type": "string",
                    "description": "The file path to read from or write to"
                },
                "content": {
                    "type": "string",
                    "description": "Content to write (required for write action)"
                }
            },
            "required": ["action", "path"]
        })
    }

    async fn invoke(&self, input: serde_json::Value) -> Result<ToolOutput, CogentError> {
        let action = input["action"].as_str().ok_or_else(|| CogentError::Tool {
            message: "missing required 'action' parameter".to_string(),
            source: None,
        })?;

        let path = input["path"].as_str().ok_or_else(|| CogentError::Tool {
            message: "missing required 'path' parameter".to_string(),
            source: None,
        })?;

        match action {
            "read" => {
                let contents = match tokio::fs::read_to_string(path).await {
                    Ok(c) => c,
                    Err(e) => {
                        return Ok(ToolOutput::failure(format!(
                            "failed to read file '{path}': {e}"
                        )));
                    }
                };

                // Truncate if too large, on a char boundary.
                let output = if contents.len() > MAX_READ_SIZE {
                    let mut end = MAX_READ_SIZE;
                    while !contents.is_char_boundary(end) {
                        end -= 1;
                    }
                    format!(
                        "{}...\n\n[File truncated from {} to {end} bytes]",
                        &contents[..end],
                        contents.len(),
                    )
                } else {
                    contents
                };

                Ok(ToolOutput::success(output))
            }
            "write" => {
                let Some(content) = input["content"].as_str() else {
                    return Ok(ToolOutput::failure(
                        "missing required 'content' parameter for write action",
                    ));
                };

                if let Err(e) = tokio::fs::write(path, content).await {
                    return Ok(ToolOutput::failure(format!(
                        "failed to write file '{path}': {e}"
                    )));
                }

                Ok(ToolOutput::success(format!(
                    "Successfully wrote {} bytes to '{path}'",
                    content.len()
                )))
            }
            other => Ok(ToolOutput::failure(format!(
                "unknown action '{other}'; supported actions: 'read', 'write'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn read_nonexistent_is_structured_failure() {
        let tool = FileTool;
        let input = serde_json::json!({
            "action": "read",
            "path": "/tmp/cogent-test-nonexistent-file-xyz-12345"
        });
        let output = tool.invoke(input).await.unwrap();
        assert!(output.is_error);
        assert!(output.content.contains("failed to read"));
    }

    #[tokio::test]
    async fn write_and_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("test.txt");
        let path_str = file_path.to_str().unwrap();

        let tool = FileTool;

        let write_input = serde_json::json!({
            "action": "write",
            "path": path_str,
            "content": "hello from cogent"
        });
        let write_output = tool.invoke(write_input).await.unwrap();
        assert!(!write_output.is_error);
        assert!(write_output.content.contains("Successfully wrote"));

        let read_input = serde_json::json!({
            "action": "read",
            "path": path_str
        });
        let read_output = tool.invoke(read_input).await.unwrap();
        assert!(!read_output.is_error);
        assert_eq!(read_output.content, "hello from cogent");
    }

    #[tokio::test]
    async fn unknown_action_is_structured_failure() {
        let tool = FileTool;
        let input = serde_json::json!({
            "action": "delete",
            "path": "/tmp/test"
        });
        let output = tool.invoke(input).await.unwrap();
        assert!(output.is_error);
        assert!(output.content.contains("unknown action"));
    }

    #[test]
    fn parameters_schema_has_required_fields() {
        let tool = FileTool;
        let schema = tool.parameters_schema();
        let required = schema["required"].as_array().unwrap();
        assert!(required.iter().any(|v| v == "action"));
        assert!(required.iter().any(|v| v == "path"));
    }
}
