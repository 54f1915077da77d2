// SPDX-FileCopyrightText: 2026 Cogent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tool trait and dispatch registry.
//!
//! The [`Tool`] trait defines the unified interface all built-in tools
//! implement. The [`ToolRegistry`] manages lookup by name, generates sorted
//! tool specs for the model request, and exposes [`ToolRegistry::dispatch`]:
//! a never-raising entrypoint that validates arguments against each tool's
//! JSON Schema before invocation and converts every failure into a
//! structured error output the model can read.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use cogent_core::{CogentError, ToolSpec};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Output from a tool invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    /// The content returned by the tool (text output, JSON, etc.).
    pub content: String,
    /// Whether the tool invocation resulted in an error.
    pub is_error: bool,
}

impl ToolOutput {
    /// A successful output.
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    /// A structured failure output: well-formed JSON the model can act on.
    pub fn failure(message: impl Into<String>) -> Self {
        let body = serde_json::json!({
            "success": false,
            "error": message.into(),
        });
        Self {
            content: body.to_string(),
            is_error: true,
        }
    }
}

/// Unified trait for all tools.
///
/// Every tool provides a name, description, JSON Schema for its parameters,
/// and an async `invoke` method. The agent loop never calls `invoke`
/// directly; it goes through [`ToolRegistry::dispatch`], which handles
/// validation and error conversion.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the tool's unique name (used for lookup and API serialization).
    fn name(&self) -> &str;

    /// Returns a human-readable description of what the tool does.
    fn description(&self) -> &str;

    /// Returns the JSON Schema describing the tool's input parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Invokes the tool with the given JSON input and returns the output.
    async fn invoke(&self, input: serde_json::Value) -> Result<ToolOutput, CogentError>;
}

/// Registry of available tools, indexed by name.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Creates an empty tool registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Registers a tool. The tool is indexed by its `name()`.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Looks up a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Returns (name, description) pairs for all registered tools, sorted by name.
    pub fn list(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .tools
            .values()
            .map(|t| (t.name(), t.description()))
            .collect();
        entries.sort_by_key(|(name, _)| *name);
        entries
    }

    /// Returns tool specs for all registered tools, sorted by name.
    pub fn specs(&self) -> Vec<ToolSpec> {
        let mut specs: Vec<ToolSpec> = self
            .tools
            .values()
            .map(|t| ToolSpec {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters_schema(),
            })
            .collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    /// Returns the number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns true if no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Dispatches a tool call by name. Never returns an error.
    ///
    /// Unknown tool names, schema-invalid arguments, and handler failures
    /// all come back as a [`ToolOutput`] with `is_error = true` and a JSON
    /// body describing the problem, so the model sees the failure as a tool
    /// result instead of the run aborting.
    pub async fn dispatch(&self, name: &str, input: serde_json::Value) -> ToolOutput {
        let Some(tool) = self.get(name) else {
            warn!(tool = name, "dispatch requested for unknown tool");
            return ToolOutput::failure(format!("unknown tool '{name}'"));
        };

        let schema = tool.parameters_schema();
        match jsonschema::validator_for(&schema) {
            Ok(validator) => {
                if let Err(error) = validator.validate(&input) {
                    debug!(tool = name, error = %error, "tool arguments failed schema validation");
                    return ToolOutput::failure(format!(
                        "invalid arguments for '{name}': {error}"
                    ));
                }
            }
            Err(e) => {
                warn!(tool = name, error = %e, "tool declares an invalid parameter schema");
                return ToolOutput::failure(format!(
                    "tool '{name}' has an invalid parameter schema"
                ));
            }
        }

        match tool.invoke(input).await {
            Ok(output) => output,
            Err(e) => {
                warn!(tool = name, error = %e, "tool handler failed");
                ToolOutput::failure(format!("tool '{name}' failed: {e}"))
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
