// SPDX-FileCopyrightText: 2026 Cogent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in long-term memory tools.
//!
//! Three tools over the shared [`LongTermMemory`] facade: store a memory,
//! search for relevant memories, and report store statistics. All three are
//! inert no-ops when memory is disabled, matching the facade's contract.

use std::sync::Arc;

use async_trait::async_trait;
use cogent_core::CogentError;
use cogent_memory::{LongTermMemory, MemoryType};

use crate::registry::{Tool, ToolOutput};

/// Saves a piece of information to long-term memory.
pub struct MemoryStoreTool {
    memory: Arc<LongTermMemory>,
}

impl MemoryStoreTool {
    pub fn new(memory: Arc<LongTermMemory>) -> Self {
        Self { memory }
    }
}

#[async_trait]
impl Tool for MemoryStoreTool {
    fn name(&self) -> &str {
        "memory_store"
    }

    fn description(&self) -> &str {
        "Save important information to long-term memory for future tasks"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "content": {
                    "type": "string",
                    "description": "The information to remember"
                },
                "memory_type": {
                    "type": "string",
                    "enum": ["conversation", "experience", "fact", "skill"],
                    "default": "fact",
                    "description": "Category of the memory"
                },
                "importance": {
                    "type": "number",
                    "minimum": 0.0,
                    "maximum": 1.0,
                    "description": "How important this memory is (default 0.5)"
                }
            },
            "required": ["content"]
        })
    }

    async fn invoke(&self, input: serde_json::Value) -> Result<ToolOutput, CogentError> {
        let content = input["content"].as_str().ok_or_else(|| CogentError::Tool {
            message: "missing required 'content' parameter".to_string(),
            source: None,
        })?;

        if !self.memory.is_enabled() {
            return Ok(ToolOutput::failure("long-term memory is disabled"));
        }

        let memory_type = input["memory_type"]
            .as_str()
            .map(MemoryType::from_str_value)
            .unwrap_or(MemoryType::Fact);
        let importance = input["importance"].as_f64().unwrap_or(0.5);

        match self
            .memory
            .store(content, memory_type, importance, serde_json::json!({}))
            .await
        {
            Some(id) => Ok(ToolOutput::success(
                serde_json::json!({"stored": true, "id": id}).to_string(),
            )),
            None => Ok(ToolOutput::failure("nothing to store: content was empty")),
        }
    }
}

/// Searches long-term memory by semantic similarity.
pub struct MemorySearchTool {
    memory: Arc<LongTermMemory>,
}

impl MemorySearchTool {
    pub fn new(memory: Arc<LongTermMemory>) -> Self {
        Self { memory }
    }
}

#[async_trait]
impl Tool for MemorySearchTool {
    fn name(&self) -> &str {
        "memory_search"
    }

    fn description(&self) -> &str {
        "Search long-term memory for information relevant to a query"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "What to search for"
                },
                "n_results": {
                    "type": "integer",
                    "minimum": 1,
                    "description": "Maximum number of results (default 3)"
                },
                "memory_type": {
                    "type": "string",
                    "enum": ["conversation", "experience", "fact", "skill"],
                    "description": "Restrict results to one category"
                },
                "min_importance": {
                    "type": "number",
                    "minimum": 0.0,
                    "maximum": 1.0,
                    "description": "Only return memories at or above this importance"
                }
            },
            "required": ["query"]
        })
    }

    async fn invoke(&self, input: serde_json::Value) -> Result<ToolOutput, CogentError> {
        let query = input["query"].as_str().ok_or_else(|| CogentError::Tool {
            message: "missing required 'query' parameter".to_string(),
            source: None,
        })?;

        let n_results = input["n_results"].as_u64().map(|n| n as usize).unwrap_or(3);
        let type_filter = input["memory_type"].as_str().map(MemoryType::from_str_value);
        let min_importance = input["min_importance"].as_f64();

        let matches = self
            .memory
            .search(query, n_results, type_filter, min_importance)
            .await;

        let results: Vec<serde_json::Value> = matches
            .iter()
            .map(|m| {
                serde_json::json!({
                    "id": m.record.id,
                    "content": m.record.content,
                    "memory_type": m.record.memory_type.as_str(),
                    "importance": m.record.importance,
                    "similarity": m.similarity,
                    "created_at": m.record.created_at,
                })
            })
            .collect();

        Ok(ToolOutput::success(
            serde_json::json!({"query": query, "results": results}).to_string(),
        ))
    }
}

/// Reports statistics about the long-term memory store.
pub struct MemoryStatsTool {
    memory: Arc<LongTermMemory>,
}

impl MemoryStatsTool {
    pub fn new(memory: Arc<LongTermMemory>) -> Self {
        Self { memory }
    }
}

#[async_trait]
impl Tool for MemoryStatsTool {
    fn name(&self) -> &str {
        "memory_stats"
    }

    fn description(&self) -> &str {
        "Get statistics about the long-term memory store"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn invoke(&self, _input: serde_json::Value) -> Result<ToolOutput, CogentError> {
        let stats = self.memory.stats().await;
        let body = serde_json::to_string(&stats).map_err(|e| CogentError::Tool {
            message: "failed to serialize memory stats".to_string(),
            source: Some(Box::new(e)),
        })?;
        Ok(ToolOutput::success(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cogent_memory::{Embedder, MemoryStore};

    async fn open_memory() -> Arc<LongTermMemory> {
        let store = MemoryStore::open_in_memory().await.unwrap();
        Arc::new(LongTermMemory::new(store, Embedder::Hash { dim: 64 }))
    }

    #[tokio::test]
    async fn store_then_search_roundtrip() {
        let memory = open_memory().await;
        let store_tool = MemoryStoreTool::new(Arc::clone(&memory));
        let search_tool = MemorySearchTool::new(Arc::clone(&memory));

        let output = store_tool
            .invoke(serde_json::json!({
                "content": "the deployment password rotates on Mondays",
                "memory_type": "fact",
                "importance": 0.9
            }))
            .await
            .unwrap();
        assert!(!output.is_error);
        let body: serde_json::Value = serde_json::from_str(&output.content).unwrap();
        assert_eq!(body["stored"], true);
        assert!(body["id"].as_str().unwrap().starts_with("mem_"));

        let output = search_tool
            .invoke(serde_json::json!({"query": "the deployment password rotates on Mondays"}))
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_str(&output.content).unwrap();
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["memory_type"], "fact");
        assert_eq!(results[0]["importance"], 0.9);
    }

    #[tokio::test]
    async fn blank_content_is_structured_failure() {
        let memory = open_memory().await;
        let tool = MemoryStoreTool::new(memory);
        let output = tool
            .invoke(serde_json::json!({"content": "   "}))
            .await
            .unwrap();
        assert!(output.is_error);
    }

    #[tokio::test]
    async fn disabled_memory_store_fails_cleanly() {
        let memory = Arc::new(LongTermMemory::disabled());
        let tool = MemoryStoreTool::new(memory);
        let output = tool
            .invoke(serde_json::json!({"content": "anything"}))
            .await
            .unwrap();
        assert!(output.is_error);
        assert!(output.content.contains("disabled"));
    }

    #[tokio::test]
    async fn disabled_memory_search_returns_empty() {
        let memory = Arc::new(LongTermMemory::disabled());
        let tool = MemorySearchTool::new(memory);
        let output = tool
            .invoke(serde_json::json!({"query": "anything"}))
            .await
            .unwrap();
        assert!(!output.is_error);
        let body: serde_json::Value = serde_json::from_str(&output.content).unwrap();
        assert!(body["results"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn stats_reports_totals() {
        let memory = open_memory().await;
        memory
            .store("a skill", MemoryType::Skill, 0.8, serde_json::json!({}))
            .await;
        let tool = MemoryStatsTool::new(memory);
        let output = tool.invoke(serde_json::json!({})).await.unwrap();
        let body: serde_json::Value = serde_json::from_str(&output.content).unwrap();
        assert_eq!(body["total"], 1);
        assert_eq!(body["by_type"]["skill"], 1);
    }
}
