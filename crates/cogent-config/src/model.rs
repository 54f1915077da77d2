// SPDX-FileCopyrightText: 2026 Cogent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Cogent agent.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Cogent configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CogentConfig {
    /// Agent identity and loop behavior settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Chat-completions API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Long-term memory settings.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Built-in tool settings.
    #[serde(default)]
    pub tools: ToolsConfig,
}

/// Agent identity and loop behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the agent.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Maximum model/tool steps per run before the loop gives up.
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,

    /// Maximum messages retained in the conversation buffer.
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,

    /// Sampling temperature passed to the model.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Inline system prompt. `None` uses the built-in prompt template.
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            max_steps: default_max_steps(),
            buffer_capacity: default_buffer_capacity(),
            temperature: default_temperature(),
            log_level: default_log_level(),
            system_prompt: None,
        }
    }
}

fn default_agent_name() -> String {
    "cogent".to_string()
}

fn default_max_steps() -> usize {
    6
}

fn default_buffer_capacity() -> usize {
    100
}

fn default_temperature() -> f32 {
    0.2
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Chat-completions API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// API key. `None` requires the `COGENT_API_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier to request.
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

/// Long-term memory configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Enable the memory system. When false, no memory operations occur.
    #[serde(default = "default_memory_enabled")]
    pub enabled: bool,

    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Embedding vector dimension (hash fallback pads/truncates to this).
    #[serde(default = "default_embedding_dim")]
    pub embedding_dim: usize,

    /// Path to a local ONNX sentence-embedding model directory.
    /// `None` or a missing model falls back to hash embeddings.
    #[serde(default)]
    pub model_path: Option<String>,

    /// Minimum importance for memories injected into a new run's context.
    #[serde(default = "default_min_importance")]
    pub min_importance: f64,

    /// Cosine similarity above which two memories are consolidated.
    #[serde(default = "default_consolidation_threshold")]
    pub consolidation_threshold: f64,

    /// Number of memories fetched per similarity search.
    #[serde(default = "default_search_results")]
    pub search_results: usize,

    /// Maximum retrieved memories injected into the system context.
    #[serde(default = "default_inject_limit")]
    pub inject_limit: usize,

    /// Maximum characters per injected memory snippet.
    #[serde(default = "default_snippet_chars")]
    pub snippet_chars: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: default_memory_enabled(),
            database_path: default_database_path(),
            embedding_dim: default_embedding_dim(),
            model_path: None,
            min_importance: default_min_importance(),
            consolidation_threshold: default_consolidation_threshold(),
            search_results: default_search_results(),
            inject_limit: default_inject_limit(),
            snippet_chars: default_snippet_chars(),
        }
    }
}

fn default_memory_enabled() -> bool {
    true
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("cogent").join("memory.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("memory.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_embedding_dim() -> usize {
    384
}

fn default_min_importance() -> f64 {
    0.6
}

fn default_consolidation_threshold() -> f64 {
    0.95
}

fn default_search_results() -> usize {
    3
}

fn default_inject_limit() -> usize {
    2
}

fn default_snippet_chars() -> usize {
    500
}

/// Built-in tool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ToolsConfig {
    /// Directory scanned by the `retrieve` tool for local documents.
    #[serde(default = "default_docs_dir")]
    pub docs_dir: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            docs_dir: default_docs_dir(),
        }
    }
}

fn default_docs_dir() -> String {
    "docs".to_string()
}
