// SPDX-FileCopyrightText: 2026 Cogent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Cogent agent.

use thiserror::Error;

/// The primary error type used across all Cogent crates.
#[derive(Debug, Error)]
pub enum CogentError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Model provider errors that are worth another attempt (HTTP failures,
    /// malformed response bodies, server-side 5xx).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The provider reported a rate limit or exhausted quota. Retrying in a
    /// tight loop would only burn the remaining quota, so this class aborts
    /// the run instead of consuming steps.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Embedding failures (model load, tokenization, inference).
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Tool handler errors (bad arguments, I/O failure inside a handler).
    #[error("tool error: {message}")]
    Tool {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CogentError {
    /// Whether the agent loop must abort the current run instead of treating
    /// this as a transient failure.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CogentError::RateLimited(_) | CogentError::Config(_))
    }
}
