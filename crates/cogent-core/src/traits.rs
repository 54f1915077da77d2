// SPDX-FileCopyrightText: 2026 Cogent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter traits at the seams of the agent.

use async_trait::async_trait;

use crate::error::CogentError;
use crate::types::{ChatMessage, ModelTurn, ToolSpec};

/// A chat-completion model backend.
///
/// The agent loop depends on this trait object rather than a concrete HTTP
/// client, so tests can script model turns deterministically.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Sends the conversation and available tools to the model and returns
    /// its next turn.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
        temperature: f32,
    ) -> Result<ModelTurn, CogentError>;
}
