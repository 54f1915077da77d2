// SPDX-FileCopyrightText: 2026 Cogent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core types for the Cogent agent: the shared error enum, chat message
//! shapes, and the `ModelProvider` seam the agent loop is written against.

pub mod error;
pub mod traits;
pub mod types;

pub use error::CogentError;
pub use traits::ModelProvider;
pub use types::{ChatMessage, ModelTurn, Role, ToolCallRequest, ToolSpec};
