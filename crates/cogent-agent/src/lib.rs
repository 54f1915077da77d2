// SPDX-FileCopyrightText: 2026 Cogent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Agent orchestration: the bounded conversation buffer and the run loop
//! that alternates model turns with tool dispatch under a step budget.

pub mod buffer;
pub mod runner;

pub use buffer::ConversationBuffer;
pub use runner::{AgentRunner, RunOutcome, RunStatus, RunnerConfig, FALLBACK_ANSWER};
