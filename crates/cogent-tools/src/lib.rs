// SPDX-FileCopyrightText: 2026 Cogent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tool trait, dispatch registry, and the built-in tool set.
//!
//! Tools are the agent's hands: each implements the [`Tool`] trait and is
//! invoked through [`ToolRegistry::dispatch`], which validates arguments
//! against the tool's JSON Schema and converts every failure into a
//! structured output the model can read. [`builtin::default_registry`]
//! assembles the standard set: calculator, document retrieval, file I/O,
//! HTTP fetch, current time, and the long-term memory tools.

pub mod builtin;
pub mod registry;

pub use registry::{Tool, ToolOutput, ToolRegistry};
