// SPDX-FileCopyrightText: 2026 Cogent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in tools shipped with the agent.

use std::path::Path;
use std::sync::Arc;

use cogent_memory::LongTermMemory;

mod calculator;
mod fetch;
mod file;
mod memory;
mod retrieve;
mod time;

pub use calculator::CalculatorTool;
pub use fetch::FetchTool;
pub use file::FileTool;
pub use memory::{MemorySearchTool, MemoryStatsTool, MemoryStoreTool};
pub use retrieve::RetrieveTool;
pub use time::TimeTool;

use crate::registry::ToolRegistry;

/// A registry populated with every built-in tool.
pub fn default_registry(memory: Arc<LongTermMemory>, docs_dir: &Path) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(CalculatorTool));
    registry.register(Arc::new(RetrieveTool::from_dir(docs_dir)));
    registry.register(Arc::new(FileTool));
    registry.register(Arc::new(FetchTool::new()));
    registry.register(Arc::new(TimeTool));
    registry.register(Arc::new(MemoryStoreTool::new(Arc::clone(&memory))));
    registry.register(Arc::new(MemorySearchTool::new(Arc::clone(&memory))));
    registry.register(Arc::new(MemoryStatsTool::new(memory)));
    registry
}
