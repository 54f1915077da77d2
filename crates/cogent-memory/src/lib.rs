// SPDX-FileCopyrightText: 2026 Cogent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Long-term memory for the Cogent agent.
//!
//! Records are embedded locally (ONNX all-MiniLM-L6-v2 when available,
//! deterministic hash fallback otherwise) and stored in SQLite with the
//! embedding as a BLOB. Search is an in-process cosine scan over candidate
//! vectors; consolidation removes near-duplicates, keeping the record with
//! the higher importance.
//!
//! All operations on [`LongTermMemory`] degrade gracefully: failures are
//! logged and return empty results, never propagated to the agent loop.

pub mod embedder;
pub mod memory;
pub mod store;
pub mod types;

pub use embedder::{hash_embedding, Embedder, OnnxEmbedder, EMBEDDING_DIM};
pub use memory::LongTermMemory;
pub use store::MemoryStore;
pub use types::{
    blob_to_vec, cosine_similarity, generate_id, vec_to_blob, MemoryMatch, MemoryRecord,
    MemoryStats, MemoryType,
};
