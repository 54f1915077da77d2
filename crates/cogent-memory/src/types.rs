// SPDX-FileCopyrightText: 2026 Cogent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory domain types for the long-term memory system.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A single record stored by the long-term memory system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Unique identifier, derived from a content hash plus random suffix.
    pub id: String,
    /// The text content of this memory.
    pub content: String,
    /// Embedding vector for semantic search.
    #[serde(skip)]
    pub embedding: Vec<f32>,
    /// Category of this memory.
    pub memory_type: MemoryType,
    /// Importance score (0.0-1.0). Higher survives consolidation.
    pub importance: f64,
    /// Arbitrary JSON metadata attached at store time.
    pub metadata: serde_json::Value,
    /// ISO 8601 creation timestamp.
    pub created_at: String,
}

/// Category of a stored memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryType {
    /// Raw conversational exchange.
    Conversation,
    /// Outcome of a completed task run.
    Experience,
    /// A standalone factual statement.
    Fact,
    /// A learned procedure or capability.
    Skill,
}

impl MemoryType {
    /// Convert to string for SQLite storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryType::Conversation => "conversation",
            MemoryType::Experience => "experience",
            MemoryType::Fact => "fact",
            MemoryType::Skill => "skill",
        }
    }

    /// Parse from SQLite string. Unrecognized values fall back to `Experience`.
    pub fn from_str_value(s: &str) -> Self {
        match s {
            "conversation" => MemoryType::Conversation,
            "fact" => MemoryType::Fact,
            "skill" => MemoryType::Skill,
            _ => MemoryType::Experience,
        }
    }
}

/// A memory with its similarity score from a search.
#[derive(Debug, Clone)]
pub struct MemoryMatch {
    /// The stored record.
    pub record: MemoryRecord,
    /// Similarity in [0.0, 1.0]; negative cosine values are clamped to zero.
    pub similarity: f32,
}

/// Aggregate statistics over the memory store.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MemoryStats {
    /// Total record count.
    pub total: usize,
    /// Count per memory type string.
    pub by_type: BTreeMap<String, usize>,
    /// Mean importance across all records (0.0 when empty).
    pub average_importance: f64,
    /// Active embedding strategy ("onnx", "hash-fallback", or "disabled").
    pub embedding_strategy: String,
}

/// Generate a record id from the content: 8 hex chars of the SHA-256 digest
/// plus 8 random hex chars, so identical content never collides.
pub fn generate_id(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    let content_part: String = digest[..4].iter().map(|b| format!("{b:02x}")).collect();
    let unique_part = uuid::Uuid::new_v4().simple().to_string();
    format!("mem_{content_part}_{}", &unique_part[..8])
}

/// Convert f32 vector to bytes for SQLite BLOB storage.
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    vec.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert SQLite BLOB back to f32 vector.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Compute cosine similarity between two vectors.
///
/// Uses the full normalized formula rather than a plain dot product because
/// hash-fallback vectors are not L2-normalized. Zero-norm inputs yield 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a <= f32::EPSILON || norm_b <= f32::EPSILON {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
