// SPDX-FileCopyrightText: 2026 Cogent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Degrade-and-log facade over the memory store.
//!
//! The agent loop must never fail because memory failed: every operation
//! here catches storage and embedding errors, logs them, and returns an
//! empty result. A disabled facade behaves like an always-empty store.

use std::path::Path;

use tracing::{debug, trace, warn};

use crate::embedder::Embedder;
use crate::store::MemoryStore;
use crate::types::{
    cosine_similarity, generate_id, MemoryMatch, MemoryRecord, MemoryStats, MemoryType,
};

struct Backend {
    store: MemoryStore,
    embedder: Embedder,
}

/// Long-term memory with similarity search and importance-weighted
/// consolidation.
pub struct LongTermMemory {
    backend: Option<Backend>,
}

impl LongTermMemory {
    /// Wrap an already-open store and embedder.
    pub fn new(store: MemoryStore, embedder: Embedder) -> Self {
        Self {
            backend: Some(Backend { store, embedder }),
        }
    }

    /// A facade with no backend: every operation is a logged no-op.
    pub fn disabled() -> Self {
        Self { backend: None }
    }

    /// Open a store at `path`. A failure to open degrades to a disabled
    /// facade rather than propagating.
    pub async fn open(path: &Path, embedder: Embedder) -> Self {
        match MemoryStore::open(path).await {
            Ok(store) => Self::new(store, embedder),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "memory store unavailable, continuing without memory");
                Self::disabled()
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Store a new memory. Returns the record id, or `None` when the content
    /// is blank, memory is disabled, or the write failed.
    pub async fn store(
        &self,
        content: &str,
        memory_type: MemoryType,
        importance: f64,
        metadata: serde_json::Value,
    ) -> Option<String> {
        let backend = self.backend.as_ref()?;
        if content.trim().is_empty() {
            trace!("skipping store of blank memory content");
            return None;
        }

        let embedding = match backend.embedder.embed(content) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "embedding failed, memory not stored");
                return None;
            }
        };

        let record = MemoryRecord {
            id: generate_id(content),
            content: content.to_string(),
            embedding,
            memory_type,
            importance: importance.clamp(0.0, 1.0),
            metadata,
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        match backend.store.insert(&record).await {
            Ok(()) => {
                debug!(id = %record.id, memory_type = memory_type.as_str(), "memory stored");
                Some(record.id)
            }
            Err(e) => {
                warn!(error = %e, "memory insert failed");
                None
            }
        }
    }

    /// Search for memories similar to `query`.
    ///
    /// An empty query, a disabled facade, or any backend failure yields an
    /// empty list. Results are sorted by descending similarity, clamped to
    /// [0, 1], and truncated to `n_results`.
    pub async fn search(
        &self,
        query: &str,
        n_results: usize,
        type_filter: Option<MemoryType>,
        min_importance: Option<f64>,
    ) -> Vec<MemoryMatch> {
        let Some(backend) = self.backend.as_ref() else {
            return Vec::new();
        };
        if query.trim().is_empty() || n_results == 0 {
            return Vec::new();
        }

        let query_vec = match backend.embedder.embed(query) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "query embedding failed");
                return Vec::new();
            }
        };

        let candidates = match backend.store.embeddings(type_filter, min_importance).await {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "memory search scan failed");
                return Vec::new();
            }
        };

        let mut scored: Vec<(String, f32)> = candidates
            .into_iter()
            .map(|(id, embedding)| {
                let similarity = cosine_similarity(&query_vec, &embedding).max(0.0);
                (id, similarity)
            })
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(n_results);

        let ids: Vec<String> = scored.iter().map(|(id, _)| id.clone()).collect();
        let records = match backend.store.get_by_ids(&ids).await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "memory fetch failed");
                return Vec::new();
            }
        };

        // Re-attach scores; get_by_ids does not preserve scan order.
        scored
            .into_iter()
            .filter_map(|(id, similarity)| {
                records
                    .iter()
                    .find(|r| r.id == id)
                    .cloned()
                    .map(|record| MemoryMatch { record, similarity })
            })
            .collect()
    }

    /// The `n` most recent memories, newest first.
    pub async fn recent(&self, n: usize, type_filter: Option<MemoryType>) -> Vec<MemoryRecord> {
        let Some(backend) = self.backend.as_ref() else {
            return Vec::new();
        };
        match backend.store.recent(n, type_filter).await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "recent memory fetch failed");
                Vec::new()
            }
        }
    }

    /// Delete a memory by id. Returns false when nothing was removed.
    pub async fn delete(&self, id: &str) -> bool {
        let Some(backend) = self.backend.as_ref() else {
            return false;
        };
        match backend.store.delete(id).await {
            Ok(removed) => removed,
            Err(e) => {
                warn!(error = %e, id, "memory delete failed");
                false
            }
        }
    }

    /// Aggregate statistics. Failures report an empty store.
    pub async fn stats(&self) -> MemoryStats {
        let Some(backend) = self.backend.as_ref() else {
            return MemoryStats {
                embedding_strategy: "disabled".to_string(),
                ..MemoryStats::default()
            };
        };

        let rows = match backend.store.type_and_importance().await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "memory stats query failed");
                Vec::new()
            }
        };

        let mut stats = MemoryStats {
            total: rows.len(),
            embedding_strategy: backend.embedder.strategy().to_string(),
            ..MemoryStats::default()
        };
        if !rows.is_empty() {
            let sum: f64 = rows.iter().map(|(_, imp)| imp).sum();
            stats.average_importance = sum / rows.len() as f64;
        }
        for (memory_type, _) in rows {
            *stats.by_type.entry(memory_type).or_insert(0) += 1;
        }
        stats
    }

    /// Consolidate near-duplicate memories.
    ///
    /// Scans all pairs; when similarity exceeds `threshold`, the record with
    /// the lower importance is deleted (ties keep the earlier-scanned one).
    /// Returns the number of records removed.
    pub async fn consolidate(&self, threshold: f64) -> usize {
        let Some(backend) = self.backend.as_ref() else {
            return 0;
        };

        let entries = match backend.store.embeddings_with_importance().await {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "consolidation scan failed");
                return 0;
            }
        };
        if entries.len() < 2 {
            return 0;
        }

        let mut doomed: Vec<usize> = Vec::new();
        for i in 0..entries.len() {
            if doomed.contains(&i) {
                continue;
            }
            for j in (i + 1)..entries.len() {
                if doomed.contains(&j) {
                    continue;
                }
                let similarity = cosine_similarity(&entries[i].1, &entries[j].1) as f64;
                if similarity > threshold {
                    // Keep the more important record; on a tie the earlier
                    // one survives.
                    if entries[i].2 >= entries[j].2 {
                        doomed.push(j);
                    } else {
                        doomed.push(i);
                        break;
                    }
                }
            }
        }

        let mut removed = 0;
        for idx in doomed {
            let id = &entries[idx].0;
            match backend.store.delete(id).await {
                Ok(true) => removed += 1,
                Ok(false) => {}
                Err(e) => warn!(id = %id, error = %e, "consolidation delete failed"),
            }
        }
        debug!(removed, threshold, "consolidation pass complete");
        removed
    }
}
