// SPDX-FileCopyrightText: 2026 Cogent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed record store with vector BLOB storage.

use std::path::Path;

use cogent_core::error::CogentError;
use tokio_rusqlite::Connection;

use crate::types::{blob_to_vec, vec_to_blob, MemoryRecord, MemoryType};

/// Helper to convert tokio_rusqlite errors into CogentError::Storage.
fn storage_err(e: tokio_rusqlite::Error) -> CogentError {
    CogentError::Storage {
        source: Box::new(e),
    }
}

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS long_term_memory (
    id TEXT PRIMARY KEY NOT NULL,
    content TEXT NOT NULL,
    embedding BLOB NOT NULL,
    memory_type TEXT NOT NULL DEFAULT 'experience',
    importance REAL NOT NULL DEFAULT 0.5,
    metadata TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

CREATE INDEX IF NOT EXISTS idx_ltm_type ON long_term_memory(memory_type);
CREATE INDEX IF NOT EXISTS idx_ltm_created ON long_term_memory(created_at);";

/// Persistent store for memory records in SQLite.
///
/// Stores embeddings as little-endian f32 BLOBs. Vector scoring happens
/// in-process over candidate embeddings fetched with [`Self::embeddings`].
pub struct MemoryStore {
    conn: Connection,
}

impl MemoryStore {
    /// Opens (or creates) a store at the given path and applies the schema.
    pub async fn open(path: &Path) -> Result<Self, CogentError> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| storage_err(e.into()))?;
        Self::init(&conn).await?;
        Ok(Self { conn })
    }

    /// Opens an in-memory store (tests and ephemeral runs).
    pub async fn open_in_memory() -> Result<Self, CogentError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| storage_err(e.into()))?;
        Self::init(&conn).await?;
        Ok(Self { conn })
    }

    async fn init(conn: &Connection) -> Result<(), CogentError> {
        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await
        .map_err(storage_err)
    }

    /// Insert a record.
    pub async fn insert(&self, record: &MemoryRecord) -> Result<(), CogentError> {
        let id = record.id.clone();
        let content = record.content.clone();
        let embedding_blob = vec_to_blob(&record.embedding);
        let memory_type = record.memory_type.as_str().to_string();
        let importance = record.importance;
        let metadata = record.metadata.to_string();
        let created_at = record.created_at.clone();

        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO long_term_memory (id, content, embedding, memory_type, importance, metadata, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    rusqlite::params![id, content, embedding_blob, memory_type, importance, metadata, created_at],
                )?;
                Ok(())
            })
            .await
            .map_err(storage_err)
    }

    /// Get candidate embeddings for a similarity scan (lightweight, no content).
    ///
    /// Returns (id, embedding) pairs, optionally restricted by type and
    /// minimum importance.
    pub async fn embeddings(
        &self,
        type_filter: Option<MemoryType>,
        min_importance: Option<f64>,
    ) -> Result<Vec<(String, Vec<f32>)>, CogentError> {
        self.conn
            .call(move |conn| {
                let mut sql = String::from("SELECT id, embedding FROM long_term_memory");
                let mut clauses = Vec::new();
                let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
                if let Some(mt) = type_filter {
                    clauses.push(format!("memory_type = ?{}", params.len() + 1));
                    params.push(Box::new(mt.as_str().to_string()));
                }
                if let Some(min) = min_importance {
                    clauses.push(format!("importance >= ?{}", params.len() + 1));
                    params.push(Box::new(min));
                }
                if !clauses.is_empty() {
                    sql.push_str(" WHERE ");
                    sql.push_str(&clauses.join(" AND "));
                }

                let mut stmt = conn.prepare(&sql)?;
                let param_refs: Vec<&dyn rusqlite::types::ToSql> =
                    params.iter().map(|p| p.as_ref()).collect();
                let results = stmt
                    .query_map(param_refs.as_slice(), |row| {
                        let id: String = row.get(0)?;
                        let blob: Vec<u8> = row.get(1)?;
                        Ok((id, blob_to_vec(&blob)))
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(results)
            })
            .await
            .map_err(storage_err)
    }

    /// Get (id, embedding, importance) triples for consolidation.
    pub async fn embeddings_with_importance(
        &self,
    ) -> Result<Vec<(String, Vec<f32>, f64)>, CogentError> {
        self.conn
            .call(move |conn| {
                let mut stmt =
                    conn.prepare("SELECT id, embedding, importance FROM long_term_memory")?;
                let results = stmt
                    .query_map([], |row| {
                        let id: String = row.get(0)?;
                        let blob: Vec<u8> = row.get(1)?;
                        let importance: f64 = row.get(2).unwrap_or(0.5);
                        Ok((id, blob_to_vec(&blob), importance))
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(results)
            })
            .await
            .map_err(storage_err)
    }

    /// Get records by IDs (batch retrieval after a similarity scan).
    pub async fn get_by_ids(&self, ids: &[String]) -> Result<Vec<MemoryRecord>, CogentError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let ids = ids.to_vec();
        self.conn
            .call(move |conn| {
                let placeholders: Vec<String> = (1..=ids.len()).map(|i| format!("?{i}")).collect();
                let sql = format!(
                    "SELECT id, content, embedding, memory_type, importance, metadata, created_at FROM long_term_memory WHERE id IN ({})",
                    placeholders.join(", ")
                );
                let mut stmt = conn.prepare(&sql)?;
                let params: Vec<&dyn rusqlite::types::ToSql> =
                    ids.iter().map(|id| id as &dyn rusqlite::types::ToSql).collect();
                let records = stmt
                    .query_map(params.as_slice(), |row| Ok(row_to_record(row)))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(records)
            })
            .await
            .map_err(storage_err)
    }

    /// Get the most recent records, newest first.
    pub async fn recent(
        &self,
        limit: usize,
        type_filter: Option<MemoryType>,
    ) -> Result<Vec<MemoryRecord>, CogentError> {
        self.conn
            .call(move |conn| {
                let records = match type_filter {
                    Some(mt) => {
                        let mut stmt = conn.prepare(
                            "SELECT id, content, embedding, memory_type, importance, metadata, created_at FROM long_term_memory WHERE memory_type = ?1 ORDER BY created_at DESC LIMIT ?2",
                        )?;
                        stmt.query_map(
                            rusqlite::params![mt.as_str(), limit as i64],
                            |row| Ok(row_to_record(row)),
                        )?
                        .collect::<Result<Vec<_>, _>>()?
                    }
                    None => {
                        let mut stmt = conn.prepare(
                            "SELECT id, content, embedding, memory_type, importance, metadata, created_at FROM long_term_memory ORDER BY created_at DESC LIMIT ?1",
                        )?;
                        stmt.query_map(rusqlite::params![limit as i64], |row| {
                            Ok(row_to_record(row))
                        })?
                        .collect::<Result<Vec<_>, _>>()?
                    }
                };
                Ok(records)
            })
            .await
            .map_err(storage_err)
    }

    /// Delete a record. Returns true when a row was removed.
    pub async fn delete(&self, id: &str) -> Result<bool, CogentError> {
        let id = id.to_string();
        self.conn
            .call(move |conn| {
                let rows = conn.execute(
                    "DELETE FROM long_term_memory WHERE id = ?1",
                    rusqlite::params![id],
                )?;
                Ok(rows > 0)
            })
            .await
            .map_err(storage_err)
    }

    /// Total record count.
    pub async fn count(&self) -> Result<usize, CogentError> {
        self.conn
            .call(|conn| {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM long_term_memory", [], |row| row.get(0))?;
                Ok(count as usize)
            })
            .await
            .map_err(storage_err)
    }

    /// (memory_type, importance) pairs for stats aggregation.
    ///
    /// Malformed importance values read back as the 0.5 default rather than
    /// failing the whole stats query.
    pub async fn type_and_importance(&self) -> Result<Vec<(String, f64)>, CogentError> {
        self.conn
            .call(|conn| {
                let mut stmt =
                    conn.prepare("SELECT memory_type, importance FROM long_term_memory")?;
                let results = stmt
                    .query_map([], |row| {
                        let memory_type: String = row.get(0).unwrap_or_default();
                        let importance: f64 = row.get(1).unwrap_or(0.5);
                        Ok((memory_type, importance))
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(results)
            })
            .await
            .map_err(storage_err)
    }
}

/// Convert a rusqlite Row to a MemoryRecord.
fn row_to_record(row: &rusqlite::Row) -> MemoryRecord {
    let embedding_blob: Vec<u8> = row.get(2).unwrap_or_default();
    let type_str: String = row.get(3).unwrap_or_default();
    let metadata_str: String = row.get(5).unwrap_or_default();

    MemoryRecord {
        id: row.get(0).unwrap_or_default(),
        content: row.get(1).unwrap_or_default(),
        embedding: blob_to_vec(&embedding_blob),
        memory_type: MemoryType::from_str_value(&type_str),
        importance: row.get(4).unwrap_or(0.5),
        metadata: serde_json::from_str(&metadata_str)
            .unwrap_or(serde_json::Value::Object(serde_json::Map::new())),
        created_at: row.get(6).unwrap_or_default(),
    }
}
