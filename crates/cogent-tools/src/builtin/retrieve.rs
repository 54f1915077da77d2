// SPDX-FileCopyrightText: 2026 Cogent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in local document retrieval tool.
//!
//! Scores documents from a local directory by normalized term frequency and
//! returns the top matches with a snippet around the first hit. No index is
//! built; the corpus is small and loaded once at registration time.

use std::path::Path;

use async_trait::async_trait;
use cogent_core::CogentError;
use tracing::debug;

use crate::registry::{Tool, ToolOutput};

/// Default number of hits returned when the model does not ask for more.
const DEFAULT_TOP_K: usize = 3;

/// Characters of context included around the first matching term.
const SNIPPET_WINDOW: usize = 200;

struct Document {
    source: String,
    text: String,
    tokens: Vec<String>,
}

/// Searches documents loaded from a local directory.
pub struct RetrieveTool {
    documents: Vec<Document>,
}

impl RetrieveTool {
    /// Load all `.md` and `.txt` files from a directory. A missing or
    /// unreadable directory yields an empty corpus, not an error.
    pub fn from_dir(dir: &Path) -> Self {
        let mut documents = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                let is_text = path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext == "md" || ext == "txt");
                if !is_text {
                    continue;
                }
                if let Ok(text) = std::fs::read_to_string(&path) {
                    let source = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| path.display().to_string());
                    documents.push(Document {
                        tokens: tokenize(&text),
                        source,
                        text,
                    });
                }
            }
        } else {
            debug!(dir = %dir.display(), "docs directory not readable, retrieve corpus is empty");
        }
        Self { documents }
    }

    /// Build a corpus from in-memory (source, text) pairs. Used in tests.
    pub fn from_documents(docs: Vec<(String, String)>) -> Self {
        let documents = docs
            .into_iter()
            .map(|(source, text)| Document {
                tokens: tokenize(&text),
                source,
                text,
            })
            .collect();
        Self { documents }
    }

    /// Number of loaded documents.
    pub fn corpus_size(&self) -> usize {
        self.documents.len()
    }
}

#[async_trait]
impl Tool for RetrieveTool {
    fn name(&self) -> &str {
        "retrieve"
    }

    fn description(&self) -> &str {
        "Search the local document collection and return the most relevant snippets"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search terms"
                },
                "top_k": {
                    "type": "integer",
                    "minimum": 1,
                    "description": "Maximum number of documents to return (default 3)"
                }
            },
            "required": ["query"]
        })
    }

    async fn invoke(&self, input: serde_json::Value) -> Result<ToolOutput, CogentError> {
        let query = input["query"].as_str().ok_or_else(|| CogentError::Tool {
            message: "missing required 'query' parameter".to_string(),
            source: None,
        })?;
        let top_k = input["top_k"]
            .as_u64()
            .map(|k| k as usize)
            .unwrap_or(DEFAULT_TOP_K);

        let terms = tokenize(query);
        if terms.is_empty() {
            return Ok(ToolOutput::success(
                serde_json::json!({"query": query, "hits": []}).to_string(),
            ));
        }

        let mut scored: Vec<(f64, &Document)> = self
            .documents
            .iter()
            .filter_map(|doc| {
                let score = score_document(doc, &terms);
                (score > 0.0).then_some((score, doc))
            })
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        let hits: Vec<serde_json::Value> = scored
            .iter()
            .map(|(score, doc)| {
                serde_json::json!({
                    "source": doc.source,
                    "score": (score * 1000.0).round() / 1000.0,
                    "snippet": snippet(&doc.text, &terms),
                })
            })
            .collect();

        Ok(ToolOutput::success(
            serde_json::json!({"query": query, "hits": hits}).to_string(),
        ))
    }
}

/// Lowercase alphanumeric tokens.
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// Sum of per-term frequencies, normalized by document length.
fn score_document(doc: &Document, terms: &[String]) -> f64 {
    if doc.tokens.is_empty() {
        return 0.0;
    }
    let hits: usize = terms
        .iter()
        .map(|term| doc.tokens.iter().filter(|t| *t == term).count())
        .sum();
    hits as f64 / doc.tokens.len() as f64
}

/// A window of text around the first occurrence of any query term.
fn snippet(text: &str, terms: &[String]) -> String {
    let lower = text.to_lowercase();
    let position = terms.iter().filter_map(|term| lower.find(term.as_str())).min();
    let Some(position) = position else {
        return text.chars().take(SNIPPET_WINDOW).collect();
    };

    let start = position.saturating_sub(SNIPPET_WINDOW / 2);
    // Clamp to char boundaries.
    let start = (0..=start).rev().find(|&i| text.is_char_boundary(i)).unwrap_or(0);
    let end = (start + SNIPPET_WINDOW).min(text.len());
    let end = (end..=text.len()).find(|&i| text.is_char_boundary(i)).unwrap_or(text.len());
    text[start..end].trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> RetrieveTool {
        RetrieveTool::from_documents(vec![
            (
                "rust.md".to_string(),
                "Rust is a systems programming language focused on safety and speed. \
                 The borrow checker enforces memory safety at compile time."
                    .to_string(),
            ),
            (
                "python.md".to_string(),
                "Python is an interpreted language popular for scripting and data science."
                    .to_string(),
            ),
        ])
    }

    #[tokio::test]
    async fn finds_relevant_document() {
        let tool = corpus();
        let output = tool
            .invoke(serde_json::json!({"query": "borrow checker safety"}))
            .await
            .unwrap();
        assert!(!output.is_error);
        let body: serde_json::Value = serde_json::from_str(&output.content).unwrap();
        let hits = body["hits"].as_array().unwrap();
        assert!(!hits.is_empty());
        assert_eq!(hits[0]["source"], "rust.md");
        assert!(hits[0]["snippet"].as_str().unwrap().contains("borrow checker"));
    }

    #[tokio::test]
    async fn unrelated_query_returns_no_hits() {
        let tool = corpus();
        let output = tool
            .invoke(serde_json::json!({"query": "quantum chromodynamics"}))
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_str(&output.content).unwrap();
        assert!(body["hits"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn top_k_limits_results() {
        let tool = corpus();
        let output = tool
            .invoke(serde_json::json!({"query": "language", "top_k": 1}))
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_str(&output.content).unwrap();
        assert_eq!(body["hits"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn missing_directory_yields_empty_corpus() {
        let tool = RetrieveTool::from_dir(Path::new("/nonexistent/docs-dir"));
        assert_eq!(tool.corpus_size(), 0);
    }

    #[test]
    fn from_dir_loads_text_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.md"), "alpha doc").unwrap();
        std::fs::write(dir.path().join("b.txt"), "beta doc").unwrap();
        std::fs::write(dir.path().join("c.bin"), "ignored").unwrap();
        let tool = RetrieveTool::from_dir(dir.path());
        assert_eq!(tool.corpus_size(), 2);
    }
}
