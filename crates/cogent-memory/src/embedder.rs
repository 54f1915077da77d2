// SPDX-FileCopyrightText: 2026 Cogent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text embedding with a local ONNX model and a deterministic hash fallback.
//!
//! The preferred path runs all-MiniLM-L6-v2 on CPU with zero external API
//! calls. When no model is available the hash fallback expands a SHA-256
//! digest into a pseudo-embedding: self-similarity still works (identical
//! text maps to identical vectors), which is all consolidation needs.

use std::path::Path;
use std::sync::Mutex;

use ndarray::Array2;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::TensorRef;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use cogent_core::error::CogentError;

/// Embedding dimensions for all-MiniLM-L6-v2.
pub const EMBEDDING_DIM: usize = 384;

/// ONNX-based embedder using all-MiniLM-L6-v2.
///
/// Loads the ONNX model and tokenizer from disk. All inference runs on CPU
/// with a single thread.
pub struct OnnxEmbedder {
    /// ONNX Runtime session (not Send, wrapped in Mutex for safety).
    session: Mutex<Session>,
    /// HuggingFace tokenizer.
    tokenizer: tokenizers::Tokenizer,
}

// Safety: Session is accessed through Mutex which provides synchronization.
// The tokenizer is thread-safe for encoding operations.
unsafe impl Send for OnnxEmbedder {}
unsafe impl Sync for OnnxEmbedder {}

impl OnnxEmbedder {
    /// Creates a new ONNX embedder from model files on disk.
    ///
    /// Expects `model.onnx` and `tokenizer.json` in the same directory
    /// as the provided model path (or its parent).
    pub fn new(model_path: &Path) -> Result<Self, CogentError> {
        let model_dir = model_path
            .parent()
            .ok_or_else(|| CogentError::Embedding("invalid model path".to_string()))?;

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = tokenizers::Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            CogentError::Embedding(format!(
                "failed to load tokenizer from {}: {e}",
                tokenizer_path.display()
            ))
        })?;

        let session = Session::builder()
            .map_err(|e| CogentError::Embedding(format!("failed to create ONNX session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| CogentError::Embedding(format!("failed to set optimization level: {e}")))?
            .with_intra_threads(1)
            .map_err(|e| CogentError::Embedding(format!("failed to set thread count: {e}")))?
            .commit_from_file(model_path)
            .map_err(|e| {
                CogentError::Embedding(format!(
                    "failed to load ONNX model from {}: {e}",
                    model_path.display()
                ))
            })?;

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
        })
    }

    /// Embed a single text string, returning a 384-dim L2-normalized vector.
    pub fn embed_text(&self, text: &str) -> Result<Vec<f32>, CogentError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| CogentError::Embedding(format!("tokenization failed: {e}")))?;

        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();
        let token_type_ids: Vec<i64> = encoding
            .get_type_ids()
            .iter()
            .map(|&t| t as i64)
            .collect();

        let seq_len = input_ids.len();

        let input_ids_array = Array2::from_shape_vec((1, seq_len), input_ids)
            .map_err(|e| CogentError::Embedding(format!("failed to create input_ids tensor: {e}")))?;
        let attention_mask_array = Array2::from_shape_vec((1, seq_len), attention_mask.clone())
            .map_err(|e| {
                CogentError::Embedding(format!("failed to create attention_mask tensor: {e}"))
            })?;
        let token_type_ids_array = Array2::from_shape_vec((1, seq_len), token_type_ids)
            .map_err(|e| {
                CogentError::Embedding(format!("failed to create token_type_ids tensor: {e}"))
            })?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| CogentError::Embedding(format!("failed to lock ONNX session: {e}")))?;

        let input_ids_tensor = TensorRef::from_array_view(&input_ids_array)
            .map_err(|e| CogentError::Embedding(format!("failed to create input_ids TensorRef: {e}")))?;
        let attention_mask_tensor = TensorRef::from_array_view(&attention_mask_array).map_err(|e| {
            CogentError::Embedding(format!("failed to create attention_mask TensorRef: {e}"))
        })?;
        let token_type_ids_tensor = TensorRef::from_array_view(&token_type_ids_array).map_err(|e| {
            CogentError::Embedding(format!("failed to create token_type_ids TensorRef: {e}"))
        })?;

        let outputs = session
            .run(ort::inputs![
                "input_ids" => input_ids_tensor,
                "attention_mask" => attention_mask_tensor,
                "token_type_ids" => token_type_ids_tensor
            ])
            .map_err(|e| CogentError::Embedding(format!("ONNX inference failed: {e}")))?;

        // Extract output: shape [1, seq_len, 384]
        let (shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| CogentError::Embedding(format!("failed to extract output tensor: {e}")))?;

        // Apply attention-masked mean pooling
        let hidden_size = shape[shape.len() - 1] as usize;
        let pooled = mean_pool_with_attention(data, &attention_mask, seq_len, hidden_size);

        Ok(l2_normalize(&pooled))
    }
}

/// Apply attention-masked mean pooling over token embeddings.
fn mean_pool_with_attention(
    embeddings: &[f32],
    attention_mask: &[i64],
    seq_len: usize,
    hidden_size: usize,
) -> Vec<f32> {
    let mut sum = vec![0.0f32; hidden_size];
    let mut count = 0.0f32;

    for i in 0..seq_len {
        if attention_mask[i] > 0 {
            for j in 0..hidden_size {
                sum[j] += embeddings[i * hidden_size + j];
            }
            count += 1.0;
        }
    }

    if count > 0.0 {
        for val in &mut sum {
            *val /= count;
        }
    }

    sum
}

/// L2-normalize a vector.
fn l2_normalize(vec: &[f32]) -> Vec<f32> {
    let norm: f32 = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        vec.iter().map(|v| v / norm).collect()
    } else {
        vec.to_vec()
    }
}

/// Deterministic hash pseudo-embedding.
///
/// Each byte of the SHA-256 digest expands into four floats via successive
/// right-shifts, mapped into [-1.0, 1.0); the result is zero-padded or
/// truncated to `dim`. Identical text always yields an identical vector.
pub fn hash_embedding(text: &str, dim: usize) -> Vec<f32> {
    let digest = Sha256::digest(text.as_bytes());
    let mut vec = Vec::with_capacity(dim);
    'outer: for byte in digest.iter() {
        for shift in 0..4 {
            if vec.len() >= dim {
                break 'outer;
            }
            vec.push(((byte >> shift) as f32) / 128.0 - 1.0);
        }
    }
    vec.resize(dim, 0.0);
    vec
}

/// The embedding strategy in use: a local ONNX model when one loads
/// successfully, otherwise the hash fallback.
pub enum Embedder {
    Onnx(OnnxEmbedder),
    Hash { dim: usize },
}

impl Embedder {
    /// Build an embedder from an optional model path, falling back to hash
    /// embeddings when the model is absent or fails to load.
    pub fn from_model_path(model_path: Option<&Path>, dim: usize) -> Self {
        match model_path {
            Some(path) => match OnnxEmbedder::new(path) {
                Ok(onnx) => {
                    info!(model = %path.display(), "loaded ONNX embedding model");
                    Embedder::Onnx(onnx)
                }
                Err(e) => {
                    warn!(model = %path.display(), error = %e, "ONNX model unavailable, using hash embeddings");
                    Embedder::Hash { dim }
                }
            },
            None => Embedder::Hash { dim },
        }
    }

    /// Embed a single text string.
    pub fn embed(&self, text: &str) -> Result<Vec<f32>, CogentError> {
        match self {
            Embedder::Onnx(onnx) => onnx.embed_text(text),
            Embedder::Hash { dim } => Ok(hash_embedding(text, *dim)),
        }
    }

    /// Name of the active strategy, reported in stats.
    pub fn strategy(&self) -> &'static str {
        match self {
            Embedder::Onnx(_) => "onnx",
            Embedder::Hash { .. } => "hash-fallback",
        }
    }

    /// Output vector dimension.
    pub fn dimension(&self) -> usize {
        match self {
            Embedder::Onnx(_) => EMBEDDING_DIM,
            Embedder::Hash { dim } => *dim,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn l2_normalize_general_vector() {
        let v = vec![3.0, 4.0];
        let n = l2_normalize(&v);
        // norm = 5, so normalized = [0.6, 0.8]
        assert!((n[0] - 0.6).abs() < 0.001);
        assert!((n[1] - 0.8).abs() < 0.001);
    }

    #[test]
    fn l2_normalize_zero_vector() {
        let v = vec![0.0, 0.0, 0.0];
        assert_eq!(l2_normalize(&v), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn mean_pool_with_attention_skips_padding() {
        // 2 tokens, hidden_size=3, first token masked out (padding)
        let embeddings = vec![
            0.0, 0.0, 0.0, // token 0 (padding)
            1.0, 2.0, 3.0, // token 1 (real)
        ];
        let attention_mask = vec![0, 1];
        let result = mean_pool_with_attention(&embeddings, &attention_mask, 2, 3);
        assert_eq!(result, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn hash_embedding_is_deterministic() {
        let a = hash_embedding("remember this", 384);
        let b = hash_embedding("remember this", 384);
        assert_eq!(a, b);
        assert_eq!(a.len(), 384);
    }

    #[test]
    fn hash_embedding_differs_for_different_text() {
        let a = hash_embedding("alpha", 384);
        let b = hash_embedding("beta", 384);
        assert_ne!(a, b);
    }

    #[test]
    fn hash_embedding_pads_beyond_digest() {
        // 32 digest bytes * 4 floats = 128 populated entries, rest zero.
        let v = hash_embedding("padding check", 384);
        assert!(v[..128].iter().any(|&x| x != 0.0));
        assert!(v[128..].iter().all(|&x| x == 0.0));
    }

    #[test]
    fn hash_embedding_values_in_range() {
        let v = hash_embedding("range check", 128);
        assert!(v.iter().all(|&x| (-1.0..1.0).contains(&x)));
    }

    #[test]
    fn hash_embedding_truncates_to_small_dim() {
        let v = hash_embedding("small", 16);
        assert_eq!(v.len(), 16);
    }

    #[test]
    fn embedder_without_model_uses_hash_fallback() {
        let embedder = Embedder::from_model_path(None, 384);
        assert_eq!(embedder.strategy(), "hash-fallback");
        assert_eq!(embedder.dimension(), 384);
        let v = embedder.embed("hello").unwrap();
        assert_eq!(v.len(), 384);
    }

    #[test]
    fn embedder_with_missing_model_falls_back() {
        let embedder =
            Embedder::from_model_path(Some(Path::new("/nonexistent/model.onnx")), 384);
        assert_eq!(embedder.strategy(), "hash-fallback");
    }

    // OnnxEmbedder::new needs real model files on disk, so the ONNX path
    // is only covered by the fallback tests above.
}
