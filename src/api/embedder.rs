// Copyright 2025 extractive_rag_engine contributors
// SPDX-License-Identifier: MIT
//
// Licensed under the MIT License. You may obtain a copy of the License at
// https://opensource.org/licenses/MIT
//
// This software is provided "AS IS", without warranty of any kind, express or
// implied, including but not limited to the warranties of merchantability,
// fitness for a particular purpose, and noninfringement. In no event shall the
// authors or copyright holders be liable for any claim, damages, or other
// liability arising from the use of this software.
//
// CONTRIBUTOR GUIDELINES:
// This file is part of the core engine. Any modifications require owner approval.
// Please submit a PR with detailed explanation of changes before modifying.
//
//! Text embedding models.
//!
//! [`HashingEmbedder`] is a fully offline, deterministic bag-of-words model
//! (signed feature hashing over Unicode words). With the `fastembed` feature,
//! [`FastEmbedder`] runs all-MiniLM-L6-v2 through ONNX instead.

use crate::api::error::{RagError, RagResult};
use sha2::{Digest, Sha256};
use unicode_segmentation::UnicodeSegmentation;

pub const DEFAULT_EMBEDDING_DIMENSION: usize = 384;

/// Produces fixed-dimension vectors from text. Must be deterministic.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> RagResult<Vec<f32>>;

    fn dimension(&self) -> usize;

    /// Stable identifier persisted next to stored vectors.
    fn name(&self) -> &str;
}

/// Signed feature-hashing embedder.
///
/// Each lowercased word lands in `sha256(word) mod dimension` with a sign taken
/// from the digest, and the result is L2-normalised. Text without words maps
/// to a fixed unit vector so cosine distance stays defined.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
    name: String,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        let dimension = dimension.max(1);
        Self {
            dimension,
            name: format!("hashing-sha256-{}", dimension),
        }
    }

    fn bucket(&self, token: &str) -> (usize, f32) {
        let digest = Sha256::digest(token.as_bytes());
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&digest[..8]);
        let index = (u64::from_le_bytes(raw) % self.dimension as u64) as usize;
        let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
        (index, sign)
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_EMBEDDING_DIMENSION)
    }
}

impl Embedder for HashingEmbedder {
    fn embed(&self, text: &str) -> RagResult<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimension];
        for word in text.unicode_words() {
            let (index, sign) = self.bucket(&word.to_lowercase());
            vector[index] += sign;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm == 0.0 {
            vector[0] = 1.0;
            return Ok(vector);
        }
        for x in vector.iter_mut() {
            *x /= norm;
        }
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(feature = "fastembed")]
pub use self::onnx::FastEmbedder;

#[cfg(feature = "fastembed")]
mod onnx {
    use super::Embedder;
    use crate::api::error::{RagError, RagResult};
    use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
    use log::info;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// all-MiniLM-L6-v2 sentence embeddings (384 dims).
    pub struct FastEmbedder {
        model: Mutex<TextEmbedding>,
        dimension: usize,
    }

    impl FastEmbedder {
        /// Load (downloading on first use) the model into `cache_dir`.
        pub fn new(cache_dir: Option<PathBuf>) -> RagResult<Self> {
            info!("[embed] Loading all-MiniLM-L6-v2");
            let mut options = InitOptions::new(EmbeddingModel::AllMiniLML6V2)
                .with_show_download_progress(false);
            if let Some(dir) = cache_dir {
                options = options.with_cache_dir(dir);
            }

            let mut model =
                TextEmbedding::try_new(options).map_err(|e| RagError::Embedding(e.to_string()))?;
            let probe = model
                .embed(vec!["probe"], None)
                .map_err(|e| RagError::Embedding(e.to_string()))?;
            let dimension = probe.first().map(|v| v.len()).unwrap_or(384);

            info!("[embed] Model ready, dimension={}", dimension);
            Ok(Self { model: Mutex::new(model), dimension })
        }
    }

    impl Embedder for FastEmbedder {
        fn embed(&self, text: &str) -> RagResult<Vec<f32>> {
            let mut model = self.model.lock()?;
            model
                .embed(vec![text], None)
                .map_err(|e| RagError::Embedding(e.to_string()))?
                .into_iter()
                .next()
                .ok_or_else(|| RagError::Embedding("model returned no vector".to_string()))
        }

        fn dimension(&self) -> usize {
            self.dimension
        }

        fn name(&self) -> &str {
            "fastembed-all-minilm-l6-v2"
        }
    }
}

/// Reject vectors the index cannot use.
pub(crate) fn validate_embedding(embedding: &[f32], expected_dimension: usize) -> RagResult<()> {
    if embedding.is_empty() {
        return Err(RagError::Embedding("embedding vector is empty".to_string()));
    }
    if embedding.len() != expected_dimension {
        return Err(RagError::Embedding(format!(
            "dimension mismatch: expected {}, got {}",
            expected_dimension,
            embedding.len()
        )));
    }
    if embedding.iter().any(|x| !x.is_finite()) {
        return Err(RagError::Embedding("embedding contains non-finite values".to_string()));
    }
    Ok(())
}
