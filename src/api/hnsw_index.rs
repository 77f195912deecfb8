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
//! HNSW (Hierarchical Navigable Small Worlds) vector index with exact re-ranking.
//!
//! The graph is created on the first insertion and grown incrementally after
//! that; there is no rebuild path. Graph candidates are re-scored with exact
//! cosine similarity so results are ordered by true similarity, ties broken
//! by insertion order.

use crate::api::error::{RagError, RagResult};
use hnsw_rs::prelude::*;
use log::{debug, info};
use ndarray::Array1;

/// hnsw_rs caps the layer count at 16 internally.
const MAX_LAYERS: usize = 16;

/// Embedding point kept alongside the graph for exact scoring.
#[derive(Clone, Debug)]
pub struct EmbeddingPoint {
    pub id: usize,
    pub embedding: Array1<f32>,
    pub norm: f32,
}

impl EmbeddingPoint {
    pub fn new(id: usize, embedding: Vec<f32>) -> Self {
        let embedding = Array1::from(embedding);
        let norm = embedding.dot(&embedding).sqrt();
        Self { id, embedding, norm }
    }

    pub fn cosine_similarity(&self, other: &Array1<f32>, other_norm: f32) -> f32 {
        if self.norm == 0.0 || other_norm == 0.0 {
            return 0.0;
        }
        self.embedding.dot(other) / (self.norm * other_norm)
    }
}

/// Graph construction parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HnswParams {
    /// Max connections per node
    pub m: usize,
    pub ef_construction: usize,
}

impl HnswParams {
    /// Adaptive parameters based on expected dataset size:
    /// - Small datasets (<1000): faster build, adequate recall
    /// - Large datasets (>10000): higher quality, better recall
    pub fn for_capacity(capacity: usize) -> Self {
        let (m, ef_construction) = if capacity > 10_000 {
            (24, 200)
        } else if capacity > 1_000 {
            (20, 150)
        } else {
            (16, 100)
        };
        Self { m, ef_construction }
    }
}

/// One search hit: corpus id and exact cosine similarity.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorHit {
    pub id: usize,
    pub similarity: f32,
}

pub struct HnswIndex {
    graph: Option<Hnsw<'static, f32, DistCosine>>,
    points: Vec<EmbeddingPoint>,
    capacity: usize,
    params: HnswParams,
}

impl HnswIndex {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            graph: None,
            points: Vec::new(),
            capacity,
            params: HnswParams::for_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_loaded(&self) -> bool {
        self.graph.is_some()
    }

    pub fn dimension(&self) -> Option<usize> {
        self.points.first().map(|p| p.embedding.len())
    }

    /// Fails when `embedding` cannot join the index. Once this passes,
    /// [`HnswIndex::insert`] with the same vector cannot fail.
    pub fn check_dimension(&self, embedding: &[f32]) -> RagResult<()> {
        match self.dimension() {
            Some(dim) if embedding.len() != dim => Err(RagError::Embedding(format!(
                "dimension mismatch: index has {}, got {}",
                dim,
                embedding.len()
            ))),
            _ => Ok(()),
        }
    }

    /// Insert the next vector; its id is the current length of the index.
    pub fn insert(&mut self, embedding: Vec<f32>) -> RagResult<usize> {
        self.check_dimension(&embedding)?;

        let params = self.params;
        let capacity = self.capacity;
        let graph = self.graph.get_or_insert_with(|| {
            info!(
                "[hnsw] Creating index (M={}, efC={}, capacity={})",
                params.m, params.ef_construction, capacity
            );
            Hnsw::new(params.m, capacity, MAX_LAYERS, params.ef_construction, DistCosine)
        });

        let id = self.points.len();
        graph.insert((embedding.as_slice(), id));
        self.points.push(EmbeddingPoint::new(id, embedding));
        debug!("[hnsw] Inserted point {}, size: {}", id, self.points.len());
        Ok(id)
    }

    /// Nearest neighbours of `query`, best first.
    ///
    /// ef_search = max(100, top_k * 5); 2 * top_k graph candidates are
    /// re-ranked exactly.
    pub fn search(&self, query: &[f32], top_k: usize) -> RagResult<Vec<VectorHit>> {
        let graph = match &self.graph {
            Some(graph) if !self.points.is_empty() && top_k > 0 => graph,
            _ => return Ok(Vec::new()),
        };

        if let Some(dim) = self.dimension() {
            if query.len() != dim {
                return Err(RagError::Search(format!(
                    "query dimension {} does not match index dimension {}",
                    query.len(),
                    dim
                )));
            }
        }

        let ef_search = core::cmp::max(100, top_k * 5);
        let candidates = (top_k * 2).min(self.points.len());
        debug!("[hnsw] Search top_k={}, candidates={}, ef_search={}", top_k, candidates, ef_search);

        let neighbours = graph.search(query, candidates, ef_search);

        let query_vec = Array1::from(query.to_vec());
        let query_norm = query_vec.dot(&query_vec).sqrt();

        let mut hits: Vec<VectorHit> = neighbours
            .iter()
            .filter_map(|n| self.points.get(n.d_id))
            .map(|point| VectorHit {
                id: point.id,
                similarity: point.cosine_similarity(&query_vec, query_norm),
            })
            .collect();

        hits.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });
        hits.dedup_by_key(|h| h.id);
        hits.truncate(top_k);

        debug!("[hnsw] Returning {} results", hits.len());
        Ok(hits)
    }
}
