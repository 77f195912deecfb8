// Copyright 2025 extractive_rag_engine contributors
// SPDX-License-Identifier: MIT
//
// CONTRIBUTOR GUIDELINES:
// This file is part of the core engine. Any modifications require owner approval.
// Please submit a PR with detailed explanation of changes before modifying.

//! Extractive question answering over a small document corpus.
//!
//! Chunks are embedded into an HNSW index; a question retrieves the nearest
//! passages (broadened with domain terms when retrieval is thin), the
//! passages are merged into a bounded context, and the best-matching
//! sentence is returned after a corruption check. No text is generated.

pub mod api;

pub use api::config::EngineConfig;
pub use api::embedder::{Embedder, HashingEmbedder};
pub use api::error::{RagError, RagResult};
pub use api::rag_engine::{AddOutcome, RagEngine};
