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
//! Engine tuning knobs.

use crate::api::query_expander::{default_expansion_rules, ExpansionRule};

/// Retrieval and extraction limits for a [`RagEngine`](crate::api::rag_engine::RagEngine).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Passages fetched for the original question
    pub primary_k: usize,
    /// Passages fetched for the expanded question
    pub expansion_k: usize,
    /// Joined primary results shorter than this trigger query expansion
    pub weak_retrieval_chars: usize,
    /// Hard cap on the assembled context
    pub max_context_chars: usize,
    /// Context shorter than this (after trim) is treated as "nothing found"
    pub min_context_chars: usize,
    /// Candidate sentences shorter than this (after trim) are discarded
    pub min_sentence_chars: usize,
    /// Unscored fallback sentences must be longer than this
    pub fallback_sentence_chars: usize,
    /// Expected corpus size, used to size the HNSW graph
    pub index_capacity: usize,
    /// Ordered keyword expansions; first match wins
    pub expansion_rules: Vec<ExpansionRule>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            primary_k: 5,
            expansion_k: 3,
            weak_retrieval_chars: 100,
            max_context_chars: 2000,
            min_context_chars: 50,
            min_sentence_chars: 20,
            fallback_sentence_chars: 30,
            index_capacity: 10_000,
            expansion_rules: default_expansion_rules(),
        }
    }
}
