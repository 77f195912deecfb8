// Copyright 2025 extractive_rag_engine contributors
// SPDX-License-Identifier: MIT
//
// CONTRIBUTOR GUIDELINES:
// This file is part of the core engine. Any modifications require owner approval.
// Please submit a PR with detailed explanation of changes before modifying.

pub mod answer_extractor;
pub mod config;
pub mod context_assembler;
pub mod corpus_store;
pub mod embedder;
pub mod error;
pub mod evaluator;
pub mod hnsw_index;
pub mod logger;
pub mod output_guard;
pub mod query_expander;
pub mod rag_engine;
