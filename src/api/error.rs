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
//! Typed errors raised inside the engine.
//!
//! None of these reach callers of the public question/ingestion API; the
//! engine converts them into fixed, user-readable messages.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RagError {
    /// Embedding computation failed for a chunk or query.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Similarity search backend failure.
    #[error("Search error: {0}")]
    Search(String),

    /// Unexpected failure while scoring or selecting sentences.
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// SQLite, serialization or filesystem failure in the corpus store.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Caller-supplied deadline elapsed before the operation finished.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Internal error (poisoned lock, worker thread vanished, etc.).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<rusqlite::Error> for RagError {
    fn from(e: rusqlite::Error) -> Self {
        RagError::Storage(e.to_string())
    }
}

impl From<bincode::Error> for RagError {
    fn from(e: bincode::Error) -> Self {
        RagError::Storage(e.to_string())
    }
}

impl From<std::io::Error> for RagError {
    fn from(e: std::io::Error) -> Self {
        RagError::Storage(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for RagError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        RagError::Internal(format!("Lock poisoned: {}", e))
    }
}

pub type RagResult<T> = Result<T, RagError>;
