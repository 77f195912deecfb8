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
//! Append-only chunk storage with optional SQLite persistence.

use crate::api::error::RagResult;
use log::{info, warn};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const CORPUS_DB_FILE: &str = "corpus.sqlite";

/// A unit of ingested text with its source label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub content: String,
    pub source: String,
}

/// A chunk read back from disk together with its stored vector.
///
/// `embedding` is empty when the vector must be recomputed.
#[derive(Debug, Clone)]
pub struct StoredChunk {
    pub row_id: i64,
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

fn encode_embedding(embedding: &[f32]) -> RagResult<Vec<u8>> {
    Ok(bincode::serialize(embedding)?)
}

fn decode_embedding(blob: &[u8]) -> RagResult<Vec<f32>> {
    Ok(bincode::deserialize(blob)?)
}

/// In-memory corpus, mirrored to `<dir>/corpus.sqlite` when opened on a directory.
#[derive(Debug, Default)]
pub struct CorpusStore {
    chunks: Vec<Chunk>,
    total_chars: usize,
    db: Option<Mutex<Connection>>,
    db_path: Option<PathBuf>,
}

impl CorpusStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open (creating if needed) the store in `dir`.
    ///
    /// Returns the store (still empty in memory) and every persisted chunk in
    /// insertion order. The caller decides which of them make it back in via
    /// [`CorpusStore::restore`].
    pub fn open(dir: &Path, embedder_name: &str) -> RagResult<(Self, Vec<StoredChunk>)> {
        std::fs::create_dir_all(dir)?;
        let db_path = dir.join(CORPUS_DB_FILE);
        info!("[store] DB path: {}", db_path.display());

        let conn = Connection::open(&db_path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS chunks (
                id INTEGER PRIMARY KEY,
                content TEXT NOT NULL,
                source TEXT NOT NULL,
                embedding BLOB NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;

        let stored_embedder: Option<String> = conn
            .query_row("SELECT value FROM meta WHERE key = 'embedder'", [], |row| row.get(0))
            .ok();
        let embedder_changed = stored_embedder.as_deref().is_some_and(|name| name != embedder_name);
        if embedder_changed {
            warn!(
                "[store] Stored vectors were built by {:?}, active embedder is {}; they will be recomputed",
                stored_embedder, embedder_name
            );
        }

        let stored = {
            let mut stmt = conn.prepare("SELECT id, content, source, embedding FROM chunks ORDER BY id")?;
            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Vec<u8>>(3)?,
                ))
            })?;

            let mut stored = Vec::new();
            for row in rows {
                let (row_id, content, source, blob) = row?;
                let embedding = if embedder_changed {
                    Vec::new()
                } else {
                    decode_embedding(&blob).unwrap_or_else(|e| {
                        warn!("[store] Undecodable embedding, will recompute: {}", e);
                        Vec::new()
                    })
                };
                stored.push(StoredChunk { row_id, chunk: Chunk { content, source }, embedding });
            }
            stored
        };

        conn.execute(
            "INSERT OR REPLACE INTO meta (key, value) VALUES ('embedder', ?1)",
            params![embedder_name],
        )?;

        info!("[store] Loaded {} persisted chunks", stored.len());
        let store = Self {
            chunks: Vec::new(),
            total_chars: 0,
            db: Some(Mutex::new(conn)),
            db_path: Some(db_path),
        };
        Ok((store, stored))
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn total_chars(&self) -> usize {
        self.total_chars
    }

    pub fn get(&self, id: usize) -> Option<&Chunk> {
        self.chunks.get(id)
    }

    /// Append a chunk, persisting it first when backed by SQLite.
    pub fn append(&mut self, chunk: Chunk, embedding: &[f32]) -> RagResult<usize> {
        if let Some(db) = &self.db {
            let blob = encode_embedding(embedding)?;
            let conn = db.lock()?;
            conn.execute(
                "INSERT INTO chunks (content, source, embedding) VALUES (?1, ?2, ?3)",
                params![chunk.content, chunk.source, blob],
            )?;
        }
        Ok(self.push(chunk))
    }

    /// Re-admit a chunk loaded by [`CorpusStore::open`], rewriting its stored
    /// vector when it had to be recomputed.
    pub fn restore(&mut self, stored: StoredChunk, recomputed: bool) -> RagResult<usize> {
        if recomputed {
            if let Some(db) = &self.db {
                let blob = encode_embedding(&stored.embedding)?;
                let conn = db.lock()?;
                conn.execute(
                    "UPDATE chunks SET embedding = ?1 WHERE id = ?2",
                    params![blob, stored.row_id],
                )?;
            }
        }
        Ok(self.push(stored.chunk))
    }

    fn push(&mut self, chunk: Chunk) -> usize {
        self.total_chars += chunk.content.chars().count();
        self.chunks.push(chunk);
        self.chunks.len() - 1
    }
}
