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
//! Session-level question answering engine.
//!
//! [`RagEngine`] owns the corpus and the vector index behind one lock:
//! ingestion takes the write side (so insertions are serialized), searches
//! take the read side and may run concurrently. Every public entry point
//! degrades to a fixed message instead of returning an error.

use crate::api::answer_extractor::{extract_answer, Extraction, ExtractionLimits};
use crate::api::config::EngineConfig;
use crate::api::context_assembler::assemble_context;
use crate::api::corpus_store::{Chunk, CorpusStore};
use crate::api::embedder::{validate_embedding, Embedder};
use crate::api::error::{RagError, RagResult};
use crate::api::hnsw_index::HnswIndex;
use crate::api::output_guard::{check_answer, GuardVerdict, UNCLEAR_ANSWER_MESSAGE};
use crate::api::query_expander::{expand_query, needs_expansion};
use log::{debug, error, info, warn};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

pub const EXTRACTION_FAILED_MESSAGE: &str =
    "I encountered an error while processing your question. Please try rephrasing it.";
pub const NO_DOCUMENTS_MESSAGE: &str = "No documents loaded";

/// Result of a single ingestion attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// Stored at this corpus position.
    Added { id: usize },
    /// Content was empty after trimming; nothing stored.
    Skipped,
}

#[derive(Debug, Clone, Copy)]
struct Deadline {
    at: Instant,
    budget: Duration,
}

impl Deadline {
    fn after(budget: Duration) -> Self {
        Self { at: Instant::now() + budget, budget }
    }

    fn remaining(&self) -> RagResult<Duration> {
        match self.at.checked_duration_since(Instant::now()) {
            Some(left) if !left.is_zero() => Ok(left),
            _ => Err(RagError::Timeout(self.budget)),
        }
    }
}

struct EngineState {
    corpus: CorpusStore,
    index: HnswIndex,
}

pub struct RagEngine {
    config: EngineConfig,
    embedder: Arc<dyn Embedder>,
    state: RwLock<EngineState>,
}

impl RagEngine {
    /// In-memory session; everything is dropped with the engine.
    pub fn new(config: EngineConfig, embedder: Arc<dyn Embedder>) -> Self {
        let index = HnswIndex::new(config.index_capacity);
        Self {
            config,
            embedder,
            state: RwLock::new(EngineState { corpus: CorpusStore::in_memory(), index }),
        }
    }

    /// Persistent session stored under `dir`. Previously ingested chunks are
    /// reloaded and re-indexed; vectors from a different embedder are recomputed.
    pub fn open(dir: impl AsRef<Path>, config: EngineConfig, embedder: Arc<dyn Embedder>) -> RagResult<Self> {
        let (corpus, stored) = CorpusStore::open(dir.as_ref(), embedder.name())?;
        let mut state = EngineState { corpus, index: HnswIndex::new(config.index_capacity) };
        let dimension = embedder.dimension();

        for mut item in stored {
            let recomputed = validate_embedding(&item.embedding, dimension).is_err();
            if recomputed {
                match embedder.embed(&item.chunk.content) {
                    Ok(embedding) if validate_embedding(&embedding, dimension).is_ok() => {
                        item.embedding = embedding;
                    }
                    Ok(_) => {
                        error!("[rag] Re-embedding produced an invalid vector, skipping chunk from {}", item.chunk.source);
                        continue;
                    }
                    Err(e) => {
                        error!("[rag] Failed to re-embed chunk from {}: {}", item.chunk.source, e);
                        continue;
                    }
                }
            }
            if let Err(e) = state.index.check_dimension(&item.embedding) {
                error!("[rag] Skipping chunk from {}: {}", item.chunk.source, e);
                continue;
            }
            let embedding = item.embedding.clone();
            let id = state.corpus.restore(item, recomputed)?;
            let index_id = state.index.insert(embedding)?;
            ensure_aligned(id, index_id)?;
        }

        info!("[rag] Opened session with {} chunks", state.corpus.len());
        Ok(Self { config, embedder, state: RwLock::new(state) })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Embed and store one chunk.
    pub fn try_add_document(&self, content: &str, source: &str) -> RagResult<AddOutcome> {
        if content.trim().is_empty() {
            info!("[rag] Skipping empty content from {}", source);
            return Ok(AddOutcome::Skipped);
        }

        let embedding = self.embedder.embed(content)?;
        validate_embedding(&embedding, self.embedder.dimension())?;

        let mut state = self.state.write()?;
        // Nothing is stored unless both the corpus and the index accept the chunk
        state.index.check_dimension(&embedding)?;
        let chunk = Chunk { content: content.to_string(), source: source.to_string() };
        let id = state.corpus.append(chunk, &embedding)?;
        let index_id = state.index.insert(embedding)?;
        ensure_aligned(id, index_id)?;

        info!("[rag] Added document from {} (id={})", source, id);
        Ok(AddOutcome::Added { id })
    }

    /// Ingestion entry point. Failures are logged and the chunk is dropped.
    pub fn add_document(&self, content: &str, source: &str) {
        if let Err(e) = self.try_add_document(content, source) {
            error!("[rag] Dropping chunk from {}: {}", source, e);
        }
    }

    /// Ingest a batch; a failing chunk does not stop the rest.
    /// Returns how many chunks were stored.
    pub fn add_documents<I, C, S>(&self, documents: I) -> usize
    where
        I: IntoIterator<Item = (C, S)>,
        C: AsRef<str>,
        S: AsRef<str>,
    {
        let mut added = 0;
        for (content, source) in documents {
            match self.try_add_document(content.as_ref(), source.as_ref()) {
                Ok(AddOutcome::Added { .. }) => added += 1,
                Ok(AddOutcome::Skipped) => {}
                Err(e) => error!("[rag] Dropping chunk from {}: {}", source.as_ref(), e),
            }
        }
        info!("[rag] Batch ingestion stored {} chunks", added);
        added
    }

    fn embed_query(&self, text: &str, deadline: Option<Deadline>) -> RagResult<Vec<f32>> {
        let deadline = match deadline {
            Some(deadline) => deadline,
            None => return self.embedder.embed(text),
        };
        let remaining = deadline.remaining()?;

        let (tx, rx) = mpsc::channel();
        let embedder = Arc::clone(&self.embedder);
        let text = text.to_string();
        std::thread::spawn(move || {
            // Receiver may be gone after a timeout
            let _ = tx.send(embedder.embed(&text));
        });

        match rx.recv_timeout(remaining) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(RagError::Timeout(deadline.budget)),
            Err(RecvTimeoutError::Disconnected) => {
                Err(RagError::Internal("embedding worker exited without a result".to_string()))
            }
        }
    }

    fn search_inner(&self, query: &str, top_k: usize, deadline: Option<Deadline>) -> RagResult<Vec<String>> {
        if self.state.read()?.index.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self.embed_query(query, deadline)?;

        let state = self.state.read()?;
        let hits = state.index.search(&query_embedding, top_k)?;
        if let Some(deadline) = deadline {
            deadline.remaining()?;
        }

        let results: Vec<String> = hits
            .iter()
            .filter_map(|hit| state.corpus.get(hit.id))
            .map(|chunk| chunk.content.clone())
            .collect();
        debug!("[rag] Search returned {} passages", results.len());
        Ok(results)
    }

    /// Top `top_k` chunk contents by similarity, with typed errors.
    pub fn try_search(&self, query: &str, top_k: usize) -> RagResult<Vec<String>> {
        self.search_inner(query, top_k, None)
    }

    /// Like [`RagEngine::try_search`] but gives up with [`RagError::Timeout`]
    /// once `budget` has elapsed.
    pub fn try_search_with_deadline(&self, query: &str, top_k: usize, budget: Duration) -> RagResult<Vec<String>> {
        self.search_inner(query, top_k, Some(Deadline::after(budget)))
    }

    /// Top `top_k` chunk contents; empty on any failure.
    pub fn search(&self, query: &str, top_k: usize) -> Vec<String> {
        self.try_search(query, top_k).unwrap_or_else(|e| {
            error!("[rag] Search error: {}", e);
            Vec::new()
        })
    }

    /// Search failures become empty results; only timeouts propagate.
    fn retrieve(&self, query: &str, top_k: usize, deadline: Option<Deadline>) -> RagResult<Vec<String>> {
        match self.search_inner(query, top_k, deadline) {
            Ok(results) => Ok(results),
            Err(RagError::Timeout(budget)) => Err(RagError::Timeout(budget)),
            Err(e) => {
                error!("[rag] Search error: {}", e);
                Ok(Vec::new())
            }
        }
    }

    fn build_context(&self, question: &str, deadline: Option<Deadline>) -> RagResult<String> {
        let primary = self.retrieve(question, self.config.primary_k, deadline)?;

        let mut secondary = Vec::new();
        if needs_expansion(&primary, self.config.weak_retrieval_chars) {
            let expanded = expand_query(question, &self.config.expansion_rules);
            if expanded != question {
                debug!("[rag] Weak retrieval, expanded query: {}", expanded);
                secondary = match self.retrieve(&expanded, self.config.expansion_k, deadline) {
                    Ok(results) => results,
                    Err(e) => {
                        warn!("[rag] Expansion search abandoned, using primary results: {}", e);
                        Vec::new()
                    }
                };
            }
        }

        Ok(assemble_context(primary, secondary, self.config.max_context_chars))
    }

    /// The assembled context used to answer `question` (may be empty).
    pub fn get_context(&self, question: &str) -> String {
        self.build_context(question, None).unwrap_or_else(|e| {
            error!("[rag] Context assembly failed: {}", e);
            String::new()
        })
    }

    fn limits(&self) -> ExtractionLimits {
        ExtractionLimits {
            min_context_chars: self.config.min_context_chars,
            min_sentence_chars: self.config.min_sentence_chars,
            fallback_sentence_chars: self.config.fallback_sentence_chars,
        }
    }

    fn answer_inner(&self, question: &str, deadline: Option<Deadline>) -> String {
        self.answer_with(question, deadline, extract_answer)
    }

    fn answer_with<F>(&self, question: &str, deadline: Option<Deadline>, extract: F) -> String
    where
        F: FnOnce(&str, &str, ExtractionLimits) -> Extraction,
    {
        let context = match self.build_context(question, deadline) {
            Ok(context) => context,
            Err(e) => {
                warn!("[rag] No context for question: {}", e);
                String::new()
            }
        };

        let limits = self.limits();
        match run_extraction(|| extract(&context, question, limits)) {
            Ok(extraction) => finalize_answer(extraction),
            Err(e) => {
                error!("[rag] Error extracting answer: {}", e);
                EXTRACTION_FAILED_MESSAGE.to_string()
            }
        }
    }

    /// Primary query entry point. Always returns a non-empty answer.
    pub fn answer_question(&self, question: &str) -> String {
        self.answer_inner(question, None)
    }

    /// Like [`RagEngine::answer_question`]; retrieval that overruns `budget`
    /// is treated as finding nothing.
    pub fn answer_question_with_deadline(&self, question: &str, budget: Duration) -> String {
        self.answer_inner(question, Some(Deadline::after(budget)))
    }

    pub fn chunk_count(&self) -> usize {
        self.state.read().map(|s| s.corpus.len()).unwrap_or(0)
    }

    pub fn total_characters(&self) -> usize {
        self.state.read().map(|s| s.corpus.total_chars()).unwrap_or(0)
    }

    /// Human-readable corpus summary.
    pub fn get_document_stats(&self) -> String {
        let (chunks, chars) = match self.state.read() {
            Ok(state) => (state.corpus.len(), state.corpus.total_chars()),
            Err(e) => {
                error!("[rag] Stats unavailable: {}", e);
                (0, 0)
            }
        };
        if chunks == 0 {
            return NO_DOCUMENTS_MESSAGE.to_string();
        }
        format!(
            "Loaded {} document chunks with {} total characters",
            chunks,
            format_thousands(chars)
        )
    }
}

fn ensure_aligned(corpus_id: usize, index_id: usize) -> RagResult<()> {
    if corpus_id != index_id {
        return Err(RagError::Internal(format!(
            "corpus id {} and index id {} diverged",
            corpus_id, index_id
        )));
    }
    Ok(())
}

/// Run extraction, turning a panic inside it into [`RagError::Extraction`].
fn run_extraction<F>(extract: F) -> RagResult<Extraction>
where
    F: FnOnce() -> Extraction,
{
    panic::catch_unwind(AssertUnwindSafe(extract)).map_err(|payload| {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        RagError::Extraction(reason)
    })
}

/// Turn an extraction outcome into user-facing text, guarding extracted sentences.
pub fn finalize_answer(extraction: Extraction) -> String {
    match extraction {
        Extraction::Answer(text) => match check_answer(&text) {
            GuardVerdict::Accepted => text,
            GuardVerdict::Rejected(reason) => {
                warn!("[guard] Rejected answer: {:?}", reason);
                UNCLEAR_ANSWER_MESSAGE.to_string()
            }
        },
        other => other.message().to_string(),
    }
}

fn format_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::answer_extractor::NO_CONTEXT_MESSAGE;
    use crate::api::embedder::HashingEmbedder;
    use std::sync::Mutex;

    fn engine() -> RagEngine {
        RagEngine::new(EngineConfig::default(), Arc::new(HashingEmbedder::default()))
    }

    /// Records every text it embeds.
    struct RecordingEmbedder {
        inner: HashingEmbedder,
        seen: Mutex<Vec<String>>,
    }

    impl Embedder for RecordingEmbedder {
        fn embed(&self, text: &str) -> RagResult<Vec<f32>> {
            self.seen.lock().unwrap().push(text.to_string());
            self.inner.embed(text)
        }
        fn dimension(&self) -> usize {
            self.inner.dimension()
        }
        fn name(&self) -> &str {
            "recording"
        }
    }

    /// Fails on content containing "FAIL", sleeps on content containing "SLOW"
    /// or the litigation expansion term "talc".
    struct FlakyEmbedder(HashingEmbedder);

    impl Embedder for FlakyEmbedder {
        fn embed(&self, text: &str) -> RagResult<Vec<f32>> {
            if text.contains("FAIL") {
                return Err(RagError::Embedding("model crashed".to_string()));
            }
            if text.contains("SLOW") || text.contains("talc") {
                std::thread::sleep(Duration::from_millis(300));
            }
            self.0.embed(text)
        }
        fn dimension(&self) -> usize {
            self.0.dimension()
        }
        fn name(&self) -> &str {
            "flaky"
        }
    }

    #[test]
    fn test_sales_trend_answer() {
        let engine = engine();
        engine.add_document("Sales grew by 12% in 2023 to $5 billion, driven by strong demand.", "report.pdf");

        let answer = engine.answer_question("What are the main sales trends?");
        assert!(answer.contains("12%"));
        assert!(answer.contains("billion"));
        assert_eq!(answer, "Sales grew by 12% in 2023 to $5 billion, driven by strong demand.");
    }

    #[test]
    fn test_empty_corpus_answer() {
        let engine = engine();
        assert_eq!(engine.answer_question("Anything at all?"), NO_CONTEXT_MESSAGE);
        assert_eq!(engine.get_context("Anything at all?"), "");
    }

    #[test]
    fn test_garbled_candidate_is_rejected() {
        let out = finalize_answer(Extraction::Answer("a1b###???***".to_string()));
        assert_eq!(out, UNCLEAR_ANSWER_MESSAGE);
    }

    #[test]
    fn test_litigation_question_is_expanded() {
        let embedder = Arc::new(RecordingEmbedder {
            inner: HashingEmbedder::default(),
            seen: Mutex::new(Vec::new()),
        });
        let engine = RagEngine::new(EngineConfig::default(), embedder.clone());
        engine.add_document("Thousands of talc lawsuits against the company remain pending in court.", "10k.pdf");

        let question = "Is there any litigation risk?";
        let answer = engine.answer_question(question);

        let seen = embedder.seen.lock().unwrap();
        assert!(seen.iter().any(|q| {
            q == "Is there any litigation risk? talc opioids lawsuits legal proceedings baby powder"
        }));
        assert!(answer.contains("talc"));
    }

    #[test]
    fn test_duplicate_chunks_counted_but_deduplicated() {
        let engine = engine();
        let text = "Revenue increased to 85 billion dollars in fiscal year 2023 overall.";
        engine.add_document(text, "annual.pdf");
        engine.add_document(text, "summary.pdf");

        assert_eq!(engine.chunk_count(), 2);
        assert!(engine.get_document_stats().starts_with("Loaded 2 document chunks"));
        let context = engine.get_context("How did revenue change?");
        assert_eq!(context.matches(text).count(), 1);
    }

    #[test]
    fn test_blank_content_is_skipped() {
        let engine = engine();
        for blank in ["", "   ", "\n\t  \n"] {
            assert_eq!(engine.try_add_document(blank, "empty.txt").unwrap(), AddOutcome::Skipped);
        }
        assert_eq!(engine.chunk_count(), 0);
        assert_eq!(engine.get_document_stats(), NO_DOCUMENTS_MESSAGE);
    }

    #[test]
    fn test_each_add_grows_corpus_by_one() {
        let engine = engine();
        for i in 0..5 {
            let outcome = engine.try_add_document(&format!("Chunk number {} about dividends.", i), "doc").unwrap();
            assert_eq!(outcome, AddOutcome::Added { id: i });
            assert_eq!(engine.chunk_count(), i + 1);
        }
    }

    #[test]
    fn test_context_is_bounded() {
        let engine = engine();
        for i in 0..8 {
            engine.add_document(&format!("{} sales revenue growth {}", i, "word ".repeat(200)), "big.pdf");
        }
        let context = engine.get_context("sales growth");
        assert!(!context.is_empty());
        assert!(context.chars().count() <= 2000);
    }

    #[test]
    fn test_answers_are_deterministic() {
        let engine = engine();
        engine.add_documents(vec![
            ("The company paid a quarterly dividend to shareholders in March.", "a"),
            ("Manufacturing facilities expanded across three new plants in Ireland.", "b"),
            ("Research and development investment rose to 15 billion dollars.", "c"),
        ]);
        let first = engine.answer_question("What about the dividend?");
        for _ in 0..5 {
            assert_eq!(engine.answer_question("What about the dividend?"), first);
        }
    }

    #[test]
    fn test_batch_ingestion_skips_failures() {
        let engine = RagEngine::new(EngineConfig::default(), Arc::new(FlakyEmbedder(HashingEmbedder::default())));
        let added = engine.add_documents(vec![
            ("Operational sales increased in the medtech segment.", "a"),
            ("FAIL this chunk cannot be embedded.", "b"),
            ("   ", "c"),
            ("Employees across the workforce grew by 4 percent.", "d"),
        ]);
        assert_eq!(added, 2);
        assert_eq!(engine.chunk_count(), 2);
    }

    #[test]
    fn test_search_failure_returns_empty() {
        let engine = RagEngine::new(EngineConfig::default(), Arc::new(FlakyEmbedder(HashingEmbedder::default())));
        engine.add_document("Patent exclusivity for the product ends in 2025.", "a");
        assert!(engine.search("FAIL query", 3).is_empty());
        assert!(matches!(engine.try_search("FAIL query", 3), Err(RagError::Embedding(_))));
    }

    #[test]
    fn test_deadline_timeouts() {
        let engine = RagEngine::new(EngineConfig::default(), Arc::new(FlakyEmbedder(HashingEmbedder::default())));
        engine.add_document("Inflation Reduction Act pricing affects medicare drugs.", "a");

        let zero = engine.try_search_with_deadline("medicare", 3, Duration::ZERO);
        assert!(matches!(zero, Err(RagError::Timeout(_))));

        let slow = engine.try_search_with_deadline("SLOW medicare", 3, Duration::from_millis(20));
        assert!(matches!(slow, Err(RagError::Timeout(_))));

        let ok = engine.try_search_with_deadline("medicare", 3, Duration::from_secs(5)).unwrap();
        assert_eq!(ok.len(), 1);

        let answer = engine.answer_question_with_deadline("SLOW medicare", Duration::from_millis(20));
        assert_eq!(answer, NO_CONTEXT_MESSAGE);
    }

    #[test]
    fn test_slow_expansion_keeps_primary_context() {
        let engine = RagEngine::new(EngineConfig::default(), Arc::new(FlakyEmbedder(HashingEmbedder::default())));
        let passage = "The litigation reserve was raised to 9 billion dollars last year.";
        engine.add_document(passage, "10k.pdf");

        let question = "How big is the litigation reserve?";
        assert_eq!(engine.answer_question(question), passage);
        assert_eq!(engine.answer_question_with_deadline(question, Duration::from_millis(100)), passage);
    }

    #[test]
    fn test_extraction_panic_becomes_failure_message() {
        let engine = engine();
        engine.add_document("Sales grew by 12% in 2023 to $5 billion, driven by strong demand.", "report.pdf");

        let answer = engine.answer_with("What are the main sales trends?", None, |_, _, _| {
            panic!("sentence splitter blew up")
        });
        assert_eq!(answer, EXTRACTION_FAILED_MESSAGE);

        let err = run_extraction(|| panic!("index out of range")).unwrap_err();
        assert!(matches!(err, RagError::Extraction(ref reason) if reason == "index out of range"));
    }

    /// Emits 384-dimensional vectors, or 512-dimensional ones for content containing "WIDE".
    struct ShiftingEmbedder {
        last_dim: Mutex<usize>,
    }

    impl Embedder for ShiftingEmbedder {
        fn embed(&self, text: &str) -> RagResult<Vec<f32>> {
            let dim = if text.contains("WIDE") { 512 } else { 384 };
            *self.last_dim.lock().unwrap() = dim;
            HashingEmbedder::new(dim).embed(text)
        }
        fn dimension(&self) -> usize {
            *self.last_dim.lock().unwrap()
        }
        fn name(&self) -> &str {
            "shifting"
        }
    }

    #[test]
    fn test_rejected_vector_leaves_corpus_and_index_aligned() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = Arc::new(ShiftingEmbedder { last_dim: Mutex::new(384) });
        let engine = RagEngine::open(dir.path(), EngineConfig::default(), embedder.clone()).unwrap();

        assert_eq!(engine.try_add_document("Dividend payments rose again.", "a").unwrap(), AddOutcome::Added { id: 0 });
        assert!(matches!(
            engine.try_add_document("WIDE vectors do not fit this index.", "b"),
            Err(RagError::Embedding(_))
        ));
        assert_eq!(engine.chunk_count(), 1);

        assert_eq!(engine.try_add_document("Patent exclusivity ends soon.", "c").unwrap(), AddOutcome::Added { id: 1 });
        assert_eq!(engine.search("patent exclusivity", 1), vec!["Patent exclusivity ends soon.".to_string()]);
        drop(engine);

        let reopened = RagEngine::open(dir.path(), EngineConfig::default(), embedder).unwrap();
        assert_eq!(reopened.chunk_count(), 2);
    }

    #[test]
    fn test_reopened_session_matches() {
        let dir = tempfile::tempdir().unwrap();
        let question = "What are the main sales trends?";
        let (stats, answer) = {
            let engine = RagEngine::open(dir.path(), EngineConfig::default(), Arc::new(HashingEmbedder::default())).unwrap();
            engine.add_document("Sales grew by 12% in 2023 to $5 billion, driven by strong demand.", "q4.pdf");
            engine.add_document("Talc litigation costs were recorded as a special charge this year.", "q4.pdf");
            (engine.get_document_stats(), engine.answer_question(question))
        };

        let engine = RagEngine::open(dir.path(), EngineConfig::default(), Arc::new(HashingEmbedder::default())).unwrap();
        assert_eq!(engine.chunk_count(), 2);
        assert_eq!(engine.get_document_stats(), stats);
        assert_eq!(engine.answer_question(question), answer);
    }

    #[test]
    fn test_reopen_with_other_embedder_recomputes() {
        let dir = tempfile::tempdir().unwrap();
        {
            let engine = RagEngine::open(dir.path(), EngineConfig::default(), Arc::new(HashingEmbedder::new(64))).unwrap();
            engine.add_document("Dividend payments to shareholders rose again this year.", "a");
        }
        let engine = RagEngine::open(dir.path(), EngineConfig::default(), Arc::new(HashingEmbedder::new(128))).unwrap();
        assert_eq!(engine.chunk_count(), 1);
        assert_eq!(engine.search("dividend", 1).len(), 1);
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_stats_format() {
        let engine = engine();
        engine.add_document(&"a".repeat(1500), "long.txt");
        assert_eq!(engine.get_document_stats(), "Loaded 1 document chunks with 1,500 total characters");
    }
}
