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
//! Deterministic sentence extraction: pick the context sentence that best
//! matches the question instead of generating text.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static SENTENCE_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").unwrap());

const FINANCIAL_TOPIC_TERMS: &[&str] = &["sales", "revenue", "growth", "financial"];
const FINANCIAL_SIGNAL_TERMS: &[&str] = &["billion", "million", "dollar", "percent", "growth", "sales"];
const LEGAL_TOPIC_TERMS: &[&str] = &["litigation", "lawsuit", "legal", "talc", "opioid"];
const LEGAL_SIGNAL_TERMS: &[&str] = &["lawsuit", "litigation", "talc", "opioid", "legal"];

const QUESTION_WORD_POINTS: u32 = 3;
const DOMAIN_SIGNAL_POINTS: u32 = 2;
const MIN_QUESTION_WORD_CHARS: usize = 4;

pub const NO_CONTEXT_MESSAGE: &str =
    "I couldn't find relevant information about this topic in your documents.";
pub const NONE_FOUND_MESSAGE: &str = "Relevant information found but cannot extract specific answer.";

/// Sentence limits applied during extraction.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionLimits {
    pub min_context_chars: usize,
    pub min_sentence_chars: usize,
    pub fallback_sentence_chars: usize,
}

impl Default for ExtractionLimits {
    fn default() -> Self {
        Self {
            min_context_chars: 50,
            min_sentence_chars: 20,
            fallback_sentence_chars: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredSentence {
    pub sentence: String,
    pub score: u32,
}

/// Outcome of one extraction run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Context empty or too short to extract from.
    NoContext,
    /// Best (or fallback) sentence, terminated with a period.
    Answer(String),
    /// Context had no usable sentence.
    NoneFound,
}

impl Extraction {
    /// Text handed back to the user for this outcome.
    pub fn message(&self) -> &str {
        match self {
            Extraction::NoContext => NO_CONTEXT_MESSAGE,
            Extraction::Answer(text) => text,
            Extraction::NoneFound => NONE_FOUND_MESSAGE,
        }
    }
}

fn contains_any(haystack: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| haystack.contains(term))
}

/// Score one sentence against the question.
///
/// - +3 per distinct question word longer than 3 chars found in the sentence
/// - +2 for a financial question answered by a sentence with financial signals
/// - +2 for a legal question answered by a sentence with legal signals
pub fn score_sentence(question: &str, sentence: &str) -> u32 {
    let question_lower = question.to_lowercase();
    let sentence_lower = sentence.to_lowercase();

    let question_words: HashSet<&str> = question_lower.split_whitespace().collect();
    let mut score = question_words
        .iter()
        .filter(|word| word.chars().count() >= MIN_QUESTION_WORD_CHARS)
        .filter(|word| sentence_lower.contains(*word))
        .count() as u32
        * QUESTION_WORD_POINTS;

    if contains_any(&question_lower, FINANCIAL_TOPIC_TERMS)
        && contains_any(&sentence_lower, FINANCIAL_SIGNAL_TERMS)
    {
        score += DOMAIN_SIGNAL_POINTS;
    }

    if contains_any(&question_lower, LEGAL_TOPIC_TERMS)
        && contains_any(&sentence_lower, LEGAL_SIGNAL_TERMS)
    {
        score += DOMAIN_SIGNAL_POINTS;
    }

    score
}

/// Split on runs of terminal punctuation and keep trimmed candidates of at
/// least `min_chars` characters, in context order.
pub fn split_candidates(context: &str, min_chars: usize) -> Vec<String> {
    SENTENCE_BOUNDARY
        .split(context)
        .map(str::trim)
        .filter(|s| s.chars().count() >= min_chars)
        .map(str::to_string)
        .collect()
}

/// Score every candidate; zero-score sentences are dropped.
pub fn rank_sentences(question: &str, candidates: &[String]) -> Vec<ScoredSentence> {
    let mut scored: Vec<ScoredSentence> = candidates
        .iter()
        .map(|sentence| ScoredSentence {
            sentence: sentence.clone(),
            score: score_sentence(question, sentence),
        })
        .filter(|s| s.score > 0)
        .collect();
    // Stable: equal scores keep context order
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}

fn terminate(sentence: &str) -> String {
    if sentence.ends_with('.') {
        sentence.to_string()
    } else {
        format!("{}.", sentence)
    }
}

/// Pick the answer sentence from `context`.
pub fn extract_answer(context: &str, question: &str, limits: ExtractionLimits) -> Extraction {
    if context.trim().chars().count() < limits.min_context_chars {
        return Extraction::NoContext;
    }

    let candidates = split_candidates(context, limits.min_sentence_chars);

    if let Some(best) = rank_sentences(question, &candidates).into_iter().next() {
        return Extraction::Answer(terminate(&best.sentence));
    }

    candidates
        .iter()
        .find(|s| s.chars().count() > limits.fallback_sentence_chars)
        .map(|s| Extraction::Answer(terminate(s)))
        .unwrap_or(Extraction::NoneFound)
}
