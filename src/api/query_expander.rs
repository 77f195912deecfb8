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
//! Keyword-driven query expansion for weak retrieval.

/// One keyword -> extra search terms mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionRule {
    /// Lowercase keyword matched as a substring of the lowercased question
    pub keyword: String,
    /// Space-separated terms appended to the question
    pub terms: String,
}

impl ExpansionRule {
    pub fn new(keyword: &str, terms: &str) -> Self {
        Self {
            keyword: keyword.to_lowercase(),
            terms: terms.to_string(),
        }
    }
}

/// Business-report expansion table in priority order.
pub fn default_expansion_rules() -> Vec<ExpansionRule> {
    [
        ("litigation", "talc opioids lawsuits legal proceedings baby powder"),
        ("sales", "revenue growth operational sales billion dollars 2023"),
        ("risk", "risk factors legal proceedings competition"),
        ("r&d", "research development innovation pipeline investment"),
        ("segment", "innovative medicine medtech business segments"),
        ("growth", "operational sales revenue increase percentage"),
        ("income", "earnings profit revenue financial"),
        ("dividend", "dividend shareholders payment"),
        ("patent", "patent intellectual property exclusivity"),
        ("inflation", "inflation reduction act ira medicare drug price"),
        ("medicare", "medicare price negotiation inflation reduction act"),
        ("stelara", "stelara biosimilar patent exclusivity"),
        ("employees", "employees workforce human capital"),
        ("manufacturing", "manufacturing facilities plants operations"),
    ]
    .iter()
    .map(|(keyword, terms)| ExpansionRule::new(keyword, terms))
    .collect()
}

/// Whether the primary retrieval is too thin to answer from.
///
/// Length is measured on the passages joined by single spaces.
pub fn needs_expansion(primary: &[String], weak_retrieval_chars: usize) -> bool {
    if primary.is_empty() {
        return true;
    }
    let joined_chars: usize = primary.iter().map(|p| p.chars().count()).sum::<usize>()
        + primary.len().saturating_sub(1);
    joined_chars < weak_retrieval_chars
}

/// Append the terms of the first matching rule to `question`.
///
/// Only one rule ever fires, even when several keywords are present.
/// Returns the question unchanged when nothing matches.
pub fn expand_query(question: &str, rules: &[ExpansionRule]) -> String {
    let lowered = question.to_lowercase();
    match rules.iter().find(|rule| lowered.contains(rule.keyword.as_str())) {
        Some(rule) => format!("{} {}", question, rule.terms),
        None => question.to_string(),
    }
}
