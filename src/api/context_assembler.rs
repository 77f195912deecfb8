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
//! Merge retrieved passages into one bounded context string.
//!
//! Pipeline: primary results, then expansion results -> exact-duplicate
//! removal (first occurrence kept) -> longest passages first -> space join ->
//! hard character cut.

use std::collections::HashSet;

/// Remove exact duplicates, keeping the first occurrence of each passage.
pub fn dedup_passages(passages: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    passages
        .into_iter()
        .filter(|p| seen.insert(p.clone()))
        .collect()
}

/// Stable sort by descending character count.
pub fn rank_by_length(mut passages: Vec<String>) -> Vec<String> {
    passages.sort_by_key(|p| std::cmp::Reverse(p.chars().count()));
    passages
}

/// Cut `text` to at most `max_chars` characters.
///
/// This may end mid-sentence or mid-word.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Build the extraction context from primary and (optional) expansion results.
pub fn assemble_context(primary: Vec<String>, secondary: Vec<String>, max_chars: usize) -> String {
    let mut passages = primary;
    passages.extend(secondary);

    let ranked = rank_by_length(dedup_passages(passages));
    if ranked.is_empty() {
        return String::new();
    }

    let joined = ranked.join(" ");
    truncate_chars(&joined, max_chars).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let out = dedup_passages(s(&["b", "a", "b", "c", "a"]));
        assert_eq!(out, s(&["b", "a", "c"]));
    }

    #[test]
    fn test_rank_is_stable_for_equal_lengths() {
        let out = rank_by_length(s(&["aa", "bbbb", "cc", "d"]));
        assert_eq!(out, s(&["bbbb", "aa", "cc", "d"]));
    }

    #[test]
    fn test_assemble_merges_and_dedups_across_searches() {
        let primary = s(&["short one", "a much longer passage here"]);
        let secondary = s(&["short one", "mid passage"]);
        let ctx = assemble_context(primary, secondary, 2000);
        assert_eq!(ctx, "a much longer passage here mid passage short one");
        assert_eq!(ctx.matches("short one").count(), 1);
    }

    #[test]
    fn test_assemble_truncates() {
        let primary = vec!["x".repeat(1500), "y".repeat(1500)];
        let ctx = assemble_context(primary, Vec::new(), 2000);
        assert_eq!(ctx.chars().count(), 2000);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let text = "é".repeat(10);
        assert_eq!(truncate_chars(&text, 3), "ééé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn test_assemble_empty() {
        assert_eq!(assemble_context(Vec::new(), Vec::new(), 2000), "");
    }
}
