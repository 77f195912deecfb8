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
//! Structural sanity checks on extracted answers.
//!
//! The guard only accepts or rejects; it never rewrites text.

use once_cell::sync::Lazy;
use regex::Regex;

static LETTER_DIGIT_LETTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z][0-9][A-Za-z]").unwrap());

const MIN_ANSWER_CHARS: usize = 10;
const MAX_SPECIAL_CHAR_RATIO: f64 = 0.2;
const ALLOWED_PUNCTUATION: &[char] = &['.', ',', '!', '?', ':', ';', '-', '$', '%'];
const CORRUPTION_MARKERS: &[&str] = &["++", "//", "&&", "(+", ")/", "*0", "*1", ".*"];

pub const UNCLEAR_ANSWER_MESSAGE: &str =
    "The document contains relevant information, but I cannot provide a clear answer at this time.";

#[derive(Debug, Clone, PartialEq)]
pub enum RejectReason {
    TooShort(usize),
    SpecialCharRatio(f64),
    CorruptionMarker(&'static str),
    LetterDigitLetter(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum GuardVerdict {
    Accepted,
    Rejected(RejectReason),
}

impl GuardVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, GuardVerdict::Accepted)
    }
}

fn is_special(c: char) -> bool {
    !c.is_alphanumeric() && !c.is_whitespace() && !ALLOWED_PUNCTUATION.contains(&c)
}

/// Check `text` against the corruption heuristics, in order:
/// length, special-character ratio, literal markers, letter-digit-letter.
pub fn check_answer(text: &str) -> GuardVerdict {
    let len = text.chars().count();
    if len < MIN_ANSWER_CHARS {
        return GuardVerdict::Rejected(RejectReason::TooShort(len));
    }

    let special = text.chars().filter(|c| is_special(*c)).count();
    let ratio = special as f64 / len as f64;
    if ratio > MAX_SPECIAL_CHAR_RATIO {
        return GuardVerdict::Rejected(RejectReason::SpecialCharRatio(ratio));
    }

    if let Some(marker) = CORRUPTION_MARKERS.iter().find(|m| text.contains(*m)) {
        return GuardVerdict::Rejected(RejectReason::CorruptionMarker(marker));
    }

    if let Some(m) = LETTER_DIGIT_LETTER.find(text) {
        return GuardVerdict::Rejected(RejectReason::LetterDigitLetter(m.as_str().to_string()));
    }

    GuardVerdict::Accepted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_financial_sentence() {
        let verdict = check_answer("Sales grew by 12% in 2023 to $5 billion, driven by strong demand.");
        assert_eq!(verdict, GuardVerdict::Accepted);
    }

    #[test]
    fn test_rejects_short() {
        assert_eq!(check_answer("Too short"), GuardVerdict::Rejected(RejectReason::TooShort(9)));
    }

    #[test]
    fn test_rejects_garbled_candidate() {
        // 6 of 12 chars are '#' or '*'
        let verdict = check_answer("a1b###???***");
        assert!(matches!(verdict, GuardVerdict::Rejected(RejectReason::SpecialCharRatio(_))));
    }

    #[test]
    fn test_rejects_markers() {
        let verdict = check_answer("The result was x++ for everybody involved");
        assert_eq!(verdict, GuardVerdict::Rejected(RejectReason::CorruptionMarker("++")));
        let verdict = check_answer("See https://example.com for details today");
        assert_eq!(verdict, GuardVerdict::Rejected(RejectReason::CorruptionMarker("//")));
    }

    #[test]
    fn test_rejects_letter_digit_letter() {
        let verdict = check_answer("The model code is q3x in the catalog listing");
        assert_eq!(
            verdict,
            GuardVerdict::Rejected(RejectReason::LetterDigitLetter("q3x".into()))
        );
    }

    #[test]
    fn test_allowed_punctuation_does_not_count() {
        assert!(check_answer("Margins: 25%; costs - $3, up! ok? fine.").is_accepted());
    }
}
