//! The two literal markers the quiz layout is built from: the question-start
//! marker ("Câu 12:") and the option marker ("A." / "b:").

use regex::Regex;
use std::sync::LazyLock;

use crate::error::QuizError;

static OPTION_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[A-D][.:]").expect("option marker pattern is valid"));

/// An option marker found in a piece of text. Offsets are byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionMarker {
    pub start: usize,
    pub end: usize,
    /// Upper-case letter of the marker.
    pub letter: char,
}

/// All option markers in `text`, left to right.
///
/// The letter must open a word: "B." in "Tab. B. x" counts once, the "d."
/// closing "called." does not. A bare letter without `.`/`:` never counts.
pub fn option_markers(text: &str) -> Vec<OptionMarker> {
    OPTION_MARKER
        .find_iter(text)
        .filter(|m| opens_word(text, m.start()))
        .filter_map(|m| {
            let letter = text[m.start()..].chars().next()?.to_ascii_uppercase();
            Some(OptionMarker {
                start: m.start(),
                end: m.end(),
                letter,
            })
        })
        .collect()
}

/// Whether `text` (ignoring leading whitespace) begins with an option marker.
pub fn starts_with_option_marker(text: &str) -> bool {
    let trimmed = text.trim_start();
    OPTION_MARKER
        .find(trimmed)
        .is_some_and(|m| m.start() == 0)
}

fn opens_word(text: &str, at: usize) -> bool {
    text[..at]
        .chars()
        .next_back()
        .map_or(true, |c| !c.is_alphanumeric())
}

/// A question-start marker at the beginning of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionStart {
    pub number: u32,
    /// Byte offset just past the marker and its optional punctuation.
    pub header_end: usize,
}

/// A question-start marker found anywhere in a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionMarker {
    pub start: usize,
    pub end: usize,
    pub number: u32,
}

/// Matcher for "keyword + digits + optional `.`/`:`", case-insensitive.
#[derive(Debug, Clone)]
pub struct QuestionGrammar {
    at_start: Regex,
    anywhere: Regex,
}

impl QuestionGrammar {
    pub fn new(keyword: &str) -> Result<Self, QuizError> {
        let keyword = regex::escape(keyword.trim());
        let build = |pattern: String| {
            Regex::new(&pattern).map_err(|e| {
                QuizError::OptionsInvalid(format!("unusable question keyword: {e}"))
            })
        };
        Ok(QuestionGrammar {
            at_start: build(format!(r"(?i)^{keyword}\s*(\d+)[:.]?"))?,
            anywhere: build(format!(r"(?i){keyword}\s*(\d+)[:.]?"))?,
        })
    }

    /// Match a question-start marker at the very beginning of `line`.
    pub fn question_start(&self, line: &str) -> Option<QuestionStart> {
        let caps = self.at_start.captures(line)?;
        let number = caps[1].parse().ok()?;
        Some(QuestionStart {
            number,
            header_end: caps.get(0)?.end(),
        })
    }

    /// Every question-start marker in `text`, left to right.
    pub fn find_all(&self, text: &str) -> Vec<QuestionMarker> {
        self.anywhere
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                Some(QuestionMarker {
                    start: whole.start(),
                    end: whole.end(),
                    number: caps[1].parse().ok()?,
                })
            })
            .collect()
    }

    /// Whether `text` mentions question `number` ("Câu 1" but not "Câu 12").
    pub fn mentions(&self, text: &str, number: u32) -> bool {
        self.find_all(text).iter().any(|m| m.number == number)
    }
}

impl Default for QuestionGrammar {
    fn default() -> Self {
        QuestionGrammar::new("Câu").expect("default keyword is valid")
    }
}
