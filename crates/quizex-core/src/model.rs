use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::QuizError;

/// Value of `correct_answer_index` while no answer is known.
pub const UNDETERMINED: i32 = -1;

/// Number of a record: a genuine question number, or a label for records
/// that carry metadata only (e.g. the images-only placeholder).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionNumber {
    Number(u32),
    Label(String),
}

impl QuestionNumber {
    pub fn as_number(&self) -> Option<u32> {
        match self {
            QuestionNumber::Number(n) => Some(*n),
            QuestionNumber::Label(_) => None,
        }
    }
}

impl fmt::Display for QuestionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionNumber::Number(n) => write!(f, "{n}"),
            QuestionNumber::Label(s) => write!(f, "{s}"),
        }
    }
}

/// One detected question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizRecord {
    pub question_number: QuestionNumber,
    pub question_text: String,
    #[serde(default)]
    pub options: Vec<String>,
    /// Canonical answer: -1 while undetermined, else an index into `options`.
    #[serde(default = "undetermined")]
    pub correct_answer_index: i32,
    /// Always derived from `correct_answer_index`; empty while undetermined.
    #[serde(default)]
    pub correct_answer_char: String,
    #[serde(default)]
    pub images: Vec<String>,
}

fn undetermined() -> i32 {
    UNDETERMINED
}

impl QuizRecord {
    pub fn new(number: u32, question_text: impl Into<String>) -> Self {
        QuizRecord {
            question_number: QuestionNumber::Number(number),
            question_text: question_text.into(),
            options: Vec::new(),
            correct_answer_index: UNDETERMINED,
            correct_answer_char: String::new(),
            images: Vec::new(),
        }
    }

    /// A metadata-only record holding images that belong to no question.
    pub fn placeholder(label: &str, heading: &str, images: Vec<String>) -> Self {
        QuizRecord {
            question_number: QuestionNumber::Label(label.to_string()),
            question_text: heading.to_string(),
            options: Vec::new(),
            correct_answer_index: UNDETERMINED,
            correct_answer_char: String::new(),
            images,
        }
    }

    pub fn is_question(&self) -> bool {
        matches!(self.question_number, QuestionNumber::Number(_))
    }

    /// The correct answer, if it points at an existing option.
    pub fn answer(&self) -> Option<usize> {
        usize::try_from(self.correct_answer_index)
            .ok()
            .filter(|&i| i < self.options.len())
    }

    /// Set the answer by index and derive the letter from it.
    pub fn set_answer(&mut self, index: usize) {
        match (i32::try_from(index), answer_letter(index)) {
            (Ok(i), Some(letter)) => {
                self.correct_answer_index = i;
                self.correct_answer_char = letter.to_string();
            }
            _ => self.clear_answer(),
        }
    }

    pub fn clear_answer(&mut self) {
        self.correct_answer_index = UNDETERMINED;
        self.correct_answer_char.clear();
    }
}

/// Letter for an option index: 0 -> 'A', 1 -> 'B', ...
pub fn answer_letter(index: usize) -> Option<char> {
    u8::try_from(index)
        .ok()
        .filter(|&i| i < 26)
        .map(|i| char::from(b'A' + i))
}

/// Option index for a letter, case-insensitive: 'A' -> 0.
pub fn letter_index(letter: char) -> Option<usize> {
    let upper = letter.to_ascii_uppercase();
    upper
        .is_ascii_uppercase()
        .then(|| (upper as u8 - b'A') as usize)
}

/// Input document formats the extractors understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Format from a file name's extension.
    pub fn from_path(path: &Path) -> Result<DocumentFormat, QuizError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| QuizError::UnsupportedFormat(path.display().to_string()))?;
        ext.parse()
    }

    /// Format from the leading bytes of the document.
    pub fn sniff(bytes: &[u8]) -> Option<DocumentFormat> {
        if bytes.starts_with(b"%PDF-") {
            Some(DocumentFormat::Pdf)
        } else if bytes.starts_with(b"PK\x03\x04") {
            Some(DocumentFormat::Docx)
        } else {
            None
        }
    }
}

impl FromStr for DocumentFormat {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_lowercase().as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" => Ok(DocumentFormat::Docx),
            other => Err(QuizError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Pdf => write!(f, "pdf"),
            DocumentFormat::Docx => write!(f, "docx"),
        }
    }
}
