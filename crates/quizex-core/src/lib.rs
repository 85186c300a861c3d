pub mod error;
pub mod extraction;
pub mod model;
pub mod options;
pub mod parsing;
pub mod shuffle;

use rand::Rng;
use serde::{Deserialize, Serialize};

use error::QuizError;
use extraction::PdfExtractor;
use model::{DocumentFormat, QuizRecord};
use options::schema::ExtractOptions;

/// Main API entry point: extract quiz records from a PDF or DOCX document.
///
/// PDF input goes through `extractor`; DOCX input is read directly. On
/// failure nothing partial is returned.
pub fn extract(
    bytes: &[u8],
    format: DocumentFormat,
    extractor: &dyn PdfExtractor,
    options: &ExtractOptions,
) -> Result<Vec<QuizRecord>, QuizError> {
    let records = match format {
        DocumentFormat::Pdf => parsing::extract_pdf(bytes, extractor, options)?,
        DocumentFormat::Docx => parsing::extract_docx(bytes, options)?,
    };
    tracing::info!(
        %format,
        records = records.len(),
        questions = total_questions(&records),
        "extraction finished"
    );
    Ok(records)
}

/// Like [`extract`], but any failure is logged and reported as an empty
/// list.
pub fn extract_or_empty(
    bytes: &[u8],
    format: DocumentFormat,
    extractor: &dyn PdfExtractor,
    options: &ExtractOptions,
) -> Vec<QuizRecord> {
    extract(bytes, format, extractor, options).unwrap_or_else(|e| {
        tracing::error!(%format, error = %e, "extraction failed");
        Vec::new()
    })
}

/// Number of genuine questions (records with an integer question number).
pub fn total_questions(records: &[QuizRecord]) -> usize {
    records.iter().filter(|r| r.is_question()).count()
}

/// The result of one extraction request, carried between steps (extract,
/// shuffle, export) instead of any shared session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionContext {
    pub filename: String,
    pub format: DocumentFormat,
    #[serde(rename = "quiz_data")]
    pub records: Vec<QuizRecord>,
}

impl ExtractionContext {
    /// Extract `bytes` and wrap the records with their source.
    pub fn extract(
        filename: impl Into<String>,
        bytes: &[u8],
        format: DocumentFormat,
        extractor: &dyn PdfExtractor,
        options: &ExtractOptions,
    ) -> Result<Self, QuizError> {
        Ok(ExtractionContext {
            filename: filename.into(),
            format,
            records: extract(bytes, format, extractor, options)?,
        })
    }

    pub fn total_questions(&self) -> usize {
        total_questions(&self.records)
    }

    /// Shuffle question order and/or the options of each question.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, questions: bool, answers: bool, rng: &mut R) {
        if questions {
            shuffle::shuffle_questions(&mut self.records, rng);
        }
        if answers {
            shuffle::shuffle_answers(&mut self.records, rng);
        }
    }
}
