use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    #[error("PDF extraction failed: {0}")]
    Extraction(String),

    #[error("{tool} not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PopplerNotFound { tool: &'static str },

    #[error("{tool} failed with exit code {code}: {stderr}")]
    PopplerFailed {
        tool: &'static str,
        code: i32,
        stderr: String,
    },

    #[error("failed to read DOCX package: {0}")]
    Docx(String),

    #[error("unsupported document format: {0}. Only .pdf and .docx are accepted.")]
    UnsupportedFormat(String),

    #[error("failed to load options from {path}: {reason}")]
    OptionsLoad { path: PathBuf, reason: String },

    #[error("invalid options: {0}")]
    OptionsInvalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<zip::result::ZipError> for QuizError {
    fn from(e: zip::result::ZipError) -> Self {
        QuizError::Docx(e.to_string())
    }
}

impl From<quick_xml::Error> for QuizError {
    fn from(e: quick_xml::Error) -> Self {
        QuizError::Docx(format!("malformed XML: {e}"))
    }
}
