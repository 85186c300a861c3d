use quizex_core::error::QuizError;
use quizex_core::extraction::pdftotext::PopplerExtractor;
use quizex_core::model::DocumentFormat;
use quizex_core::options::builtin;
use quizex_core::options::schema::ExtractOptions;
use quizex_core::ExtractionContext;
use std::path::{Path, PathBuf};

use crate::output;

pub fn run(
    input_file: PathBuf,
    format: Option<String>,
    profile: Option<String>,
    config: Option<PathBuf>,
    output_format: &str,
    output_file: Option<PathBuf>,
) -> Result<(), QuizError> {
    let options: ExtractOptions = match (&profile, &config) {
        (_, Some(path)) => quizex_core::options::load_options(path)?,
        (Some(name), None) => builtin::load_profile(name)?,
        (None, None) => builtin::load_profile("vi")?,
    };

    let bytes = std::fs::read(&input_file)?;
    let format = detect_format(&input_file, format.as_deref(), &bytes)?;
    tracing::debug!(file = %input_file.display(), %format, "input format resolved");
    if format == DocumentFormat::Pdf && !PopplerExtractor::is_available() {
        tracing::warn!("pdftotext not found on PATH, PDF extraction will fail");
    }

    let filename = input_file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extractor = PopplerExtractor::new();
    let context = ExtractionContext::extract(filename, &bytes, format, &extractor, &options)?;

    match output_file {
        Some(path) => {
            let json = serde_json::to_string_pretty(&context)?;
            std::fs::write(&path, json)?;
            eprintln!(
                "Extracted {} question(s), written to {}",
                context.total_questions(),
                path.display()
            );
        }
        None => match output_format {
            "json" => output::json::print(&context)?,
            _ => output::table::print(&context),
        },
    }

    Ok(())
}

/// Explicit `--format` wins, then the file extension, then the leading bytes.
fn detect_format(
    path: &Path,
    explicit: Option<&str>,
    bytes: &[u8],
) -> Result<DocumentFormat, QuizError> {
    if let Some(name) = explicit {
        return name.parse();
    }
    DocumentFormat::from_path(path).or_else(|e| DocumentFormat::sniff(bytes).ok_or(e))
}
