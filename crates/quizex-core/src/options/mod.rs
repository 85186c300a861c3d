pub mod builtin;
pub mod schema;

use crate::error::QuizError;
use schema::ExtractOptions;
use std::path::Path;

/// Load extraction options from a JSON file.
pub fn load_options(path: &Path) -> Result<ExtractOptions, QuizError> {
    let content = std::fs::read_to_string(path).map_err(|e| QuizError::OptionsLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let options: ExtractOptions =
        serde_json::from_str(&content).map_err(|e| QuizError::OptionsLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_options(&options)?;
    Ok(options)
}

/// Parse extraction options from a JSON string (no file path context).
pub fn parse_options_str(json: &str) -> Result<ExtractOptions, QuizError> {
    let options: ExtractOptions = serde_json::from_str(json)?;
    validate_options(&options)?;
    Ok(options)
}

/// Validate that options are usable.
pub fn validate_options(options: &ExtractOptions) -> Result<(), QuizError> {
    let keyword = options.question_keyword.trim();
    if keyword.is_empty() {
        return Err(QuizError::OptionsInvalid(
            "question_keyword must not be empty".into(),
        ));
    }
    if keyword.chars().any(|c| c.is_ascii_digit()) {
        return Err(QuizError::OptionsInvalid(format!(
            "question_keyword '{keyword}' must not contain digits"
        )));
    }

    if !(options.line_threshold.is_finite() && options.line_threshold > 0.0) {
        return Err(QuizError::OptionsInvalid(format!(
            "line_threshold must be a positive number, got {}",
            options.line_threshold
        )));
    }

    if !(options.min_drawing_size.is_finite() && options.min_drawing_size >= 0.0) {
        return Err(QuizError::OptionsInvalid(format!(
            "min_drawing_size must not be negative, got {}",
            options.min_drawing_size
        )));
    }

    if !(36..=600).contains(&options.snapshot_dpi) {
        return Err(QuizError::OptionsInvalid(format!(
            "snapshot_dpi must be between 36 and 600, got {}",
            options.snapshot_dpi
        )));
    }

    if options.images_label.trim().is_empty() {
        return Err(QuizError::OptionsInvalid(
            "images_label must not be empty".into(),
        ));
    }

    Ok(())
}
