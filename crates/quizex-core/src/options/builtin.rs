use crate::error::QuizError;
use crate::options::schema::ExtractOptions;
use crate::options::validate_options;

const VI_JSON: &str = include_str!("../../../../profiles/vi.json");
const EN_JSON: &str = include_str!("../../../../profiles/en.json");

/// Available built-in extraction profiles.
pub const PROFILES: &[&str] = &["vi", "en"];

/// Load a built-in profile by name.
pub fn load_profile(name: &str) -> Result<ExtractOptions, QuizError> {
    let json = match name {
        "vi" => VI_JSON,
        "en" => EN_JSON,
        _ => {
            return Err(QuizError::OptionsInvalid(format!(
                "unknown profile '{}'. Available: {}",
                name,
                PROFILES.join(", ")
            )))
        }
    };
    let options: ExtractOptions = serde_json::from_str(json)?;
    validate_options(&options)?;
    Ok(options)
}
