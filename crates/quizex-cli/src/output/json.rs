use quizex_core::error::QuizError;
use quizex_core::ExtractionContext;

pub fn print(context: &ExtractionContext) -> Result<(), QuizError> {
    let json = serde_json::to_string_pretty(context)?;
    println!("{json}");
    Ok(())
}
