use quizex_core::error::QuizError;
use quizex_core::ExtractionContext;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

use crate::output;

pub fn run(
    context_file: PathBuf,
    questions: bool,
    answers: bool,
    seed: Option<u64>,
    output_file: Option<PathBuf>,
) -> Result<(), QuizError> {
    let json_bytes = std::fs::read(&context_file)?;
    let mut context: ExtractionContext = serde_json::from_slice(&json_bytes)?;

    // Neither flag means both.
    let (questions, answers) = if questions || answers {
        (questions, answers)
    } else {
        (true, true)
    };

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    context.shuffle(questions, answers, &mut rng);
    tracing::info!(
        file = %context.filename,
        questions,
        answers,
        "context shuffled"
    );

    match output_file {
        Some(path) => {
            let json = serde_json::to_string_pretty(&context)?;
            std::fs::write(&path, json)?;
            eprintln!(
                "Shuffled {} question(s), written to {}",
                context.total_questions(),
                path.display()
            );
        }
        None => output::json::print(&context)?,
    }

    Ok(())
}
