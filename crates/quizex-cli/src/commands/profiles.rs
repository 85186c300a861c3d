use quizex_core::error::QuizError;
use quizex_core::options::builtin;

pub fn list() -> Result<(), QuizError> {
    println!("Available extraction profiles:\n");
    for name in builtin::PROFILES {
        let options = builtin::load_profile(name)?;
        println!(
            "  {:<6} keyword \"{}\", line threshold {}",
            name, options.question_keyword, options.line_threshold
        );
        if let Some(ref desc) = options.description {
            println!("         {}", desc);
        }
        println!();
    }
    Ok(())
}

pub fn show(name: &str) -> Result<(), QuizError> {
    let options = builtin::load_profile(name)?;
    println!("{}", serde_json::to_string_pretty(&options)?);
    Ok(())
}
