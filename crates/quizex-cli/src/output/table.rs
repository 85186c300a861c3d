use quizex_core::model::{answer_letter, QuizRecord};
use quizex_core::ExtractionContext;

pub fn print(context: &ExtractionContext) {
    println!(
        "=== {} ({}, {} question(s)) ===\n",
        context.filename,
        context.format,
        context.total_questions()
    );
    for record in &context.records {
        println!("{}", format_record(record));
    }
}

fn format_record(record: &QuizRecord) -> String {
    let mut out = String::new();
    if !record.is_question() {
        out.push_str(&format!(
            "  [{}] {}\n",
            record.question_number, record.question_text
        ));
        out.push_str(&format!("    {} image(s)\n", record.images.len()));
        return out;
    }

    out.push_str(&format!("  {}\n", record.question_text));
    let answer = record.answer();
    for (i, option) in record.options.iter().enumerate() {
        let letter = answer_letter(i).unwrap_or('?');
        let marker = if answer == Some(i) { "*" } else { " " };
        out.push_str(&format!("   {marker} {letter}. {option}\n"));
    }
    if !record.images.is_empty() {
        out.push_str(&format!("    {} image(s)\n", record.images.len()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_correct_option() {
        let mut record = QuizRecord::new(1, "Câu 1: 2+2=?");
        record.options = vec!["3".into(), "4".into()];
        record.set_answer(1);
        let text = format_record(&record);
        assert!(text.contains("     A. 3"));
        assert!(text.contains("   * B. 4"));
    }

    #[test]
    fn placeholder_shows_image_count() {
        let record = QuizRecord::placeholder("Hình ảnh", "Ảnh", vec!["data:a".into()]);
        let text = format_record(&record);
        assert!(text.contains("[Hình ảnh] Ảnh"));
        assert!(text.contains("1 image(s)"));
    }
}
