//! Randomized reordering of extracted quizzes.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::model::{QuestionNumber, QuizRecord};
use crate::parsing::options::strip_option_marker;

/// Shuffle the genuine questions and renumber them 1..n in their new order.
///
/// Placeholder records keep their relative order and follow the questions.
pub fn shuffle_questions<R: Rng + ?Sized>(records: &mut Vec<QuizRecord>, rng: &mut R) {
    let (mut questions, placeholders): (Vec<_>, Vec<_>) =
        records.drain(..).partition(QuizRecord::is_question);
    questions.shuffle(rng);
    for (i, record) in questions.iter_mut().enumerate() {
        record.question_number = QuestionNumber::Number(i as u32 + 1);
    }
    tracing::debug!(
        questions = questions.len(),
        placeholders = placeholders.len(),
        "questions shuffled"
    );
    records.extend(questions);
    records.extend(placeholders);
}

/// Shuffle the options of every genuine question.
pub fn shuffle_answers<R: Rng + ?Sized>(records: &mut [QuizRecord], rng: &mut R) {
    for record in records.iter_mut().filter(|r| r.is_question()) {
        shuffle_answers_in_question(record, rng);
    }
}

/// Permute one question's options, keeping the answer on the same option.
///
/// A record without a usable answer gets the first option as its answer
/// before shuffling.
pub fn shuffle_answers_in_question<R: Rng + ?Sized>(record: &mut QuizRecord, rng: &mut R) {
    if record.options.is_empty() {
        record.clear_answer();
        return;
    }
    let correct = record.answer().unwrap_or(0);

    let mut order: Vec<usize> = (0..record.options.len()).collect();
    order.shuffle(rng);

    let options = std::mem::take(&mut record.options);
    record.options = order.iter().map(|&i| strip_option_marker(&options[i])).collect();
    match order.iter().position(|&i| i == correct) {
        Some(index) => record.set_answer(index),
        None => record.clear_answer(),
    }
}
