use crate::model::QuizRecord;
use crate::parsing::options::strip_option_marker;

/// Final cleanup shared by both extractors.
///
/// - option text loses its leading "A." / "B:" marker;
/// - a record with options always ends up with an answer: the detected
///   one if it points at an option, else the first option;
/// - `correct_answer_char` is re-derived from `correct_answer_index`,
///   which is the only source of truth.
pub fn normalize(records: &mut [QuizRecord]) {
    for record in records.iter_mut() {
        normalize_record(record);
    }
}

pub fn normalize_record(record: &mut QuizRecord) {
    for option in record.options.iter_mut() {
        *option = strip_option_marker(option);
    }

    match record.answer() {
        Some(index) => record.set_answer(index),
        None if !record.options.is_empty() => record.set_answer(0),
        None => record.clear_answer(),
    }
}
