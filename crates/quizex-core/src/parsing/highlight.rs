//! Recover the correct answer from visually marked runs (highlight or
//! font color) in DOCX paragraphs.

use crate::extraction::docx::Run;
use crate::model::letter_index;
use crate::parsing::markers::option_markers;
use crate::parsing::options::strip_option_marker;

/// Interpret the text of a marked run against a record's options.
///
/// Tried in order: a lone letter A-D ("B", "b."), a marker-led run
/// ("B. 4"), then the run's content equal to, or contained in, an option.
/// `options` are compared after marker stripping.
pub fn answer_from_run(text: &str, options: &[String]) -> Option<usize> {
    let text = text.trim();
    if text.is_empty() || options.is_empty() {
        return None;
    }

    let bare = text.trim_end_matches(['.', ':', ')']).trim();
    let mut chars = bare.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if let Some(index) = letter_index(c).filter(|&i| i < 4) {
            return (index < options.len()).then_some(index);
        }
    }

    if let Some(marker) = option_markers(text).first().filter(|m| m.start == 0) {
        if let Some(index) = letter_index(marker.letter).filter(|&i| i < options.len()) {
            return Some(index);
        }
    }

    let needle = strip_option_marker(text);
    if needle.is_empty() {
        return None;
    }
    let cleaned: Vec<String> = options.iter().map(|o| strip_option_marker(o)).collect();
    cleaned
        .iter()
        .position(|o| *o == needle)
        .or_else(|| cleaned.iter().position(|o| o.contains(needle.as_str())))
}

/// First answer found in the marked runs of `runs`, left to right.
///
/// With `span`, only runs overlapping that byte range of the paragraph
/// text are considered.
pub fn answer_from_runs(
    runs: &[Run],
    span: Option<&std::ops::Range<usize>>,
    options: &[String],
) -> Option<usize> {
    let mut offset = 0;
    for run in runs {
        let start = offset;
        offset += run.text.len();
        if let Some(span) = span {
            if offset <= span.start || start >= span.end {
                continue;
            }
        }
        if !run.is_marked() {
            continue;
        }
        if let Some(index) = answer_from_run(&run.text, options) {
            return Some(index);
        }
    }
    None
}
