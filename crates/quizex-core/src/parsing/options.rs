use std::ops::Range;

use crate::parsing::markers::{option_markers, OptionMarker};

/// A line of text split at its option markers.
///
/// `stem` is everything before the first marker; each option spans from its
/// marker up to the next marker (or the end). Ranges are byte offsets into
/// the text that was split and option ranges still include their marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSplit {
    pub stem: Range<usize>,
    pub options: Vec<Range<usize>>,
    pub markers: Vec<OptionMarker>,
}

impl OptionSplit {
    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }

    /// Whether the stem holds nothing but whitespace, i.e. the text opens
    /// with an option marker.
    pub fn starts_with_option(&self, text: &str) -> bool {
        self.has_options() && text[self.stem.clone()].trim().is_empty()
    }

    /// Trimmed stem and option fragments of `text`.
    pub fn fragments<'a>(&self, text: &'a str) -> (&'a str, Vec<&'a str>) {
        let stem = text[self.stem.clone()].trim();
        let options = self
            .options
            .iter()
            .map(|r| text[r.clone()].trim())
            .collect();
        (stem, options)
    }
}

/// Split `text` into a stem and one fragment per option marker.
pub fn split_options(text: &str) -> OptionSplit {
    split_options_from(text, 0)
}

/// Like [`split_options`], but markers are only searched from `offset` on,
/// so a question header in front of it is never mistaken for a marker.
pub fn split_options_from(text: &str, offset: usize) -> OptionSplit {
    let markers: Vec<OptionMarker> = option_markers(&text[offset..])
        .into_iter()
        .map(|m| OptionMarker {
            start: m.start + offset,
            end: m.end + offset,
            letter: m.letter,
        })
        .collect();

    let stem_end = markers.first().map_or(text.len(), |m| m.start);
    let options = markers
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let end = markers.get(i + 1).map_or(text.len(), |next| next.start);
            m.start..end
        })
        .collect();

    OptionSplit {
        stem: 0..stem_end,
        options,
        markers,
    }
}

/// Remove the leading option marker(s) from an option's content.
///
/// Inline tags in front of or between markers (`<img .../> A. x`) are kept;
/// only the markers and the whitespace after them go. Tags and markers are
/// consumed alternately until neither leads, so stripping twice equals
/// stripping once.
pub fn strip_option_marker(option: &str) -> String {
    let mut tags: Vec<&str> = Vec::new();
    let mut rest = option.trim();

    loop {
        rest = rest.trim_start();
        if let Some(len) = leading_tag_len(rest) {
            tags.push(&rest[..len]);
            rest = &rest[len..];
            continue;
        }
        match option_markers(rest).first() {
            Some(m) if m.start == 0 => rest = &rest[m.end..],
            _ => break,
        }
    }

    let rest = rest.trim();
    match (tags.is_empty(), rest.is_empty()) {
        (true, _) => rest.to_string(),
        (false, true) => tags.join(" "),
        (false, false) => format!("{} {}", tags.join(" "), rest),
    }
}

/// Byte length of the `<...>` tag opening `s`, if any.
fn leading_tag_len(s: &str) -> Option<usize> {
    if !s.starts_with('<') {
        return None;
    }
    s.find('>').map(|close| close + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_question_line() {
        let text = "Câu 1: What is X? A. foo B. bar C. baz";
        let split = split_options(text);
        let (stem, options) = split.fragments(text);
        assert_eq!(stem, "Câu 1: What is X?");
        let cleaned: Vec<String> = options.iter().map(|o| strip_option_marker(o)).collect();
        assert_eq!(cleaned, vec!["foo", "bar", "baz"]);
    }

    #[test]
    fn test_split_without_markers() {
        let text = "Just a stem line";
        let split = split_options(text);
        assert!(!split.has_options());
        assert_eq!(split.fragments(text).0, text);
    }

    #[test]
    fn test_adjacent_markers_keep_empty_option() {
        let text = "A. B. foo";
        let split = split_options(text);
        assert!(split.starts_with_option(text));
        let (_, options) = split.fragments(text);
        assert_eq!(options, vec!["A.", "B. foo"]);
        assert_eq!(strip_option_marker(options[0]), "");
    }

    #[test]
    fn test_split_from_skips_header() {
        let text = "Câu 2. D: x";
        let split = split_options_from(text, "Câu 2.".len());
        assert_eq!(split.markers.len(), 1);
        assert_eq!(split.markers[0].letter, 'D');
    }

    #[test]
    fn test_strip_keeps_leading_tags() {
        let option = r#"<img src="data:image/png;base64,AAA" /> B. bar"#;
        assert_eq!(
            strip_option_marker(option),
            r#"<img src="data:image/png;base64,AAA" /> bar"#
        );
    }

    #[test]
    fn test_strip_is_idempotent() {
        for option in [
            "A. foo",
            "a: B. foo",
            "<b>C.</b> x",
            "plain",
            "D.",
            "Apple",
            r#"A. <img src="x" /> B. y"#,
            "<i>A.</i> <b>B.</b>",
        ] {
            let once = strip_option_marker(option);
            assert_eq!(strip_option_marker(&once), once, "input {option:?}");
        }
    }

    #[test]
    fn test_strip_markers_behind_tags() {
        assert_eq!(
            strip_option_marker(r#"A. <img src="x" /> B. y"#),
            r#"<img src="x" /> y"#
        );
        assert_eq!(strip_option_marker("<b>C.</b> x"), "<b> </b> x");
    }

    #[test]
    fn test_strip_leaves_words_alone() {
        assert_eq!(strip_option_marker("Apple pie"), "Apple pie");
        assert_eq!(strip_option_marker("  B:   4 "), "4");
    }
}
