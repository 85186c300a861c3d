//! Line classifier for quiz layouts.
//!
//! [`step`] is a pure transition over one line; [`RecordAssembler`] applies
//! the resulting effects to the records under construction.

use std::ops::Range;

use crate::model::QuizRecord;
use crate::parsing::lines::SourceLine;
use crate::parsing::markers::{starts_with_option_marker, QuestionGrammar};
use crate::parsing::options::{split_options, split_options_from};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineState {
    /// No open record.
    #[default]
    AwaitingQuestion,
    /// Open record, text goes to the question stem.
    InStem,
    /// Open record, text goes to the last option.
    InOptions,
}

/// How much structure a single line may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitMode {
    /// A line may hold a stem fragment and several options (PDF lines).
    Inline,
    /// A line is one unit: a question start, one option or a continuation
    /// (DOCX paragraphs).
    WholeLine,
}

/// Where continuation text is appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Stem,
    LastOption,
}

/// What a line does to the record sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Not attributable to any record.
    Discard,
    /// Seal the open record (if any) and start a new one.
    Open {
        number: u32,
        stem: String,
        options: Vec<String>,
    },
    /// Append `lead` to its target, then push each option.
    AddOptions {
        lead: Option<(Target, String)>,
        options: Vec<String>,
    },
    /// Append text to the current target.
    Append { target: Target, text: String },
}

/// Classify one line given the current state.
pub fn step(
    state: LineState,
    line: &SourceLine,
    grammar: &QuestionGrammar,
    mode: SplitMode,
) -> (LineState, Effect) {
    if line.is_blank() {
        return (state, Effect::Discard);
    }
    let plain = line.plain();

    if let Some(start) = grammar.question_start(plain) {
        let (stem, options) = match mode {
            SplitMode::Inline => {
                line.project(&split_options_from(plain, start.header_end), false)
            }
            SplitMode::WholeLine => (line.markup().trim().to_string(), Vec::new()),
        };
        let next = if options.is_empty() {
            LineState::InStem
        } else {
            LineState::InOptions
        };
        return (
            next,
            Effect::Open {
                number: start.number,
                stem,
                options,
            },
        );
    }

    let target = match state {
        LineState::AwaitingQuestion => return (state, Effect::Discard),
        LineState::InStem => Target::Stem,
        LineState::InOptions => Target::LastOption,
    };

    match mode {
        SplitMode::Inline => {
            let split = split_options(plain);
            if split.has_options() {
                let leads_with_option = split.starts_with_option(plain);
                let (lead, options) = line.project(&split, leads_with_option);
                let lead = (!lead.is_empty()).then_some((target, lead));
                return (LineState::InOptions, Effect::AddOptions { lead, options });
            }
        }
        SplitMode::WholeLine => {
            if starts_with_option_marker(plain) {
                return (
                    LineState::InOptions,
                    Effect::AddOptions {
                        lead: None,
                        options: vec![line.markup().trim().to_string()],
                    },
                );
            }
        }
    }

    (
        state,
        Effect::Append {
            target,
            text: line.markup().trim().to_string(),
        },
    )
}

/// A sealed record and the source lines attributed to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledRecord {
    pub record: QuizRecord,
    /// Indices of the lines from the question start up to (excluding) the
    /// next question start or the end of input.
    pub lines: Range<usize>,
}

/// Feeds lines through [`step`] and builds the record sequence.
pub struct RecordAssembler<'g> {
    grammar: &'g QuestionGrammar,
    mode: SplitMode,
    state: LineState,
    line_index: usize,
    open: Option<AssembledRecord>,
    sealed: Vec<AssembledRecord>,
    /// Indices of lines that belonged to no record.
    unattributed: Vec<usize>,
}

impl<'g> RecordAssembler<'g> {
    pub fn new(grammar: &'g QuestionGrammar, mode: SplitMode) -> Self {
        RecordAssembler {
            grammar,
            mode,
            state: LineState::AwaitingQuestion,
            line_index: 0,
            open: None,
            sealed: Vec::new(),
            unattributed: Vec::new(),
        }
    }

    pub fn state(&self) -> LineState {
        self.state
    }

    pub fn feed(&mut self, line: &SourceLine) {
        let (next, effect) = step(self.state, line, self.grammar, self.mode);
        self.apply(effect);
        self.state = next;
        self.line_index += 1;
    }

    fn apply(&mut self, effect: Effect) {
        let index = self.line_index;
        match effect {
            Effect::Discard => {
                if self.open.is_none() {
                    self.unattributed.push(index);
                }
            }
            Effect::Open {
                number,
                stem,
                options,
            } => {
                self.seal(index);
                let mut record = QuizRecord::new(number, stem);
                record.options = options;
                tracing::debug!(number, "question found");
                self.open = Some(AssembledRecord {
                    record,
                    lines: index..index + 1,
                });
            }
            Effect::AddOptions { lead, options } => {
                if let Some(open) = self.open.as_mut() {
                    if let Some((target, text)) = lead {
                        append_to(&mut open.record, target, &text);
                    }
                    open.record.options.extend(options);
                }
            }
            Effect::Append { target, text } => {
                if let Some(open) = self.open.as_mut() {
                    append_to(&mut open.record, target, &text);
                }
            }
        }
    }

    fn seal(&mut self, end: usize) {
        if let Some(mut open) = self.open.take() {
            open.lines.end = end;
            self.sealed.push(open);
        }
    }

    /// Seal the open record and return everything built so far, plus the
    /// indices of lines no record claimed.
    pub fn finish(mut self) -> (Vec<AssembledRecord>, Vec<usize>) {
        let end = self.line_index;
        self.seal(end);
        (self.sealed, self.unattributed)
    }
}

fn append_to(record: &mut QuizRecord, target: Target, text: &str) {
    let dst = match (target, record.options.last_mut()) {
        (Target::LastOption, Some(last)) => last,
        _ => &mut record.question_text,
    };
    if !dst.is_empty() {
        dst.push(' ');
    }
    dst.push_str(text);
}
