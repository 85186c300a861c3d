use std::ops::Range;

use crate::error::QuizError;
use crate::extraction::docx::{read_docx, DocxDocument};
use crate::model::QuizRecord;
use crate::options::schema::ExtractOptions;
use crate::parsing::highlight::answer_from_runs;
use crate::parsing::lines::SourceLine;
use crate::parsing::markers::QuestionGrammar;
use crate::parsing::normalize::normalize;
use crate::parsing::options::split_options;
use crate::parsing::state::{RecordAssembler, SplitMode};

/// A record plus where it came from in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocxRecord {
    pub record: QuizRecord,
    /// Paragraph indices attributed to the record.
    pub paragraphs: Range<usize>,
    /// Byte range of the record inside its paragraph, when several
    /// questions share one paragraph.
    pub span: Option<Range<usize>>,
}

/// Output of one structural strategy.
#[derive(Debug, Clone, Default)]
pub struct Structure {
    pub records: Vec<DocxRecord>,
    /// Paragraphs no record claimed.
    pub unattributed: Vec<usize>,
}

impl Structure {
    /// Success predicate for a strategy: at least one record has options.
    pub fn has_options(&self) -> bool {
        self.records.iter().any(|r| !r.record.options.is_empty())
    }
}

/// A way to recover question structure from paragraph texts.
pub type Strategy = fn(&[String], &QuestionGrammar) -> Structure;

/// Strategies in the order they are tried.
pub const STRATEGIES: &[(&str, Strategy)] = &[
    ("paragraph-per-line", paragraph_strategy),
    ("single-line", single_line_strategy),
];

/// Extract quiz records from .docx bytes.
pub fn extract_docx(bytes: &[u8], options: &ExtractOptions) -> Result<Vec<QuizRecord>, QuizError> {
    let document = read_docx(bytes)?;
    extract_from_document(&document, options)
}

/// Extract quiz records from an already-read document.
pub fn extract_from_document(
    document: &DocxDocument,
    options: &ExtractOptions,
) -> Result<Vec<QuizRecord>, QuizError> {
    let grammar = QuestionGrammar::new(&options.question_keyword)?;
    let texts: Vec<String> = document.paragraphs.iter().map(|p| p.text()).collect();

    let mut structure = structure(&texts, &grammar);
    detect_answers(&mut structure.records, document, &texts, &grammar);

    let mut records = attach_images(&structure, document, options);
    normalize(&mut records);

    tracing::debug!(
        paragraphs = texts.len(),
        records = records.len(),
        "docx extraction finished"
    );
    Ok(records)
}

/// Try each strategy in turn; the first whose result has options wins.
/// When none does, the first strategy's result is kept.
pub fn structure(texts: &[String], grammar: &QuestionGrammar) -> Structure {
    let mut first: Option<Structure> = None;
    for (name, strategy) in STRATEGIES {
        let result = strategy(texts, grammar);
        if result.has_options() {
            tracing::debug!(strategy = *name, "docx structure recovered");
            return result;
        }
        tracing::debug!(strategy = *name, "no options found, trying next strategy");
        first.get_or_insert(result);
    }
    first.unwrap_or_default()
}

/// One paragraph is one line: a question start, one option, or a
/// continuation of the current stem/option.
pub fn paragraph_strategy(texts: &[String], grammar: &QuestionGrammar) -> Structure {
    let mut assembler = RecordAssembler::new(grammar, SplitMode::WholeLine);
    for text in texts {
        assembler.feed(&SourceLine::from_text(text));
    }
    let (assembled, unattributed) = assembler.finish();
    Structure {
        records: assembled
            .into_iter()
            .map(|a| DocxRecord {
                record: a.record,
                paragraphs: a.lines,
                span: None,
            })
            .collect(),
        unattributed,
    }
}

/// Each paragraph opening with a question marker packs one or more whole
/// questions with their options inline.
pub fn single_line_strategy(texts: &[String], grammar: &QuestionGrammar) -> Structure {
    let mut structure = Structure::default();

    for (index, text) in texts.iter().enumerate() {
        let markers = grammar.find_all(text);
        let opens_with_question = markers
            .first()
            .is_some_and(|m| text[..m.start].trim().is_empty());
        if !opens_with_question {
            structure.unattributed.push(index);
            continue;
        }

        for (i, marker) in markers.iter().enumerate() {
            let end = markers.get(i + 1).map_or(text.len(), |next| next.start);
            let header = text[marker.start..marker.end].trim();
            let body = &text[marker.end..end];

            let split = split_options(body);
            let (stem, options) = split.fragments(body);
            let question_text = if stem.is_empty() {
                header.to_string()
            } else {
                format!("{header} {stem}")
            };

            let mut record = QuizRecord::new(marker.number, question_text);
            record.options = options.into_iter().map(str::to_string).collect();
            structure.records.push(DocxRecord {
                record,
                paragraphs: index..index + 1,
                span: Some(marker.start..end),
            });
        }
    }

    structure
}

/// Scan marked runs for each record's correct answer.
///
/// Candidates are the record's own paragraphs first, then any paragraph
/// mentioning the record's question number. First match wins.
fn detect_answers(
    records: &mut [DocxRecord],
    document: &DocxDocument,
    texts: &[String],
    grammar: &QuestionGrammar,
) {
    for entry in records.iter_mut() {
        let Some(number) = entry.record.question_number.as_number() else {
            continue;
        };

        let own = entry.paragraphs.clone().map(|i| (i, entry.span.as_ref()));
        let mentioning = texts
            .iter()
            .enumerate()
            .filter(|(i, text)| !entry.paragraphs.contains(i) && grammar.mentions(text, number))
            .map(|(i, _)| (i, None));

        let found = own.chain(mentioning).find_map(|(i, span)| {
            let paragraph = document.paragraphs.get(i)?;
            answer_from_runs(&paragraph.runs, span, &entry.record.options)
        });

        if let Some(index) = found {
            tracing::debug!(number, answer = index, "marked answer found");
            entry.record.set_answer(index);
        }
    }
}

/// Move paragraph images into the records that own the paragraphs; images
/// nobody owns end up in a trailing placeholder record.
fn attach_images(
    structure: &Structure,
    document: &DocxDocument,
    options: &ExtractOptions,
) -> Vec<QuizRecord> {
    let mut records: Vec<QuizRecord> = Vec::with_capacity(structure.records.len() + 1);
    let mut claimed = vec![false; document.paragraphs.len()];

    for entry in &structure.records {
        let mut record = entry.record.clone();
        for i in entry.paragraphs.clone() {
            if let Some(done) = claimed.get_mut(i) {
                if !*done {
                    *done = true;
                    record
                        .images
                        .extend(document.paragraphs[i].images.iter().map(|img| img.data_uri()));
                }
            }
        }
        records.push(record);
    }

    let stray: Vec<String> = structure
        .unattributed
        .iter()
        .filter(|&&i| !claimed.get(i).copied().unwrap_or(true))
        .flat_map(|&i| document.paragraphs[i].images.iter().map(|img| img.data_uri()))
        .collect();
    if !stray.is_empty() {
        records.push(QuizRecord::placeholder(
            &options.images_label,
            &options.images_heading,
            stray,
        ));
    }

    records
}
