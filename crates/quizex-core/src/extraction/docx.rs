//! Minimal WordprocessingML reader: paragraphs, their formatting runs and
//! the images they reference.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::Path;
use zip::ZipArchive;

use crate::error::QuizError;
use crate::extraction::{mime_for, EmbeddedImage};

const DOCUMENT_PART: &str = "word/document.xml";
const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";

/// A contiguous span of text sharing one set of run properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    /// `w:highlight` value, unless it is "none".
    pub highlight: Option<String>,
    /// `w:color` value, unless it is "auto".
    pub color: Option<String>,
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Run {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn highlighted(text: impl Into<String>, color: &str) -> Self {
        Run {
            text: text.into(),
            highlight: Some(color.to_string()),
            color: None,
        }
    }

    /// Whether the run is visually marked: a highlight, or a font color
    /// other than the default black.
    pub fn is_marked(&self) -> bool {
        self.highlight.is_some()
            || self
                .color
                .as_deref()
                .is_some_and(|c| !c.eq_ignore_ascii_case("000000"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    pub runs: Vec<Run>,
    pub images: Vec<EmbeddedImage>,
}

impl Paragraph {
    pub fn from_runs(runs: Vec<Run>) -> Self {
        Paragraph {
            runs,
            images: Vec::new(),
        }
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// Body paragraphs of a document, in document order.
#[derive(Debug, Clone, Default)]
pub struct DocxDocument {
    pub paragraphs: Vec<Paragraph>,
}

impl DocxDocument {
    pub fn from_paragraphs(paragraphs: Vec<Paragraph>) -> Self {
        DocxDocument { paragraphs }
    }
}

/// Read a .docx package from bytes.
pub fn read_docx(bytes: &[u8]) -> Result<DocxDocument, QuizError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let document_xml = read_part(&mut archive, DOCUMENT_PART)?
        .ok_or_else(|| QuizError::Docx(format!("{DOCUMENT_PART} missing from package")))?;
    let rels = match read_part(&mut archive, DOCUMENT_RELS_PART)? {
        Some(xml) => parse_relationships(&xml)?,
        None => HashMap::new(),
    };

    let parsed = parse_document_xml(&document_xml)?;
    let mut paragraphs = Vec::with_capacity(parsed.len());
    for p in parsed {
        let mut images = Vec::new();
        for rel_id in &p.image_rels {
            match load_image(&mut archive, &rels, rel_id) {
                Ok(Some(image)) => images.push(image),
                Ok(None) => tracing::warn!(rel_id = %rel_id, "image relationship has no usable target"),
                Err(e) => tracing::warn!(rel_id = %rel_id, error = %e, "skipping unreadable image"),
            }
        }
        paragraphs.push(Paragraph {
            runs: p.runs,
            images,
        });
    }

    Ok(DocxDocument { paragraphs })
}

fn read_part<R: Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<String>, QuizError> {
    let mut file = match archive.by_name(name) {
        Ok(f) => f,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

fn load_image<R: Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
    rels: &HashMap<String, String>,
    rel_id: &str,
) -> Result<Option<EmbeddedImage>, QuizError> {
    let Some(target) = rels.get(rel_id) else {
        return Ok(None);
    };
    let part = resolve_target(target);
    let Some(mime) = mime_for(Path::new(&part)) else {
        return Ok(None);
    };
    let mut file = archive.by_name(&part)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(Some(EmbeddedImage {
        mime: mime.to_string(),
        bytes,
    }))
}

/// Package part name for a relationship target of `word/document.xml`.
fn resolve_target(target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut parts: Vec<&str> = vec!["word"];
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }
    parts.join("/")
}

fn parse_relationships(xml: &str) -> Result<HashMap<String, String>, QuizError> {
    let mut reader = Reader::from_str(xml);
    let mut rels = HashMap::new();
    loop {
        match reader.read_event()? {
            Event::Start(ref e) | Event::Empty(ref e)
                if e.local_name().as_ref() == b"Relationship" =>
            {
                if attr(e, b"TargetMode").as_deref() == Some("External") {
                    continue;
                }
                if let (Some(id), Some(target)) = (attr(e, b"Id"), attr(e, b"Target")) {
                    rels.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(rels)
}

#[derive(Debug, Default)]
struct ParsedParagraph {
    runs: Vec<Run>,
    image_rels: Vec<String>,
}

#[derive(Debug, Default)]
struct ParagraphBuilder {
    paragraph: ParsedParagraph,
    run: Option<Run>,
    in_run_props: bool,
}

impl ParagraphBuilder {
    fn push_text(&mut self, text: &str) {
        match &mut self.run {
            Some(run) => run.text.push_str(text),
            None => self.paragraph.runs.push(Run::plain(text)),
        }
    }

    fn finish_run(&mut self) {
        if let Some(run) = self.run.take() {
            if !run.text.is_empty() {
                self.paragraph.runs.push(run);
            }
        }
    }
}

/// Walk `word/document.xml`. Paragraphs nested in text boxes are emitted
/// before the paragraph that contains them.
fn parse_document_xml(xml: &str) -> Result<Vec<ParsedParagraph>, QuizError> {
    let mut reader = Reader::from_str(xml);
    let mut out = Vec::new();
    let mut stack: Vec<ParagraphBuilder> = Vec::new();
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"p" => stack.push(ParagraphBuilder::default()),
                b"r" => {
                    if let Some(b) = stack.last_mut() {
                        b.finish_run();
                        b.run = Some(Run::default());
                    }
                }
                b"rPr" => {
                    if let Some(b) = stack.last_mut() {
                        b.in_run_props = b.run.is_some();
                    }
                }
                b"t" => in_text = true,
                _ => handle_marker(&mut stack, e),
            },
            Event::Empty(ref e) if e.local_name().as_ref() == b"p" => {
                out.push(ParsedParagraph::default());
            }
            Event::Empty(ref e) => handle_marker(&mut stack, e),
            Event::Text(t) => {
                if in_text {
                    let text = t.unescape().map_err(|e| QuizError::Docx(e.to_string()))?;
                    if let Some(b) = stack.last_mut() {
                        b.push_text(&text);
                    }
                }
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"rPr" => {
                    if let Some(b) = stack.last_mut() {
                        b.in_run_props = false;
                    }
                }
                b"r" => {
                    if let Some(b) = stack.last_mut() {
                        b.finish_run();
                    }
                }
                b"p" => {
                    if let Some(mut b) = stack.pop() {
                        b.finish_run();
                        out.push(b.paragraph);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(out)
}

/// Elements that carry meaning regardless of being empty or not:
/// run properties, tabs/breaks and image references.
fn handle_marker(stack: &mut [ParagraphBuilder], e: &BytesStart<'_>) {
    let Some(b) = stack.last_mut() else {
        return;
    };
    match e.local_name().as_ref() {
        b"highlight" if b.in_run_props => {
            if let (Some(run), Some(val)) = (b.run.as_mut(), attr(e, b"val")) {
                run.highlight = (!val.eq_ignore_ascii_case("none")).then_some(val);
            }
        }
        b"color" if b.in_run_props => {
            if let (Some(run), Some(val)) = (b.run.as_mut(), attr(e, b"val")) {
                run.color = (!val.eq_ignore_ascii_case("auto")).then_some(val);
            }
        }
        b"tab" if b.run.is_some() && !b.in_run_props => b.push_text("\t"),
        b"br" | b"cr" if b.run.is_some() => b.push_text("\n"),
        b"blip" => {
            if let Some(id) = attr(e, b"embed") {
                b.paragraph.image_rels.push(id);
            }
        }
        b"imagedata" => {
            if let Some(id) = attr(e, b"id") {
                b.paragraph.image_rels.push(id);
            }
        }
        _ => {}
    }
}

fn attr(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == name)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}
