use crate::error::QuizError;
use crate::extraction::drawings::page_drawings;
use crate::extraction::{
    mime_for, BBox, EmbeddedImage, PageContent, PdfDocument, PdfExtractor, Word,
};
use std::ffi::OsStr;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output};

/// PDF backend built on poppler-utils.
///
/// Uses `pdftotext -bbox` for word geometry, `pdftoppm` to rasterize
/// drawing regions and `pdfimages` to dump embedded raster images.
/// Vector drawings are located with lopdf.
pub struct PopplerExtractor;

impl PopplerExtractor {
    pub fn new() -> Self {
        PopplerExtractor
    }

    /// Check if pdftotext is available on the system.
    pub fn is_available() -> bool {
        Command::new("pdftotext")
            .arg("-v")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }
}

impl Default for PopplerExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfExtractor for PopplerExtractor {
    fn open(&self, pdf_bytes: &[u8]) -> Result<Box<dyn PdfDocument>, QuizError> {
        // Per-call temp file, removed when the document is dropped.
        let mut file = tempfile::Builder::new()
            .suffix(".pdf")
            .tempfile()
            .map_err(|e| QuizError::Extraction(e.to_string()))?;
        file.write_all(pdf_bytes)
            .map_err(|e| QuizError::Extraction(e.to_string()))?;
        Ok(Box::new(PopplerDocument { file }))
    }

    fn backend_name(&self) -> &str {
        "poppler"
    }
}

struct PopplerDocument {
    file: tempfile::NamedTempFile,
}

impl PopplerDocument {
    fn path(&self) -> &Path {
        self.file.path()
    }

    fn attach_drawings(&self, pages: &mut [PageContent]) -> Result<(), QuizError> {
        let doc = lopdf::Document::load(self.path())
            .map_err(|e| QuizError::Extraction(format!("lopdf could not load PDF: {e}")))?;
        for (number, page_id) in doc.get_pages() {
            let Some(page) = pages.iter_mut().find(|p| p.page_number == number as usize) else {
                continue;
            };
            match page_drawings(&doc, page_id, page.height) {
                Ok(drawings) => page.drawings = drawings,
                Err(e) => tracing::warn!(page = number, error = %e, "skipping drawings of page"),
            }
        }
        Ok(())
    }
}

impl PdfDocument for PopplerDocument {
    fn pages(&self) -> Result<Vec<PageContent>, QuizError> {
        let output = run_poppler(
            "pdftotext",
            &[
                OsStr::new("-bbox"),
                self.path().as_os_str(),
                OsStr::new("-"),
            ],
        )?;
        let xml = String::from_utf8_lossy(&output.stdout);
        let mut pages = parse_bbox_xml(&xml);

        if let Err(e) = self.attach_drawings(&mut pages) {
            tracing::warn!(error = %e, "vector drawings unavailable, continuing with text only");
        }

        Ok(pages)
    }

    fn snapshot(&self, page_number: usize, region: &BBox, dpi: u32) -> Result<Vec<u8>, QuizError> {
        let dir = tempfile::tempdir()?;
        let prefix = dir.path().join("snapshot");
        let scale = dpi as f32 / 72.0;
        let page = page_number.to_string();
        let x = ((region.x_min * scale).floor().max(0.0) as u32).to_string();
        let y = ((region.y_min * scale).floor().max(0.0) as u32).to_string();
        let w = ((region.width() * scale).ceil().max(1.0) as u32).to_string();
        let h = ((region.height() * scale).ceil().max(1.0) as u32).to_string();
        let dpi = dpi.to_string();

        run_poppler(
            "pdftoppm",
            &[
                OsStr::new("-png"),
                OsStr::new("-r"),
                OsStr::new(&dpi),
                OsStr::new("-f"),
                OsStr::new(&page),
                OsStr::new("-l"),
                OsStr::new(&page),
                OsStr::new("-x"),
                OsStr::new(&x),
                OsStr::new("-y"),
                OsStr::new(&y),
                OsStr::new("-W"),
                OsStr::new(&w),
                OsStr::new("-H"),
                OsStr::new(&h),
                OsStr::new("-singlefile"),
                self.path().as_os_str(),
                prefix.as_os_str(),
            ],
        )?;

        Ok(std::fs::read(prefix.with_extension("png"))?)
    }

    fn embedded_images(&self) -> Result<Vec<EmbeddedImage>, QuizError> {
        let dir = tempfile::tempdir()?;
        let prefix = dir.path().join("img");
        run_poppler(
            "pdfimages",
            &[
                OsStr::new("-png"),
                self.path().as_os_str(),
                prefix.as_os_str(),
            ],
        )?;

        let mut paths: Vec<_> = std::fs::read_dir(dir.path())?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .collect();
        paths.sort();

        let mut images = Vec::new();
        for path in paths {
            let Some(mime) = mime_for(&path) else {
                continue;
            };
            images.push(EmbeddedImage {
                mime: mime.to_string(),
                bytes: std::fs::read(&path)?,
            });
        }
        Ok(images)
    }
}

fn run_poppler(tool: &'static str, args: &[&OsStr]) -> Result<Output, QuizError> {
    let output = Command::new(tool).args(args).output().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            QuizError::PopplerNotFound { tool }
        } else {
            QuizError::Extraction(format!("{tool} failed: {e}"))
        }
    })?;

    if !output.status.success() {
        let code = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        return Err(QuizError::PopplerFailed { tool, code, stderr });
    }

    Ok(output)
}

/// Parse `pdftotext -bbox` output into per-page words.
fn parse_bbox_xml(xml: &str) -> Vec<PageContent> {
    let mut pages: Vec<PageContent> = Vec::new();

    for raw in xml.lines() {
        let line = raw.trim();

        if line.starts_with("<page ") {
            pages.push(PageContent {
                page_number: pages.len() + 1,
                width: parse_attr_f32(line, "width").unwrap_or(0.0),
                height: parse_attr_f32(line, "height").unwrap_or(0.0),
                ..Default::default()
            });
            continue;
        }

        if line.starts_with("<word ") {
            let (Some(page), Some(bbox), Some(text)) =
                (pages.last_mut(), parse_bbox(line), parse_word_text(line))
            else {
                continue;
            };
            let text = decode_xml_entities(&text).trim().to_string();
            if !text.is_empty() {
                page.words.push(Word { text, bbox });
            }
        }
    }

    pages
}

fn parse_attr_f32(tag: &str, name: &str) -> Option<f32> {
    parse_attr(tag, name)?.parse().ok()
}

fn parse_attr<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!(" {}=\"", name);
    let start = tag.find(&needle)? + needle.len();
    let rest = &tag[start..];
    let end = rest.find('"')?;
    Some(&rest[..end])
}

fn parse_bbox(tag: &str) -> Option<BBox> {
    Some(BBox {
        x_min: parse_attr_f32(tag, "xMin")?,
        y_min: parse_attr_f32(tag, "yMin")?,
        x_max: parse_attr_f32(tag, "xMax")?,
        y_max: parse_attr_f32(tag, "yMax")?,
    })
}

fn parse_word_text(word_tag: &str) -> Option<String> {
    let start = word_tag.find('>')? + 1;
    let end = word_tag.rfind("</word>")?;
    Some(word_tag.get(start..end)?.to_string())
}

fn decode_xml_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
