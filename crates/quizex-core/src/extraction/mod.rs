pub mod docx;
pub mod drawings;
pub mod pdftotext;

use crate::error::QuizError;
use std::path::Path;

/// Rectangle in page coordinates: points, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
}

impl BBox {
    pub fn width(&self) -> f32 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f32 {
        self.y_max - self.y_min
    }
}

/// A word with its position on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub text: String,
    pub bbox: BBox,
}

/// Positioned content of a single PDF page.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    pub page_number: usize,
    pub width: f32,
    pub height: f32,
    pub words: Vec<Word>,
    /// Bounding boxes of painted vector paths.
    pub drawings: Vec<BBox>,
}

/// A raster image stored inside a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedImage {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl EmbeddedImage {
    /// The image as a `data:` URI.
    pub fn data_uri(&self) -> String {
        use base64::Engine;
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{};base64,{}", self.mime, encoded)
    }
}

/// Trait for PDF backends.
pub trait PdfExtractor: Send + Sync {
    /// Open a PDF for one extraction call.
    fn open(&self, pdf_bytes: &[u8]) -> Result<Box<dyn PdfDocument>, QuizError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// An opened PDF. Owns whatever per-call resources the backend needs and
/// releases them on drop.
pub trait PdfDocument {
    /// Words and drawing regions, one entry per page.
    fn pages(&self) -> Result<Vec<PageContent>, QuizError>;

    /// Rasterize a region of a page to PNG bytes.
    fn snapshot(&self, page_number: usize, region: &BBox, dpi: u32) -> Result<Vec<u8>, QuizError>;

    /// Raster images embedded in the document.
    fn embedded_images(&self) -> Result<Vec<EmbeddedImage>, QuizError>;
}

/// MIME type of an image file, from its extension.
pub(crate) fn mime_for(path: &Path) -> Option<&'static str> {
    match path.extension()?.to_str()?.to_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "tif" | "tiff" => Some("image/tiff"),
        "emf" => Some("image/x-emf"),
        "wmf" => Some("image/x-wmf"),
        _ => None,
    }
}
