use serde::{Deserialize, Serialize};

/// Tunables for one extraction call. Every field has a default, so a
/// profile file only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Keyword of the question-start marker ("Câu" in "Câu 12:").
    pub question_keyword: String,
    /// Max vertical distance (PDF points) between items of one visual line.
    pub line_threshold: f32,
    /// Drawings narrower or shorter than this (PDF points) are not rasterized.
    pub min_drawing_size: f32,
    pub snapshot_dpi: u32,
    /// Collect raster images embedded in a PDF into a placeholder record.
    pub embedded_images: bool,
    /// `question_number` of the images-only placeholder record.
    pub images_label: String,
    /// `question_text` of the images-only placeholder record.
    pub images_heading: String,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            name: None,
            description: None,
            question_keyword: "Câu".into(),
            line_threshold: 5.0,
            min_drawing_size: 5.0,
            snapshot_dpi: 150,
            embedded_images: true,
            images_label: "Hình ảnh".into(),
            images_heading: "CÁC HÌNH ẢNH TRÍCH XUẤT TỪ FILE PDF:".into(),
        }
    }
}
