pub mod docx;
pub mod highlight;
pub mod lines;
pub mod markers;
pub mod normalize;
pub mod options;
pub mod pdf;
pub mod state;

pub use docx::{extract_docx, extract_from_document};
pub use pdf::extract_pdf;
