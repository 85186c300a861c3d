//! Locate painted vector paths (figures, graphs, boxes) in page content
//! streams, so they can be rasterized into inline images.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId};

use crate::error::QuizError;
use crate::extraction::BBox;

type Matrix = [f32; 6];

const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// Bounding boxes of painted paths on one page, top-left origin.
pub fn page_drawings(
    doc: &Document,
    page_id: ObjectId,
    page_height: f32,
) -> Result<Vec<BBox>, QuizError> {
    let bytes = doc
        .get_page_content(page_id)
        .map_err(|e| QuizError::Extraction(format!("page content unreadable: {e}")))?;
    let content = Content::decode(&bytes)
        .map_err(|e| QuizError::Extraction(format!("content stream undecodable: {e}")))?;
    Ok(drawings_from_operations(&content.operations, page_height))
}

/// Interpret path construction and painting operators.
///
/// Every painting operator closes the current path and yields its bounding
/// box in device space; `n` (end path without painting) discards it.
pub fn drawings_from_operations(operations: &[Operation], page_height: f32) -> Vec<BBox> {
    let mut ctm = IDENTITY;
    let mut saved: Vec<Matrix> = Vec::new();
    let mut path: Option<Extent> = None;
    let mut out = Vec::new();

    for op in operations {
        let nums: Vec<f32> = op.operands.iter().filter_map(number).collect();
        match op.operator.as_str() {
            "q" => saved.push(ctm),
            "Q" => ctm = saved.pop().unwrap_or(IDENTITY),
            "cm" if nums.len() == 6 => {
                let m = [nums[0], nums[1], nums[2], nums[3], nums[4], nums[5]];
                ctm = multiply(&m, &ctm);
            }
            "m" | "l" if nums.len() == 2 => {
                extend(&mut path, &ctm, nums[0], nums[1]);
            }
            "c" if nums.len() == 6 => {
                for pair in nums.chunks(2) {
                    extend(&mut path, &ctm, pair[0], pair[1]);
                }
            }
            "v" | "y" if nums.len() == 4 => {
                for pair in nums.chunks(2) {
                    extend(&mut path, &ctm, pair[0], pair[1]);
                }
            }
            "re" if nums.len() == 4 => {
                let (x, y, w, h) = (nums[0], nums[1], nums[2], nums[3]);
                for (px, py) in [(x, y), (x + w, y), (x, y + h), (x + w, y + h)] {
                    extend(&mut path, &ctm, px, py);
                }
            }
            "S" | "s" | "f" | "F" | "f*" | "B" | "B*" | "b" | "b*" => {
                if let Some(extent) = path.take() {
                    out.push(extent.to_top_left(page_height));
                }
            }
            "n" => path = None,
            _ => {}
        }
    }

    out
}

#[derive(Debug, Clone, Copy)]
struct Extent {
    x_min: f32,
    y_min: f32,
    x_max: f32,
    y_max: f32,
}

impl Extent {
    fn to_top_left(self, page_height: f32) -> BBox {
        BBox {
            x_min: self.x_min,
            y_min: page_height - self.y_max,
            x_max: self.x_max,
            y_max: page_height - self.y_min,
        }
    }
}

fn extend(path: &mut Option<Extent>, ctm: &Matrix, x: f32, y: f32) {
    let (dx, dy) = apply(ctm, x, y);
    match path {
        Some(e) => {
            e.x_min = e.x_min.min(dx);
            e.y_min = e.y_min.min(dy);
            e.x_max = e.x_max.max(dx);
            e.y_max = e.y_max.max(dy);
        }
        None => {
            *path = Some(Extent {
                x_min: dx,
                y_min: dy,
                x_max: dx,
                y_max: dy,
            })
        }
    }
}

fn apply(m: &Matrix, x: f32, y: f32) -> (f32, f32) {
    (m[0] * x + m[2] * y + m[4], m[1] * x + m[3] * y + m[5])
}

/// `a × b` in PDF's row-vector convention: `a` is applied first.
fn multiply(a: &Matrix, b: &Matrix) -> Matrix {
    [
        a[0] * b[0] + a[1] * b[2],
        a[0] * b[1] + a[1] * b[3],
        a[2] * b[0] + a[3] * b[2],
        a[2] * b[1] + a[3] * b[3],
        a[4] * b[0] + a[5] * b[2] + b[4],
        a[4] * b[1] + a[5] * b[3] + b[5],
    ]
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}
