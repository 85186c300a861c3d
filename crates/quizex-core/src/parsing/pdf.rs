use base64::Engine;

use crate::error::QuizError;
use crate::extraction::{PageContent, PdfDocument, PdfExtractor};
use crate::model::QuizRecord;
use crate::options::schema::ExtractOptions;
use crate::parsing::lines::{group_lines, PositionedItem, SourceLine};
use crate::parsing::markers::QuestionGrammar;
use crate::parsing::normalize::normalize;
use crate::parsing::state::{RecordAssembler, SplitMode};

/// Extract quiz records from PDF bytes.
pub fn extract_pdf(
    bytes: &[u8],
    extractor: &dyn PdfExtractor,
    options: &ExtractOptions,
) -> Result<Vec<QuizRecord>, QuizError> {
    let grammar = QuestionGrammar::new(&options.question_keyword)?;
    let document = extractor.open(bytes)?;
    let pages = document.pages()?;
    tracing::debug!(
        backend = extractor.backend_name(),
        pages = pages.len(),
        "pdf opened"
    );

    let mut assembler = RecordAssembler::new(&grammar, SplitMode::Inline);
    for page in &pages {
        let items = page_items(document.as_ref(), page, options);
        for line in group_lines(items, options.line_threshold) {
            assembler.feed(&SourceLine::from_items(&line));
        }
    }
    let (assembled, _) = assembler.finish();
    let mut records: Vec<QuizRecord> = assembled.into_iter().map(|a| a.record).collect();

    if options.embedded_images {
        match document.embedded_images() {
            Ok(images) if !images.is_empty() => {
                tracing::debug!(count = images.len(), "embedded images collected");
                records.push(QuizRecord::placeholder(
                    &options.images_label,
                    &options.images_heading,
                    images.iter().map(|img| img.data_uri()).collect(),
                ));
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "could not list embedded images"),
        }
    }

    normalize(&mut records);
    Ok(records)
}

/// Words of a page plus its large drawings rendered as inline images.
fn page_items(
    document: &dyn PdfDocument,
    page: &PageContent,
    options: &ExtractOptions,
) -> Vec<PositionedItem> {
    let mut items: Vec<PositionedItem> = page
        .words
        .iter()
        .map(|w| PositionedItem::text(w.bbox, w.text.clone()))
        .collect();

    for region in &page.drawings {
        if region.width() < options.min_drawing_size || region.height() < options.min_drawing_size {
            continue;
        }
        match document.snapshot(page.page_number, region, options.snapshot_dpi) {
            Ok(png) => items.push(PositionedItem::image(*region, inline_image(&png))),
            Err(e) => {
                tracing::warn!(page = page.page_number, error = %e, "drawing snapshot failed")
            }
        }
    }

    items
}

/// `<img>` markup for a PNG, sized to sit within a line of text.
pub fn inline_image(png: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(png);
    format!(
        r#"<img src="data:image/png;base64,{encoded}" style="vertical-align: middle; max-height: 2.5em;" />"#
    )
}
