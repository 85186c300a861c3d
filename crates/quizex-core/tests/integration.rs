//! Integration tests for the extract() pipeline.
//!
//! PDF input goes through a MockExtractor returning pre-built pages, so
//! these tests run without poppler-utils. DOCX input is built in memory
//! with the zip writer.

use std::io::{Cursor, Write};

use quizex_core::error::QuizError;
use quizex_core::extraction::{BBox, EmbeddedImage, PageContent, PdfDocument, PdfExtractor, Word};
use quizex_core::model::{DocumentFormat, QuestionNumber};
use quizex_core::options::builtin::load_profile;
use quizex_core::options::schema::ExtractOptions;
use quizex_core::{extract, extract_or_empty, total_questions, ExtractionContext};
use rand::rngs::StdRng;
use rand::SeedableRng;
use zip::write::SimpleFileOptions;

/// `images: None` makes the embedded image dump fail.
struct MockExtractor {
    pages: Vec<PageContent>,
    images: Option<Vec<EmbeddedImage>>,
}

struct MockDocument {
    pages: Vec<PageContent>,
    images: Option<Vec<EmbeddedImage>>,
}

impl PdfExtractor for MockExtractor {
    fn open(&self, _pdf_bytes: &[u8]) -> Result<Box<dyn PdfDocument>, QuizError> {
        Ok(Box::new(MockDocument {
            pages: self.pages.clone(),
            images: self.images.clone(),
        }))
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

impl PdfDocument for MockDocument {
    fn pages(&self) -> Result<Vec<PageContent>, QuizError> {
        Ok(self.pages.clone())
    }

    fn snapshot(&self, _page: usize, _region: &BBox, _dpi: u32) -> Result<Vec<u8>, QuizError> {
        Err(QuizError::Extraction("no rasterizer in tests".into()))
    }

    fn embedded_images(&self) -> Result<Vec<EmbeddedImage>, QuizError> {
        self.images.clone().ok_or(QuizError::PopplerFailed {
            tool: "pdfimages",
            code: 99,
            stderr: "Syntax Error: broken image stream".into(),
        })
    }
}

/// A PDF backend that cannot read anything.
struct BrokenExtractor;

impl PdfExtractor for BrokenExtractor {
    fn open(&self, _pdf_bytes: &[u8]) -> Result<Box<dyn PdfDocument>, QuizError> {
        Err(QuizError::Extraction("corrupt xref table".into()))
    }

    fn backend_name(&self) -> &str {
        "broken"
    }
}

fn page(number: usize, lines: &[&str]) -> PageContent {
    let mut words = Vec::new();
    for (row, line) in lines.iter().enumerate() {
        let y = 40.0 + row as f32 * 14.0;
        for (col, token) in line.split_whitespace().enumerate() {
            let x = 30.0 + col as f32 * 40.0;
            words.push(Word {
                text: token.to_string(),
                bbox: BBox {
                    x_min: x,
                    y_min: y,
                    x_max: x + 35.0,
                    y_max: y + 10.0,
                },
            });
        }
    }
    PageContent {
        page_number: number,
        width: 595.0,
        height: 842.0,
        words,
        drawings: vec![],
    }
}

fn mock(pages: Vec<PageContent>) -> MockExtractor {
    MockExtractor {
        pages,
        images: Some(vec![]),
    }
}

const DOCUMENT_OPEN: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"
            xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"
            xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"><w:body>"#;
const DOCUMENT_CLOSE: &str = "</w:body></w:document>";

fn plain_run(text: &str) -> String {
    format!(r#"<w:r><w:t xml:space="preserve">{text}</w:t></w:r>"#)
}

fn highlighted_run(text: &str) -> String {
    format!(
        r#"<w:r><w:rPr><w:highlight w:val="yellow"/></w:rPr><w:t xml:space="preserve">{text}</w:t></w:r>"#
    )
}

fn paragraph(runs: &[String]) -> String {
    format!("<w:p>{}</w:p>", runs.concat())
}

fn docx(body: &[String], parts: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("word/document.xml", SimpleFileOptions::default())
        .unwrap();
    let xml = format!("{DOCUMENT_OPEN}{}{DOCUMENT_CLOSE}", body.concat());
    writer.write_all(xml.as_bytes()).unwrap();
    for (name, bytes) in parts {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(bytes).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

// ---------------------------------------------------------------------------
// PDF
// ---------------------------------------------------------------------------

#[test]
fn pdf_questions_across_pages() {
    let extractor = mock(vec![
        page(
            1,
            &[
                "ĐỀ KIỂM TRA 15 PHÚT",
                "Câu 1: Thủ đô của Việt Nam là",
                "A. Huế B. Hà Nội",
                "C. Đà Nẵng D. Cần Thơ",
                "Câu 2. Kết quả của 2 + 3 là",
            ],
        ),
        page(2, &["A. 4", "B. 5", "C. 6", "D. 7"]),
    ]);

    let records = extract(
        b"%PDF-1.7",
        DocumentFormat::Pdf,
        &extractor,
        &ExtractOptions::default(),
    )
    .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].question_text, "Câu 1: Thủ đô của Việt Nam là");
    assert_eq!(records[0].options, vec!["Huế", "Hà Nội", "Đà Nẵng", "Cần Thơ"]);
    assert_eq!(records[1].question_number, QuestionNumber::Number(2));
    assert_eq!(records[1].options, vec!["4", "5", "6", "7"]);
    for record in &records {
        assert_eq!(record.correct_answer_index, 0);
        assert_eq!(record.correct_answer_char, "A");
    }
}

#[test]
fn pdf_embedded_images_become_placeholder() {
    let extractor = MockExtractor {
        pages: vec![page(1, &["Câu 1: Chọn hình đúng", "A. trái B. phải"])],
        images: Some(vec![EmbeddedImage {
            mime: "image/png".into(),
            bytes: b"png".to_vec(),
        }]),
    };

    let records = extract(
        b"%PDF-1.7",
        DocumentFormat::Pdf,
        &extractor,
        &ExtractOptions::default(),
    )
    .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(total_questions(&records), 1);
    let placeholder = &records[1];
    assert_eq!(
        placeholder.question_number,
        QuestionNumber::Label("Hình ảnh".into())
    );
    assert_eq!(placeholder.question_text, "CÁC HÌNH ẢNH TRÍCH XUẤT TỪ FILE PDF:");
    assert_eq!(placeholder.images, vec!["data:image/png;base64,cG5n"]);
    assert!(placeholder.options.is_empty());
    assert_eq!(placeholder.correct_answer_index, -1);
}

#[test]
fn pdf_english_profile() {
    let options = load_profile("en").unwrap();
    let extractor = mock(vec![page(
        1,
        &["Question 1: Capital of France?", "A. Lyon B. Paris"],
    )]);

    let records = extract(b"%PDF-1.7", DocumentFormat::Pdf, &extractor, &options).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].options, vec!["Lyon", "Paris"]);
}

#[test]
fn pdf_without_questions_is_empty() {
    let extractor = mock(vec![page(1, &["Trang bìa", "Họ tên: ........"])]);
    let records = extract(
        b"%PDF-1.7",
        DocumentFormat::Pdf,
        &extractor,
        &ExtractOptions::default(),
    )
    .unwrap();
    assert!(records.is_empty());
}

#[test]
fn pdf_failed_snapshot_is_skipped() {
    let mut first = page(1, &["Câu 1: Hình nào là hình vuông?", "A. trái B. phải"]);
    first.drawings.push(BBox {
        x_min: 200.0,
        y_min: 54.0,
        x_max: 260.0,
        y_max: 100.0,
    });
    let extractor = mock(vec![first]);

    let records = extract(
        b"%PDF-1.7",
        DocumentFormat::Pdf,
        &extractor,
        &ExtractOptions::default(),
    )
    .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].options, vec!["trái", "phải"]);
    assert!(records[0].options.iter().all(|o| !o.contains("<img")));
}

#[test]
fn pdf_failed_image_dump_keeps_questions() {
    let extractor = MockExtractor {
        pages: vec![page(1, &["Câu 1: 1+1=?", "A. 2 B. 3"])],
        images: None,
    };

    let records = extract(
        b"%PDF-1.7",
        DocumentFormat::Pdf,
        &extractor,
        &ExtractOptions::default(),
    )
    .unwrap();

    assert_eq!(records.len(), 1);
    assert!(records[0].is_question());
    assert_eq!(records[0].options, vec!["2", "3"]);
}

#[test]
fn pdf_without_pages_is_empty() {
    let records = extract(
        b"%PDF-1.7",
        DocumentFormat::Pdf,
        &mock(vec![]),
        &ExtractOptions::default(),
    )
    .unwrap();
    assert!(records.is_empty());
}

#[test]
fn strict_and_lenient_entry_points_on_failure() {
    let result = extract(
        b"garbage",
        DocumentFormat::Pdf,
        &BrokenExtractor,
        &ExtractOptions::default(),
    );
    assert!(matches!(result, Err(QuizError::Extraction(_))));

    let records = extract_or_empty(
        b"garbage",
        DocumentFormat::Pdf,
        &BrokenExtractor,
        &ExtractOptions::default(),
    );
    assert!(records.is_empty());
}

// ---------------------------------------------------------------------------
// DOCX
// ---------------------------------------------------------------------------

#[test]
fn docx_highlighted_answer() {
    let bytes = docx(
        &[
            paragraph(&[plain_run("Câu 1: Thủ đô của Việt Nam là")]),
            paragraph(&[plain_run("A. Huế")]),
            paragraph(&[highlighted_run("B. Hà Nội")]),
            paragraph(&[plain_run("C. Đà Nẵng")]),
            paragraph(&[plain_run("Câu 2: Số nguyên tố nhỏ nhất là")]),
            paragraph(&[plain_run("A. 1")]),
            paragraph(&[plain_run("B. 2")]),
        ],
        &[],
    );

    let records = extract(
        &bytes,
        DocumentFormat::Docx,
        &BrokenExtractor,
        &ExtractOptions::default(),
    )
    .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].options, vec!["Huế", "Hà Nội", "Đà Nẵng"]);
    assert_eq!(records[0].correct_answer_index, 1);
    assert_eq!(records[0].correct_answer_char, "B");
    assert_eq!(records[1].correct_answer_char, "A");
}

#[test]
fn docx_end_to_end_scenario() {
    let bytes = docx(
        &[
            paragraph(&[plain_run("Câu 1: 2+2=?")]),
            paragraph(&[plain_run("A. 3")]),
            paragraph(&[highlighted_run("B. 4")]),
            paragraph(&[plain_run("Câu 2: Capital of France?")]),
            paragraph(&[plain_run("A. Paris")]),
            paragraph(&[plain_run("B. Lyon")]),
        ],
        &[],
    );

    let records = extract(
        &bytes,
        DocumentFormat::Docx,
        &BrokenExtractor,
        &ExtractOptions::default(),
    )
    .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].options, vec!["3", "4"]);
    assert_eq!(records[0].correct_answer_char, "B");
    assert_eq!(records[0].correct_answer_index, 1);
    assert_eq!(records[1].options, vec!["Paris", "Lyon"]);
    assert_eq!(records[1].correct_answer_char, "A");
    assert_eq!(records[1].correct_answer_index, 0);
}

#[test]
fn docx_single_line_layout_falls_back() {
    let bytes = docx(
        &[paragraph(&[
            plain_run("Câu 1: 2 + 2 = ? A. 3 "),
            highlighted_run("B. 4"),
            plain_run(" Câu 2: 3 + 3 = ? "),
            highlighted_run("A. 6"),
            plain_run(" B. 9"),
        ])],
        &[],
    );

    let records = extract(
        &bytes,
        DocumentFormat::Docx,
        &BrokenExtractor,
        &ExtractOptions::default(),
    )
    .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].question_text, "Câu 1: 2 + 2 = ?");
    assert_eq!(records[0].options, vec!["3", "4"]);
    assert_eq!(records[0].correct_answer_char, "B");
    assert_eq!(records[1].options, vec!["6", "9"]);
    assert_eq!(records[1].correct_answer_char, "A");
}

#[test]
fn docx_images_attached_to_question() {
    let drawing = r#"<w:r><w:drawing><a:blip r:embed="rId5"/></w:drawing></w:r>"#.to_string();
    let rels: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId5" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/image1.png"/>
</Relationships>"#;
    let bytes = docx(
        &[
            paragraph(&[plain_run("Câu 1: Hình bên là con vật gì?")]),
            paragraph(&[drawing]),
            paragraph(&[plain_run("A. Mèo")]),
            paragraph(&[plain_run("B. Chó")]),
        ],
        &[
            ("word/_rels/document.xml.rels", rels),
            ("word/media/image1.png", b"png".as_slice()),
        ],
    );

    let records = extract(
        &bytes,
        DocumentFormat::Docx,
        &BrokenExtractor,
        &ExtractOptions::default(),
    )
    .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].images, vec!["data:image/png;base64,cG5n"]);
    assert_eq!(records[0].options, vec!["Mèo", "Chó"]);
}

#[test]
fn docx_missing_image_part_is_skipped() {
    let drawing = r#"<w:r><w:drawing><a:blip r:embed="rId9"/></w:drawing></w:r>"#.to_string();
    let rels: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId9" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/missing.png"/>
</Relationships>"#;
    let bytes = docx(
        &[
            paragraph(&[plain_run("Câu 1: Quan sát hình")]),
            paragraph(&[drawing]),
            paragraph(&[plain_run("A. Có")]),
            paragraph(&[plain_run("B. Không")]),
        ],
        &[("word/_rels/document.xml.rels", rels)],
    );

    let records = extract(
        &bytes,
        DocumentFormat::Docx,
        &BrokenExtractor,
        &ExtractOptions::default(),
    )
    .unwrap();

    assert_eq!(records.len(), 1);
    assert!(records[0].images.is_empty());
    assert_eq!(records[0].options, vec!["Có", "Không"]);
}

#[test]
fn docx_without_document_part_is_an_error() {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("[Content_Types].xml", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"<Types/>").unwrap();
    let bytes = writer.finish().unwrap().into_inner();

    let result = extract(
        &bytes,
        DocumentFormat::Docx,
        &BrokenExtractor,
        &ExtractOptions::default(),
    );
    assert!(matches!(result, Err(QuizError::Docx(_))));
}

#[test]
fn docx_empty_body_is_empty() {
    let bytes = docx(&[], &[]);
    let records = extract_or_empty(
        &bytes,
        DocumentFormat::Docx,
        &BrokenExtractor,
        &ExtractOptions::default(),
    );
    assert!(records.is_empty());
}

// ---------------------------------------------------------------------------
// Context and shuffling
// ---------------------------------------------------------------------------

#[test]
fn context_shuffle_keeps_answers_consistent() {
    let extractor = mock(vec![page(
        1,
        &[
            "Câu 1: một? A. 1 B. 2 C. 3",
            "Câu 2: hai? A. 1 B. 2 C. 3",
            "Câu 3: ba? A. 1 B. 2 C. 3",
        ],
    )]);
    let mut context = ExtractionContext::extract(
        "de.pdf",
        b"%PDF-1.7",
        DocumentFormat::Pdf,
        &extractor,
        &ExtractOptions::default(),
    )
    .unwrap();
    assert_eq!(context.total_questions(), 3);

    let mut rng = StdRng::seed_from_u64(2024);
    context.shuffle(true, true, &mut rng);

    for (i, record) in context.records.iter().enumerate() {
        assert_eq!(record.question_number, QuestionNumber::Number(i as u32 + 1));
        let index = usize::try_from(record.correct_answer_index).unwrap();
        assert_eq!(record.options[index], "1");
        let letter = char::from(b'A' + index as u8).to_string();
        assert_eq!(record.correct_answer_char, letter);
    }
}
