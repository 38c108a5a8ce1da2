// End-to-end coverage over generated PDF fixtures
use std::fs;
use std::path::Path;

use image::{GrayImage, Luma};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tempfile::TempDir;

use pdftriage::{
    BatchOrchestrator, BatchSummary, DocumentProcessor, FileType, PageRasterAdapter, PdfFile,
    PdfType, TriageConfig, TriageError, SUMMARY_FILE,
};

/// Text-bearing PDF with one content stream per page and a shared Helvetica
/// resource, optionally carrying an Info dictionary.
fn build_text_pdf(path: &Path, pages: &[&str], info: Option<(&str, &str)>) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);
    if let Some((author, title)) = info {
        let info_id = doc.add_object(dictionary! {
            "Author" => Object::string_literal(author),
            "Title" => Object::string_literal(title),
        });
        doc.trailer.set("Info", info_id);
    }
    doc.save(path).unwrap();
}

/// Pages with no text layer and no font resources, standing in for a
/// scanned document.
fn build_untexted_pdf(path: &Path, page_count: usize) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::with_capacity(page_count);
    for _ in 0..page_count {
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        });
        kids.push(page_id.into());
    }
    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

/// Deterministic stand-in for a real renderer: every page is a sharp
/// vertical step edge, except the configured pages, which fail at artifact
/// resolution (detection renders stay cheap and succeed).
struct SyntheticRasterizer {
    fail_pages_at_full_dpi: Vec<u32>,
}

impl PageRasterAdapter for SyntheticRasterizer {
    fn render(&self, _pdf: &PdfFile, page_number: u32, dpi: u32) -> pdftriage::Result<GrayImage> {
        if dpi >= 150 && self.fail_pages_at_full_dpi.contains(&page_number) {
            return Err(TriageError::Render {
                page: page_number,
                reason: "synthetic render failure".to_string(),
            });
        }
        Ok(GrayImage::from_fn(64, 64, |x, _| {
            if x < 32 {
                Luma([0u8])
            } else {
                Luma([255u8])
            }
        }))
    }
}

/// Thresholds tuned so the synthetic step edge counts as dense.
fn raster_leaning_config() -> TriageConfig {
    let mut config = TriageConfig::default();
    config.detector.high_edge_density = 0.001;
    config
}

#[test]
fn vector_document_round_trips_text_and_metadata() {
    let dir = TempDir::new().unwrap();
    let pdf_path = dir.path().join("report.pdf");
    let out_dir = dir.path().join("out");
    build_text_pdf(
        &pdf_path,
        &["First page body text", "", "Third page body text"],
        Some(("J", "T")),
    );

    let result = DocumentProcessor::new(TriageConfig::default()).run(&pdf_path, &out_dir);

    assert!(result.is_success(), "error: {:?}", result.error);
    assert_eq!(result.pdf_type, Some(PdfType::Vector));
    assert_eq!(result.total_pages, 3);
    assert_eq!(result.processed_files.len(), 3);

    let metadata = result.metadata.as_ref().expect("vector metadata");
    assert_eq!(metadata.get("Author").map(String::as_str), Some("J"));
    assert_eq!(metadata.get("Title").map(String::as_str), Some("T"));

    for file in &result.processed_files {
        assert_eq!(file.file_type, FileType::Text);
        let content = fs::read_to_string(&file.file_path).unwrap();
        assert_eq!(file.content_length, Some(content.chars().count()));
    }
    let first = fs::read_to_string(&result.processed_files[0].file_path).unwrap();
    assert!(first.contains("First page"), "extracted: {first:?}");
}

#[test]
fn untexted_document_routes_raster() {
    let dir = TempDir::new().unwrap();
    let pdf_path = dir.path().join("scan.pdf");
    let out_dir = dir.path().join("out");
    build_untexted_pdf(&pdf_path, 5);

    let processor = DocumentProcessor::with_rasterizer(
        raster_leaning_config(),
        Box::new(SyntheticRasterizer {
            fail_pages_at_full_dpi: vec![],
        }),
    );
    let result = processor.run(&pdf_path, &out_dir);

    assert!(result.is_success(), "error: {:?}", result.error);
    assert_eq!(result.pdf_type, Some(PdfType::Raster));
    assert_eq!(result.total_pages, 5);
    assert_eq!(result.processed_files.len(), 5);
    assert!(result.metadata.is_none());
    for file in &result.processed_files {
        assert_eq!(file.file_type, FileType::Image);
        assert_eq!(file.content_length, None);
        assert!(file.file_path.exists(), "missing {:?}", file.file_path);
    }
}

#[test]
fn failed_page_leaves_a_gap_not_a_document_failure() {
    let dir = TempDir::new().unwrap();
    let pdf_path = dir.path().join("scan.pdf");
    let out_dir = dir.path().join("out");
    build_untexted_pdf(&pdf_path, 3);

    let processor = DocumentProcessor::with_rasterizer(
        raster_leaning_config(),
        Box::new(SyntheticRasterizer {
            fail_pages_at_full_dpi: vec![2],
        }),
    );
    let result = processor.run(&pdf_path, &out_dir);

    assert!(result.is_success(), "error: {:?}", result.error);
    assert_eq!(result.total_pages, 3);
    let pages: Vec<u32> = result.processed_files.iter().map(|f| f.page_number).collect();
    assert_eq!(pages, vec![1, 3]);
}

#[test]
fn all_pages_failing_is_a_document_failure() {
    let dir = TempDir::new().unwrap();
    let pdf_path = dir.path().join("scan.pdf");
    let out_dir = dir.path().join("out");
    build_untexted_pdf(&pdf_path, 2);

    let processor = DocumentProcessor::with_rasterizer(
        raster_leaning_config(),
        Box::new(SyntheticRasterizer {
            fail_pages_at_full_dpi: vec![1, 2],
        }),
    );
    let result = processor.run(&pdf_path, &out_dir);

    assert!(!result.is_success());
    assert!(result.processed_files.is_empty());
}

#[tokio::test]
async fn batch_accounts_for_every_discovered_document() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("pdfs");
    let output = dir.path().join("out");
    fs::create_dir(&input).unwrap();

    build_text_pdf(
        &input.join("alpha.pdf"),
        &["alpha body"],
        Some(("J", "T")),
    );
    fs::write(input.join("broken.pdf"), b"not a pdf at all").unwrap();
    build_text_pdf(&input.join("zulu.pdf"), &["zulu body"], None);

    let summary = BatchOrchestrator::new(TriageConfig::default())
        .run(&input, &output)
        .await
        .unwrap();

    assert_eq!(summary.total_pdfs, 3);
    assert_eq!(summary.successful_processing, 2);
    assert_eq!(summary.failed_processing, 1);
    assert_eq!(
        summary.total_pdfs,
        summary.successful_processing + summary.failed_processing
    );

    let names: Vec<&str> = summary.results.iter().map(|r| r.pdf_name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "broken", "zulu"]);
    assert!(summary.results[1].error.is_some());
    assert!(summary.results[1].processed_files.is_empty());

    // artifacts live under one subdirectory per document
    assert!(output.join("alpha").join("page_1_text.txt").exists());

    // the persisted summary matches what the orchestrator returned
    let raw = fs::read_to_string(output.join(SUMMARY_FILE)).unwrap();
    let persisted: BatchSummary = serde_json::from_str(&raw).unwrap();
    assert_eq!(persisted.total_pdfs, summary.total_pdfs);
    assert_eq!(persisted.results.len(), summary.results.len());
    assert_eq!(persisted.results[0].pdf_name, "alpha");
}

#[tokio::test]
async fn result_order_is_discovery_order_for_any_worker_count() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("pdfs");
    fs::create_dir(&input).unwrap();
    for name in ["d.pdf", "a.pdf", "c.pdf", "b.pdf"] {
        build_text_pdf(&input.join(name), &["some body text"], None);
    }

    let mut serial_config = TriageConfig::default();
    serial_config.batch.workers = 1;
    let serial = BatchOrchestrator::new(serial_config)
        .run(&input, &dir.path().join("out1"))
        .await
        .unwrap();

    let mut pooled_config = TriageConfig::default();
    pooled_config.batch.workers = 4;
    let pooled = BatchOrchestrator::new(pooled_config)
        .run(&input, &dir.path().join("out4"))
        .await
        .unwrap();

    let serial_names: Vec<&str> = serial.results.iter().map(|r| r.pdf_name.as_str()).collect();
    let pooled_names: Vec<&str> = pooled.results.iter().map(|r| r.pdf_name.as_str()).collect();
    assert_eq!(serial_names, vec!["a", "b", "c", "d"]);
    assert_eq!(serial_names, pooled_names);
}

#[tokio::test]
async fn empty_batch_produces_an_empty_summary() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("pdfs");
    let output = dir.path().join("out");
    fs::create_dir(&input).unwrap();

    let summary = BatchOrchestrator::new(TriageConfig::default())
        .run(&input, &output)
        .await
        .unwrap();

    assert_eq!(summary.total_pdfs, 0);
    assert_eq!(summary.successful_processing, 0);
    assert_eq!(summary.failed_processing, 0);
    assert!(summary.results.is_empty());
    assert!(output.join(SUMMARY_FILE).exists());
}

#[test]
fn rerunning_a_document_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let pdf_path = dir.path().join("report.pdf");
    build_text_pdf(&pdf_path, &["stable content"], None);

    let processor = DocumentProcessor::new(TriageConfig::default());
    let first = processor.run(&pdf_path, &dir.path().join("out1"));
    let second = processor.run(&pdf_path, &dir.path().join("out2"));

    assert_eq!(first.pdf_type, second.pdf_type);
    assert_eq!(first.processed_files.len(), second.processed_files.len());
    assert_eq!(first.total_pages, second.total_pages);
}
