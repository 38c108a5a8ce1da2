// Result types shared between the pipelines and the batch layer
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Document-level classification. Decided once per document, never revisited
/// after pipeline dispatch.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PdfType {
    Raster,
    Vector,
}

impl std::fmt::Display for PdfType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PdfType::Raster => write!(f, "raster"),
            PdfType::Vector => write!(f, "vector"),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Image,
    Text,
}

/// Per-page measurement consumed by the type detector and discarded.
#[derive(Debug, Clone, Copy)]
pub struct DetectionSignal {
    /// Fraction of edge pixels in the rasterized page, in [0,1].
    pub edge_density: f32,
    pub text_length: usize,
    pub has_vector_markers: bool,
}

/// One pipeline output artifact. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedFile {
    pub page_number: u32,
    pub file_path: PathBuf,
    pub file_type: FileType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_length: Option<usize>,
}

/// Normalized per-document record, the unit exchanged between the document
/// processor and the batch layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub pdf_name: String,
    pub pdf_path: PathBuf,
    /// Absent when the document failed before classification.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub pdf_type: Option<PdfType>,
    pub total_pages: u32,
    pub processed_files: Vec<ProcessedFile>,
    /// Present for vector documents only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcessingResult {
    pub fn failed(pdf_name: String, pdf_path: &Path, reason: String) -> Self {
        Self {
            pdf_name,
            pdf_path: pdf_path.to_path_buf(),
            pdf_type: None,
            total_pages: 0,
            processed_files: Vec::new(),
            metadata: None,
            error: Some(reason),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total_pdfs: usize,
    pub successful_processing: usize,
    pub failed_processing: usize,
    /// Discovery order, stable regardless of completion order.
    pub results: Vec<ProcessingResult>,
}

impl BatchSummary {
    /// Single aggregation pass over the joined results; no shared counters.
    pub fn from_results(results: Vec<ProcessingResult>) -> Self {
        let successful_processing = results.iter().filter(|r| r.is_success()).count();
        Self {
            total_pdfs: results.len(),
            successful_processing,
            failed_processing: results.len() - successful_processing,
            results,
        }
    }
}
