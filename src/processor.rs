// Per-document orchestration: classify, dispatch, package
use std::fs;
use std::path::Path;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::TriageConfig;
use crate::detect::TypeDetector;
use crate::error::Result;
use crate::extract::{pdf_stem, PdfFile};
use crate::pipeline::{RasterPipeline, VectorPipeline};
use crate::raster::{EmbeddedImageRasterizer, PageRasterAdapter};
use crate::types::{PdfType, ProcessingResult};

pub struct DocumentProcessor {
    config: TriageConfig,
    rasterizer: Box<dyn PageRasterAdapter>,
}

impl DocumentProcessor {
    pub fn new(config: TriageConfig) -> Self {
        Self::with_rasterizer(config, Box::new(EmbeddedImageRasterizer))
    }

    /// Substitute the rendering backend; detection and both pipelines go
    /// through the same adapter.
    pub fn with_rasterizer(config: TriageConfig, rasterizer: Box<dyn PageRasterAdapter>) -> Self {
        Self { config, rasterizer }
    }

    /// Never fails at the document level: load, classification and pipeline
    /// failures all come back as a ProcessingResult carrying an error, so
    /// the batch layer keeps going regardless of one document's fate.
    pub fn run(&self, pdf_path: &Path, out_dir: &Path) -> ProcessingResult {
        let started = Instant::now();
        debug!(pdf = %pdf_path.display(), "processing document");
        match self.try_run(pdf_path, out_dir) {
            Ok(result) => {
                info!(
                    pdf = %result.pdf_name,
                    pdf_type = %result.pdf_type.map(|t| t.to_string()).unwrap_or_default(),
                    pages = result.processed_files.len(),
                    total_pages = result.total_pages,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "document processed"
                );
                result
            }
            Err(e) => {
                let pdf_name = pdf_stem(pdf_path);
                warn!(
                    pdf = %pdf_name,
                    error = %e,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "document failed"
                );
                ProcessingResult::failed(pdf_name, pdf_path, e.to_string())
            }
        }
    }

    fn try_run(&self, pdf_path: &Path, out_dir: &Path) -> Result<ProcessingResult> {
        fs::create_dir_all(out_dir)?;
        let pdf = PdfFile::load(pdf_path)?;
        let total_pages = pdf.page_count();

        let detector = TypeDetector::new(&self.config.detector, self.rasterizer.as_ref());
        let classification = detector.classify(&pdf)?;

        // The type is decided exactly once; dispatch is exhaustive.
        let (processed_files, metadata) = match classification.pdf_type {
            PdfType::Raster => {
                let pipeline = RasterPipeline::new(&self.config.pipeline, self.rasterizer.as_ref());
                (pipeline.process(&pdf, out_dir)?, None)
            }
            PdfType::Vector => {
                let (files, metadata) = VectorPipeline.process(&pdf, out_dir)?;
                (files, Some(metadata))
            }
        };

        Ok(ProcessingResult {
            pdf_name: pdf.name.clone(),
            pdf_path: pdf_path.to_path_buf(),
            pdf_type: Some(classification.pdf_type),
            total_pages,
            processed_files,
            metadata,
            error: None,
        })
    }
}
