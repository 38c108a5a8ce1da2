// Raster pipeline: edge-detect and binarize every page image
use std::path::Path;

use tracing::warn;

use crate::config::PipelineConfig;
use crate::error::{Result, TriageError};
use crate::extract::PdfFile;
use crate::imaging;
use crate::raster::PageRasterAdapter;
use crate::types::{FileType, ProcessedFile};

pub struct RasterPipeline<'a> {
    config: &'a PipelineConfig,
    rasterizer: &'a dyn PageRasterAdapter,
}

impl<'a> RasterPipeline<'a> {
    pub fn new(config: &'a PipelineConfig, rasterizer: &'a dyn PageRasterAdapter) -> Self {
        Self { config, rasterizer }
    }

    /// Pages are processed independently; a failed page leaves a gap and is
    /// logged. Only total failure escalates to a document failure.
    pub fn process(&self, pdf: &PdfFile, out_dir: &Path) -> Result<Vec<ProcessedFile>> {
        let pages: Vec<u32> = match self.config.max_pages {
            Some(cap) => pdf.page_numbers().take(cap as usize).collect(),
            None => pdf.page_numbers().collect(),
        };
        let mut processed = Vec::with_capacity(pages.len());
        for &page in &pages {
            match self.process_page(pdf, page, out_dir) {
                Ok(file) => processed.push(file),
                Err(e) => warn!(pdf = %pdf.name, page, error = %e, "raster page skipped"),
            }
        }
        if processed.is_empty() && !pages.is_empty() {
            return Err(TriageError::DocumentFailure(format!(
                "all {} raster pages failed",
                pages.len()
            )));
        }
        Ok(processed)
    }

    fn process_page(&self, pdf: &PdfFile, page: u32, out_dir: &Path) -> Result<ProcessedFile> {
        let raster = self.rasterizer.render(pdf, page, self.config.render_dpi)?;
        let edges = imaging::edge_map(&raster);
        let binary = imaging::binarize(&edges);
        let file_path = out_dir.join(format!("page_{page}_processed.png"));
        binary.save(&file_path)?;
        Ok(ProcessedFile {
            page_number: page,
            file_path,
            file_type: FileType::Image,
            content_length: None,
        })
    }
}
