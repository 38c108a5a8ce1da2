// Vector pipeline: document metadata once, then a text artifact per page
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::warn;

use crate::error::{Result, TriageError};
use crate::extract::{self, PdfFile};
use crate::types::{FileType, ProcessedFile};

pub struct VectorPipeline;

impl VectorPipeline {
    /// An empty page is legitimate: the artifact is still written and its
    /// content_length is 0. Only total failure escalates.
    pub fn process(
        &self,
        pdf: &PdfFile,
        out_dir: &Path,
    ) -> Result<(Vec<ProcessedFile>, BTreeMap<String, String>)> {
        let metadata = extract::document_metadata(pdf);
        let pages: Vec<u32> = pdf.page_numbers().collect();
        let mut processed = Vec::with_capacity(pages.len());
        for &page in &pages {
            match self.process_page(pdf, page, out_dir) {
                Ok(file) => processed.push(file),
                Err(e) => warn!(pdf = %pdf.name, page, error = %e, "text page skipped"),
            }
        }
        if processed.is_empty() && !pages.is_empty() {
            return Err(TriageError::DocumentFailure(format!(
                "all {} text pages failed",
                pages.len()
            )));
        }
        Ok((processed, metadata))
    }

    fn process_page(&self, pdf: &PdfFile, page: u32, out_dir: &Path) -> Result<ProcessedFile> {
        let text = extract::page_text(pdf, page)?;
        let file_path = out_dir.join(format!("page_{page}_text.txt"));
        fs::write(&file_path, &text)?;
        Ok(ProcessedFile {
            page_number: page,
            file_path,
            file_type: FileType::Text,
            content_length: Some(text.chars().count()),
        })
    }
}
