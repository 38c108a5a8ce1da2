// Batch orchestration: a bounded worker pool over a discovered document set
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::TriageConfig;
use crate::error::Result;
use crate::extract::pdf_stem;
use crate::processor::DocumentProcessor;
use crate::types::{BatchSummary, ProcessingResult};

pub const SUMMARY_FILE: &str = "processing_results.json";

pub struct BatchOrchestrator {
    processor: Arc<DocumentProcessor>,
    workers: usize,
}

impl BatchOrchestrator {
    pub fn new(config: TriageConfig) -> Self {
        let workers = config.batch.workers.max(1);
        Self {
            processor: Arc::new(DocumentProcessor::new(config)),
            workers,
        }
    }

    /// PDFs under the input directory in lexicographic filename order, the
    /// stable discovery order that the summary preserves.
    pub fn discover(input_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut pdfs = Vec::new();
        for entry in fs::read_dir(input_dir)? {
            let path = entry?.path();
            let is_pdf = path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("pdf"))
                .unwrap_or(false);
            if path.is_file() && is_pdf {
                pdfs.push(path);
            }
        }
        pdfs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(pdfs)
    }

    /// Runs every discovered document under the pool and writes
    /// `processing_results.json` after all workers join. Per-document
    /// failures are data in the summary; only batch-infrastructure errors
    /// (output root, summary write) abort the run.
    pub async fn run(&self, input_dir: &Path, out_dir: &Path) -> Result<BatchSummary> {
        fs::create_dir_all(out_dir)?;
        let documents = Self::discover(input_dir)?;
        info!(total = documents.len(), workers = self.workers, "batch started");

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut handles: Vec<(PathBuf, JoinHandle<ProcessingResult>)> =
            Vec::with_capacity(documents.len());
        for pdf_path in &documents {
            let semaphore = semaphore.clone();
            let processor = self.processor.clone();
            let path = pdf_path.clone();
            // Each worker owns its document's subdirectory exclusively.
            let doc_out = out_dir.join(pdf_stem(pdf_path));
            let handle = tokio::spawn(async move {
                // acquire only fails once the semaphore is closed, which
                // this orchestrator never does
                let _permit = semaphore.acquire_owned().await.ok();
                let worker_path = path.clone();
                match tokio::task::spawn_blocking(move || processor.run(&worker_path, &doc_out))
                    .await
                {
                    Ok(result) => result,
                    Err(e) => ProcessingResult::failed(
                        pdf_stem(&path),
                        &path,
                        format!("worker terminated: {e}"),
                    ),
                }
            });
            handles.push((pdf_path.clone(), handle));
        }

        // Awaiting in submission order reassembles completion-ordered work
        // back into discovery order.
        let mut results = Vec::with_capacity(handles.len());
        for (pdf_path, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => ProcessingResult::failed(
                    pdf_stem(&pdf_path),
                    &pdf_path,
                    format!("worker terminated: {e}"),
                ),
            };
            results.push(result);
        }

        let summary = BatchSummary::from_results(results);
        let summary_path = out_dir.join(SUMMARY_FILE);
        fs::write(&summary_path, serde_json::to_vec_pretty(&summary)?)?;
        info!(
            total = summary.total_pdfs,
            ok = summary.successful_processing,
            failed = summary.failed_processing,
            summary = %summary_path.display(),
            "batch finished"
        );
        Ok(summary)
    }
}
