// pdftriage: classify PDFs as raster- or vector-dominant and route each
// through the matching extraction pipeline
pub mod batch;
pub mod config;
pub mod detect;
pub mod error;
pub mod extract;
pub mod imaging;
pub mod pipeline;
pub mod processor;
pub mod raster;
pub mod types;

pub use batch::{BatchOrchestrator, SUMMARY_FILE};
pub use config::TriageConfig;
pub use detect::{Classification, TypeDetector};
pub use error::{Result, TriageError};
pub use extract::PdfFile;
pub use processor::DocumentProcessor;
pub use raster::{EmbeddedImageRasterizer, PageRasterAdapter};
pub use types::{BatchSummary, FileType, PdfType, ProcessedFile, ProcessingResult};
