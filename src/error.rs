// Error taxonomy for detection, pipelines and the batch layer
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    /// No sampled page produced a usable detection signal.
    #[error("type detection failed for {path}: {reason}")]
    Detection { path: PathBuf, reason: String },

    /// Single-page rasterization failure. Recoverable: the page is skipped.
    #[error("render failed for page {page}: {reason}")]
    Render { page: u32, reason: String },

    /// Single-page text or metadata failure. Recoverable: the page is skipped.
    #[error("extraction failed for page {page}: {reason}")]
    Extraction { page: u32, reason: String },

    /// Every page of a document failed, or it never classified. The only
    /// kind that reaches a ProcessingResult's error field.
    #[error("document failed: {0}")]
    DocumentFailure(String),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TriageError>;
