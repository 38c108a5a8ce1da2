// Raster/vector classification over sampled pages
use tracing::debug;

use crate::config::DetectorConfig;
use crate::error::{Result, TriageError};
use crate::extract::{self, PdfFile};
use crate::imaging;
use crate::raster::PageRasterAdapter;
use crate::types::{DetectionSignal, PdfType};

/// Classification outcome. Confidence is advisory only; downstream routing
/// is purely type-driven.
#[derive(Debug, Clone, Copy)]
pub struct Classification {
    pub pdf_type: PdfType,
    pub confidence: f32,
}

pub struct TypeDetector<'a> {
    config: &'a DetectorConfig,
    rasterizer: &'a dyn PageRasterAdapter,
}

impl<'a> TypeDetector<'a> {
    pub fn new(config: &'a DetectorConfig, rasterizer: &'a dyn PageRasterAdapter) -> Self {
        Self { config, rasterizer }
    }

    /// Sample the leading pages, measure each, and combine document-wide.
    /// Fails with `Detection` only when no sampled page can be rasterized.
    pub fn classify(&self, pdf: &PdfFile) -> Result<Classification> {
        let sampled: Vec<u32> = pdf
            .page_numbers()
            .take(self.config.sample_pages.max(1) as usize)
            .collect();
        if sampled.is_empty() {
            return Err(TriageError::Detection {
                path: pdf.path.clone(),
                reason: "document has no pages".to_string(),
            });
        }

        // Text and structure signals are independent of rasterization and
        // still count for pages whose render fails.
        let mut signals: Vec<DetectionSignal> = Vec::with_capacity(sampled.len());
        let mut total_text = 0usize;
        let mut vector_markers = false;
        for &page in &sampled {
            let text_length = extract::page_text(pdf, page)
                .map(|t| t.trim().chars().count())
                .unwrap_or(0);
            total_text += text_length;
            let has_vector_markers = extract::page_has_fonts(pdf, page);
            vector_markers |= has_vector_markers;

            match self.rasterizer.render(pdf, page, self.config.detect_dpi) {
                Ok(raster) => {
                    let edge_density = imaging::edge_density(&imaging::edge_map(&raster));
                    signals.push(DetectionSignal {
                        edge_density,
                        text_length,
                        has_vector_markers,
                    });
                }
                Err(e) => debug!(pdf = %pdf.name, page, error = %e, "detection render failed"),
            }
        }

        if signals.is_empty() {
            return Err(TriageError::Detection {
                path: pdf.path.clone(),
                reason: format!("no sampled page out of {} could be rasterized", sampled.len()),
            });
        }

        let mean_density =
            signals.iter().map(|s| s.edge_density).sum::<f32>() / signals.len() as f32;
        let classification = decide(self.config, mean_density, total_text, vector_markers);
        debug!(
            pdf = %pdf.name,
            pdf_type = %classification.pdf_type,
            confidence = classification.confidence,
            mean_density,
            total_text,
            vector_markers,
            "classified"
        );
        Ok(classification)
    }
}

/// The decision rule. Dense edges with no real text layer read as scanned;
/// a substantial text layer or font markers read as vector; the ambiguous
/// band falls back to the dominant normalized signal, ties to vector.
fn decide(
    config: &DetectorConfig,
    mean_density: f32,
    total_text: usize,
    vector_markers: bool,
) -> Classification {
    if mean_density > config.high_edge_density && total_text < config.low_text_threshold {
        let margin = (mean_density - config.high_edge_density) / config.high_edge_density;
        return Classification {
            pdf_type: PdfType::Raster,
            confidence: margin.clamp(0.0, 1.0),
        };
    }

    if total_text >= config.min_text_threshold || vector_markers {
        let confidence = if vector_markers {
            1.0
        } else {
            let min = config.min_text_threshold as f32;
            ((total_text as f32 - min) / min).clamp(0.0, 1.0)
        };
        return Classification {
            pdf_type: PdfType::Vector,
            confidence,
        };
    }

    let density_score = (mean_density / config.high_edge_density).clamp(0.0, 1.0);
    let text_score = (total_text as f32 / config.min_text_threshold as f32).clamp(0.0, 1.0);
    if density_score > text_score {
        Classification {
            pdf_type: PdfType::Raster,
            confidence: (density_score - text_score).clamp(0.0, 1.0),
        }
    } else {
        // ties land here and default to vector
        Classification {
            pdf_type: PdfType::Vector,
            confidence: (text_score - density_score).clamp(0.0, 1.0),
        }
    }
}
