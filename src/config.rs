// Tunable thresholds and runtime settings
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TriageConfig {
    #[serde(default)]
    pub detector: DetectorConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}

impl TriageConfig {
    /// Load from a TOML file; absent fields fall back to their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}

/// Detection heuristic thresholds. `low_text_threshold` must stay at or
/// below `min_text_threshold`: the band between them is the ambiguous zone
/// resolved by the dominant-signal fallback.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DetectorConfig {
    /// Pages sampled from the front of the document. Type is a document-level
    /// property, so sampling everything buys nothing.
    #[serde(default = "default_sample_pages")]
    pub sample_pages: u32,
    /// DPI for detection renders. Edge density is scale-relative, so this
    /// stays low.
    #[serde(default = "default_detect_dpi")]
    pub detect_dpi: u32,
    /// Mean edge density above this reads as scanned content.
    #[serde(default = "default_high_edge_density")]
    pub high_edge_density: f32,
    /// Total sampled text below this counts as "no text layer".
    #[serde(default = "default_low_text_threshold")]
    pub low_text_threshold: usize,
    /// Total sampled text at or above this is decisive for vector.
    #[serde(default = "default_min_text_threshold")]
    pub min_text_threshold: usize,
}

fn default_sample_pages() -> u32 {
    3
}
fn default_detect_dpi() -> u32 {
    72
}
fn default_high_edge_density() -> f32 {
    0.08
}
fn default_low_text_threshold() -> usize {
    64
}
fn default_min_text_threshold() -> usize {
    200
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            sample_pages: default_sample_pages(),
            detect_dpi: default_detect_dpi(),
            high_edge_density: default_high_edge_density(),
            low_text_threshold: default_low_text_threshold(),
            min_text_threshold: default_min_text_threshold(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// DPI for full-resolution artifact renders.
    #[serde(default = "default_render_dpi")]
    pub render_dpi: u32,
    /// Cap on the pages the raster pipeline attempts; unset processes all.
    /// The vector pipeline always covers every page.
    #[serde(default)]
    pub max_pages: Option<u32>,
}

fn default_render_dpi() -> u32 {
    150
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            render_dpi: default_render_dpi(),
            max_pages: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BatchConfig {
    /// Worker pool size, one in-flight document per worker.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
        }
    }
}
