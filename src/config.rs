//! Directory layout and run configuration.
//!
//! `Settings` locates the benchmark data on disk and is passed by reference
//! into every figure operation; there is no global state. `RunConfig` is the
//! JSON file consumed by the `paper_figures` binary.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Benchmark directory layout.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Scene data: `<data_dir>/<category>/<scene>/`.
    pub data_dir: PathBuf,
    /// Precomputed algorithm results: `<results_dir>/<algo>/disp_maps/`.
    pub results_dir: PathBuf,
    /// Output tree for rendered figures.
    pub figures_dir: PathBuf,
    /// Cached intermediate scores (bad-pixel series).
    pub cache_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            results_dir: PathBuf::from("algo_results"),
            figures_dir: PathBuf::from("figures"),
            cache_dir: PathBuf::from("cache"),
        }
    }
}

/// Run description for the `paper_figures` binary.
#[derive(Debug, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub settings: Settings,
    /// Algorithms to compare, in display order.
    pub algorithms: Vec<AlgorithmConfig>,
    #[serde(default)]
    pub options: RunOptions,
}

#[derive(Debug, Deserialize)]
pub struct AlgorithmConfig {
    /// Key into the results directory.
    pub name: String,
    /// Label used in figure titles and legends.
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RunOptions {
    pub with_cached_scores: bool,
    pub penalize_missing_pixels: bool,
    pub log_runtime: bool,
    /// Scene used for the discontinuity close-up, if any.
    pub discont_scene: Option<String>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            with_cached_scores: false,
            penalize_missing_pixels: false,
            log_runtime: true,
            discont_scene: None,
        }
    }
}

pub fn load_config(path: &Path) -> Result<RunConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}
