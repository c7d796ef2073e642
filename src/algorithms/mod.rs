//! Algorithm handles and precomputed-result lookup.
//!
//! An `Algorithm` is a name into the results directory plus a display label;
//! it owns no data. Results are disparity PFMs precomputed by the benchmark
//! submission pipeline. The per-pixel median baseline is materialized into
//! the same results tree so every consumer can fetch it through the one
//! `algo_result` path.

use crate::config::Settings;
use crate::field::io::{read_pfm, write_pfm};
use crate::field::DispField;
use crate::scenes::Scene;
use std::fs;
use std::path::PathBuf;

/// Result-directory key of the materialized per-pixel median baseline.
pub const PER_PIX_MEDIAN: &str = "per_pix_median";

/// A disparity-estimation method under comparison.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Algorithm {
    name: String,
    display_name: String,
}

impl Algorithm {
    pub fn new(name: &str, display_name: &str) -> Self {
        Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
        }
    }

    /// The pixel-wise median-of-all-algorithms baseline.
    pub fn per_pix_median() -> Self {
        Self::new(PER_PIX_MEDIAN, "PerPixMedian")
    }

    /// Key used to locate results on disk.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Label used in titles and legends.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

fn result_path(settings: &Settings, scene: &Scene, algorithm: &Algorithm) -> PathBuf {
    settings
        .results_dir
        .join(algorithm.name())
        .join("disp_maps")
        .join(format!("{}.pfm", scene.name()))
}

/// Fetch the precomputed disparity field for `(scene, algorithm)`.
pub fn algo_result(
    settings: &Settings,
    scene: &Scene,
    algorithm: &Algorithm,
) -> Result<DispField, String> {
    read_pfm(&result_path(settings, scene, algorithm))
}

/// Reported runtime for `(scene, algorithm)` in seconds.
pub fn runtime_seconds(
    settings: &Settings,
    scene: &Scene,
    algorithm: &Algorithm,
) -> Result<f32, String> {
    let path = settings
        .results_dir
        .join(algorithm.name())
        .join("runtimes")
        .join(format!("{}.txt", scene.name()));
    let text =
        fs::read_to_string(&path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    text.trim()
        .parse::<f32>()
        .map_err(|e| format!("Invalid runtime in {}: {e}", path.display()))
}

/// Pixel-wise median across the given algorithm results.
///
/// NaN entries are ignored per pixel; a pixel no algorithm estimated stays
/// NaN. An even number of contributors averages the middle pair.
pub fn compute_per_pix_median(
    settings: &Settings,
    scene: &Scene,
    algorithms: &[Algorithm],
) -> Result<DispField, String> {
    if algorithms.is_empty() {
        return Err("per-pixel median needs at least one algorithm".to_string());
    }
    let mut results: Vec<DispField> = Vec::with_capacity(algorithms.len());
    for algorithm in algorithms {
        let r = algo_result(settings, scene, algorithm)?;
        if let Some(first) = results.first() {
            if first.w != r.w || first.h != r.h {
                return Err(format!(
                    "result shape mismatch for {} on {}: {}x{} vs {}x{}",
                    algorithm.name(),
                    scene.name(),
                    r.w,
                    r.h,
                    first.w,
                    first.h
                ));
            }
        }
        results.push(r);
    }

    let w = results[0].w;
    let h = results[0].h;
    let mut median = DispField::filled(w, h, f32::NAN);
    let mut stack: Vec<f32> = Vec::with_capacity(results.len());
    for i in 0..w * h {
        stack.clear();
        stack.extend(results.iter().map(|r| r.data[i]).filter(|v| v.is_finite()));
        if stack.is_empty() {
            continue;
        }
        stack.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let n = stack.len();
        median.data[i] = if n % 2 == 1 {
            stack[n / 2]
        } else {
            0.5 * (stack[n / 2 - 1] + stack[n / 2])
        };
    }
    Ok(median)
}

/// Materialize the per-pixel median baseline for the given scenes.
///
/// Existing result files are reused; the computation runs only for scenes
/// whose baseline is missing.
pub fn ensure_per_pix_median(
    settings: &Settings,
    scenes: &[Scene],
    algorithms: &[Algorithm],
) -> Result<(), String> {
    let median_algo = Algorithm::per_pix_median();
    for scene in scenes {
        let path = result_path(settings, scene, &median_algo);
        if path.exists() {
            log::debug!("per-pixel median for {} already cached", scene.name());
            continue;
        }
        log::info!("computing per-pixel median for {}", scene.name());
        let median = compute_per_pix_median(settings, scene, algorithms)?;
        write_pfm(&median, &path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack_settings(results: &[(&str, Vec<f32>)]) -> (Settings, Scene, Vec<Algorithm>) {
        let root = std::env::temp_dir().join(format!(
            "depth_figures_median_{}",
            std::process::id() as usize + results.len()
        ));
        let settings = Settings {
            results_dir: root.join("algo_results"),
            data_dir: root.join("data"),
            figures_dir: root.join("figures"),
            cache_dir: root.join("cache"),
        };
        let scene = Scene::new(
            "cotton",
            crate::scenes::SceneCategory::Training,
            &settings.data_dir.join("training/cotton"),
        );
        let mut algorithms = Vec::new();
        for (name, data) in results {
            let field = DispField::from_vec(2, 2, data.clone()).unwrap();
            let algo = Algorithm::new(name, name);
            write_pfm(
                &field,
                &settings
                    .results_dir
                    .join(name)
                    .join("disp_maps")
                    .join("cotton.pfm"),
            )
            .unwrap();
            algorithms.push(algo);
        }
        (settings, scene, algorithms)
    }

    #[test]
    fn median_of_three_is_middle_value() {
        let (settings, scene, algos) = stack_settings(&[
            ("a", vec![1.0, 0.0, 5.0, -1.0]),
            ("b", vec![2.0, 0.5, 6.0, 0.0]),
            ("c", vec![3.0, 1.0, 4.0, 1.0]),
        ]);
        let m = compute_per_pix_median(&settings, &scene, &algos).unwrap();
        assert_eq!(m.data, vec![2.0, 0.5, 5.0, 0.0]);
    }

    #[test]
    fn median_ignores_nan_and_averages_even_stacks() {
        let (settings, scene, algos) = stack_settings(&[
            ("d", vec![1.0, f32::NAN, f32::NAN, 2.0]),
            ("e", vec![3.0, f32::NAN, 1.0, 4.0]),
        ]);
        let m = compute_per_pix_median(&settings, &scene, &algos).unwrap();
        assert_eq!(m.data[0], 2.0, "even stack averages the middle pair");
        assert!(m.data[1].is_nan(), "all-NaN pixel stays NaN");
        assert_eq!(m.data[2], 1.0, "NaN contributors are ignored");
        assert_eq!(m.data[3], 3.0);
    }
}
