//! Bad-pixel-rate curves over a sweep of error thresholds.
//!
//! For every algorithm the routine averages, per threshold, the fraction of
//! pixels whose absolute disparity error exceeds it across the scene set.
//! Scores can be cached as JSON keyed by algorithm so regenerating the
//! figure does not re-read every disparity map.

use crate::algorithms::{algo_result, Algorithm};
use crate::config::Settings;
use crate::field::io::write_json_file;
use crate::plotting::{path_to_figure, FigureCanvas};
use crate::scenes::Scene;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// Threshold sweep: `SERIES_STEPS` points over [MIN, MAX].
const THRESH_MIN: f32 = 0.01;
const THRESH_MAX: f32 = 0.2;
const SERIES_STEPS: usize = 40;

const FIG_W: u32 = 1100;
const FIG_H: u32 = 700;

#[derive(Clone, Copy, Debug, Default)]
pub struct SeriesOptions {
    /// Reuse per-algorithm score vectors from the JSON cache when present.
    pub with_cached_scores: bool,
    /// Count missing (NaN) result pixels as bad instead of dropping them.
    pub penalize_missing_pixels: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeriesCache {
    thresholds: Vec<f32>,
    penalize_missing_pixels: bool,
    scores: BTreeMap<String, Vec<f32>>,
}

fn thresholds() -> Vec<f32> {
    (0..SERIES_STEPS)
        .map(|i| THRESH_MIN + i as f32 * (THRESH_MAX - THRESH_MIN) / (SERIES_STEPS - 1) as f32)
        .collect()
}

/// Mean bad-pixel percentage per threshold for one algorithm over the set.
fn algorithm_series(
    settings: &Settings,
    algorithm: &Algorithm,
    scenes: &[Scene],
    thresholds: &[f32],
    penalize_missing: bool,
) -> Result<Vec<f32>, String> {
    let mut sums = vec![0.0f64; thresholds.len()];
    for scene in scenes {
        let gt = scene.gt()?;
        let result = algo_result(settings, scene, algorithm)?;
        let diff = result.abs_diff(&gt)?;

        let mut errs: Vec<f32> = Vec::with_capacity(diff.data.len());
        let mut missing = 0usize;
        for i in 0..diff.data.len() {
            if !gt.data[i].is_finite() {
                continue;
            }
            if diff.data[i].is_nan() {
                missing += 1;
            } else {
                errs.push(diff.data[i]);
            }
        }
        errs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let denom = errs.len() + if penalize_missing { missing } else { 0 };
        if denom == 0 {
            return Err(format!("scene {} has no measurable pixels", scene.name()));
        }
        for (k, &t) in thresholds.iter().enumerate() {
            let good = errs.partition_point(|&e| e <= t);
            let mut bad = errs.len() - good;
            if penalize_missing {
                bad += missing;
            }
            sums[k] += 100.0 * bad as f64 / denom as f64;
        }
    }
    Ok(sums
        .into_iter()
        .map(|s| (s / scenes.len() as f64) as f32)
        .collect())
}

/// Render one bad-pixel-rate series figure and return the written path.
pub fn plot(
    settings: &Settings,
    algorithms: &[Algorithm],
    scenes: &[Scene],
    options: SeriesOptions,
    title: &str,
    subdir: &str,
    fig_name: &str,
) -> Result<PathBuf, String> {
    if algorithms.is_empty() || scenes.is_empty() {
        return Err("bad-pixel series needs algorithms and scenes".to_string());
    }
    let thresholds = thresholds();
    let cache_path = settings.cache_dir.join(format!("{fig_name}.json"));

    let mut cache = SeriesCache::default();
    if options.with_cached_scores && cache_path.exists() {
        let data = fs::read_to_string(&cache_path)
            .map_err(|e| format!("Failed to read cache {}: {e}", cache_path.display()))?;
        let loaded: SeriesCache = serde_json::from_str(&data)
            .map_err(|e| format!("Failed to parse cache {}: {e}", cache_path.display()))?;
        if loaded.thresholds == thresholds
            && loaded.penalize_missing_pixels == options.penalize_missing_pixels
        {
            cache = loaded;
        } else {
            log::debug!("score cache {} is stale, recomputing", cache_path.display());
        }
    }

    let mut computed_any = false;
    let mut series: Vec<(String, Vec<f32>)> = Vec::with_capacity(algorithms.len());
    for algorithm in algorithms {
        let scores = match cache.scores.get(algorithm.name()) {
            Some(cached) => {
                log::debug!("using cached series for {}", algorithm.name());
                cached.clone()
            }
            None => {
                let scores = algorithm_series(
                    settings,
                    algorithm,
                    scenes,
                    &thresholds,
                    options.penalize_missing_pixels,
                )?;
                cache
                    .scores
                    .insert(algorithm.name().to_string(), scores.clone());
                computed_any = true;
                scores
            }
        };
        series.push((algorithm.display_name().to_string(), scores));
    }

    if computed_any {
        cache.thresholds = thresholds.clone();
        cache.penalize_missing_pixels = options.penalize_missing_pixels;
        write_json_file(&cache_path, &cache)?;
    }

    let mut canvas = FigureCanvas::new(FIG_W, FIG_H);
    canvas.render(|root| {
        let mut chart = ChartBuilder::on(root)
            .caption(title, ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(45)
            .y_label_area_size(55)
            .build_cartesian_2d(0f32..THRESH_MAX, 0f32..100f32)?;

        chart
            .configure_mesh()
            .x_desc("Disparity error threshold")
            .y_desc("Bad pixels (%)")
            .draw()?;

        for (i, (name, scores)) in series.iter().enumerate() {
            let color = Palette99::pick(i);
            chart
                .draw_series(LineSeries::new(
                    thresholds.iter().copied().zip(scores.iter().copied()),
                    color.stroke_width(2),
                ))?
                .label(name.clone())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });
        }

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
        Ok(())
    })?;

    let path = path_to_figure(settings, fig_name, subdir);
    canvas.save(&path)?;
    Ok(path)
}
