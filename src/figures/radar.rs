//! Radar charts of median metric scores and relative-performance bars.
//!
//! One radar axis per metric; the radial value is the algorithm's median
//! score across the scene set, normalized by a hand-tuned per-axis maximum.
//! The maxima tables are benchmark constants; a length mismatch with the
//! metric set is a configuration error, not a data error.

use crate::algorithms::{algo_result, Algorithm};
use crate::config::Settings;
use crate::field::io::write_json_file;
use crate::metrics::regions::{
    bumpiness_contin_surf, bumpiness_planes, mae_contin_surf, mae_planes, Discontinuities,
    FineFattening, FineThinning,
};
use crate::metrics::stratified::stratified_metrics;
use crate::metrics::{BadPix, EvalInputs, Metric, Mse, Quantile, Runtime};
use crate::plotting::{path_to_figure, FigureCanvas};
use crate::scenes::Scene;
use plotters::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

const RADAR_SIZE: u32 = 900;
const BARS_W: u32 = 1100;
const BARS_H: u32 = 600;

/// Axis maxima for the stratified radar (base metrics + nine stratified).
const STRATIFIED_MAXIMA: [f32; 15] = [
    5.0, 16.0, 2.0, 120.0, 80.0, 40.0, 40.0, 8.0, 6.0, 6.0, 24.0, 128.0, 48.0, 64.0, 100.0,
];

/// Axis maxima for the photorealistic radar (base + region metrics).
const PHOTOREALISTIC_MAXIMA: [f32; 13] = [
    5.0, 12.0, 2.0, 128.0, 72.0, 32.0, 80.0, 80.0, 4.0, 4.0, 80.0, 16.0, 72.0,
];

fn base_metrics(log_runtime: bool) -> Vec<Box<dyn Metric>> {
    vec![
        Box::new(Runtime::new(log_runtime)),
        Box::new(Mse),
        Box::new(Quantile::new(25)),
        Box::new(BadPix::new(0.01)),
        Box::new(BadPix::new(0.03)),
        Box::new(BadPix::new(0.07)),
    ]
}

fn region_metrics() -> Vec<Box<dyn Metric>> {
    vec![
        Box::new(mae_planes()),
        Box::new(mae_contin_surf()),
        Box::new(bumpiness_planes()),
        Box::new(bumpiness_contin_surf()),
        Box::new(FineFattening),
        Box::new(FineThinning),
        Box::new(Discontinuities::new()),
    ]
}

/// Median score per (algorithm, metric) across the applicable scenes.
pub(crate) fn median_scores(
    settings: &Settings,
    algorithms: &[Algorithm],
    scenes: &[Scene],
    metrics: &[Box<dyn Metric>],
) -> Result<Vec<Vec<f32>>, String> {
    let mut collected: Vec<Vec<Vec<f32>>> =
        vec![vec![Vec::new(); metrics.len()]; algorithms.len()];
    for scene in scenes {
        let gt = scene.gt()?;
        for (ia, algorithm) in algorithms.iter().enumerate() {
            let result = algo_result(settings, scene, algorithm)?;
            let inputs = EvalInputs {
                settings,
                scene,
                algorithm,
            };
            for (im, metric) in metrics.iter().enumerate() {
                if !metric.applies_to(scene) {
                    continue;
                }
                collected[ia][im].push(metric.score(inputs, &result, &gt)?);
            }
        }
    }

    let mut medians = vec![vec![0.0f32; metrics.len()]; algorithms.len()];
    for (ia, per_metric) in collected.iter_mut().enumerate() {
        for (im, scores) in per_metric.iter_mut().enumerate() {
            if scores.is_empty() {
                return Err(format!(
                    "metric {} has no applicable scene in the given set",
                    metrics[im].name()
                ));
            }
            scores.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            let n = scores.len();
            medians[ia][im] = if n % 2 == 1 {
                scores[n / 2]
            } else {
                0.5 * (scores[n / 2 - 1] + scores[n / 2])
            };
        }
    }
    Ok(medians)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScoreTable {
    title: String,
    metrics: Vec<String>,
    maxima: Vec<f32>,
    scores: BTreeMap<String, Vec<f32>>,
}

/// Render one radar chart and a JSON score table next to it.
#[allow(clippy::too_many_arguments)]
pub fn plot(
    settings: &Settings,
    algorithms: &[Algorithm],
    scenes: &[Scene],
    metrics: &[Box<dyn Metric>],
    axis_labels: &[String],
    max_per_metric: &[f32],
    title: &str,
    fig_name: &str,
    subdir: &str,
) -> Result<PathBuf, String> {
    if metrics.len() != max_per_metric.len() || metrics.len() != axis_labels.len() {
        return Err(format!(
            "radar configuration error: {} metrics, {} maxima, {} labels",
            metrics.len(),
            max_per_metric.len(),
            axis_labels.len()
        ));
    }
    if metrics.len() < 3 {
        return Err("radar chart needs at least three axes".to_string());
    }

    let medians = median_scores(settings, algorithms, scenes, metrics)?;
    let n_axes = metrics.len();
    let angle = |k: usize| {
        // First axis at twelve o'clock, axes clockwise.
        std::f32::consts::FRAC_PI_2 - k as f32 * std::f32::consts::TAU / n_axes as f32
    };

    let mut canvas = FigureCanvas::new(RADAR_SIZE, RADAR_SIZE);
    canvas.render(|root| {
        let mut chart = ChartBuilder::on(root)
            .caption(title, ("sans-serif", 26))
            .margin(10)
            .build_cartesian_2d(-1.45f32..1.45f32, -1.45f32..1.45f32)?;

        // Rings and spokes form the polar scaffolding.
        for ring in [0.25f32, 0.5, 0.75, 1.0] {
            let pts: Vec<(f32, f32)> = (0..=n_axes)
                .map(|k| {
                    let a = angle(k % n_axes);
                    (ring * a.cos(), ring * a.sin())
                })
                .collect();
            chart.draw_series(std::iter::once(PathElement::new(pts, BLACK.mix(0.25))))?;
        }
        for k in 0..n_axes {
            let a = angle(k);
            chart.draw_series(std::iter::once(PathElement::new(
                vec![(0.0, 0.0), (a.cos(), a.sin())],
                BLACK.mix(0.25),
            )))?;
        }

        let label_style = ("sans-serif", 15)
            .into_font()
            .color(&BLACK)
            .pos(plotters::style::text_anchor::Pos::new(
                plotters::style::text_anchor::HPos::Center,
                plotters::style::text_anchor::VPos::Center,
            ));
        for (k, label) in axis_labels.iter().enumerate() {
            let a = angle(k);
            chart.draw_series(std::iter::once(Text::new(
                label.clone(),
                (1.22 * a.cos(), 1.22 * a.sin()),
                label_style.clone(),
            )))?;
        }

        for (ia, algorithm) in algorithms.iter().enumerate() {
            let color = Palette99::pick(ia);
            let mut pts: Vec<(f32, f32)> = medians[ia]
                .iter()
                .enumerate()
                .map(|(k, &score)| {
                    let r = (score / max_per_metric[k]).clamp(0.0, 1.0);
                    let a = angle(k);
                    (r * a.cos(), r * a.sin())
                })
                .collect();
            pts.push(pts[0]);

            chart.draw_series(std::iter::once(Polygon::new(
                pts.clone(),
                color.mix(0.12).filled(),
            )))?;
            chart
                .draw_series(std::iter::once(PathElement::new(
                    pts,
                    color.stroke_width(2),
                )))?
                .label(algorithm.display_name())
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

    let table = ScoreTable {
        title: title.to_string(),
        metrics: metrics.iter().map(|m| m.name()).collect(),
        maxima: max_per_metric.to_vec(),
        scores: algorithms
            .iter()
            .zip(&medians)
            .map(|(a, s)| (a.name().to_string(), s.clone()))
            .collect(),
    };
    write_json_file(
        &path.with_file_name(format!("{fig_name}_scores.json")),
        &table,
    )?;
    Ok(path)
}

/// Compare every algorithm's median score against the best of the remaining
/// algorithms, after excluding the `all_but` strongest competitors.
///
/// Bars show `log2(baseline / own)`: positive means the algorithm beats the
/// (possibly thinned) field.
pub fn compare_relative_performances(
    settings: &Settings,
    algorithms: &[Algorithm],
    scenes: &[Scene],
    metrics: &[Box<dyn Metric>],
    all_but: usize,
    subdir: &str,
) -> Result<PathBuf, String> {
    if algorithms.len() < all_but + 2 {
        return Err(format!(
            "relative comparison with all_but={} needs at least {} algorithms",
            all_but,
            all_but + 2
        ));
    }
    let medians = median_scores(settings, algorithms, scenes, metrics)?;
    let n_metrics = metrics.len();

    let mut values = vec![vec![0.0f32; n_metrics]; algorithms.len()];
    for im in 0..n_metrics {
        for ia in 0..algorithms.len() {
            let own = medians[ia][im];
            let mut others: Vec<f32> = (0..algorithms.len())
                .filter(|&j| j != ia)
                .map(|j| medians[j][im])
                .collect();
            others.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            let baseline = others[all_but];
            let eps = 1e-6f32;
            values[ia][im] = (baseline.max(eps) / own.max(eps)).log2().clamp(-2.0, 2.0);
        }
    }

    let metric_labels: Vec<String> = metrics.iter().map(|m| m.display_name()).collect();
    let n_algos = algorithms.len();

    let mut canvas = FigureCanvas::new(BARS_W, BARS_H);
    canvas.render(|root| {
        let caption = format!(
            "Relative performance vs. best of remaining (excluding top {all_but})"
        );
        let mut chart = ChartBuilder::on(root)
            .caption(caption, ("sans-serif", 22))
            .margin(10)
            .x_label_area_size(90)
            .y_label_area_size(55)
            .build_cartesian_2d(0f32..n_metrics as f32, -2f32..2f32)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n_metrics)
            .x_label_formatter(&|x| {
                let idx = x.floor() as usize;
                metric_labels.get(idx).cloned().unwrap_or_default()
            })
            .y_desc("log2(best of others / own score)")
            .draw()?;

        let slot = 1.0 / (n_algos as f32 + 1.0);
        for (ia, algorithm) in algorithms.iter().enumerate() {
            let color = Palette99::pick(ia);
            chart
                .draw_series(values[ia].iter().enumerate().map(|(im, &v)| {
                    let x0 = im as f32 + slot * (ia as f32 + 0.5);
                    let x1 = x0 + slot * 0.9;
                    Rectangle::new([(x0, 0.0), (x1, v)], color.filled())
                }))?
                .label(algorithm.display_name())
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled())
                });
        }

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
        Ok(())
    })?;

    let path = path_to_figure(
        settings,
        &format!("relative_performance_all_but_{all_but}"),
        subdir,
    );
    canvas.save(&path)?;
    Ok(path)
}

/// The full radar figure set: stratified chart, photorealistic chart, and
/// the two relative-performance comparisons.
pub fn plot_benchmark_charts(
    settings: &Settings,
    algorithms: &[Algorithm],
    log_runtime: bool,
    subdir: &str,
) -> Result<Vec<PathBuf>, String> {
    let mut paths = Vec::new();

    let stratified = crate::scenes::stratified_scenes(settings)?;
    let mut metrics = base_metrics(log_runtime);
    metrics.extend(stratified_metrics());
    let labels: Vec<String> = metrics.iter().map(|m| m.display_name()).collect();
    paths.push(plot(
        settings,
        algorithms,
        &stratified,
        &metrics,
        &labels,
        &STRATIFIED_MAXIMA,
        "Median Scores for Stratified Scenes",
        "radar_stratified",
        subdir,
    )?);

    let mut photorealistic = crate::scenes::training_scenes(settings)?;
    photorealistic.extend(crate::scenes::test_scenes(settings)?);
    let metrics: Vec<Box<dyn Metric>> = base_metrics(log_runtime)
        .into_iter()
        .chain(region_metrics())
        .collect();
    let labels: Vec<String> = metrics.iter().map(|m| m.display_name()).collect();
    paths.push(plot(
        settings,
        algorithms,
        &photorealistic,
        &metrics,
        &labels,
        &PHOTOREALISTIC_MAXIMA,
        "Median Scores for Test and Training Scenes",
        "radar_photorealistic",
        subdir,
    )?);

    let training = crate::scenes::training_scenes(settings)?;
    paths.push(compare_relative_performances(
        settings,
        algorithms,
        &training,
        &metrics,
        0,
        subdir,
    )?);
    paths.push(compare_relative_performances(
        settings,
        algorithms,
        &training,
        &metrics,
        1,
        subdir,
    )?);

    Ok(paths)
}
