//! Shared multi-algorithm overview grids.
//!
//! `plot_general_overview` tiles metric heat maps: one block of rows per
//! scene (one row per metric), one column per algorithm, a leading
//! reference column and a trailing colorbar column. `plot_normals` tiles
//! surface-normal renderings with the ground truth in the leading column.

use crate::algorithms::{algo_result, Algorithm};
use crate::config::Settings;
use crate::metrics::{EvalInputs, Metric};
use crate::plotting::colormap::metric_args;
use crate::plotting::grid::GridLayout;
use crate::plotting::panels::{draw_colorbar, draw_rgb_panel, draw_scalar_panel, draw_title, draw_ylabel};
use crate::plotting::{colorbar_geometry, path_to_figure, FigureCanvas};
use crate::scenes::Scene;
use std::path::PathBuf;

/// Metric overview grid for a fixed metric subset.
pub fn plot_general_overview(
    settings: &Settings,
    algorithms: &[Algorithm],
    scenes: &[Scene],
    metrics: &[Box<dyn Metric>],
    fig_name: &str,
    subdir: &str,
) -> Result<PathBuf, String> {
    if scenes.is_empty() || algorithms.is_empty() || metrics.is_empty() {
        return Err("metric overview needs scenes, algorithms and metrics".to_string());
    }
    let fs = 13u32;
    let gt0 = scenes[0].gt()?;
    let rows = scenes.len() * metrics.len();
    let cols = algorithms.len() + 2;
    let layout = GridLayout::new(rows, cols, gt0.w as u32, gt0.h as u32)
        .with_row_band(fs + 8)
        .with_left_band(fs + 10)
        .with_gaps(4, 4);
    let (cb_h, cb_w) = colorbar_geometry(gt0.w as u32, gt0.h as u32);

    let (fig_w, fig_h) = layout.fig_size();
    let mut canvas = FigureCanvas::new(fig_w, fig_h);
    canvas.render(|root| {
        for (idx_s, scene) in scenes.iter().enumerate() {
            let gt = scene.gt()?;
            let center_view = scene.center_view()?;

            for (idx_m, metric) in metrics.iter().enumerate() {
                let row = idx_s * metrics.len() + idx_m;
                let row_cell = row * cols;
                let is_top = row == 0;

                if idx_m == 0 {
                    draw_rgb_panel(root, layout.cell_origin(row_cell), &center_view)?;
                    if is_top {
                        draw_title(root, layout.title_anchor(row_cell), "Scene", fs)?;
                    }
                }
                draw_ylabel(
                    root,
                    layout.ylabel_anchor(row_cell),
                    &metric.display_name(),
                    fs,
                )?;

                let mask = metric.evaluation_mask(scene)?;
                let args = metric_args(metric.as_ref());
                for (idx_a, algorithm) in algorithms.iter().enumerate() {
                    let result = algo_result(settings, scene, algorithm)?;
                    let inputs = EvalInputs {
                        settings,
                        scene,
                        algorithm,
                    };
                    let (score, vis) = metric.score_with_vis(inputs, &result, &gt, &mask)?;
                    log::debug!(
                        "{}: {} on {} = {:.2}",
                        fig_name,
                        metric.name(),
                        algorithm.name(),
                        score
                    );

                    let cell = row_cell + idx_a + 1;
                    draw_scalar_panel(root, layout.cell_origin(cell), &vis, &args)?;
                    if is_top {
                        draw_title(root, layout.title_anchor(cell), algorithm.display_name(), fs)?;
                    }
                }

                draw_colorbar(
                    root,
                    layout.cell_origin(row_cell + cols - 1),
                    cb_h,
                    cb_w,
                    &args,
                    4,
                    fs,
                )?;
            }
        }
        Ok(())
    })?;

    let path = path_to_figure(settings, fig_name, subdir);
    canvas.save(&path)?;
    Ok(path)
}

/// Surface-normal overview: ground truth next to every algorithm's normals.
pub fn plot_normals(
    settings: &Settings,
    algorithms: &[Algorithm],
    scenes: &[Scene],
    subdir: &str,
) -> Result<PathBuf, String> {
    if scenes.is_empty() || algorithms.is_empty() {
        return Err("normals overview needs scenes and algorithms".to_string());
    }
    let fs = 13u32;
    let gt0 = scenes[0].gt()?;
    let rows = scenes.len();
    let cols = algorithms.len() + 1;
    let layout = GridLayout::new(rows, cols, gt0.w as u32, gt0.h as u32)
        .with_row_band(fs + 8)
        .with_left_band(fs + 10)
        .with_gaps(4, 4);

    let (fig_w, fig_h) = layout.fig_size();
    let mut canvas = FigureCanvas::new(fig_w, fig_h);
    canvas.render(|root| {
        for (idx_s, scene) in scenes.iter().enumerate() {
            let gt = scene.gt()?;
            let row_cell = idx_s * cols;
            let is_top = idx_s == 0;

            draw_rgb_panel(
                root,
                layout.cell_origin(row_cell),
                &scene.normal_vis_from_disp_map(&gt),
            )?;
            if is_top {
                draw_title(root, layout.title_anchor(row_cell), "Ground Truth", fs)?;
            }
            draw_ylabel(root, layout.ylabel_anchor(row_cell), scene.display_name(), fs)?;

            for (idx_a, algorithm) in algorithms.iter().enumerate() {
                let result = algo_result(settings, scene, algorithm)?;
                let cell = row_cell + idx_a + 1;
                draw_rgb_panel(
                    root,
                    layout.cell_origin(cell),
                    &scene.normal_vis_from_disp_map(&result),
                )?;
                if is_top {
                    draw_title(root, layout.title_anchor(cell), algorithm.display_name(), fs)?;
                }
            }
        }
        Ok(())
    })?;

    let path = path_to_figure(settings, "normals_overview", subdir);
    canvas.save(&path)?;
    Ok(path)
}
