//! The figure composer: one routine per paper figure.
//!
//! Every routine assembles a panel grid or chart from scene data and
//! precomputed algorithm results, writes exactly one PNG under the figure
//! output tree and returns the written path. Inputs are never mutated;
//! failures propagate as `Err` and abort only the current figure.

pub mod overviews;
pub mod radar;
pub mod series;

#[cfg(test)]
mod tests;

use crate::algorithms::{self, algo_result, Algorithm};
use crate::config::Settings;
use crate::field::Window;
use crate::metrics::regions::{mae_contin_surf, mae_planes};
use crate::metrics::{EvalInputs, Metric};
use crate::plotting::colormap::{
    abs_diff_map_args, diff_map_args, disp_map_args, median_diff_args, metric_args,
};
use crate::plotting::grid::GridLayout;
use crate::plotting::panels::{
    draw_colorbar, draw_rgb_panel, draw_scalar_panel, draw_title, draw_xlabel, draw_ylabel,
    pixelize,
};
use crate::plotting::{colorbar_geometry, path_to_figure, FigureCanvas};
use crate::scenes::Scene;
use std::path::PathBuf;

/// Fraction of ground-truth pixels shuffled when the scene withholds it.
const HIDDEN_GT_NOISE: f32 = 0.5;

/// Default crop of the discontinuity close-up.
pub const DISCONT_WINDOW: Window = Window {
    x: 150,
    y: 230,
    size: 250,
};

/// Scene overview: center views over ground truth, one column per scene.
///
/// Hidden ground truth is pixel-shuffled before rendering so the figure
/// conveys structure without leaking withheld values.
pub fn plot_scene_overview(
    settings: &Settings,
    scenes: &[Scene],
    subdir: &str,
) -> Result<PathBuf, String> {
    if scenes.is_empty() {
        return Err("scene overview needs at least one scene".to_string());
    }
    let fs = 16u32;
    let first_view = scenes[0].center_view()?;
    let (cell_w, cell_h) = (first_view.width(), first_view.height());
    let layout = GridLayout::new(2, scenes.len(), cell_w, cell_h)
        .with_row_band(2 * fs)
        .with_bottom_band(2 * fs)
        .with_gaps(4, 4);
    let cols = layout.cols;

    let (fig_w, fig_h) = layout.fig_size();
    let mut canvas = FigureCanvas::new(fig_w, fig_h);
    canvas.render(|root| {
        for (idx_s, scene) in scenes.iter().enumerate() {
            let center_view = if idx_s == 0 {
                first_view.clone()
            } else {
                scene.center_view()?
            };
            draw_rgb_panel(root, layout.cell_origin(idx_s), &center_view)?;
            draw_title(root, layout.title_anchor(idx_s), scene.display_name(), fs)?;

            let mut gt = scene.gt()?;
            if scene.hidden_gt() {
                gt = pixelize(&gt, HIDDEN_GT_NOISE);
            }
            draw_scalar_panel(
                root,
                layout.cell_origin(cols + idx_s),
                &gt,
                &disp_map_args(scene),
            )?;
        }

        draw_title(root, layout.caption_anchor(0.12), "(a) Stratified Scenes", fs)?;
        draw_title(root, layout.caption_anchor(0.45), "(b) Training Scenes", fs)?;
        draw_title(
            root,
            layout.caption_anchor(0.74),
            "(c) Test Scenes (Hidden Ground Truth)",
            fs,
        )?;
        Ok(())
    })?;

    let path = path_to_figure(settings, "scenes", subdir);
    canvas.save(&path)?;
    Ok(path)
}

/// Normals explanation: ground-truth and algorithm normal maps next to the
/// median-angular-error heat map and its colorbar.
pub fn plot_normals_explanation(
    settings: &Settings,
    scene: &Scene,
    algorithm: &Algorithm,
    subdir: &str,
) -> Result<PathBuf, String> {
    let fs = 14u32;
    let normals_contin = mae_contin_surf();
    let normals_planes = mae_planes();

    let gt = scene.gt()?;
    let result = algo_result(settings, scene, algorithm)?;
    let mask = normals_contin
        .evaluation_mask(scene)?
        .union(&normals_planes.evaluation_mask(scene)?)?;
    let inputs = EvalInputs {
        settings,
        scene,
        algorithm,
    };
    let (score, vis) = normals_contin.score_with_vis(inputs, &result, &gt, &mask)?;

    let layout = GridLayout::new(1, 4, gt.w as u32, gt.h as u32)
        .with_row_band(fs + 10)
        .with_gaps(6, 6);
    let (cb_h, cb_w) = colorbar_geometry(gt.w as u32, gt.h as u32);
    let args = metric_args(&normals_contin);

    let (fig_w, fig_h) = layout.fig_size();
    let mut canvas = FigureCanvas::new(fig_w, fig_h);
    canvas.render(|root| {
        draw_rgb_panel(
            root,
            layout.cell_origin(0),
            &scene.normal_vis_from_disp_map(&gt),
        )?;
        draw_title(root, layout.title_anchor(0), "Ground Truth Normals", fs)?;

        draw_rgb_panel(
            root,
            layout.cell_origin(1),
            &scene.normal_vis_from_disp_map(&result),
        )?;
        draw_title(root, layout.title_anchor(1), "Algorithm Normals", fs)?;

        draw_scalar_panel(root, layout.cell_origin(2), &vis, &args)?;
        draw_title(
            root,
            layout.title_anchor(2),
            &format!("Median Angular Error: {score:.1}"),
            fs,
        )?;

        draw_colorbar(root, layout.cell_origin(3), cb_h, cb_w, &args, 4, fs)?;
        Ok(())
    })?;

    let path = path_to_figure(
        settings,
        &format!("metrics_{}_{}", scene.name(), algorithm.name()),
        subdir,
    );
    canvas.save(&path)?;
    Ok(path)
}

/// Bad-pixel-rate curves for the stratified and the photorealistic scene
/// sets. Delegates to the series routine, varying only scene set, title and
/// figure name.
pub fn plot_bad_pix_series(
    settings: &Settings,
    algorithms: &[Algorithm],
    with_cached_scores: bool,
    penalize_missing_pixels: bool,
    subdir: &str,
) -> Result<Vec<PathBuf>, String> {
    let mut training = crate::scenes::training_scenes(settings)?;
    training.extend(crate::scenes::test_scenes(settings)?);
    let scene_sets = [
        (
            crate::scenes::stratified_scenes(settings)?,
            "Stratified Scenes",
            "stratified",
        ),
        (training, "Test and Training Scenes", "photorealistic"),
    ];

    let mut paths = Vec::new();
    for (scene_set, title, set_name) in &scene_sets {
        paths.push(series::plot(
            settings,
            algorithms,
            scene_set,
            series::SeriesOptions {
                with_cached_scores,
                penalize_missing_pixels,
            },
            title,
            subdir,
            &format!("bad_pix_series_{set_name}"),
        )?);
    }
    Ok(paths)
}

/// Radar charts for both scene groups plus the two relative-performance
/// comparisons against leave-one-out and leave-two-out baselines.
pub fn plot_radar_charts(
    settings: &Settings,
    algorithms: &[Algorithm],
    log_runtime: bool,
    subdir: &str,
) -> Result<Vec<PathBuf>, String> {
    radar::plot_benchmark_charts(settings, algorithms, log_runtime, subdir)
}

/// Normals overview grid across algorithms and scenes.
pub fn plot_normals_overview(
    settings: &Settings,
    algorithms: &[Algorithm],
    scenes: &[Scene],
    subdir: &str,
) -> Result<PathBuf, String> {
    overviews::plot_normals(settings, algorithms, scenes, subdir)
}

/// High-accuracy overview: strict bad-pixel and quantile metrics.
pub fn plot_high_accuracy(
    settings: &Settings,
    algorithms: &[Algorithm],
    scenes: &[Scene],
    subdir: &str,
) -> Result<PathBuf, String> {
    let metrics: Vec<Box<dyn Metric>> = vec![
        Box::new(crate::metrics::BadPix::new(0.07)),
        Box::new(crate::metrics::BadPix::new(0.01)),
        Box::new(crate::metrics::Quantile::new(25)),
    ];
    overviews::plot_general_overview(settings, algorithms, scenes, &metrics, "high_accuracy", subdir)
}

/// Grid shape of the discontinuity close-up: two stacked visualization rows
/// per super-row of algorithm entries, one extra column for colorbars.
pub fn discont_grid_shape(n_algorithms: usize, n_rows: usize) -> (usize, usize) {
    let n_vis_types = 2;
    let n_entries_per_row = (n_algorithms + 1).div_ceil(n_rows);
    (n_vis_types * n_rows, n_entries_per_row + 1)
}

/// Subplot indices claimed by the discontinuity close-up: image panels and
/// colorbars. Used by the renderer and checked for overlap-free tiling.
pub(crate) fn discont_entry_cells(n_algorithms: usize, n_rows: usize) -> Vec<usize> {
    let n_vis_types = 2;
    let n_entries_per_row = (n_algorithms + 1).div_ceil(n_rows);
    let (_, cols) = discont_grid_shape(n_algorithms, n_rows);

    // The reference entry: center view over an empty label cell.
    let mut cells = vec![0];
    for idx_a in 0..n_algorithms {
        let idx = idx_a + 1;
        let idx_row = (idx / n_entries_per_row) * n_vis_types;
        let idx_col = idx % n_entries_per_row;
        cells.push(idx_row * cols + idx_col);
        cells.push((idx_row + 1) * cols + idx_col);
        if (idx + 1) % n_entries_per_row == 0 {
            cells.push(idx_row * cols + idx_col + 1);
            cells.push((idx_row + 1) * cols + idx_col + 1);
        }
    }
    cells
}

/// Discontinuity close-up: cropped disparity patches over signed median-diff
/// patches, a fixed window per panel, for one scene.
pub fn plot_discont_overview(
    settings: &Settings,
    algorithms: &[Algorithm],
    scene: &Scene,
    n_rows: usize,
    window: Option<Window>,
    subdir: &str,
) -> Result<PathBuf, String> {
    if algorithms.is_empty() || n_rows == 0 {
        return Err("discontinuity overview needs algorithms and at least one row".to_string());
    }
    let fs = 15u32;
    let n_vis_types = 2;
    let n_entries_per_row = (algorithms.len() + 1).div_ceil(n_rows);
    let (rows, cols) = discont_grid_shape(algorithms.len(), n_rows);
    let win = window.unwrap_or(DISCONT_WINDOW);

    algorithms::ensure_per_pix_median(settings, std::slice::from_ref(scene), algorithms)?;
    let median_algo = Algorithm::per_pix_median();
    let gt = scene.gt()?;
    let median_result = algo_result(settings, scene, &median_algo)?;
    let center_view = scene.center_view()?;

    let layout = GridLayout::new(rows, cols, win.size as u32, win.size as u32)
        .with_row_band(fs + 8)
        .with_left_band(fs + 10)
        .with_gaps(6, 6);
    let (cb_h, cb_w) = colorbar_geometry(win.size as u32, win.size as u32);
    let disp_args = disp_map_args(scene);
    let diff_args = median_diff_args();

    let (fig_w, fig_h) = layout.fig_size();
    let mut canvas = FigureCanvas::new(fig_w, fig_h);
    canvas.render(|root| {
        let center_crop = crop_rgb(&center_view, win);
        draw_rgb_panel(root, layout.cell_origin(0), &center_crop)?;
        draw_title(root, layout.title_anchor(0), "Center View", fs)?;
        draw_ylabel(root, layout.ylabel_anchor(0), "DispMap", fs)?;
        draw_ylabel(root, layout.ylabel_anchor(cols), "MedianDiff", fs)?;

        for (idx_a, algorithm) in algorithms.iter().enumerate() {
            let algo_map = algo_result(settings, scene, algorithm)?;
            let idx = idx_a + 1;

            let add_ylabel = idx % n_entries_per_row == 0;
            let add_colorbar = (idx + 1) % n_entries_per_row == 0;
            let idx_row = (idx / n_entries_per_row) * n_vis_types;
            let idx_col = idx % n_entries_per_row;

            let disp_cell = idx_row * cols + idx_col;
            draw_scalar_panel(root, layout.cell_origin(disp_cell), &algo_map.crop(win)?, &disp_args)?;
            draw_title(root, layout.title_anchor(disp_cell), algorithm.display_name(), fs)?;
            if add_ylabel {
                draw_ylabel(root, layout.ylabel_anchor(disp_cell), "DispMap", fs)?;
            }
            if add_colorbar {
                draw_colorbar(
                    root,
                    layout.cell_origin(disp_cell + 1),
                    cb_h,
                    cb_w,
                    &disp_args,
                    7,
                    fs,
                )?;
            }

            let median_diff = median_result.abs_diff(&gt)?.sub(&algo_map.abs_diff(&gt)?)?;
            let diff_cell = (idx_row + 1) * cols + idx_col;
            draw_scalar_panel(
                root,
                layout.cell_origin(diff_cell),
                &median_diff.crop(win)?,
                &diff_args,
            )?;
            if add_ylabel {
                draw_ylabel(root, layout.ylabel_anchor(diff_cell), "MedianDiff", fs)?;
            }
            if add_colorbar {
                draw_colorbar(
                    root,
                    layout.cell_origin(diff_cell + 1),
                    cb_h,
                    cb_w,
                    &diff_args,
                    7,
                    fs,
                )?;
            }
        }
        Ok(())
    })?;

    let path = path_to_figure(settings, &format!("discont_{}", scene.name()), subdir);
    canvas.save(&path)?;
    Ok(path)
}

/// Grid shape of the median comparison: one row per algorithm (plus the
/// optional reference row), three panels per scene plus a colorbar column.
pub fn median_comparison_shape(
    n_scenes: usize,
    n_algorithms: usize,
    with_gt_row: bool,
) -> (usize, usize) {
    (
        n_algorithms + usize::from(with_gt_row),
        n_scenes * 3 + 1,
    )
}

/// Per-pixel median comparison: disparity, signed error and median-diff per
/// (scene, algorithm), with an optional ground-truth reference row.
pub fn plot_median_comparisons(
    settings: &Settings,
    scenes: &[Scene],
    algorithms: &[Algorithm],
    subdir: &str,
    with_gt_row: bool,
) -> Result<PathBuf, String> {
    if scenes.is_empty() || algorithms.is_empty() {
        return Err("median comparison needs scenes and algorithms".to_string());
    }
    let fs = 12u32;
    let (rows, cols) = median_comparison_shape(scenes.len(), algorithms.len(), with_gt_row);

    algorithms::ensure_per_pix_median(settings, scenes, algorithms)?;
    let median_algo = Algorithm::per_pix_median();

    let gt0 = scenes[0].gt()?;
    let layout = GridLayout::new(rows, cols, gt0.w as u32, gt0.h as u32)
        .with_row_band(fs + 8)
        .with_left_band(fs + 10)
        .with_bottom_band(fs + 8)
        .with_gaps(4, 2);
    let (cb_h, cb_w) = colorbar_geometry(gt0.w as u32, gt0.h as u32);
    let cb_h = cb_h * 4 / 5;

    let gt_algo_args = diff_map_args(-0.1, 0.1);
    let median_args = median_diff_args();
    let abs_args = abs_diff_map_args();

    let (fig_w, fig_h) = layout.fig_size();
    let mut canvas = FigureCanvas::new(fig_w, fig_h);
    canvas.render(|root| {
        for (idx_s, scene) in scenes.iter().enumerate() {
            let gt = scene.gt()?;
            let median_result = algo_result(settings, scene, &median_algo)?;
            let add_label = idx_s == 0;
            let add_colorbar = idx_s == scenes.len() - 1;
            let disp_args = disp_map_args(scene);

            for (idx_a, algorithm) in algorithms.iter().enumerate() {
                let algo_map = algo_result(settings, scene, algorithm)?;
                let add_title = idx_a == 0;

                let disp_cell = idx_a * cols + 3 * idx_s;
                draw_scalar_panel(root, layout.cell_origin(disp_cell), &algo_map, &disp_args)?;
                if add_title {
                    draw_title(root, layout.title_anchor(disp_cell), "DispMap", fs)?;
                }
                if add_label {
                    draw_ylabel(
                        root,
                        layout.ylabel_anchor(disp_cell),
                        algorithm.display_name(),
                        fs,
                    )?;
                }

                let gt_minus_algo = gt.sub(&algo_map)?;
                draw_scalar_panel(
                    root,
                    layout.cell_origin(disp_cell + 1),
                    &gt_minus_algo,
                    &gt_algo_args,
                )?;
                if add_title {
                    draw_title(root, layout.title_anchor(disp_cell + 1), "GT-Algo", fs)?;
                }

                let median_diff = median_result.abs_diff(&gt)?.sub(&algo_map.abs_diff(&gt)?)?;
                draw_scalar_panel(
                    root,
                    layout.cell_origin(disp_cell + 2),
                    &median_diff,
                    &median_args,
                )?;
                if add_title {
                    draw_title(root, layout.title_anchor(disp_cell + 2), "MedianDiff", fs)?;
                }

                if add_colorbar {
                    // Colorbars alternate between the two error scales
                    // across even/odd algorithm rows.
                    let (args, bins) = if idx_a % 2 == 0 {
                        (&gt_algo_args, 4)
                    } else {
                        (&median_args, 4)
                    };
                    draw_colorbar(
                        root,
                        layout.cell_origin(disp_cell + 3),
                        cb_h,
                        cb_w,
                        args,
                        bins,
                        fs,
                    )?;
                }
            }

            if with_gt_row {
                let idx_a = algorithms.len();
                let gt_cell = idx_a * cols + 3 * idx_s;
                draw_scalar_panel(root, layout.cell_origin(gt_cell), &gt, &disp_args)?;
                draw_xlabel(root, layout.xlabel_anchor(gt_cell), "GT", fs)?;
                if add_label {
                    draw_ylabel(root, layout.ylabel_anchor(gt_cell), "Reference", fs)?;
                }

                let gt_median = gt.abs_diff(&median_result)?;
                draw_scalar_panel(root, layout.cell_origin(gt_cell + 1), &gt_median, &abs_args)?;
                draw_xlabel(
                    root,
                    layout.xlabel_anchor(gt_cell + 1),
                    "|GT-PerPixMedian|",
                    fs - 2,
                )?;

                if add_colorbar {
                    draw_colorbar(
                        root,
                        layout.cell_origin(gt_cell + 3),
                        cb_h,
                        cb_w,
                        &abs_args,
                        4,
                        fs,
                    )?;
                }
            }
        }
        Ok(())
    })?;

    let path = path_to_figure(
        settings,
        &format!("median_comparison_{}", scenes[0].category().key()),
        subdir,
    );
    canvas.save(&path)?;
    Ok(path)
}

fn crop_rgb(img: &image::RgbImage, win: Window) -> image::RgbImage {
    let mut out = image::RgbImage::new(win.size as u32, win.size as u32);
    for y in 0..win.size as u32 {
        for x in 0..win.size as u32 {
            let sx = (win.x as u32 + x).min(img.width().saturating_sub(1));
            let sy = (win.y as u32 + y).min(img.height().saturating_sub(1));
            out.put_pixel(x, y, *img.get_pixel(sx, sy));
        }
    }
    out
}
