//! On-disk synthetic benchmark fixture for the figure tests.
//!
//! Builds a throwaway data/results tree under the system temp directory:
//! gradient center views, tilted-ramp ground truth, all-true region masks,
//! and per-algorithm results derived from the ground truth by a small
//! deterministic perturbation.

use depth_figures::field::io::write_pfm;
use depth_figures::field::DispField;
use depth_figures::{Algorithm, SceneCategory, Settings};
use image::{GrayImage, Luma, Rgb, RgbImage};
use std::fs;
use std::path::PathBuf;

pub struct Fixture {
    pub settings: Settings,
    pub algorithms: Vec<Algorithm>,
    pub root: PathBuf,
}

/// Ground truth used by every synthetic scene: a tilted ramp.
pub fn synthetic_gt(size: usize) -> DispField {
    let mut gt = DispField::new(size, size);
    for y in 0..size {
        for x in 0..size {
            gt.set(x, y, 0.5 + 1.0 * x as f32 / size as f32 - 0.3 * y as f32 / size as f32);
        }
    }
    gt
}

fn category_dir(cat: SceneCategory) -> &'static str {
    cat.key()
}

/// Build a benchmark tree with the given scenes and algorithms.
///
/// `tag` keeps parallel tests in separate directories.
pub fn build_benchmark(
    tag: &str,
    size: usize,
    scenes: &[(SceneCategory, &str)],
    algo_names: &[&str],
) -> Fixture {
    let root = std::env::temp_dir()
        .join("depth_figures_tests")
        .join(format!("{tag}_{}", std::process::id()));
    if root.exists() {
        fs::remove_dir_all(&root).expect("reset fixture root");
    }

    let settings = Settings {
        data_dir: root.join("data"),
        results_dir: root.join("algo_results"),
        figures_dir: root.join("figures"),
        cache_dir: root.join("cache"),
    };

    let gt = synthetic_gt(size);
    for (cat, name) in scenes {
        let scene_dir = settings.data_dir.join(category_dir(*cat)).join(name);
        fs::create_dir_all(scene_dir.join("masks")).expect("create scene dir");

        let mut view = RgbImage::new(size as u32, size as u32);
        for (x, y, p) in view.enumerate_pixels_mut() {
            let v = ((x * 255) / size as u32) as u8;
            let w = ((y * 255) / size as u32) as u8;
            *p = Rgb([v, w, 128]);
        }
        view.save(scene_dir.join("center_view.png"))
            .expect("save center view");

        write_pfm(&gt, &scene_dir.join("gt_disp.pfm")).expect("save gt");

        let full = GrayImage::from_pixel(size as u32, size as u32, Luma([255u8]));
        for mask in ["contin_surfaces", "planes"] {
            full.save(scene_dir.join("masks").join(format!("{mask}.png")))
                .expect("save mask");
        }
    }

    let mut algorithms = Vec::new();
    for (i, algo_name) in algo_names.iter().enumerate() {
        let algorithm = Algorithm::new(algo_name, &algo_name.to_uppercase());
        for (_cat, name) in scenes {
            let result = perturbed_result(&gt, i);
            let dir = settings.results_dir.join(algo_name);
            write_pfm(&result, &dir.join("disp_maps").join(format!("{name}.pfm")))
                .expect("save algo result");
            let runtimes = dir.join("runtimes");
            fs::create_dir_all(&runtimes).expect("create runtimes dir");
            fs::write(runtimes.join(format!("{name}.txt")), format!("{}", 1.5 + i as f32))
                .expect("save runtime");
        }
        algorithms.push(algorithm);
    }

    Fixture {
        settings,
        algorithms,
        root,
    }
}

/// Algorithm result: ground truth plus a small algorithm-specific offset
/// and a deterministic ripple, so errors and median-diffs are nonzero.
pub fn perturbed_result(gt: &DispField, algo_index: usize) -> DispField {
    let mut out = gt.clone();
    let offset = 0.01 * (algo_index as f32 + 1.0);
    for y in 0..out.h {
        for x in 0..out.w {
            let ripple = 0.02 * ((x * 7 + y * 3 + algo_index) % 5) as f32;
            let v = out.get(x, y) + offset + ripple;
            out.set(x, y, v);
        }
    }
    out
}
