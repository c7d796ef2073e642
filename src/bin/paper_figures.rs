use depth_figures::config::{load_config, RunConfig};
use depth_figures::figures;
use depth_figures::scenes;
use depth_figures::Algorithm;
use std::env;
use std::path::Path;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = load_config(Path::new(&config_path))?;
    let RunConfig {
        settings,
        algorithms,
        options,
    } = config;

    let algorithms: Vec<Algorithm> = algorithms
        .iter()
        .map(|a| {
            let display = a.display_name.clone().unwrap_or_else(|| a.name.clone());
            Algorithm::new(&a.name, &display)
        })
        .collect();
    if algorithms.is_empty() {
        return Err("config lists no algorithms".to_string());
    }

    let stratified = scenes::stratified_scenes(&settings)?;
    let training = scenes::training_scenes(&settings)?;
    let test = scenes::test_scenes(&settings)?;
    let mut all_scenes = stratified.clone();
    all_scenes.extend(training.iter().cloned());
    all_scenes.extend(test.iter().cloned());

    let path = figures::plot_scene_overview(&settings, &all_scenes, "overview")?;
    println!("Saved scene overview to {}", path.display());

    if let (Some(scene), Some(algorithm)) = (training.first(), algorithms.first()) {
        let path = figures::plot_normals_explanation(&settings, scene, algorithm, "overview")?;
        println!("Saved normals explanation to {}", path.display());
    }

    for path in figures::plot_bad_pix_series(
        &settings,
        &algorithms,
        options.with_cached_scores,
        options.penalize_missing_pixels,
        "bad_pix",
    )? {
        println!("Saved bad-pixel series to {}", path.display());
    }

    for path in figures::plot_radar_charts(&settings, &algorithms, options.log_runtime, "radar")? {
        println!("Saved radar figure to {}", path.display());
    }

    let path = figures::plot_high_accuracy(&settings, &algorithms, &training, "overview")?;
    println!("Saved high-accuracy overview to {}", path.display());

    let path = figures::plot_normals_overview(&settings, &algorithms, &training, "overview")?;
    println!("Saved normals overview to {}", path.display());

    if let Some(name) = &options.discont_scene {
        let scene = all_scenes
            .iter()
            .find(|s| s.name() == name.as_str())
            .ok_or_else(|| format!("discontinuity scene {name:?} not found"))?;
        let path = figures::plot_discont_overview(&settings, &algorithms, scene, 2, None, "overview")?;
        println!("Saved discontinuity overview to {}", path.display());
    }

    for scene_set in [&stratified, &training] {
        if scene_set.is_empty() {
            continue;
        }
        let path = figures::plot_median_comparisons(
            &settings,
            scene_set,
            &algorithms,
            "per_pix_comparisons",
            true,
        )?;
        println!("Saved median comparison to {}", path.display());
    }

    Ok(())
}

fn usage() -> String {
    "Usage: paper_figures <config.json>".to_string()
}
