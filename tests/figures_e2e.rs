mod common;

use common::synthetic_scene::build_benchmark;
use depth_figures::field::Window;
use depth_figures::figures::{self, median_comparison_shape};
use depth_figures::metrics::{BadPix, Metric, Mse, Quantile};
use depth_figures::scenes;
use depth_figures::SceneCategory;
use std::fs;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn median_comparison_three_scenes_two_algorithms() {
    init_logging();
    let fixture = build_benchmark(
        "median_cmp",
        48,
        &[
            (SceneCategory::Training, "boxes"),
            (SceneCategory::Training, "cotton"),
            (SceneCategory::Training, "dino"),
        ],
        &["algo_a", "algo_b"],
    );
    let scene_list = scenes::training_scenes(&fixture.settings).expect("list scenes");
    assert_eq!(scene_list.len(), 3);

    assert_eq!(median_comparison_shape(3, 2, true), (3, 10));

    let path = figures::plot_median_comparisons(
        &fixture.settings,
        &scene_list,
        &fixture.algorithms,
        "per_pix_comparisons",
        true,
    )
    .expect("median comparison renders");

    assert!(path.exists(), "figure file missing at {}", path.display());
    assert_eq!(
        path.file_name().unwrap().to_string_lossy(),
        "median_comparison_training.png",
        "file is named by the scenes' shared category"
    );

    let files: Vec<_> = fs::read_dir(path.parent().unwrap())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().map(|x| x == "png").unwrap_or(false))
        .collect();
    assert_eq!(files.len(), 1, "exactly one output file per invocation");
}

#[test]
fn scene_overview_renders_hidden_and_visible_gt() {
    init_logging();
    let fixture = build_benchmark(
        "overview",
        48,
        &[
            (SceneCategory::Stratified, "backgammon"),
            (SceneCategory::Training, "cotton"),
            (SceneCategory::Test, "bedroom"),
        ],
        &["algo_a"],
    );
    let mut all = scenes::stratified_scenes(&fixture.settings).unwrap();
    all.extend(scenes::training_scenes(&fixture.settings).unwrap());
    all.extend(scenes::test_scenes(&fixture.settings).unwrap());
    assert_eq!(all.len(), 3);
    assert!(all[2].hidden_gt(), "test scene must hide its ground truth");

    let path = figures::plot_scene_overview(&fixture.settings, &all, "overview")
        .expect("scene overview renders");
    assert!(path.exists());
}

#[test]
fn normals_explanation_writes_named_figure() {
    init_logging();
    let fixture = build_benchmark(
        "normals",
        48,
        &[(SceneCategory::Training, "cotton")],
        &["algo_a"],
    );
    let scene_list = scenes::training_scenes(&fixture.settings).unwrap();
    let path = figures::plot_normals_explanation(
        &fixture.settings,
        &scene_list[0],
        &fixture.algorithms[0],
        "overview",
    )
    .expect("normals explanation renders");
    assert!(path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .contains("metrics_cotton_algo_a"));
}

#[test]
fn bad_pix_series_uses_its_score_cache() {
    init_logging();
    let fixture = build_benchmark(
        "series",
        32,
        &[
            (SceneCategory::Stratified, "backgammon"),
            (SceneCategory::Training, "cotton"),
            (SceneCategory::Test, "bedroom"),
        ],
        &["algo_a", "algo_b"],
    );

    let paths = figures::plot_bad_pix_series(&fixture.settings, &fixture.algorithms, true, false, "bad_pix")
        .expect("series renders");
    assert_eq!(paths.len(), 2, "stratified + photorealistic");

    let cache = fixture.settings.cache_dir.join("bad_pix_series_stratified.json");
    assert!(cache.exists(), "score cache written on first run");

    // Second run must succeed from the cache alone.
    figures::plot_bad_pix_series(&fixture.settings, &fixture.algorithms, true, false, "bad_pix")
        .expect("series renders from cache");
}

#[test]
fn radar_maxima_mismatch_is_a_configuration_error() {
    init_logging();
    let fixture = build_benchmark(
        "radar_cfg",
        32,
        &[(SceneCategory::Training, "cotton")],
        &["algo_a", "algo_b"],
    );
    let scene_list = scenes::training_scenes(&fixture.settings).unwrap();
    let metrics: Vec<Box<dyn Metric>> = vec![
        Box::new(Mse),
        Box::new(BadPix::new(0.07)),
        Box::new(Quantile::new(25)),
    ];
    let labels: Vec<String> = metrics.iter().map(|m| m.display_name()).collect();

    let err = figures::radar::plot(
        &fixture.settings,
        &fixture.algorithms,
        &scene_list,
        &metrics,
        &labels,
        &[8.0, 16.0],
        "Broken",
        "radar_broken",
        "radar",
    )
    .expect_err("maxima length mismatch must fail");
    assert!(err.contains("configuration"), "unexpected error: {err}");
}

#[test]
fn radar_chart_and_score_table_render() {
    init_logging();
    let fixture = build_benchmark(
        "radar_plot",
        32,
        &[
            (SceneCategory::Training, "boxes"),
            (SceneCategory::Training, "cotton"),
        ],
        &["algo_a", "algo_b", "algo_c"],
    );
    let scene_list = scenes::training_scenes(&fixture.settings).unwrap();
    let metrics: Vec<Box<dyn Metric>> = vec![
        Box::new(Mse),
        Box::new(BadPix::new(0.07)),
        Box::new(Quantile::new(25)),
    ];
    let labels: Vec<String> = metrics.iter().map(|m| m.display_name()).collect();

    let path = figures::radar::plot(
        &fixture.settings,
        &fixture.algorithms,
        &scene_list,
        &metrics,
        &labels,
        &[8.0, 100.0, 40.0],
        "Median Scores",
        "radar_training",
        "radar",
    )
    .expect("radar renders");
    assert!(path.exists());
    assert!(
        path.with_file_name("radar_training_scores.json").exists(),
        "score table written next to the radar figure"
    );

    let bars = figures::radar::compare_relative_performances(
        &fixture.settings,
        &fixture.algorithms,
        &scene_list,
        &metrics,
        1,
        "radar",
    )
    .expect("relative comparison renders");
    assert!(bars.exists());
}

#[test]
fn discont_overview_uses_the_requested_window() {
    init_logging();
    let fixture = build_benchmark(
        "discont",
        64,
        &[(SceneCategory::Training, "cotton")],
        &["algo_a", "algo_b", "algo_c"],
    );
    let scene_list = scenes::training_scenes(&fixture.settings).unwrap();

    let window = Window { x: 8, y: 8, size: 32 };
    let path = figures::plot_discont_overview(
        &fixture.settings,
        &fixture.algorithms,
        &scene_list[0],
        2,
        Some(window),
        "overview",
    )
    .expect("discontinuity overview renders");
    assert!(path.file_name().unwrap().to_string_lossy().contains("discont_cotton"));

    let too_big = Window { x: 40, y: 40, size: 32 };
    assert!(
        figures::plot_discont_overview(
            &fixture.settings,
            &fixture.algorithms,
            &scene_list[0],
            2,
            Some(too_big),
            "overview",
        )
        .is_err(),
        "a window past the field border must propagate as an error"
    );
}

#[test]
fn high_accuracy_and_normals_overviews_render() {
    init_logging();
    let fixture = build_benchmark(
        "overviews",
        32,
        &[(SceneCategory::Training, "cotton")],
        &["algo_a", "algo_b"],
    );
    let scene_list = scenes::training_scenes(&fixture.settings).unwrap();

    let path =
        figures::plot_high_accuracy(&fixture.settings, &fixture.algorithms, &scene_list, "overview")
            .expect("high-accuracy overview renders");
    assert!(path.exists());

    let path = figures::plot_normals_overview(
        &fixture.settings,
        &fixture.algorithms,
        &scene_list,
        "overview",
    )
    .expect("normals overview renders");
    assert!(path.exists());
}
