use super::regions::{bumpiness_score, signed_excess_percent};
use super::stratified::stratified_metrics;
use super::{bad_pix_percent, mse_score, quantile_score};
use crate::field::{DispField, MaskField};
use crate::scenes::{Scene, SceneCategory};
use std::path::Path;

fn fields(result: &[f32], gt: &[f32]) -> (DispField, DispField, MaskField) {
    let n = result.len();
    (
        DispField::from_vec(n, 1, result.to_vec()).unwrap(),
        DispField::from_vec(n, 1, gt.to_vec()).unwrap(),
        MaskField::full(n, 1),
    )
}

#[test]
fn bad_pix_counts_threshold_crossings() {
    let (r, g, m) = fields(&[0.0, 0.1, 0.5, 1.0], &[0.0, 0.0, 0.0, 0.0]);
    let score = bad_pix_percent(&r, &g, &m, 0.07, true).unwrap();
    assert_eq!(score, 75.0);
    let score = bad_pix_percent(&r, &g, &m, 0.6, true).unwrap();
    assert_eq!(score, 25.0);
}

#[test]
fn bad_pix_missing_pixel_policy() {
    let (r, g, m) = fields(&[0.0, f32::NAN, 0.0, 0.0], &[0.0; 4]);
    let penalized = bad_pix_percent(&r, &g, &m, 0.07, true).unwrap();
    assert_eq!(penalized, 25.0, "NaN counts as bad when penalizing");
    let tolerant = bad_pix_percent(&r, &g, &m, 0.07, false).unwrap();
    assert_eq!(tolerant, 0.0, "NaN drops out otherwise");
}

#[test]
fn bad_pix_respects_mask() {
    let (r, g, mut m) = fields(&[1.0, 0.0], &[0.0, 0.0]);
    m.set(0, 0, false);
    let score = bad_pix_percent(&r, &g, &m, 0.07, true).unwrap();
    assert_eq!(score, 0.0, "masked-out bad pixel must not score");
}

#[test]
fn empty_mask_is_an_error() {
    let (r, g, _) = fields(&[0.0], &[0.0]);
    let empty = MaskField::new(1, 1);
    assert!(bad_pix_percent(&r, &g, &empty, 0.07, true).is_err());
    assert!(mse_score(&r, &g, &empty).is_err());
}

#[test]
fn mse_is_mean_squared_error_times_100() {
    let (r, g, m) = fields(&[0.1, 0.3], &[0.0, 0.0]);
    let score = mse_score(&r, &g, &m).unwrap();
    let expected = (0.01 + 0.09) / 2.0 * 100.0;
    assert!((score - expected).abs() < 1e-4, "got {score}, want {expected}");
}

#[test]
fn quantile_picks_sorted_error() {
    let (r, g, m) = fields(&[0.4, 0.1, 0.2, 0.3], &[0.0; 4]);
    let q25 = quantile_score(&r, &g, &m, 25).unwrap();
    assert!((q25 - 20.0).abs() < 1e-4, "got {q25}");
    let q75 = quantile_score(&r, &g, &m, 75).unwrap();
    assert!((q75 - 40.0).abs() < 1e-4, "got {q75}");
}

#[test]
fn bumpiness_zero_for_constant_offset() {
    let n = 6;
    let mut r = DispField::new(n, n);
    let g = DispField::new(n, n);
    for v in r.data.iter_mut() {
        *v = 0.5;
    }
    let m = MaskField::full(n, n);
    let score = bumpiness_score(&r, &g, &m).unwrap();
    assert!(score.abs() < 1e-4, "offset-only error has no curvature, got {score}");
}

#[test]
fn bumpiness_positive_for_rippled_error() {
    let n = 8;
    let mut r = DispField::new(n, n);
    let g = DispField::new(n, n);
    for y in 0..n {
        for x in 0..n {
            r.set(x, y, if (x + y) % 2 == 0 { 0.2 } else { -0.2 });
        }
    }
    let m = MaskField::full(n, n);
    let score = bumpiness_score(&r, &g, &m).unwrap();
    assert!(score > 1.0, "checkerboard error must be bumpy, got {score}");
}

#[test]
fn fattening_and_thinning_are_directional() {
    let (fat, g, m) = fields(&[0.3, 0.0, 0.0, 0.0], &[0.0; 4]);
    assert_eq!(
        signed_excess_percent(&fat, &g, &m, 0.1, 1.0).unwrap(),
        25.0,
        "one pixel moved toward the camera"
    );
    assert_eq!(
        signed_excess_percent(&fat, &g, &m, 0.1, -1.0).unwrap(),
        0.0,
        "no pixel moved away"
    );
}

#[test]
fn stratified_metrics_bind_to_their_scenes() {
    let metrics = stratified_metrics();
    assert_eq!(metrics.len(), 9);

    let backgammon = Scene::new(
        "backgammon",
        SceneCategory::Stratified,
        Path::new("data/stratified/backgammon"),
    );
    let dots = Scene::new("dots", SceneCategory::Stratified, Path::new("data/stratified/dots"));

    assert!(metrics[0].applies_to(&backgammon));
    assert!(!metrics[0].applies_to(&dots));
    assert!(metrics[2].applies_to(&dots));

    let names: Vec<String> = metrics.iter().map(|m| m.name()).collect();
    let mut unique = names.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), names.len(), "metric keys must be unique");
}
