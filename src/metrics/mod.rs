//! Scoring functions for disparity results.
//!
//! Every metric scores a `(result, gt)` pair over an evaluation mask and can
//! optionally emit a per-pixel contribution field for heat-map panels
//! (pixels outside the mask are NaN there). Scores follow the benchmark
//! convention: lower is better, percentages are reported in [0, 100].
//!
//! The `Runtime` pseudo-metric reads the submitted runtime instead of
//! comparing fields; it participates in radar charts like any other axis.

pub mod regions;
pub mod stratified;

#[cfg(test)]
mod tests;

use crate::algorithms::{runtime_seconds, Algorithm};
use crate::config::Settings;
use crate::field::{DispField, MaskField};
use crate::scenes::Scene;

/// Everything a metric may need besides the two disparity fields.
#[derive(Clone, Copy)]
pub struct EvalInputs<'a> {
    pub settings: &'a Settings,
    pub scene: &'a Scene,
    pub algorithm: &'a Algorithm,
}

/// A named scoring function. Lower scores are better.
pub trait Metric {
    /// Stable key used in caches and score tables.
    fn name(&self) -> String;

    /// Label used on chart axes and in titles.
    fn display_name(&self) -> String;

    /// Pixels this metric scores for the given scene.
    fn evaluation_mask(&self, scene: &Scene) -> Result<MaskField, String>;

    /// Scalar score over the masked pixels.
    fn score_from_mask(
        &self,
        inputs: EvalInputs,
        result: &DispField,
        gt: &DispField,
        mask: &MaskField,
    ) -> Result<f32, String>;

    /// Score plus a per-pixel contribution field (NaN outside the mask).
    fn score_with_vis(
        &self,
        inputs: EvalInputs,
        result: &DispField,
        gt: &DispField,
        mask: &MaskField,
    ) -> Result<(f32, DispField), String>;

    /// Display range for the contribution field.
    fn vis_range(&self) -> (f32, f32) {
        (0.0, 100.0)
    }

    /// Whether the metric is defined for this scene (scene-bound stratified
    /// metrics restrict this).
    fn applies_to(&self, _scene: &Scene) -> bool {
        true
    }

    /// Convenience: evaluation mask followed by scoring.
    fn score(
        &self,
        inputs: EvalInputs,
        result: &DispField,
        gt: &DispField,
    ) -> Result<f32, String> {
        let mask = self.evaluation_mask(inputs.scene)?;
        self.score_from_mask(inputs, result, gt, &mask)
    }
}

// ---- shared scoring kernels -------------------------------------------------

fn check_shapes(result: &DispField, gt: &DispField, mask: &MaskField) -> Result<(), String> {
    if result.w != gt.w || result.h != gt.h || mask.w != gt.w || mask.h != gt.h {
        return Err(format!(
            "shape mismatch: result {}x{}, gt {}x{}, mask {}x{}",
            result.w, result.h, gt.w, gt.h, mask.w, mask.h
        ));
    }
    Ok(())
}

/// Fraction (percent) of masked pixels whose absolute error exceeds `thresh`.
///
/// `penalize_missing` counts NaN result pixels as bad; otherwise they are
/// dropped from the denominator.
pub fn bad_pix_percent(
    result: &DispField,
    gt: &DispField,
    mask: &MaskField,
    thresh: f32,
    penalize_missing: bool,
) -> Result<f32, String> {
    check_shapes(result, gt, mask)?;
    let mut total = 0usize;
    let mut bad = 0usize;
    for i in 0..mask.data.len() {
        if !mask.data[i] || !gt.data[i].is_finite() {
            continue;
        }
        let err = (result.data[i] - gt.data[i]).abs();
        if err.is_nan() {
            if penalize_missing {
                total += 1;
                bad += 1;
            }
            continue;
        }
        total += 1;
        if err > thresh {
            bad += 1;
        }
    }
    if total == 0 {
        return Err("empty evaluation mask".to_string());
    }
    Ok(100.0 * bad as f32 / total as f32)
}

/// Mean squared error over the mask, scaled by 100. Missing pixels count
/// with the largest observed squared error so holes cannot help a score.
pub fn mse_score(result: &DispField, gt: &DispField, mask: &MaskField) -> Result<f32, String> {
    check_shapes(result, gt, mask)?;
    let mut sum = 0.0f64;
    let mut n = 0usize;
    let mut worst = 0.0f32;
    let mut missing = 0usize;
    for i in 0..mask.data.len() {
        if !mask.data[i] || !gt.data[i].is_finite() {
            continue;
        }
        let err = result.data[i] - gt.data[i];
        if err.is_nan() {
            missing += 1;
            continue;
        }
        let sq = err * err;
        worst = worst.max(sq);
        sum += sq as f64;
        n += 1;
    }
    if n + missing == 0 {
        return Err("empty evaluation mask".to_string());
    }
    sum += missing as f64 * worst as f64;
    Ok((sum / (n + missing) as f64 * 100.0) as f32)
}

/// Absolute-error value at the q-th percentile (best-q% accuracy), ×100.
pub fn quantile_score(
    result: &DispField,
    gt: &DispField,
    mask: &MaskField,
    q: u8,
) -> Result<f32, String> {
    check_shapes(result, gt, mask)?;
    let mut errs: Vec<f32> = Vec::new();
    let mut missing = 0usize;
    for i in 0..mask.data.len() {
        if !mask.data[i] || !gt.data[i].is_finite() {
            continue;
        }
        let err = (result.data[i] - gt.data[i]).abs();
        if err.is_nan() {
            missing += 1;
        } else {
            errs.push(err);
        }
    }
    if errs.is_empty() && missing == 0 {
        return Err("empty evaluation mask".to_string());
    }
    errs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    // Missing pixels rank behind every measured error.
    let total = errs.len() + missing;
    let idx = (total as f32 * q as f32 / 100.0) as usize;
    let v = if idx < errs.len() {
        errs[idx]
    } else {
        f32::INFINITY
    };
    Ok(v * 100.0)
}

fn masked_vis(values: &DispField, mask: &MaskField) -> DispField {
    let mut vis = DispField::filled(values.w, values.h, f32::NAN);
    for i in 0..values.data.len() {
        if mask.data[i] {
            vis.data[i] = values.data[i];
        }
    }
    vis
}

// ---- general metrics --------------------------------------------------------

/// Mean squared disparity error ×100 over the scene's evaluation mask.
pub struct Mse;

impl Metric for Mse {
    fn name(&self) -> String {
        "mse".to_string()
    }

    fn display_name(&self) -> String {
        "MSE".to_string()
    }

    fn evaluation_mask(&self, scene: &Scene) -> Result<MaskField, String> {
        general_mask(scene)
    }

    fn score_from_mask(
        &self,
        _inputs: EvalInputs,
        result: &DispField,
        gt: &DispField,
        mask: &MaskField,
    ) -> Result<f32, String> {
        mse_score(result, gt, mask)
    }

    fn score_with_vis(
        &self,
        inputs: EvalInputs,
        result: &DispField,
        gt: &DispField,
        mask: &MaskField,
    ) -> Result<(f32, DispField), String> {
        let score = self.score_from_mask(inputs, result, gt, mask)?;
        let sq = result.sub(gt)?;
        let sq = DispField::from_vec(sq.w, sq.h, sq.data.iter().map(|e| e * e * 100.0).collect())?;
        Ok((score, masked_vis(&sq, mask)))
    }

    fn vis_range(&self) -> (f32, f32) {
        (0.0, 10.0)
    }
}

/// Fraction of pixels whose absolute error exceeds a threshold, percent.
pub struct BadPix {
    thresh: f32,
}

impl BadPix {
    pub fn new(thresh: f32) -> Self {
        Self { thresh }
    }

    pub fn thresh(&self) -> f32 {
        self.thresh
    }
}

impl Metric for BadPix {
    fn name(&self) -> String {
        format!("badpix_{:.3}", self.thresh)
    }

    fn display_name(&self) -> String {
        format!("BadPix({})", self.thresh)
    }

    fn evaluation_mask(&self, scene: &Scene) -> Result<MaskField, String> {
        general_mask(scene)
    }

    fn score_from_mask(
        &self,
        _inputs: EvalInputs,
        result: &DispField,
        gt: &DispField,
        mask: &MaskField,
    ) -> Result<f32, String> {
        bad_pix_percent(result, gt, mask, self.thresh, true)
    }

    fn score_with_vis(
        &self,
        inputs: EvalInputs,
        result: &DispField,
        gt: &DispField,
        mask: &MaskField,
    ) -> Result<(f32, DispField), String> {
        let score = self.score_from_mask(inputs, result, gt, mask)?;
        let abs = result.abs_diff(gt)?;
        let flags = DispField::from_vec(
            abs.w,
            abs.h,
            abs.data
                .iter()
                .map(|&e| if !(e <= self.thresh) { 1.0 } else { 0.0 })
                .collect(),
        )?;
        Ok((score, masked_vis(&flags, mask)))
    }

    fn vis_range(&self) -> (f32, f32) {
        (0.0, 1.0)
    }
}

/// Accuracy of the best q percent of pixels (absolute error ×100).
pub struct Quantile {
    q: u8,
}

impl Quantile {
    pub fn new(q: u8) -> Self {
        Self { q }
    }
}

impl Metric for Quantile {
    fn name(&self) -> String {
        format!("quantile_{}", self.q)
    }

    fn display_name(&self) -> String {
        format!("Q{}", self.q)
    }

    fn evaluation_mask(&self, scene: &Scene) -> Result<MaskField, String> {
        general_mask(scene)
    }

    fn score_from_mask(
        &self,
        _inputs: EvalInputs,
        result: &DispField,
        gt: &DispField,
        mask: &MaskField,
    ) -> Result<f32, String> {
        quantile_score(result, gt, mask, self.q)
    }

    fn score_with_vis(
        &self,
        inputs: EvalInputs,
        result: &DispField,
        gt: &DispField,
        mask: &MaskField,
    ) -> Result<(f32, DispField), String> {
        let score = self.score_from_mask(inputs, result, gt, mask)?;
        let abs = result.abs_diff(gt)?;
        let abs = DispField::from_vec(abs.w, abs.h, abs.data.iter().map(|e| e * 100.0).collect())?;
        Ok((score, masked_vis(&abs, mask)))
    }

    fn vis_range(&self) -> (f32, f32) {
        (0.0, 50.0)
    }
}

/// Reported runtime in seconds, optionally log10-scaled.
pub struct Runtime {
    log: bool,
}

impl Runtime {
    pub fn new(log: bool) -> Self {
        Self { log }
    }
}

impl Metric for Runtime {
    fn name(&self) -> String {
        if self.log {
            "runtime_log10".to_string()
        } else {
            "runtime".to_string()
        }
    }

    fn display_name(&self) -> String {
        if self.log {
            "Runtime (log10)".to_string()
        } else {
            "Runtime".to_string()
        }
    }

    fn evaluation_mask(&self, scene: &Scene) -> Result<MaskField, String> {
        // Runtime is per-scene, not per-pixel; every pixel "participates".
        let gt = scene.gt()?;
        Ok(MaskField::full(gt.w, gt.h))
    }

    fn score_from_mask(
        &self,
        inputs: EvalInputs,
        _result: &DispField,
        _gt: &DispField,
        _mask: &MaskField,
    ) -> Result<f32, String> {
        let seconds = runtime_seconds(inputs.settings, inputs.scene, inputs.algorithm)?;
        if self.log {
            Ok(seconds.max(f32::MIN_POSITIVE).log10())
        } else {
            Ok(seconds)
        }
    }

    fn score_with_vis(
        &self,
        _inputs: EvalInputs,
        _result: &DispField,
        _gt: &DispField,
        _mask: &MaskField,
    ) -> Result<(f32, DispField), String> {
        Err("runtime has no per-pixel visualization".to_string())
    }
}

/// Evaluation mask shared by the whole-image metrics: the scene's
/// `general_eval` mask when present, else every pixel.
fn general_mask(scene: &Scene) -> Result<MaskField, String> {
    if scene.has_mask("general_eval") {
        scene.mask("general_eval")
    } else {
        let gt = scene.gt()?;
        Ok(MaskField::full(gt.w, gt.h))
    }
}
