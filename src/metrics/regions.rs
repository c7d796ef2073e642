//! Region-based metrics: surface quality and fine-structure preservation.
//!
//! These score restricted pixel sets from the scene's mask directory:
//! planar regions, continuous (smooth) surfaces, fine structures and their
//! surroundings, and depth discontinuities. The scoring kernels are shared
//! with the scene-bound stratified metrics.

use crate::field::{DispField, MaskField};
use crate::scenes::{normals, Scene};
use crate::metrics::{bad_pix_percent, EvalInputs, Metric};

/// Clip applied to the per-pixel bumpiness response before averaging.
const BUMPINESS_CLIP: f32 = 5.0;

/// Median of the masked, finite values.
pub fn masked_median(values: &DispField, mask: &MaskField) -> Result<f32, String> {
    let mut selected: Vec<f32> = values
        .data
        .iter()
        .zip(&mask.data)
        .filter(|(v, &m)| m && v.is_finite())
        .map(|(&v, _)| v)
        .collect();
    if selected.is_empty() {
        return Err("empty evaluation mask".to_string());
    }
    selected.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = selected.len();
    Ok(if n % 2 == 1 {
        selected[n / 2]
    } else {
        0.5 * (selected[n / 2 - 1] + selected[n / 2])
    })
}

/// Frobenius norm of the error-map Hessian per pixel, clipped.
///
/// A result that is merely offset from the ground truth is flat here; only
/// curvature of the error surface registers as bumpiness.
pub fn bumpiness_field(result: &DispField, gt: &DispField) -> Result<DispField, String> {
    let err = result.sub(gt)?;
    let w = err.w;
    let h = err.h;
    let mut out = DispField::filled(w, h, f32::NAN);
    if w < 3 || h < 3 {
        return Ok(out);
    }
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let c = err.get(x, y);
            let dxx = err.get(x + 1, y) - 2.0 * c + err.get(x - 1, y);
            let dyy = err.get(x, y + 1) - 2.0 * c + err.get(x, y - 1);
            let dxy = 0.25
                * (err.get(x + 1, y + 1) - err.get(x + 1, y - 1) - err.get(x - 1, y + 1)
                    + err.get(x - 1, y - 1));
            let frob = (dxx * dxx + 2.0 * dxy * dxy + dyy * dyy).sqrt();
            if frob.is_finite() {
                out.set(x, y, frob.min(BUMPINESS_CLIP));
            }
        }
    }
    Ok(out)
}

/// Mean clipped bumpiness over the mask, ×100.
pub fn bumpiness_score(
    result: &DispField,
    gt: &DispField,
    mask: &MaskField,
) -> Result<f32, String> {
    let field = bumpiness_field(result, gt)?;
    let mut sum = 0.0f64;
    let mut n = 0usize;
    for i in 0..mask.data.len() {
        if mask.data[i] && field.data[i].is_finite() {
            sum += field.data[i] as f64;
            n += 1;
        }
    }
    if n == 0 {
        return Err("empty evaluation mask".to_string());
    }
    Ok((sum / n as f64 * 100.0) as f32)
}

/// Percent of masked pixels pushed past `thresh` in the signed direction
/// `sign` (+1 toward the camera, -1 away). Missing pixels count as moved.
pub fn signed_excess_percent(
    result: &DispField,
    gt: &DispField,
    mask: &MaskField,
    thresh: f32,
    sign: f32,
) -> Result<f32, String> {
    let mut total = 0usize;
    let mut moved = 0usize;
    for i in 0..mask.data.len() {
        if !mask.data[i] || !gt.data[i].is_finite() {
            continue;
        }
        total += 1;
        let err = (result.data[i] - gt.data[i]) * sign;
        if err.is_nan() || err > thresh {
            moved += 1;
        }
    }
    if total == 0 {
        return Err("empty evaluation mask".to_string());
    }
    Ok(100.0 * moved as f32 / total as f32)
}

fn masked_nan(field: DispField, mask: &MaskField) -> DispField {
    let mut out = DispField::filled(field.w, field.h, f32::NAN);
    for i in 0..field.data.len() {
        if mask.data[i] {
            out.data[i] = field.data[i];
        }
    }
    out
}

// ---- surface-normal metrics -------------------------------------------------

/// Median angular error of surface normals over a named region mask.
pub struct MaeNormals {
    mask_name: &'static str,
    key: &'static str,
    label: &'static str,
}

/// Median angular error on continuous (smooth, non-planar) surfaces.
pub fn mae_contin_surf() -> MaeNormals {
    MaeNormals {
        mask_name: "contin_surfaces",
        key: "mae_contin_surf",
        label: "MAE Contin. Surfaces",
    }
}

/// Median angular error on planar regions.
pub fn mae_planes() -> MaeNormals {
    MaeNormals {
        mask_name: "planes",
        key: "mae_planes",
        label: "MAE Planes",
    }
}

impl Metric for MaeNormals {
    fn name(&self) -> String {
        self.key.to_string()
    }

    fn display_name(&self) -> String {
        self.label.to_string()
    }

    fn evaluation_mask(&self, scene: &Scene) -> Result<MaskField, String> {
        scene.mask(self.mask_name)
    }

    fn score_from_mask(
        &self,
        inputs: EvalInputs,
        result: &DispField,
        gt: &DispField,
        mask: &MaskField,
    ) -> Result<f32, String> {
        self.score_with_vis(inputs, result, gt, mask).map(|(s, _)| s)
    }

    fn score_with_vis(
        &self,
        _inputs: EvalInputs,
        result: &DispField,
        gt: &DispField,
        mask: &MaskField,
    ) -> Result<(f32, DispField), String> {
        let angles = normals::angular_error_deg(result, gt)?;
        let score = masked_median(&angles, mask)?;
        Ok((score, masked_nan(angles, mask)))
    }

    fn vis_range(&self) -> (f32, f32) {
        (0.0, 80.0)
    }
}

// ---- bumpiness --------------------------------------------------------------

/// Mean clipped curvature of the error surface over a named region mask.
pub struct Bumpiness {
    mask_name: &'static str,
    key: &'static str,
    label: &'static str,
}

pub fn bumpiness_planes() -> Bumpiness {
    Bumpiness {
        mask_name: "planes",
        key: "bumpiness_planes",
        label: "Bumpiness Planes",
    }
}

pub fn bumpiness_contin_surf() -> Bumpiness {
    Bumpiness {
        mask_name: "contin_surfaces",
        key: "bumpiness_contin_surf",
        label: "Bumpiness Contin. Surfaces",
    }
}

impl Metric for Bumpiness {
    fn name(&self) -> String {
        self.key.to_string()
    }

    fn display_name(&self) -> String {
        self.label.to_string()
    }

    fn evaluation_mask(&self, scene: &Scene) -> Result<MaskField, String> {
        scene.mask(self.mask_name)
    }

    fn score_from_mask(
        &self,
        _inputs: EvalInputs,
        result: &DispField,
        gt: &DispField,
        mask: &MaskField,
    ) -> Result<f32, String> {
        bumpiness_score(result, gt, mask)
    }

    fn score_with_vis(
        &self,
        inputs: EvalInputs,
        result: &DispField,
        gt: &DispField,
        mask: &MaskField,
    ) -> Result<(f32, DispField), String> {
        let score = self.score_from_mask(inputs, result, gt, mask)?;
        let field = bumpiness_field(result, gt)?;
        Ok((score, masked_nan(field, mask)))
    }

    fn vis_range(&self) -> (f32, f32) {
        (0.0, BUMPINESS_CLIP)
    }
}

// ---- fine structures --------------------------------------------------------

/// Disparity offset beyond which a fine-structure pixel counts as moved.
const FINE_THRESH: f32 = 0.1;

/// Percent of fine-structure surroundings pulled toward the foreground.
pub struct FineFattening;

/// Percent of fine-structure pixels pushed toward the background.
pub struct FineThinning;

impl Metric for FineFattening {
    fn name(&self) -> String {
        "fine_fattening".to_string()
    }

    fn display_name(&self) -> String {
        "Fattening".to_string()
    }

    fn evaluation_mask(&self, scene: &Scene) -> Result<MaskField, String> {
        scene.mask("fine_surround")
    }

    fn score_from_mask(
        &self,
        _inputs: EvalInputs,
        result: &DispField,
        gt: &DispField,
        mask: &MaskField,
    ) -> Result<f32, String> {
        signed_excess_percent(result, gt, mask, FINE_THRESH, 1.0)
    }

    fn score_with_vis(
        &self,
        inputs: EvalInputs,
        result: &DispField,
        gt: &DispField,
        mask: &MaskField,
    ) -> Result<(f32, DispField), String> {
        let score = self.score_from_mask(inputs, result, gt, mask)?;
        let signed = result.sub(gt)?;
        let flags = DispField::from_vec(
            signed.w,
            signed.h,
            signed
                .data
                .iter()
                .map(|&e| if e.is_nan() || e > FINE_THRESH { 1.0 } else { 0.0 })
                .collect(),
        )?;
        Ok((score, masked_nan(flags, mask)))
    }

    fn vis_range(&self) -> (f32, f32) {
        (0.0, 1.0)
    }
}

impl Metric for FineThinning {
    fn name(&self) -> String {
        "fine_thinning".to_string()
    }

    fn display_name(&self) -> String {
        "Thinning".to_string()
    }

    fn evaluation_mask(&self, scene: &Scene) -> Result<MaskField, String> {
        scene.mask("fine_structures")
    }

    fn score_from_mask(
        &self,
        _inputs: EvalInputs,
        result: &DispField,
        gt: &DispField,
        mask: &MaskField,
    ) -> Result<f32, String> {
        signed_excess_percent(result, gt, mask, FINE_THRESH, -1.0)
    }

    fn score_with_vis(
        &self,
        inputs: EvalInputs,
        result: &DispField,
        gt: &DispField,
        mask: &MaskField,
    ) -> Result<(f32, DispField), String> {
        let score = self.score_from_mask(inputs, result, gt, mask)?;
        let signed = result.sub(gt)?;
        let flags = DispField::from_vec(
            signed.w,
            signed.h,
            signed
                .data
                .iter()
                .map(|&e| if e.is_nan() || -e > FINE_THRESH { 1.0 } else { 0.0 })
                .collect(),
        )?;
        Ok((score, masked_nan(flags, mask)))
    }

    fn vis_range(&self) -> (f32, f32) {
        (0.0, 1.0)
    }
}

// ---- discontinuities --------------------------------------------------------

/// Bad-pixel rate restricted to the discontinuity neighborhood mask.
pub struct Discontinuities {
    thresh: f32,
}

impl Discontinuities {
    pub fn new() -> Self {
        Self { thresh: 0.07 }
    }
}

impl Default for Discontinuities {
    fn default() -> Self {
        Self::new()
    }
}

impl Metric for Discontinuities {
    fn name(&self) -> String {
        "discontinuities".to_string()
    }

    fn display_name(&self) -> String {
        "Discontinuities".to_string()
    }

    fn evaluation_mask(&self, scene: &Scene) -> Result<MaskField, String> {
        scene.mask("discontinuities")
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
        Ok((score, masked_nan(flags, mask)))
    }

    fn vis_range(&self) -> (f32, f32) {
        (0.0, 1.0)
    }
}
