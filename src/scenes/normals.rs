//! Surface normals derived from disparity fields.
//!
//! Treats a disparity field as a height field: central-difference gradients
//! (border clamping) give the local slope, and the normal is the normalized
//! `(-dx, -dy, 1)`. The visualization maps each unit normal into RGB the
//! usual way, `(n + 1) / 2`. Angular error between two fields is measured
//! per pixel as the angle between their unit normals, in degrees.

use crate::field::DispField;
use image::{Rgb, RgbImage};
use nalgebra::Vector3;

/// Per-pixel unit normals of a disparity field, row-major.
pub fn normal_map(disp: &DispField) -> Vec<Vector3<f32>> {
    let w = disp.w;
    let h = disp.h;
    let mut normals = Vec::with_capacity(w * h);
    for y in 0..h {
        let ym = y.saturating_sub(1);
        let yp = (y + 1).min(h.saturating_sub(1));
        for x in 0..w {
            let xm = x.saturating_sub(1);
            let xp = (x + 1).min(w.saturating_sub(1));
            let dx = (disp.get(xp, y) - disp.get(xm, y)) / (xp - xm).max(1) as f32;
            let dy = (disp.get(x, yp) - disp.get(x, ym)) / (yp - ym).max(1) as f32;
            let n = if dx.is_finite() && dy.is_finite() {
                Vector3::new(-dx, -dy, 1.0).normalize()
            } else {
                // Missing pixels get a straight-on normal so the
                // visualization stays defined.
                Vector3::new(0.0, 0.0, 1.0)
            };
            normals.push(n);
        }
    }
    normals
}

/// RGB rendering of the normal field: each component mapped from [-1, 1]
/// to [0, 255].
pub fn normal_vis(disp: &DispField) -> RgbImage {
    let normals = normal_map(disp);
    let mut img = RgbImage::new(disp.w as u32, disp.h as u32);
    for (i, n) in normals.iter().enumerate() {
        let x = (i % disp.w) as u32;
        let y = (i / disp.w) as u32;
        let to_byte = |v: f32| (((v + 1.0) * 0.5).clamp(0.0, 1.0) * 255.0) as u8;
        img.put_pixel(x, y, Rgb([to_byte(n.x), to_byte(n.y), to_byte(n.z)]));
    }
    img
}

/// Per-pixel angle between the normals of two disparity fields, degrees.
///
/// Shapes must match; the result has the same dimensions.
pub fn angular_error_deg(a: &DispField, b: &DispField) -> Result<DispField, String> {
    if a.w != b.w || a.h != b.h {
        return Err(format!(
            "normal comparison shape mismatch: {}x{} vs {}x{}",
            a.w, a.h, b.w, b.h
        ));
    }
    let na = normal_map(a);
    let nb = normal_map(b);
    let data = na
        .iter()
        .zip(&nb)
        .map(|(p, q)| p.dot(q).clamp(-1.0, 1.0).acos().to_degrees())
        .collect();
    DispField::from_vec(a.w, a.h, data)
}
