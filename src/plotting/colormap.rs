//! Value-to-color mapping for disparity and error panels.
//!
//! Built on plotters' colormap support: Viridis for disparity maps and
//! derived control-point maps for the diverging and sequential error
//! scales. NaN pixels (missing estimates, out-of-mask) render light gray.

use crate::metrics::Metric;
use crate::scenes::Scene;
use plotters::style::colors::colormaps::{ColorMap, DerivedColorMap, ViridisRGB};
use plotters::style::RGBColor;
use std::sync::OnceLock;

/// Light gray used for NaN pixels.
pub const MISSING: RGBColor = RGBColor(210, 210, 210);

fn rdylgn() -> &'static DerivedColorMap<RGBColor> {
    static MAP: OnceLock<DerivedColorMap<RGBColor>> = OnceLock::new();
    MAP.get_or_init(|| {
        DerivedColorMap::new(&[
            RGBColor(165, 0, 38),
            RGBColor(244, 109, 67),
            RGBColor(255, 255, 191),
            RGBColor(102, 189, 99),
            RGBColor(0, 104, 55),
        ])
    })
}

fn seismic() -> &'static DerivedColorMap<RGBColor> {
    static MAP: OnceLock<DerivedColorMap<RGBColor>> = OnceLock::new();
    MAP.get_or_init(|| {
        DerivedColorMap::new(&[
            RGBColor(0, 0, 76),
            RGBColor(0, 0, 255),
            RGBColor(255, 255, 255),
            RGBColor(255, 0, 0),
            RGBColor(127, 0, 0),
        ])
    })
}

fn hot() -> &'static DerivedColorMap<RGBColor> {
    static MAP: OnceLock<DerivedColorMap<RGBColor>> = OnceLock::new();
    MAP.get_or_init(|| {
        DerivedColorMap::new(&[
            RGBColor(10, 0, 0),
            RGBColor(230, 0, 0),
            RGBColor(255, 210, 0),
            RGBColor(255, 255, 255),
        ])
    })
}

/// Named color scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorScale {
    /// Perceptually uniform map for disparity values.
    Viridis,
    /// Diverging red → yellow → green, used for median-diff maps.
    RdYlGn,
    /// Diverging blue → white → red, used for signed error maps.
    Seismic,
    /// Black → red → yellow → white, used for absolute error maps.
    Hot,
}

impl ColorScale {
    /// Sample the scale at `t` in [0, 1].
    pub fn sample(self, t: f32) -> RGBColor {
        let t = t.clamp(0.0, 1.0);
        match self {
            ColorScale::Viridis => ViridisRGB.get_color(t),
            ColorScale::RdYlGn => rdylgn().get_color(t),
            ColorScale::Seismic => seismic().get_color(t),
            ColorScale::Hot => hot().get_color(t),
        }
    }
}

/// How a scalar panel maps values to colors.
#[derive(Clone, Copy, Debug)]
pub struct DisplayArgs {
    pub scale: ColorScale,
    pub vmin: f32,
    pub vmax: f32,
}

impl DisplayArgs {
    pub fn color_of(&self, v: f32) -> RGBColor {
        if !v.is_finite() {
            return MISSING;
        }
        let span = self.vmax - self.vmin;
        let t = if span.abs() < f32::EPSILON {
            0.5
        } else {
            (v - self.vmin) / span
        };
        self.scale.sample(t)
    }
}

/// Disparity maps: Viridis over the scene's display range.
pub fn disp_map_args(scene: &Scene) -> DisplayArgs {
    let (vmin, vmax) = scene.disp_range();
    DisplayArgs {
        scale: ColorScale::Viridis,
        vmin,
        vmax,
    }
}

/// Signed error maps (gt − algo): diverging scale around zero.
pub fn diff_map_args(vmin: f32, vmax: f32) -> DisplayArgs {
    DisplayArgs {
        scale: ColorScale::Seismic,
        vmin,
        vmax,
    }
}

/// Median-diff maps: diverging red/green clipped to ±0.05.
pub fn median_diff_args() -> DisplayArgs {
    DisplayArgs {
        scale: ColorScale::RdYlGn,
        vmin: -0.05,
        vmax: 0.05,
    }
}

/// Absolute error maps.
pub fn abs_diff_map_args() -> DisplayArgs {
    DisplayArgs {
        scale: ColorScale::Hot,
        vmin: 0.0,
        vmax: 0.1,
    }
}

/// Heat map for a metric's per-pixel contribution field.
pub fn metric_args(metric: &dyn Metric) -> DisplayArgs {
    let (vmin, vmax) = metric.vis_range();
    DisplayArgs {
        scale: ColorScale::Hot,
        vmin,
        vmax,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_renders_as_missing_gray() {
        let args = median_diff_args();
        assert_eq!(args.color_of(f32::NAN), MISSING);
    }

    #[test]
    fn range_endpoints_hit_scale_ends() {
        let args = DisplayArgs {
            scale: ColorScale::RdYlGn,
            vmin: -1.0,
            vmax: 1.0,
        };
        let lo = args.color_of(-1.0);
        let hi = args.color_of(1.0);
        assert_ne!(lo, hi, "endpoints must map to different colors");
        // Below/above the range clamps to the ends.
        assert_eq!(args.color_of(-5.0), lo);
        assert_eq!(args.color_of(5.0), hi);
    }
}
