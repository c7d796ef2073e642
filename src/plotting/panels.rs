//! Panel primitives: 1:1 image blitting, scalar-field rendering, titles,
//! rotated row labels, colorbars and the ground-truth obscuring shuffle.
//!
//! All drawing goes through a plotters drawing area positioned by the
//! `GridLayout`; pixels are written 1:1, never resampled.

use crate::field::DispField;
use crate::plotting::colormap::DisplayArgs;
use crate::plotting::{DrawResult, Root};
use image::RgbImage;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seed for the obscuring shuffle; fixed so reruns produce identical files.
const PIXELIZE_SEED: u64 = 0x9e3779b97f4a7c15;

/// Neighborhood radius for the obscuring shuffle, pixels.
const PIXELIZE_RADIUS: i64 = 12;

/// Blit an RGB image 1:1 with its top-left at `origin`.
pub fn draw_rgb_panel(root: &Root<'_>, origin: (u32, u32), img: &RgbImage) -> DrawResult<()> {
    for (x, y, p) in img.enumerate_pixels() {
        root.draw_pixel(
            ((origin.0 + x) as i32, (origin.1 + y) as i32),
            &RGBColor(p.0[0], p.0[1], p.0[2]),
        )?;
    }
    Ok(())
}

/// Render a scalar field 1:1 through a color scale.
pub fn draw_scalar_panel(
    root: &Root<'_>,
    origin: (u32, u32),
    field: &DispField,
    args: &DisplayArgs,
) -> DrawResult<()> {
    for y in 0..field.h {
        for x in 0..field.w {
            let color = args.color_of(field.get(x, y));
            root.draw_pixel(
                ((origin.0 + x as u32) as i32, (origin.1 + y as u32) as i32),
                &color,
            )?;
        }
    }
    Ok(())
}

/// Title centered above a cell (anchor from `GridLayout::title_anchor`).
pub fn draw_title(root: &Root<'_>, anchor: (i32, i32), text: &str, fs: u32) -> DrawResult<()> {
    let style = ("sans-serif", fs)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Top));
    root.draw(&Text::new(text.to_string(), anchor, style))?;
    Ok(())
}

/// Caption centered below a cell.
pub fn draw_xlabel(root: &Root<'_>, anchor: (i32, i32), text: &str, fs: u32) -> DrawResult<()> {
    draw_title(root, anchor, text, fs)
}

/// Rotated row label left of a cell (anchor from `GridLayout::ylabel_anchor`).
pub fn draw_ylabel(root: &Root<'_>, anchor: (i32, i32), text: &str, fs: u32) -> DrawResult<()> {
    let style = ("sans-serif", fs)
        .into_font()
        .color(&BLACK)
        .transform(FontTransform::Rotate270)
        .pos(Pos::new(HPos::Center, VPos::Center));
    root.draw(&Text::new(text.to_string(), anchor, style))?;
    Ok(())
}

/// Vertical colorbar for `args`, drawn inside the cell at `origin`.
///
/// `bar_h`/`bar_w` follow the grid's colorbar geometry; `bins` tick labels
/// are spread over the value range, highest at the top.
#[allow(clippy::too_many_arguments)]
pub fn draw_colorbar(
    root: &Root<'_>,
    origin: (u32, u32),
    bar_h: u32,
    bar_w: u32,
    args: &DisplayArgs,
    bins: usize,
    fs: u32,
) -> DrawResult<()> {
    let (x0, y0) = (origin.0 as i32, origin.1 as i32);
    for y in 0..bar_h {
        let t = 1.0 - y as f32 / (bar_h.saturating_sub(1)).max(1) as f32;
        let color = args.scale.sample(t);
        for x in 0..bar_w {
            root.draw_pixel((x0 + x as i32, y0 + y as i32), &color)?;
        }
    }
    root.draw(&Rectangle::new(
        [(x0, y0), (x0 + bar_w as i32, y0 + bar_h as i32)],
        BLACK.stroke_width(1),
    ))?;

    let label_style = ("sans-serif", fs)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Left, VPos::Center));
    for i in 0..=bins {
        let frac = i as f32 / bins as f32;
        let value = args.vmax - frac * (args.vmax - args.vmin);
        let y = y0 + (frac * bar_h as f32) as i32;
        root.draw(&Text::new(
            format_tick(value),
            (x0 + bar_w as i32 + 4, y),
            label_style.clone(),
        ))?;
    }
    Ok(())
}

fn format_tick(v: f32) -> String {
    if v.abs() >= 10.0 {
        format!("{v:.0}")
    } else if v.abs() >= 1.0 {
        format!("{v:.1}")
    } else {
        format!("{v:.2}")
    }
}

/// Obscure a withheld ground-truth field by swapping a fixed fraction of
/// pixels with random neighbors. Deterministic; values are permuted, never
/// changed, so the rendering still conveys structure without leaking exact
/// per-pixel ground truth.
pub fn pixelize(field: &DispField, noise_factor: f32) -> DispField {
    let mut out = field.clone();
    let w = field.w as i64;
    let h = field.h as i64;
    if w == 0 || h == 0 {
        return out;
    }
    let mut rng = StdRng::seed_from_u64(PIXELIZE_SEED);
    for y in 0..h {
        for x in 0..w {
            if rng.random::<f32>() >= noise_factor {
                continue;
            }
            let nx = (x + rng.random_range(-PIXELIZE_RADIUS..=PIXELIZE_RADIUS)).clamp(0, w - 1);
            let ny = (y + rng.random_range(-PIXELIZE_RADIUS..=PIXELIZE_RADIUS)).clamp(0, h - 1);
            let a = (y * w + x) as usize;
            let b = (ny * w + nx) as usize;
            out.data.swap(a, b);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(w: usize, h: usize) -> DispField {
        let mut f = DispField::new(w, h);
        for y in 0..h {
            for x in 0..w {
                f.set(x, y, (y * w + x) as f32);
            }
        }
        f
    }

    #[test]
    fn pixelize_is_deterministic() {
        let f = ramp(32, 32);
        let a = pixelize(&f, 0.5);
        let b = pixelize(&f, 0.5);
        assert_eq!(a.data, b.data, "same seed, same shuffle");
    }

    #[test]
    fn pixelize_permutes_without_changing_values() {
        let f = ramp(32, 32);
        let shuffled = pixelize(&f, 0.5);
        let mut before = f.data.clone();
        let mut after = shuffled.data.clone();
        before.sort_by(|a, b| a.partial_cmp(b).unwrap());
        after.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(before, after, "shuffle must preserve the value multiset");
        assert_ne!(f.data, shuffled.data, "a 50% shuffle must move something");
    }

    #[test]
    fn pixelize_zero_fraction_is_identity() {
        let f = ramp(16, 16);
        let same = pixelize(&f, 0.0);
        assert_eq!(f.data, same.data);
    }
}
