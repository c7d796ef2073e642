//! Figure assembly: canvas, grid layout, color mapping and panel drawing.
//!
//! A `FigureCanvas` owns the pixel buffer for one figure. Drawing happens
//! inside a closure borrowing the plotters backend, so the backend is
//! released on every exit path, including failures; the buffer is saved as
//! PNG exactly once. Chart figures (series, radar) draw through the same
//! canvas with plotters' chart API.

pub mod colormap;
pub mod grid;
pub mod panels;

use crate::config::Settings;
use crate::field::io::ensure_parent_dir;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::{Path, PathBuf};

/// Error type used by drawing helpers; converted to `String` at the
/// figure-operation seam.
pub type DrawResult<T> = Result<T, Box<dyn std::error::Error>>;

/// The root drawing area of a figure canvas.
pub type Root<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Owned RGB canvas for one figure.
pub struct FigureCanvas {
    width: u32,
    height: u32,
    buf: Vec<u8>,
}

impl FigureCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            buf: vec![255u8; (width * height * 3) as usize],
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Run `draw` against a fresh backend over this canvas.
    pub fn render<F>(&mut self, draw: F) -> Result<(), String>
    where
        F: for<'a> FnOnce(&Root<'a>) -> DrawResult<()>,
    {
        let (w, h) = (self.width, self.height);
        let root = BitMapBackend::with_buffer(&mut self.buf, (w, h)).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| format!("Failed to clear figure canvas: {e}"))?;
        draw(&root).map_err(|e| format!("Failed to render figure: {e}"))?;
        root.present()
            .map_err(|e| format!("Failed to finalize figure canvas: {e}"))?;
        Ok(())
    }

    /// Write the canvas as PNG, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        ensure_parent_dir(path)?;
        image::save_buffer(
            path,
            &self.buf,
            self.width,
            self.height,
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
    }
}

/// Output path for a named figure: `<figures_dir>/<subdir>/<name>.png`.
pub fn path_to_figure(settings: &Settings, name: &str, subdir: &str) -> PathBuf {
    settings
        .figures_dir
        .join(subdir)
        .join(format!("{name}.png"))
}

/// Colorbar size inside a cell: (height, width) in pixels.
pub fn colorbar_geometry(cell_w: u32, cell_h: u32) -> (u32, u32) {
    (cell_h * 3 / 4, (cell_w / 7).max(8))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn figure_path_is_under_subdir() {
        let settings = Settings::default();
        let p = path_to_figure(&settings, "scenes", "overview");
        assert!(p.ends_with("figures/overview/scenes.png"), "got {p:?}");
    }

    #[test]
    fn canvas_renders_and_keeps_its_size() {
        let mut canvas = FigureCanvas::new(64, 32);
        canvas
            .render(|root| {
                root.draw_pixel((1, 1), &plotters::style::RGBColor(10, 20, 30))?;
                Ok(())
            })
            .expect("render succeeds");
        assert_eq!(canvas.size(), (64, 32));
        // Pixel (1, 1) of a 64-wide RGB buffer.
        let i = (64 * 1 + 1) * 3;
        assert_eq!(&canvas.buf[i..i + 3], &[10, 20, 30]);
    }
}
