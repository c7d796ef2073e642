//! Pixel-exact grid layout for panel figures.
//!
//! A `GridLayout` places `rows × cols` equally sized cells on a canvas,
//! optionally with a band above every row (titles), a band left of the grid
//! (rotated row labels) and a band below (captions). Subplot indices count
//! row-major, `idx = row * cols + col`, matching the composer's arithmetic.

/// Outer margin around the whole figure, pixels.
const MARGIN: u32 = 10;

#[derive(Clone, Copy, Debug)]
pub struct GridLayout {
    pub rows: usize,
    pub cols: usize,
    pub cell_w: u32,
    pub cell_h: u32,
    row_band: u32,
    left_band: u32,
    bottom_band: u32,
    hgap: u32,
    wgap: u32,
}

impl GridLayout {
    pub fn new(rows: usize, cols: usize, cell_w: u32, cell_h: u32) -> Self {
        Self {
            rows,
            cols,
            cell_w,
            cell_h,
            row_band: 0,
            left_band: 0,
            bottom_band: 0,
            hgap: 4,
            wgap: 4,
        }
    }

    /// Reserve `h` pixels above every row for titles.
    pub fn with_row_band(mut self, h: u32) -> Self {
        self.row_band = h;
        self
    }

    /// Reserve `w` pixels left of the grid for rotated row labels.
    pub fn with_left_band(mut self, w: u32) -> Self {
        self.left_band = w;
        self
    }

    /// Reserve `h` pixels below the grid for captions.
    pub fn with_bottom_band(mut self, h: u32) -> Self {
        self.bottom_band = h;
        self
    }

    pub fn with_gaps(mut self, hgap: u32, wgap: u32) -> Self {
        self.hgap = hgap;
        self.wgap = wgap;
        self
    }

    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    pub fn fig_size(&self) -> (u32, u32) {
        let w = 2 * MARGIN
            + self.left_band
            + self.cols as u32 * self.cell_w
            + self.cols.saturating_sub(1) as u32 * self.wgap;
        let h = 2 * MARGIN
            + self.rows as u32 * (self.row_band + self.cell_h)
            + self.rows.saturating_sub(1) as u32 * self.hgap
            + self.bottom_band;
        (w, h)
    }

    /// Top-left pixel of the cell for a row-major subplot index.
    ///
    /// Panics if `idx` is outside the grid; callers compute indices from the
    /// same `rows`/`cols` this layout was built with.
    pub fn cell_origin(&self, idx: usize) -> (u32, u32) {
        assert!(
            idx < self.cell_count(),
            "subplot index {} outside {}x{} grid",
            idx,
            self.rows,
            self.cols
        );
        let row = (idx / self.cols) as u32;
        let col = (idx % self.cols) as u32;
        let x = MARGIN + self.left_band + col * (self.cell_w + self.wgap);
        let y = MARGIN + row * (self.row_band + self.cell_h + self.hgap) + self.row_band;
        (x, y)
    }

    /// Anchor for a title centered above the cell, inside the row band.
    pub fn title_anchor(&self, idx: usize) -> (i32, i32) {
        let (x, y) = self.cell_origin(idx);
        (
            (x + self.cell_w / 2) as i32,
            y as i32 - self.row_band as i32 + 2,
        )
    }

    /// Anchor for a rotated label left of the cell, vertically centered.
    pub fn ylabel_anchor(&self, idx: usize) -> (i32, i32) {
        let (x, y) = self.cell_origin(idx);
        (
            x as i32 - self.left_band as i32 + 2,
            (y + self.cell_h / 2) as i32,
        )
    }

    /// Anchor for a caption centered below the cell.
    pub fn xlabel_anchor(&self, idx: usize) -> (i32, i32) {
        let (x, y) = self.cell_origin(idx);
        ((x + self.cell_w / 2) as i32, (y + self.cell_h) as i32 + 2)
    }

    /// Anchor inside the bottom band, `frac` across the figure width.
    pub fn caption_anchor(&self, frac: f32) -> (i32, i32) {
        let (w, h) = self.fig_size();
        (
            (w as f32 * frac) as i32,
            (h - MARGIN - self.bottom_band + 4) as i32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_unique_and_inside_figure() {
        let layout = GridLayout::new(3, 7, 64, 48)
            .with_row_band(18)
            .with_left_band(20)
            .with_bottom_band(30);
        let (fw, fh) = layout.fig_size();
        let mut seen = std::collections::HashSet::new();
        for idx in 0..layout.cell_count() {
            let (x, y) = layout.cell_origin(idx);
            assert!(
                x + layout.cell_w <= fw && y + layout.cell_h <= fh,
                "cell {idx} at ({x}, {y}) leaves the {fw}x{fh} canvas"
            );
            assert!(seen.insert((x, y)), "cell {idx} overlaps another cell");
        }
    }

    #[test]
    fn row_major_indexing() {
        let layout = GridLayout::new(2, 4, 10, 10);
        let (x0, y0) = layout.cell_origin(0);
        let (x1, _) = layout.cell_origin(1);
        let (_, y4) = layout.cell_origin(4);
        assert!(x1 > x0, "index 1 sits right of index 0");
        assert!(y4 > y0, "index cols starts the second row");
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn out_of_grid_index_panics() {
        let layout = GridLayout::new(2, 2, 10, 10);
        let _ = layout.cell_origin(4);
    }
}
