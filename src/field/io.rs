//! I/O helpers for benchmark data files.
//!
//! - `read_pfm` / `write_pfm`: single-channel PFM disparity maps
//!   (little-endian, scanlines stored bottom-up).
//! - `load_rgb_image`: read a PNG/JPEG center view into an RGB buffer.
//! - `load_mask`: read an 8-bit mask image, nonzero pixels selected.
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::{DispField, MaskField};
use image::RgbImage;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Load an image from disk and convert to RGB.
pub fn load_rgb_image(path: &Path) -> Result<RgbImage, String> {
    let img = image::open(path)
        .map_err(|e| format!("Failed to open {}: {e}", path.display()))?
        .into_rgb8();
    Ok(img)
}

/// Load an 8-bit image as a boolean mask. Any nonzero pixel is selected.
pub fn load_mask(path: &Path) -> Result<MaskField, String> {
    let img = image::open(path)
        .map_err(|e| format!("Failed to open mask {}: {e}", path.display()))?
        .into_luma8();
    let w = img.width() as usize;
    let h = img.height() as usize;
    let data = img.into_raw().into_iter().map(|v| v > 0).collect();
    Ok(MaskField { w, h, data })
}

/// Read a single-channel PFM file into a `DispField`.
///
/// Header: `Pf`, then `width height`, then a scale whose sign selects the
/// byte order (negative = little endian). Scanlines are stored bottom-up.
pub fn read_pfm(path: &Path) -> Result<DispField, String> {
    let bytes = fs::read(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    parse_pfm(&bytes).map_err(|e| format!("Malformed PFM {}: {e}", path.display()))
}

fn parse_pfm(bytes: &[u8]) -> Result<DispField, String> {
    let mut pos = 0usize;
    let magic = next_token(bytes, &mut pos).ok_or("missing magic")?;
    if magic != b"Pf" {
        return Err(format!(
            "unsupported magic {:?} (only single-channel `Pf`)",
            String::from_utf8_lossy(magic)
        ));
    }
    let w: usize = parse_ascii(next_token(bytes, &mut pos).ok_or("missing width")?)?;
    let h: usize = parse_ascii(next_token(bytes, &mut pos).ok_or("missing height")?)?;
    let scale: f32 = parse_ascii(next_token(bytes, &mut pos).ok_or("missing scale")?)?;
    // Exactly one whitespace byte separates the header from the raster.
    pos += 1;

    let n = w * h;
    let expected = n * 4;
    let raster = bytes
        .get(pos..pos + expected)
        .ok_or_else(|| format!("raster truncated: want {} bytes", expected))?;

    let little_endian = scale < 0.0;
    let mut data = vec![0.0f32; n];
    for (i, chunk) in raster.chunks_exact(4).enumerate() {
        let raw = [chunk[0], chunk[1], chunk[2], chunk[3]];
        let v = if little_endian {
            f32::from_le_bytes(raw)
        } else {
            f32::from_be_bytes(raw)
        };
        // PFM stores the bottom scanline first; flip to top-down.
        let y = h - 1 - i / w;
        let x = i % w;
        data[y * w + x] = v;
    }
    DispField::from_vec(w, h, data)
}

fn next_token<'a>(bytes: &'a [u8], pos: &mut usize) -> Option<&'a [u8]> {
    while *pos < bytes.len() && bytes[*pos].is_ascii_whitespace() {
        *pos += 1;
    }
    let start = *pos;
    while *pos < bytes.len() && !bytes[*pos].is_ascii_whitespace() {
        *pos += 1;
    }
    (*pos > start).then(|| &bytes[start..*pos])
}

fn parse_ascii<T: std::str::FromStr>(token: &[u8]) -> Result<T, String> {
    let s = std::str::from_utf8(token).map_err(|_| "non-ascii header token".to_string())?;
    s.parse()
        .map_err(|_| format!("invalid header token {s:?}"))
}

/// Write a `DispField` as a little-endian single-channel PFM.
pub fn write_pfm(field: &DispField, path: &Path) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let mut out = Vec::with_capacity(32 + field.data.len() * 4);
    out.extend_from_slice(format!("Pf\n{} {}\n-1.0\n", field.w, field.h).as_bytes());
    for y in (0..field.h).rev() {
        for &v in field.row(y) {
            out.extend_from_slice(&v.to_le_bytes());
        }
    }
    fs::write(path, out).map_err(|e| format!("Failed to write {}: {e}", path.display()))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

pub fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}
