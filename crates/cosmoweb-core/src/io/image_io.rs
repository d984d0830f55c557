use std::path::Path;

use image::{GrayImage, ImageFormat, Luma};
use ndarray::Array2;

use crate::error::Result;

/// Display range `(low, high)` over the finite pixels, or `None` if there are none.
pub fn finite_range(data: &Array2<f32>) -> Option<(f32, f32)> {
    data.iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Save a cutout as an 8-bit grayscale PNG preview with a linear min/max stretch.
///
/// Row 0 of the array is the bottom of the sky image, so rows are flipped to
/// put north up. NaN pixels are drawn black.
pub fn save_png_preview(data: &Array2<f32>, path: &Path) -> Result<()> {
    let (h, w) = data.dim();
    let (lo, hi) = finite_range(data).unwrap_or((0.0, 1.0));
    let span = if hi > lo { hi - lo } else { 1.0 };

    let mut img = GrayImage::new(w as u32, h as u32);
    for row in 0..h {
        for col in 0..w {
            let v = data[[row, col]];
            let val = if v.is_finite() {
                (((v - lo) / span).clamp(0.0, 1.0) * 255.0) as u8
            } else {
                0
            };
            img.put_pixel(col as u32, (h - 1 - row) as u32, Luma([val]));
        }
    }

    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}
