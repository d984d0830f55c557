use ndarray::{s, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{CutoutError, Result};
use crate::sky::{CutoutSize, SkyPosition};
use crate::wcs::TanWcs;

/// How a cutout that runs past the tile edge is shaped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CutoutMode {
    /// Keep the requested shape; pixels outside the tile are NaN.
    #[default]
    Partial,
    /// Keep only the part that overlaps the tile.
    Trim,
}

impl std::fmt::Display for CutoutMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Partial => write!(f, "Partial"),
            Self::Trim => write!(f, "Trim"),
        }
    }
}

/// A square patch cut from one plane of a mosaic tile.
#[derive(Clone, Debug)]
pub struct Cutout {
    /// Pixel data, shape = (height, width)
    pub data: Array2<f32>,
    pub size: CutoutSize,
    /// Requested centre
    pub position: SkyPosition,
    pub tile_id: String,
    /// Calibration of the cutout's own pixel grid
    pub wcs: TanWcs,
    /// Tile pixel `(x, y)` of cutout pixel `(0, 0)`
    pub origin_original: (i64, i64),
    /// Requested centre in cutout pixel coordinates
    pub position_cutout: (f64, f64),
}

impl Cutout {
    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    /// True when no pixel carries data (every value is NaN).
    pub fn all_pixels_invalid(&self) -> bool {
        self.data.iter().all(|v| v.is_nan())
    }

    /// Number of NaN pixels.
    pub fn invalid_count(&self) -> usize {
        self.data.iter().filter(|v| v.is_nan()).count()
    }
}

/// Cutout shape `(height, width)` in pixels.
///
/// Angular sizes are divided by the projection-plane pixel scale of each axis
/// and rounded half to even; the result is at least one pixel.
pub fn cutout_shape(size: CutoutSize, wcs: &TanWcs) -> (usize, usize) {
    match size {
        CutoutSize::Pixels(n) => (n.max(1), n.max(1)),
        CutoutSize::Arcsec(_) => {
            let deg = size.degrees().unwrap_or_default();
            let (scale_x, scale_y) = wcs.pixel_scales();
            let axis = |scale: f64| ((deg / scale).round_ties_even() as usize).max(1);
            (axis(scale_y), axis(scale_x))
        }
    }
}

/// Half-open index range `[min, max)` of `n` pixels centred on `pos`.
pub fn index_range(pos: f64, n: usize) -> (i64, i64) {
    let half = n as f64 / 2.0;
    ((pos - half).ceil() as i64, (pos + half).ceil() as i64)
}

/// Overlap of `[min, max)` with `[0, len)`, or `None` if empty.
fn overlap(min: i64, max: i64, len: usize) -> Option<(usize, usize)> {
    let lo = min.max(0);
    let hi = max.min(len as i64);
    (lo < hi).then_some((lo as usize, hi as usize))
}

/// Cut a square patch centred on `position` out of `data`.
pub fn extract(
    data: &Array2<f32>,
    wcs: &TanWcs,
    tile_id: &str,
    position: SkyPosition,
    size: CutoutSize,
    mode: CutoutMode,
) -> Result<Cutout> {
    let (x, y) = wcs.world_to_pixel(position).ok_or(CutoutError::NoOverlap)?;
    let (ny, nx) = cutout_shape(size, wcs);
    let (height, width) = data.dim();

    let (x_min, x_max) = index_range(x, nx);
    let (y_min, y_max) = index_range(y, ny);
    let x_overlap = overlap(x_min, x_max, width);
    let y_overlap = overlap(y_min, y_max, height);

    let (pixels, origin) = match mode {
        CutoutMode::Partial => {
            let mut out = Array2::from_elem((ny, nx), f32::NAN);
            if let (Some((x0, x1)), Some((y0, y1))) = (x_overlap, y_overlap) {
                let dx = (x0 as i64 - x_min) as usize;
                let dy = (y0 as i64 - y_min) as usize;
                out.slice_mut(s![dy..dy + (y1 - y0), dx..dx + (x1 - x0)])
                    .assign(&data.slice(s![y0..y1, x0..x1]));
            }
            (out, (x_min, y_min))
        }
        CutoutMode::Trim => {
            let (Some((x0, x1)), Some((y0, y1))) = (x_overlap, y_overlap) else {
                return Err(CutoutError::NoOverlap);
            };
            (
                data.slice(s![y0..y1, x0..x1]).to_owned(),
                (x0 as i64, y0 as i64),
            )
        }
    };

    Ok(Cutout {
        data: pixels,
        size,
        position,
        tile_id: tile_id.to_string(),
        wcs: wcs.shifted(origin),
        origin_original: origin,
        position_cutout: (x - origin.0 as f64, y - origin.1 as f64),
    })
}
