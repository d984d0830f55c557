pub mod naming;
pub mod store;

use std::path::Path;

use ndarray::Array2;
use tracing::debug;

use crate::consts::{ERROR_HDU, SCIENCE_HDU};
use crate::error::{CutoutError, Result};
use crate::io::fits::FitsReader;
use crate::wcs::TanWcs;

pub use naming::{mosaic_file_name, parse_mosaic_file_name, parse_tile_id, MosaicFileName};
pub use store::{LocalMosaicStore, TileSource};

/// Pixel extent and calibration of a tile, enough to decide containment.
pub trait Footprint {
    fn id(&self) -> &str;
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn wcs(&self) -> &TanWcs;
}

/// Header-only view of a mosaic tile.
#[derive(Clone, Debug)]
pub struct TileFootprint {
    pub id: String,
    pub width: usize,
    pub height: usize,
    pub wcs: TanWcs,
}

impl TileFootprint {
    /// Read the science header of a mosaic file without decoding pixels.
    pub fn open(path: &Path, id: &str) -> Result<Self> {
        let reader = FitsReader::open(path)?;
        let (height, width) = reader.image_shape(SCIENCE_HDU)?;
        let wcs = TanWcs::from_header(reader.header(SCIENCE_HDU)?)?;
        Ok(Self {
            id: id.to_string(),
            width,
            height,
            wcs,
        })
    }
}

impl Footprint for TileFootprint {
    fn id(&self) -> &str {
        &self.id
    }

    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn wcs(&self) -> &TanWcs {
        &self.wcs
    }
}

/// A fully loaded mosaic tile: science and error planes sharing one WCS.
#[derive(Clone, Debug)]
pub struct MosaicTile {
    pub id: String,
    /// Science pixels, shape = (height, width)
    pub science: Array2<f32>,
    /// Error pixels, same shape as `science`
    pub error: Array2<f32>,
    pub wcs: TanWcs,
}

impl MosaicTile {
    pub fn new(id: &str, science: Array2<f32>, error: Array2<f32>, wcs: TanWcs) -> Result<Self> {
        if science.dim() != error.dim() {
            return Err(CutoutError::PlaneMismatch {
                science: science.dim(),
                error: error.dim(),
            });
        }
        Ok(Self {
            id: id.to_string(),
            science,
            error,
            wcs,
        })
    }

    /// Load both planes of a mosaic file.
    pub fn open(path: &Path, id: &str) -> Result<Self> {
        let reader = FitsReader::open(path)?;
        let wcs = TanWcs::from_header(reader.header(SCIENCE_HDU)?)?;
        let science = reader.read_image(SCIENCE_HDU)?;
        let error = reader.read_image(ERROR_HDU)?;
        debug!(tile = id, dims = ?science.dim(), "Tile planes decoded");
        Self::new(id, science, error, wcs)
    }

    pub fn footprint(&self) -> TileFootprint {
        TileFootprint {
            id: self.id.clone(),
            width: self.width(),
            height: self.height(),
            wcs: self.wcs.clone(),
        }
    }
}

impl Footprint for MosaicTile {
    fn id(&self) -> &str {
        &self.id
    }

    fn width(&self) -> usize {
        self.science.ncols()
    }

    fn height(&self) -> usize {
        self.science.nrows()
    }

    fn wcs(&self) -> &TanWcs {
        &self.wcs
    }
}
