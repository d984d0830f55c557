use serde::{Deserialize, Serialize};

use crate::consts::ARCSEC_PER_DEG;

/// A position on the sky in degrees (ICRS right ascension and declination).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkyPosition {
    pub ra_deg: f64,
    pub dec_deg: f64,
}

impl SkyPosition {
    pub fn new(ra_deg: f64, dec_deg: f64) -> Self {
        Self { ra_deg, dec_deg }
    }
}

impl std::fmt::Display for SkyPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:+.6})", self.ra_deg, self.dec_deg)
    }
}

/// Edge length of a square cutout.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum CutoutSize {
    /// Angular edge length, converted to pixels with the tile's pixel scale.
    Arcsec(f64),
    /// Edge length in pixels.
    Pixels(usize),
}

impl CutoutSize {
    pub fn degrees(&self) -> Option<f64> {
        match self {
            Self::Arcsec(a) => Some(a / ARCSEC_PER_DEG),
            Self::Pixels(_) => None,
        }
    }
}

impl Default for CutoutSize {
    fn default() -> Self {
        Self::Arcsec(crate::consts::DEFAULT_CUTOUT_ARCSEC)
    }
}

impl std::fmt::Display for CutoutSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Arcsec(a) => write!(f, "{a}\""),
            Self::Pixels(n) => write!(f, "{n} px"),
        }
    }
}
