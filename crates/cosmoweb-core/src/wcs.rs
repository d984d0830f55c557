//! Gnomonic (TAN) world coordinate system.
//!
//! Maps between sky positions and 0-based pixel coordinates, where the centre
//! of the first pixel is `(0.0, 0.0)`. Header values follow the FITS
//! convention (CRPIX is 1-based), so the conversion subtracts one.
//!
//! Only the linear part of the calibration is modelled: CRPIX, CRVAL and
//! either a CD matrix or CDELT with an optional PC matrix. Distortion terms
//! (SIP, TPV) are ignored.

use tracing::warn;

use crate::consts::{SINGULAR_MATRIX_EPSILON, TAN_PROJECTION_EPSILON};
use crate::error::{CutoutError, Result};
use crate::io::fits::{FitsHeader, HeaderValue};
use crate::sky::SkyPosition;

/// A TAN projection bound to one image.
#[derive(Clone, Debug, PartialEq)]
pub struct TanWcs {
    /// Reference pixel, 1-based as in the header.
    crpix: [f64; 2],
    /// Reference sky position in degrees.
    crval: [f64; 2],
    /// Linear transform from pixel offsets to intermediate world coordinates (deg/pixel).
    cd: [[f64; 2]; 2],
    cd_inv: [[f64; 2]; 2],
}

impl TanWcs {
    /// Build a WCS from its reference pixel (1-based), reference sky position
    /// and CD matrix.
    pub fn new(crpix: [f64; 2], crval: SkyPosition, cd: [[f64; 2]; 2]) -> Result<Self> {
        let cd_inv = invert_2x2(&cd)
            .ok_or_else(|| CutoutError::InvalidWcs(format!("singular CD matrix {cd:?}")))?;
        Ok(Self {
            crpix,
            crval: [crval.ra_deg, crval.dec_deg],
            cd,
            cd_inv,
        })
    }

    /// Read the celestial TAN calibration of an image header.
    pub fn from_header(header: &FitsHeader) -> Result<Self> {
        let ctype1 = header
            .get_str("CTYPE1")
            .ok_or_else(|| CutoutError::MissingKeyword("CTYPE1".into()))?;
        let ctype2 = header
            .get_str("CTYPE2")
            .ok_or_else(|| CutoutError::MissingKeyword("CTYPE2".into()))?;
        if !ctype1.starts_with("RA---TAN") || !ctype2.starts_with("DEC--TAN") {
            return Err(CutoutError::InvalidWcs(format!(
                "unsupported projection {ctype1}/{ctype2}"
            )));
        }
        if ctype1.len() > 8 || ctype2.len() > 8 {
            warn!(ctype1, ctype2, "Ignoring distortion terms");
        }

        let crpix = [header.require_f64("CRPIX1")?, header.require_f64("CRPIX2")?];
        let crval = SkyPosition::new(header.require_f64("CRVAL1")?, header.require_f64("CRVAL2")?);

        let cd = if header.get("CD1_1").is_some() || header.get("CD2_2").is_some() {
            [
                [
                    header.get_f64("CD1_1").unwrap_or(0.0),
                    header.get_f64("CD1_2").unwrap_or(0.0),
                ],
                [
                    header.get_f64("CD2_1").unwrap_or(0.0),
                    header.get_f64("CD2_2").unwrap_or(0.0),
                ],
            ]
        } else {
            let cdelt = [header.require_f64("CDELT1")?, header.require_f64("CDELT2")?];
            let pc = |i: usize, j: usize| {
                let default = if i == j { 1.0 } else { 0.0 };
                header.get_f64(&format!("PC{i}_{j}")).unwrap_or(default)
            };
            [
                [cdelt[0] * pc(1, 1), cdelt[0] * pc(1, 2)],
                [cdelt[1] * pc(2, 1), cdelt[1] * pc(2, 2)],
            ]
        };

        Self::new(crpix, crval, cd)
    }

    /// Header cards describing this WCS, in CD form.
    pub fn to_header(&self) -> FitsHeader {
        let mut header = FitsHeader::new();
        header.set("WCSAXES", HeaderValue::Int(2));
        header.set("CTYPE1", HeaderValue::Str("RA---TAN".into()));
        header.set("CTYPE2", HeaderValue::Str("DEC--TAN".into()));
        header.set("CUNIT1", HeaderValue::Str("deg".into()));
        header.set("CUNIT2", HeaderValue::Str("deg".into()));
        header.set("CRPIX1", HeaderValue::Float(self.crpix[0]));
        header.set("CRPIX2", HeaderValue::Float(self.crpix[1]));
        header.set("CRVAL1", HeaderValue::Float(self.crval[0]));
        header.set("CRVAL2", HeaderValue::Float(self.crval[1]));
        header.set("CD1_1", HeaderValue::Float(self.cd[0][0]));
        header.set("CD1_2", HeaderValue::Float(self.cd[0][1]));
        header.set("CD2_1", HeaderValue::Float(self.cd[1][0]));
        header.set("CD2_2", HeaderValue::Float(self.cd[1][1]));
        header
    }

    pub fn reference_position(&self) -> SkyPosition {
        SkyPosition::new(self.crval[0], self.crval[1])
    }

    /// Reference pixel in 0-based coordinates.
    pub fn reference_pixel(&self) -> (f64, f64) {
        (self.crpix[0] - 1.0, self.crpix[1] - 1.0)
    }

    pub fn cd(&self) -> [[f64; 2]; 2] {
        self.cd
    }

    /// Project a sky position to 0-based pixel coordinates `(x, y)`.
    ///
    /// Returns `None` for positions on or behind the tangent plane.
    pub fn world_to_pixel(&self, pos: SkyPosition) -> Option<(f64, f64)> {
        let (xi, eta) = tan_project(
            pos.ra_deg.to_radians(),
            pos.dec_deg.to_radians(),
            self.crval[0].to_radians(),
            self.crval[1].to_radians(),
        )?;
        let (u, v) = (xi.to_degrees(), eta.to_degrees());
        let m = &self.cd_inv;
        let dx = m[0][0] * u + m[0][1] * v;
        let dy = m[1][0] * u + m[1][1] * v;
        Some((self.crpix[0] + dx - 1.0, self.crpix[1] + dy - 1.0))
    }

    /// Sky position of 0-based pixel coordinates `(x, y)`.
    pub fn pixel_to_world(&self, x: f64, y: f64) -> SkyPosition {
        let dx = x + 1.0 - self.crpix[0];
        let dy = y + 1.0 - self.crpix[1];
        let u = self.cd[0][0] * dx + self.cd[0][1] * dy;
        let v = self.cd[1][0] * dx + self.cd[1][1] * dy;
        let (ra, dec) = inverse_tan_project(
            u.to_radians(),
            v.to_radians(),
            self.crval[0].to_radians(),
            self.crval[1].to_radians(),
        );
        SkyPosition::new(ra.to_degrees().rem_euclid(360.0), dec.to_degrees())
    }

    /// Projection-plane pixel scales `(x, y)` in degrees per pixel.
    pub fn pixel_scales(&self) -> (f64, f64) {
        let cd = &self.cd;
        (
            (cd[0][0] * cd[0][0] + cd[1][0] * cd[1][0]).sqrt(),
            (cd[0][1] * cd[0][1] + cd[1][1] * cd[1][1]).sqrt(),
        )
    }

    /// The same calibration for an image whose pixel `(0, 0)` is pixel
    /// `origin` of this one.
    pub fn shifted(&self, origin: (i64, i64)) -> Self {
        let mut wcs = self.clone();
        wcs.crpix[0] -= origin.0 as f64;
        wcs.crpix[1] -= origin.1 as f64;
        wcs
    }
}

/// Forward gnomonic projection of `(ra, dec)` about `(ra0, dec0)`, all in
/// radians. Returns standard coordinates `(xi, eta)` in radians.
pub fn tan_project(ra: f64, dec: f64, ra0: f64, dec0: f64) -> Option<(f64, f64)> {
    let da = ra - ra0;
    let (sin_dec, cos_dec) = dec.sin_cos();
    let (sin_dec0, cos_dec0) = dec0.sin_cos();
    let cos_da = da.cos();

    let denom = sin_dec * sin_dec0 + cos_dec * cos_dec0 * cos_da;
    if denom <= TAN_PROJECTION_EPSILON {
        return None;
    }

    let xi = cos_dec * da.sin() / denom;
    let eta = (sin_dec * cos_dec0 - cos_dec * sin_dec0 * cos_da) / denom;
    Some((xi, eta))
}

/// Inverse gnomonic projection; returns `(ra, dec)` in radians.
pub fn inverse_tan_project(xi: f64, eta: f64, ra0: f64, dec0: f64) -> (f64, f64) {
    let rho = (xi * xi + eta * eta).sqrt();
    if rho == 0.0 {
        return (ra0, dec0);
    }
    let (sin_dec0, cos_dec0) = dec0.sin_cos();
    let c = rho.atan();
    let (sin_c, cos_c) = c.sin_cos();

    let dec = (cos_c * sin_dec0 + eta * sin_c * cos_dec0 / rho).asin();
    let ra = ra0 + (xi * sin_c).atan2(rho * cos_dec0 * cos_c - eta * sin_dec0 * sin_c);
    (ra, dec)
}

fn invert_2x2(m: &[[f64; 2]; 2]) -> Option<[[f64; 2]; 2]> {
    let det = m[0][0] * m[1][1] - m[0][1] * m[1][0];
    if det.abs() < SINGULAR_MATRIX_EPSILON {
        return None;
    }
    let inv = 1.0 / det;
    Some([
        [m[1][1] * inv, -m[0][1] * inv],
        [-m[1][0] * inv, m[0][0] * inv],
    ])
}
