#![allow(dead_code)]

use std::path::{Path, PathBuf};

use cosmoweb_core::config::SurveyConfig;
use cosmoweb_core::io::fits::{FitsHeader, HeaderValue};
use cosmoweb_core::io::fits_writer::FitsWriter;
use cosmoweb_core::sky::SkyPosition;
use cosmoweb_core::tile::mosaic_file_name;
use cosmoweb_core::wcs::TanWcs;
use ndarray::Array2;

/// Sky position near the centre of the COSMOS field.
pub const FIELD_CENTRE: SkyPosition = SkyPosition {
    ra_deg: 150.1,
    dec_deg: 2.2,
};

/// 30 mas in degrees.
pub const SCALE_30MAS_DEG: f64 = 0.03 / 3600.0;

/// North-up, east-left TAN WCS with square pixels.
///
/// `crpix` is 1-based, as in a FITS header.
pub fn tan_wcs(crpix: [f64; 2], crval: SkyPosition, scale_deg: f64) -> TanWcs {
    TanWcs::new(crpix, crval, [[-scale_deg, 0.0], [0.0, scale_deg]]).expect("valid WCS")
}

/// Image whose pixel (row, col) holds `row * width + col`.
pub fn ramp(height: usize, width: usize) -> Array2<f32> {
    Array2::from_shape_fn((height, width), |(r, c)| (r * width + c) as f32)
}

/// Write a two-plane mosaic file (science + error extensions) at `path`.
pub fn write_mosaic_file(path: &Path, wcs: &TanWcs, science: &Array2<f32>, error: &Array2<f32>) {
    let mut sci_header = wcs.to_header();
    sci_header.set("EXTNAME", HeaderValue::Str("SCI".into()));
    let mut err_header = FitsHeader::new();
    err_header.set("EXTNAME", HeaderValue::Str("ERR".into()));

    let mut writer = FitsWriter::create(path).expect("create FITS");
    writer.write_image(science, &sci_header).expect("write SCI");
    writer.write_image(error, &err_header).expect("write ERR");
    assert_eq!(writer.extensions_written(), 2);
    writer.finalize().expect("finalize FITS");
}

/// Write a tile under its survey file name in `dir`, error plane = science / 10.
pub fn write_tile(
    dir: &Path,
    filter: &str,
    scale_mas: u32,
    tile_id: &str,
    wcs: &TanWcs,
    science: &Array2<f32>,
) -> PathBuf {
    let path = dir.join(mosaic_file_name(filter, scale_mas, tile_id));
    let error = science.mapv(|v| v / 10.0);
    write_mosaic_file(&path, wcs, science, &error);
    path
}

/// Create the mosaic directory of `config`'s release and return it.
pub fn mosaic_dir(config: &SurveyConfig) -> PathBuf {
    let dir = config.mosaic_dir();
    std::fs::create_dir_all(&dir).expect("create mosaic directory");
    dir
}
