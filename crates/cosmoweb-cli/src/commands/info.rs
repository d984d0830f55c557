use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use cosmoweb_core::consts::{ARCSEC_PER_DEG, SCIENCE_HDU};
use cosmoweb_core::io::fits::FitsReader;
use cosmoweb_core::tile::parse_tile_id;
use cosmoweb_core::wcs::TanWcs;

#[derive(Args)]
pub struct InfoArgs {
    /// Mosaic FITS file
    pub file: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let reader = FitsReader::open(&args.file)
        .with_context(|| format!("Failed to open {}", args.file.display()))?;

    println!("File:        {}", args.file.display());
    if let Ok(tile) = parse_tile_id(&args.file.to_string_lossy()) {
        println!("Tile:        {}", tile);
    }
    println!("HDUs:        {}", reader.hdu_count());

    for index in 0..reader.hdu_count() {
        let header = reader.header(index)?;
        let name = header.get_str("EXTNAME").unwrap_or("-");
        match reader.image_shape(index) {
            Ok((height, width)) => println!("  [{index}] {name:<8} {width}x{height}"),
            Err(_) => println!("  [{index}] {name:<8} no image data"),
        }
    }

    if reader.hdu_count() > SCIENCE_HDU {
        match TanWcs::from_header(reader.header(SCIENCE_HDU)?) {
            Ok(wcs) => {
                let centre = wcs.reference_position();
                let (x, y) = wcs.reference_pixel();
                let (sx, sy) = wcs.pixel_scales();
                let mas = |deg: f64| deg * ARCSEC_PER_DEG * 1000.0;
                println!("Reference:   {} at pixel ({:.1}, {:.1})", centre, x, y);
                println!("Pixel scale: {:.2} x {:.2} mas", mas(sx), mas(sy));
            }
            Err(e) => println!("WCS:         unavailable ({e})"),
        }
    }

    Ok(())
}
