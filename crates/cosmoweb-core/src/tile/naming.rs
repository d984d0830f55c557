//! COSMOS-Web mosaic file names.
//!
//! `mosaic_nircam_{filter}_COSMOS-Web_{scale}mas_{tile}_v0_5_i2d.fits`

use std::path::Path;

use crate::error::{CutoutError, Result};

const PREFIX: [&str; 2] = ["mosaic", "nircam"];
const SURVEY: &str = "COSMOS-Web";
const VERSION_SUFFIX: [&str; 3] = ["v0", "5", "i2d.fits"];

/// Position of the tile id among the underscore-separated tokens.
const TILE_TOKEN_INDEX: usize = 5;
const TOKEN_COUNT: usize = 9;

/// Components of a mosaic file name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MosaicFileName {
    pub filter: String,
    pub pixel_scale_mas: u32,
    pub tile_id: String,
}

impl MosaicFileName {
    pub fn new(filter: &str, pixel_scale_mas: u32, tile_id: &str) -> Self {
        Self {
            filter: filter.to_string(),
            pixel_scale_mas,
            tile_id: tile_id.to_string(),
        }
    }
}

impl std::fmt::Display for MosaicFileName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}_{}_{}_{}_{}mas_{}_{}",
            PREFIX[0],
            PREFIX[1],
            self.filter,
            SURVEY,
            self.pixel_scale_mas,
            self.tile_id,
            VERSION_SUFFIX.join("_")
        )
    }
}

/// Build the file name of one mosaic tile.
pub fn mosaic_file_name(filter: &str, pixel_scale_mas: u32, tile_id: &str) -> String {
    MosaicFileName::new(filter, pixel_scale_mas, tile_id).to_string()
}

/// Tile id of a mosaic file: the 6th underscore-separated token of its name.
///
/// Any leading directories are ignored.
pub fn parse_tile_id(path: &str) -> Result<String> {
    let name = base_name(path);
    name.split('_')
        .nth(TILE_TOKEN_INDEX)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or_else(|| CutoutError::MalformedFilename(name.to_string()))
}

/// Parse a full mosaic file name, checking every fixed token.
pub fn parse_mosaic_file_name(path: &str) -> Result<MosaicFileName> {
    let name = base_name(path);
    let malformed = || CutoutError::MalformedFilename(name.to_string());

    let tokens: Vec<&str> = name.split('_').collect();
    if tokens.len() != TOKEN_COUNT
        || tokens[..2] != PREFIX
        || tokens[3] != SURVEY
        || tokens[6..] != VERSION_SUFFIX
    {
        return Err(malformed());
    }

    let pixel_scale_mas = tokens[4]
        .strip_suffix("mas")
        .and_then(|s| s.parse::<u32>().ok())
        .ok_or_else(malformed)?;

    let tile_id = parse_tile_id(name)?;
    Ok(MosaicFileName {
        filter: tokens[2].to_string(),
        pixel_scale_mas,
        tile_id,
    })
}

fn base_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
}
