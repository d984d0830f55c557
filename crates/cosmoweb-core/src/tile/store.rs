use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::SurveyConfig;
use crate::error::Result;

use super::naming::{mosaic_file_name, parse_mosaic_file_name};
use super::{MosaicTile, TileFootprint};

/// Somewhere mosaic tiles can be enumerated and loaded from.
pub trait TileSource {
    /// Footprints of every tile available for `filter`, in a stable order.
    fn footprints(&self, filter: &str) -> Result<Vec<TileFootprint>>;

    /// Load the science and error planes of one tile.
    fn load_tile(&self, filter: &str, tile_id: &str) -> Result<MosaicTile>;
}

/// Mosaic files of one release stored in a local directory.
///
/// Filters are matched case-insensitively; archive file names use lowercase
/// (`f444w`).
#[derive(Clone, Debug)]
pub struct LocalMosaicStore {
    dir: PathBuf,
    pixel_scale_mas: u32,
}

impl LocalMosaicStore {
    pub fn new(config: &SurveyConfig) -> Self {
        Self {
            dir: config.mosaic_dir(),
            pixel_scale_mas: config.pixel_scale_mas,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Expected path of a tile, using the archive's lowercase filter name.
    pub fn tile_path(&self, filter: &str, tile_id: &str) -> PathBuf {
        self.dir.join(mosaic_file_name(
            &filter.to_ascii_lowercase(),
            self.pixel_scale_mas,
            tile_id,
        ))
    }

    /// Mosaic files for `filter` at the configured pixel scale, sorted by name.
    ///
    /// Only `A*` tiles are considered. A missing directory yields no files.
    pub fn tile_files(&self, filter: &str) -> Result<Vec<(String, PathBuf)>> {
        if !self.dir.is_dir() {
            warn!(dir = %self.dir.display(), "Mosaic directory does not exist");
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Ok(parsed) = parse_mosaic_file_name(name) else {
                continue;
            };
            if parsed.filter.eq_ignore_ascii_case(filter)
                && parsed.pixel_scale_mas == self.pixel_scale_mas
                && parsed.tile_id.starts_with('A')
            {
                files.push((name.to_string(), parsed.tile_id, path.clone()));
            }
        }
        files.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(files.into_iter().map(|(_, id, path)| (id, path)).collect())
    }
}

impl TileSource for LocalMosaicStore {
    fn footprints(&self, filter: &str) -> Result<Vec<TileFootprint>> {
        let files = self.tile_files(filter)?;
        info!(
            filter,
            tiles = files.len(),
            dir = %self.dir.display(),
            "Enumerated mosaic tiles"
        );
        files
            .iter()
            .map(|(id, path)| TileFootprint::open(path, id))
            .collect()
    }

    fn load_tile(&self, filter: &str, tile_id: &str) -> Result<MosaicTile> {
        let path = self
            .tile_files(filter)?
            .into_iter()
            .find(|(id, _)| id == tile_id)
            .map(|(_, path)| path)
            .unwrap_or_else(|| self.tile_path(filter, tile_id));
        info!(tile = tile_id, path = %path.display(), "Loading tile");
        MosaicTile::open(&path, tile_id)
    }
}
