use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_CUTOUT_ARCSEC, DEFAULT_PIXEL_SCALE_MAS, DEFAULT_RELEASE, RELEASE_SUBPATH,
};
use crate::cutout::CutoutMode;
use crate::error::{CutoutError, Result};
use crate::sky::CutoutSize;

/// Where the survey mosaics live and which release/resolution to use.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurveyConfig {
    /// Survey root; mosaics of a release live in `dr{release}/NIRCam/Apr23` below it.
    pub root_path: PathBuf,
    #[serde(default = "default_release")]
    pub release: String,
    #[serde(default = "default_pixel_scale")]
    pub pixel_scale_mas: u32,
    #[serde(default)]
    pub cutout: CutoutDefaults,
}

fn default_release() -> String {
    DEFAULT_RELEASE.to_string()
}

fn default_pixel_scale() -> u32 {
    DEFAULT_PIXEL_SCALE_MAS
}

impl SurveyConfig {
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
            release: default_release(),
            pixel_scale_mas: default_pixel_scale(),
            cutout: CutoutDefaults::default(),
        }
    }

    /// Directory holding the mosaic files of the configured release.
    pub fn mosaic_dir(&self) -> PathBuf {
        RELEASE_SUBPATH
            .split('/')
            .fold(self.root_path.join(format!("dr{}", self.release)), |dir, part| {
                dir.join(part)
            })
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| CutoutError::Config(e.to_string()))
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CutoutError::Config(e.to_string()))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CutoutDefaults {
    /// Edge length in arcseconds.
    pub size_arcsec: f64,
    #[serde(default)]
    pub mode: CutoutMode,
}

impl Default for CutoutDefaults {
    fn default() -> Self {
        Self {
            size_arcsec: DEFAULT_CUTOUT_ARCSEC,
            mode: CutoutMode::default(),
        }
    }
}

impl CutoutDefaults {
    pub fn size(&self) -> CutoutSize {
        CutoutSize::Arcsec(self.size_arcsec)
    }
}
