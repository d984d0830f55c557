use std::path::{Path, PathBuf};

use tracing::info;

use crate::consts::DOWNLOAD_SCRIPT_NAME;
use crate::error::Result;

/// Shell script fetching `names` from `base_url` into `dest`, one `wget` per file.
pub fn script_contents(base_url: &str, names: &[String], dest: &Path) -> String {
    let mut script = String::from("#!/bin/bash\n");
    for name in names {
        script.push_str(&format!("wget {base_url}{name} -P {}\n", dest.display()));
    }
    script
}

/// Write the batch download script into `dest`, creating it if needed.
///
/// No network access is performed. Returns the script path.
pub fn write_download_script(base_url: &str, names: &[String], dest: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dest)?;
    let path = dest.join(DOWNLOAD_SCRIPT_NAME);
    std::fs::write(&path, script_contents(base_url, names, dest))?;
    info!(path = %path.display(), files = names.len(), "Download script written");
    Ok(path)
}
