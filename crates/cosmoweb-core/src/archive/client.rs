use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{info, warn};

use crate::consts::{ARCHIVE_ROOT_URL, DOWNLOAD_BUFFER_SIZE, HTTP_TIMEOUT_SECS};
use crate::error::{CutoutError, Result};

use super::listing::{parse_listing, release_url, FileQuery};
use super::script::write_download_script;

/// What `fetch` does with the selected files.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchMode {
    /// Download each file now.
    Download,
    /// Only write a batch download script.
    Script,
}

/// Outcome of a `fetch` call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FetchSummary {
    pub downloaded: Vec<PathBuf>,
    pub failed: Vec<String>,
    pub bytes: u64,
    pub script: Option<PathBuf>,
}

/// Blocking client for the public mosaic archive.
#[derive(Debug)]
pub struct ArchiveClient {
    client: Client,
    root_url: String,
}

impl ArchiveClient {
    /// Client for the public archive.
    pub fn new() -> Result<Self> {
        Self::with_root_url(ARCHIVE_ROOT_URL)
    }

    /// Client for a mirror laid out like the public archive.
    pub fn with_root_url(root_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            root_url: root_url.to_string(),
        })
    }

    /// Directory URL of one data release.
    pub fn release_url(&self, release: &str) -> String {
        release_url(&self.root_url, release)
    }

    /// File names of a release matching `query`, in listing order.
    pub fn list_remote_files(&self, release: &str, query: &FileQuery) -> Result<Vec<String>> {
        let url = self.release_url(release);
        let html = self
            .client
            .get(&url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .map_err(|e| CutoutError::RemoteListing(format!("{url}: {e}")))?;

        let names = query.apply(parse_listing(&html));
        info!(url = %url, files = names.len(), "Archive listing fetched");
        Ok(names)
    }

    /// Download `names` into `dest` one at a time, or write a script that does.
    ///
    /// `dest` is created if missing. A failed transfer is logged and skipped.
    /// `progress` is called with `(files_done, total_files)`.
    pub fn fetch(
        &self,
        release: &str,
        names: &[String],
        dest: &Path,
        mode: FetchMode,
        mut progress: impl FnMut(usize, usize),
    ) -> Result<FetchSummary> {
        let base_url = self.release_url(release);
        if mode == FetchMode::Script {
            let script = write_download_script(&base_url, names, dest)?;
            return Ok(FetchSummary {
                script: Some(script),
                ..FetchSummary::default()
            });
        }

        std::fs::create_dir_all(dest)?;
        let mut summary = FetchSummary::default();
        let total = names.len();
        for (i, name) in names.iter().enumerate() {
            let url = format!("{base_url}{name}");
            let target = dest.join(name);
            info!(file = %name, "Start downloading");
            match self.download_file(&url, &target) {
                Ok(bytes) => {
                    info!(file = %name, bytes, "Completed");
                    summary.bytes += bytes;
                    summary.downloaded.push(target);
                }
                Err(e) => {
                    warn!(file = %name, error = %e, "Download failed");
                    summary.failed.push(name.clone());
                }
            }
            progress(i + 1, total);
        }
        Ok(summary)
    }

    /// Stream one file to disk through a `.part` file renamed on success.
    fn download_file(&self, url: &str, target: &Path) -> Result<u64> {
        let mut response = self.client.get(url).send()?.error_for_status()?;

        let mut partial = target.as_os_str().to_owned();
        partial.push(".part");
        let partial = PathBuf::from(partial);

        let file = File::create(&partial)?;
        let mut writer = BufWriter::with_capacity(DOWNLOAD_BUFFER_SIZE, file);
        let result = std::io::copy(&mut response, &mut writer)
            .and_then(|bytes| writer.flush().map(|_| bytes));
        drop(writer);

        match result {
            Ok(bytes) => {
                std::fs::rename(&partial, target)?;
                Ok(bytes)
            }
            Err(e) => {
                let _ = std::fs::remove_file(&partial);
                Err(e.into())
            }
        }
    }
}
