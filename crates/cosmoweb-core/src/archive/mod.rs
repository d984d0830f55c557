//! Listing and downloading mosaic files from the public COSMOS-Web archive.

mod client;
mod listing;
mod script;

pub use client::{ArchiveClient, FetchMode, FetchSummary};
pub use listing::{archive_url, parse_listing, FileQuery};
pub use script::{script_contents, write_download_script};
