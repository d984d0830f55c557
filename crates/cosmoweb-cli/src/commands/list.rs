use anyhow::{Context, Result};
use clap::Args;
use cosmoweb_core::archive::{ArchiveClient, FileQuery};
use cosmoweb_core::consts::{ARCHIVE_ROOT_URL, DEFAULT_RELEASE};

/// Archive selection shared by `list` and `fetch`.
#[derive(Args)]
pub struct ArchiveArgs {
    /// Data release
    #[arg(long, default_value = DEFAULT_RELEASE)]
    pub release: String,

    /// Only files of this filter (e.g. f444w)
    #[arg(long)]
    pub filter: Option<String>,

    /// Only files at this pixel scale in mas
    #[arg(long)]
    pub pixel_scale: Option<u32>,

    /// Only files of this tile (substring match)
    #[arg(long)]
    pub tile: Option<String>,

    /// Archive root URL
    #[arg(long, default_value = ARCHIVE_ROOT_URL)]
    pub root_url: String,
}

impl ArchiveArgs {
    pub fn query(&self) -> FileQuery {
        FileQuery {
            filter: self.filter.clone(),
            pixel_scale_mas: self.pixel_scale,
            tile: self.tile.clone(),
        }
    }

    /// Client plus the matching remote file names.
    pub fn list(&self) -> Result<(ArchiveClient, Vec<String>)> {
        let client = ArchiveClient::with_root_url(&self.root_url)?;
        let names = client
            .list_remote_files(&self.release, &self.query())
            .with_context(|| format!("Failed to list release {}", self.release))?;
        Ok((client, names))
    }
}

#[derive(Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub archive: ArchiveArgs,
}

pub fn run(args: &ListArgs) -> Result<()> {
    let (client, names) = args.archive.list()?;

    println!("{}", client.release_url(&args.archive.release));
    for name in &names {
        println!("  {}", name);
    }
    println!("{} file(s)", names.len());

    Ok(())
}
