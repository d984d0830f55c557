use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use cosmoweb_core::archive::FetchMode;
use indicatif::{ProgressBar, ProgressStyle};

use super::list::ArchiveArgs;
use crate::summary::print_fetch_summary;

#[derive(Args)]
pub struct FetchArgs {
    #[command(flatten)]
    pub archive: ArchiveArgs,

    /// Destination directory
    #[arg(short, long)]
    pub dest: PathBuf,

    /// Write a wget script instead of downloading
    #[arg(long)]
    pub script: bool,
}

pub fn run(args: &FetchArgs) -> Result<()> {
    let (client, names) = args.archive.list()?;
    if names.is_empty() {
        println!("No matching files in release {}", args.archive.release);
        return Ok(());
    }

    let mode = if args.script {
        FetchMode::Script
    } else {
        FetchMode::Download
    };

    let pb = if mode == FetchMode::Script {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(names.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("Downloading [{bar:40}] {pos}/{len}")?
                .progress_chars("=> "),
        );
        pb
    };

    let summary = client
        .fetch(&args.archive.release, &names, &args.dest, mode, |done, _| {
            pb.set_position(done as u64);
        })
        .with_context(|| format!("Failed to fetch into {}", args.dest.display()))?;
    pb.finish();

    print_fetch_summary(&summary, names.len());
    Ok(())
}
