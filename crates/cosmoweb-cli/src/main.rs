mod commands;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cosmoweb", about = "COSMOS-Web mosaic cutout tool")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cut science and error patches around sky coordinates
    Cutout(commands::cutout::CutoutArgs),
    /// Show mosaic file metadata
    Info(commands::info::InfoArgs),
    /// List mosaic files in the public archive
    List(commands::list::ListArgs),
    /// Download mosaic files or write a download script
    Fetch(commands::fetch::FetchArgs),
    /// Print or save a default survey config
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Cutout(args) => commands::cutout::run(args),
        Commands::Info(args) => commands::info::run(args),
        Commands::List(args) => commands::list::run(args),
        Commands::Fetch(args) => commands::fetch::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
