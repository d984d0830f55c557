use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use cosmoweb_core::config::SurveyConfig;
use cosmoweb_core::cutout::{Cutout, CutoutMode};
use cosmoweb_core::extract::{
    extract_cutouts_reported, CutoutBatch, CutoutRequest, ExtractionStage, ProgressReporter,
};
use cosmoweb_core::io::fits::HeaderValue;
use cosmoweb_core::io::fits_writer::FitsWriter;
use cosmoweb_core::io::image_io::save_png_preview;
use cosmoweb_core::sky::{CutoutSize, SkyPosition};
use cosmoweb_core::tile::LocalMosaicStore;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::summary::print_cutout_summary;

#[derive(Args)]
pub struct CutoutArgs {
    /// File of `ra,dec` pairs in degrees, one per line
    #[arg(long)]
    pub coords: Option<PathBuf>,

    /// Single position as RA,DEC in degrees (repeatable)
    #[arg(long = "at", value_parser = parse_position, allow_hyphen_values = true)]
    pub at: Vec<SkyPosition>,

    /// NIRCam filter, case-insensitive (e.g. f444w)
    #[arg(long)]
    pub filter: String,

    /// Cutout edge length in arcseconds
    #[arg(long, conflicts_with = "pixels")]
    pub size: Option<f64>,

    /// Cutout edge length in pixels
    #[arg(long)]
    pub pixels: Option<usize>,

    /// Keep only the part of the cutout overlapping the tile
    #[arg(long)]
    pub trim: bool,

    /// Survey config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Survey root holding the `dr<release>` directories
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Data release to read mosaics from (e.g. 0.5)
    #[arg(long)]
    pub release: Option<String>,

    /// Mosaic pixel scale in mas
    #[arg(long)]
    pub pixel_scale: Option<u32>,

    /// Result table path (.csv or .json)
    #[arg(long, default_value = "cutouts.csv")]
    pub table: PathBuf,

    /// Write each cutout as FITS into this directory
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Also write a PNG preview of each science cutout
    #[arg(long, requires = "output_dir")]
    pub png: bool,
}

pub fn run(args: &CutoutArgs) -> Result<()> {
    let config = survey_config(args)?;
    let coordinates = collect_coordinates(args)?;
    if coordinates.is_empty() {
        bail!("No coordinates given; use --coords or --at");
    }
    info!(count = coordinates.len(), dir = %config.mosaic_dir().display(), "Coordinates loaded");

    let mut request = CutoutRequest::from_config(&args.filter, &config);
    if let Some(arcsec) = args.size {
        request.size = CutoutSize::Arcsec(arcsec);
    }
    if let Some(pixels) = args.pixels {
        request.size = CutoutSize::Pixels(pixels);
    }
    if args.trim {
        request.mode = CutoutMode::Trim;
    }

    let store = LocalMosaicStore::new(&config);
    let reporter = BarReporter::new()?;
    let batch = extract_cutouts_reported(&coordinates, &request, &store, &reporter)
        .context("Cutout extraction failed")?;
    reporter.bar.finish_with_message("Done");

    batch
        .table
        .save(&args.table)
        .with_context(|| format!("Failed to write table {}", args.table.display()))?;

    if let Some(ref dir) = args.output_dir {
        write_cutouts(&batch, dir, args.png)?;
    }

    print_cutout_summary(&request, &config, &batch, &args.table, args.output_dir.as_deref());
    Ok(())
}

/// Config file (if any) with command-line overrides applied.
fn survey_config(args: &CutoutArgs) -> Result<SurveyConfig> {
    let mut config = match (&args.config, &args.root) {
        (Some(path), _) => SurveyConfig::from_toml_file(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        (None, Some(root)) => SurveyConfig::new(root),
        (None, None) => bail!("Either --config or --root is required"),
    };
    if let Some(ref root) = args.root {
        config.root_path = root.clone();
    }
    if let Some(ref release) = args.release {
        config.release = release.clone();
    }
    if let Some(scale) = args.pixel_scale {
        config.pixel_scale_mas = scale;
    }
    Ok(config)
}

fn collect_coordinates(args: &CutoutArgs) -> Result<Vec<SkyPosition>> {
    let mut coordinates = Vec::new();
    if let Some(ref path) = args.coords {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        coordinates = parse_coordinates(&contents)
            .with_context(|| format!("Invalid coordinate file {}", path.display()))?;
    }
    coordinates.extend_from_slice(&args.at);
    Ok(coordinates)
}

/// `RA,DEC` in degrees.
fn parse_position(s: &str) -> std::result::Result<SkyPosition, String> {
    let (ra, dec) = s
        .split_once(',')
        .ok_or_else(|| format!("expected RA,DEC, got '{s}'"))?;
    let ra: f64 = ra.trim().parse().map_err(|_| format!("invalid RA '{ra}'"))?;
    let dec: f64 = dec.trim().parse().map_err(|_| format!("invalid DEC '{dec}'"))?;
    Ok(SkyPosition::new(ra, dec))
}

/// One `ra,dec` (or whitespace separated) pair per line.
///
/// Blank lines and `#` comments are skipped. A first line that does not parse
/// as numbers is taken as a column header.
fn parse_coordinates(contents: &str) -> Result<Vec<SkyPosition>> {
    let mut coordinates = Vec::new();
    let mut first = true;
    for (lineno, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|f| !f.is_empty())
            .collect();
        let parsed = match fields.as_slice() {
            [ra, dec, ..] => ra.parse::<f64>().ok().zip(dec.parse::<f64>().ok()),
            _ => None,
        };
        match parsed {
            Some((ra, dec)) => coordinates.push(SkyPosition::new(ra, dec)),
            None if first => {}
            None => bail!("line {}: expected ra,dec but found '{}'", lineno + 1, line),
        }
        first = false;
    }
    Ok(coordinates)
}

/// `{index}_sci.fits` and `{index}_err.fits` for every coordinate with a cutout.
fn write_cutouts(batch: &CutoutBatch, dir: &Path, png: bool) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    for (index, (sci, err)) in batch.science.iter().zip(&batch.error).enumerate() {
        let (Some(sci), Some(err)) = (sci, err) else {
            continue;
        };
        write_cutout_fits(sci, "SCI", &dir.join(format!("{index}_sci.fits")))?;
        write_cutout_fits(err, "ERR", &dir.join(format!("{index}_err.fits")))?;
        if png {
            let path = dir.join(format!("{index}_sci.png"));
            save_png_preview(&sci.data, &path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
    }
    Ok(())
}

fn write_cutout_fits(cutout: &Cutout, extname: &str, path: &Path) -> Result<()> {
    let mut header = cutout.wcs.to_header();
    header.set("EXTNAME", HeaderValue::Str(extname.into()));
    header.set("TILE", HeaderValue::Str(cutout.tile_id.clone()));
    header.set("RA_TARG", HeaderValue::Float(cutout.position.ra_deg));
    header.set("DEC_TARG", HeaderValue::Float(cutout.position.dec_deg));

    let mut writer = FitsWriter::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_image(&cutout.data, &header)?;
    writer.finalize()?;
    Ok(())
}

/// Renders extraction progress as a single indicatif bar.
struct BarReporter {
    bar: ProgressBar,
}

impl BarReporter {
    fn new() -> Result<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{msg:22} [{bar:40}] {pos}/{len}")?
                .progress_chars("=> "),
        );
        Ok(Self { bar })
    }
}

impl ProgressReporter for BarReporter {
    fn begin_stage(&self, stage: ExtractionStage, total_items: Option<usize>) {
        self.bar.set_message(stage.to_string());
        self.bar.set_length(total_items.unwrap_or(0) as u64);
        self.bar.set_position(0);
    }

    fn advance(&self, items_done: usize) {
        self.bar.set_position(items_done as u64);
    }

    fn finish_stage(&self) {
        self.bar.set_position(self.bar.length().unwrap_or(0));
    }
}
