use std::path::Path;

use console::Style;
use cosmoweb_core::archive::FetchSummary;
use cosmoweb_core::config::SurveyConfig;
use cosmoweb_core::extract::{CutoutBatch, CutoutRequest};

struct Styles {
    title: Style,
    label: Style,
    value: Style,
    good: Style,
    warn: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            good: Style::new().green(),
            warn: Style::new().yellow(),
            path: Style::new().underlined(),
        }
    }
}

fn rule(s: &Styles, len: usize) {
    println!("  {}", s.title.apply_to("\u{2550}".repeat(len)));
}

pub fn print_cutout_summary(
    request: &CutoutRequest,
    config: &SurveyConfig,
    batch: &CutoutBatch,
    table: &Path,
    output_dir: Option<&Path>,
) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("COSMOS-Web Cutouts"));
    rule(&s, 18);
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Mosaics"),
        s.path.apply_to(config.mosaic_dir().display())
    );
    println!(
        "  {:<14}{} @ {} mas",
        s.label.apply_to("Filter"),
        s.value.apply_to(&request.filter),
        config.pixel_scale_mas
    );
    println!(
        "  {:<14}{} ({})",
        s.label.apply_to("Size"),
        s.value.apply_to(request.size),
        request.mode
    );
    println!();

    let results = &batch.table;
    println!(
        "  {:<14}{}",
        s.label.apply_to("Coordinates"),
        s.value.apply_to(results.len())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("In survey"),
        s.good.apply_to(results.in_survey_count())
    );
    let outside = results.len() - results.in_survey_count();
    if outside > 0 {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Outside"),
            s.warn.apply_to(outside)
        );
    }
    let invalid = results.all_invalid_count();
    if invalid > 0 {
        println!(
            "  {:<14}{}",
            s.label.apply_to("No data"),
            s.warn.apply_to(invalid)
        );
    }
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Table"),
        s.path.apply_to(table.display())
    );
    if let Some(dir) = output_dir {
        println!(
            "  {:<14}{} ({} pairs)",
            s.label.apply_to("Cutouts"),
            s.path.apply_to(dir.display()),
            batch.found_count()
        );
    }
    println!();
}

pub fn print_fetch_summary(summary: &FetchSummary, requested: usize) {
    let s = Styles::new();

    println!();
    if let Some(ref script) = summary.script {
        println!(
            "  {:<14}{} ({} files)",
            s.label.apply_to("Script"),
            s.path.apply_to(script.display()),
            requested
        );
        return;
    }

    println!(
        "  {:<14}{} / {}",
        s.label.apply_to("Downloaded"),
        s.good.apply_to(summary.downloaded.len()),
        requested
    );
    println!(
        "  {:<14}{:.1} MB",
        s.label.apply_to("Size"),
        summary.bytes as f64 / (1024.0 * 1024.0)
    );
    for name in &summary.failed {
        println!("  {:<14}{}", s.label.apply_to("Failed"), s.warn.apply_to(name));
    }
}
