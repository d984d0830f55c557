mod orchestrator;
mod types;

pub use orchestrator::{extract_cutouts, extract_cutouts_reported};
pub use types::{CutoutBatch, CutoutRequest, ExtractionStage, ProgressReporter};
