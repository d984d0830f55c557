use crate::config::SurveyConfig;
use crate::cutout::{Cutout, CutoutMode};
use crate::sky::CutoutSize;
use crate::table::ResultTable;

/// What to cut out of which filter.
#[derive(Clone, Debug, PartialEq)]
pub struct CutoutRequest {
    pub filter: String,
    pub size: CutoutSize,
    pub mode: CutoutMode,
}

impl CutoutRequest {
    pub fn new(filter: &str, size: CutoutSize) -> Self {
        Self {
            filter: filter.to_string(),
            size,
            mode: CutoutMode::default(),
        }
    }

    /// A request using the configured cutout defaults.
    pub fn from_config(filter: &str, config: &SurveyConfig) -> Self {
        Self {
            filter: filter.to_string(),
            size: config.cutout.size(),
            mode: config.cutout.mode,
        }
    }
}

/// Everything produced for one batch of coordinates, in input order.
#[derive(Clone, Debug)]
pub struct CutoutBatch {
    pub science: Vec<Option<Cutout>>,
    pub error: Vec<Option<Cutout>>,
    pub table: ResultTable,
}

impl CutoutBatch {
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn found_count(&self) -> usize {
        self.science.iter().filter(|c| c.is_some()).count()
    }
}

/// Extraction stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtractionStage {
    Enumerating,
    Resolving,
    Extracting,
}

impl std::fmt::Display for ExtractionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Enumerating => write!(f, "Reading tile headers"),
            Self::Resolving => write!(f, "Resolving mosaics"),
            Self::Extracting => write!(f, "Extracting cutouts"),
        }
    }
}

/// Progress reporting for cutout extraction.
///
/// All methods have default no-op implementations.
pub trait ProgressReporter {
    /// A new stage has started. `total_items` is the number of work items, if known.
    fn begin_stage(&self, _stage: ExtractionStage, _total_items: Option<usize>) {}

    /// `items_done` work items of the current stage have completed.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

pub(super) struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}
