use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CutoutError, Result};

/// Column names of the CSV form, in order.
pub const CSV_COLUMNS: [&str; 5] = ["RA (deg)", "DEC (deg)", "inSurvey", "tile", "cutoutAllInvalid"];

/// Outcome for one input coordinate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub ra_deg: f64,
    pub dec_deg: f64,
    pub in_survey: bool,
    /// Tile id, or `"none"`
    pub tile: String,
    pub cutout_all_invalid: bool,
}

/// One row per input coordinate, in input order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultTable {
    rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: ResultRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn in_survey_count(&self) -> usize {
        self.rows.iter().filter(|r| r.in_survey).count()
    }

    pub fn all_invalid_count(&self) -> usize {
        self.rows.iter().filter(|r| r.cutout_all_invalid).count()
    }

    pub fn write_csv(&self, w: &mut impl Write) -> Result<()> {
        writeln!(w, "{}", CSV_COLUMNS.join(","))?;
        for row in &self.rows {
            writeln!(
                w,
                "{},{},{},{},{}",
                row.ra_deg, row.dec_deg, row.in_survey, row.tile, row.cutout_all_invalid
            )?;
        }
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        String::from_utf8(buf).map_err(|e| CutoutError::Serialization(e.to_string()))
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| CutoutError::Serialization(e.to_string()))
    }

    /// Save as JSON for a `.json` path, CSV otherwise.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => self.to_json_string()?,
            _ => self.to_csv_string()?,
        };
        std::fs::write(path, contents)?;
        Ok(())
    }
}

impl FromIterator<ResultRow> for ResultTable {
    fn from_iter<I: IntoIterator<Item = ResultRow>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ResultTable {
    type Item = &'a ResultRow;
    type IntoIter = std::slice::Iter<'a, ResultRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
