use tracing::{debug, info};

use crate::cutout::{self, Cutout};
use crate::error::Result;
use crate::resolve::{resolve, MosaicAssignment};
use crate::sky::SkyPosition;
use crate::table::{ResultRow, ResultTable};
use crate::tile::TileSource;

use super::types::{CutoutBatch, CutoutRequest, ExtractionStage, NoOpReporter, ProgressReporter};

/// Resolve every coordinate to a tile and cut science and error patches
/// around it.
///
/// Coordinates outside every tile get no cutouts. Any failure to read a tile
/// aborts the whole batch.
pub fn extract_cutouts(
    coordinates: &[SkyPosition],
    request: &CutoutRequest,
    source: &impl TileSource,
) -> Result<CutoutBatch> {
    extract_cutouts_reported(coordinates, request, source, &NoOpReporter)
}

/// Same as [`extract_cutouts`], reporting progress per stage.
pub fn extract_cutouts_reported(
    coordinates: &[SkyPosition],
    request: &CutoutRequest,
    source: &impl TileSource,
    reporter: &dyn ProgressReporter,
) -> Result<CutoutBatch> {
    reporter.begin_stage(ExtractionStage::Enumerating, None);
    let footprints = source.footprints(&request.filter)?;
    reporter.finish_stage();

    reporter.begin_stage(ExtractionStage::Resolving, Some(footprints.len()));
    let assignments = resolve(coordinates, &footprints);
    reporter.finish_stage();

    let found = assignments.iter().filter(|a| a.tile.is_some()).count();
    info!(
        coordinates = coordinates.len(),
        found,
        filter = %request.filter,
        size = %request.size,
        "Mosaics resolved"
    );

    let mut science: Vec<Option<Cutout>> = vec![None; coordinates.len()];
    let mut error: Vec<Option<Cutout>> = vec![None; coordinates.len()];

    reporter.begin_stage(ExtractionStage::Extracting, Some(found));
    let mut done = 0;
    for (tile_id, indices) in group_by_tile(&assignments) {
        // One tile in memory at a time.
        let tile = source.load_tile(&request.filter, tile_id)?;
        for index in indices {
            let pos = coordinates[index];
            let sci = cutout::extract(
                &tile.science,
                &tile.wcs,
                &tile.id,
                pos,
                request.size,
                request.mode,
            )?;
            let err = cutout::extract(
                &tile.error,
                &tile.wcs,
                &tile.id,
                pos,
                request.size,
                request.mode,
            )?;
            debug!(
                index,
                tile = %tile.id,
                shape = ?sci.data.dim(),
                invalid = sci.invalid_count(),
                "Cutout extracted"
            );
            science[index] = Some(sci);
            error[index] = Some(err);
            done += 1;
            reporter.advance(done);
        }
    }
    reporter.finish_stage();

    let table = build_table(coordinates, &assignments, &science);
    Ok(CutoutBatch {
        science,
        error,
        table,
    })
}

/// Coordinate indices per assigned tile, tiles in order of first appearance.
fn group_by_tile(assignments: &[MosaicAssignment]) -> Vec<(&str, Vec<usize>)> {
    let mut groups: Vec<(&str, Vec<usize>)> = Vec::new();
    for a in assignments {
        let Some(ref tile) = a.tile else { continue };
        match groups.iter_mut().find(|(id, _)| *id == tile.as_str()) {
            Some((_, indices)) => indices.push(a.index),
            None => groups.push((tile.as_str(), vec![a.index])),
        }
    }
    groups
}

fn build_table(
    coordinates: &[SkyPosition],
    assignments: &[MosaicAssignment],
    science: &[Option<Cutout>],
) -> ResultTable {
    coordinates
        .iter()
        .zip(assignments)
        .zip(science)
        .map(|((pos, assignment), sci)| ResultRow {
            ra_deg: pos.ra_deg,
            dec_deg: pos.dec_deg,
            in_survey: assignment.tile.is_some(),
            tile: assignment.tile_label().to_string(),
            cutout_all_invalid: sci.as_ref().is_some_and(Cutout::all_pixels_invalid),
        })
        .collect()
}
