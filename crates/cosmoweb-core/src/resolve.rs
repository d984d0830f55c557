use tracing::{debug, info};

use crate::sky::SkyPosition;
use crate::tile::Footprint;

/// Which tile, if any, a coordinate fell in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MosaicAssignment {
    pub index: usize,
    pub tile: Option<String>,
}

impl MosaicAssignment {
    /// Tile id, or `"none"` for an unassigned coordinate.
    pub fn tile_label(&self) -> &str {
        self.tile.as_deref().unwrap_or("none")
    }
}

/// Inclusive containment test; both edges count as inside.
pub fn contains_pixel(x: f64, y: f64, width: usize, height: usize) -> bool {
    (0.0..=width as f64).contains(&x) && (0.0..=height as f64).contains(&y)
}

/// Assign each coordinate to the tile that contains it.
///
/// Tiles are scanned in order and every containing tile overwrites the
/// previous assignment, so where tiles overlap the last one wins. Positions
/// that cannot be projected onto a tile's tangent plane are outside it.
pub fn resolve<F: Footprint>(
    coordinates: &[SkyPosition],
    tiles: &[F],
) -> Vec<MosaicAssignment> {
    let mut assignments: Vec<MosaicAssignment> = (0..coordinates.len())
        .map(|index| MosaicAssignment { index, tile: None })
        .collect();

    for tile in tiles {
        let mut claimed = 0usize;
        for (assignment, &pos) in assignments.iter_mut().zip(coordinates) {
            let Some((x, y)) = tile.wcs().world_to_pixel(pos) else {
                continue;
            };
            if contains_pixel(x, y, tile.width(), tile.height()) {
                if let Some(ref previous) = assignment.tile {
                    debug!(
                        index = assignment.index,
                        previous = %previous,
                        tile = tile.id(),
                        "Overlapping tiles, reassigning"
                    );
                }
                assignment.tile = Some(tile.id().to_string());
                claimed += 1;
            }
        }
        info!(tile = tile.id(), claimed, "Scanned tile");
    }

    assignments
}
