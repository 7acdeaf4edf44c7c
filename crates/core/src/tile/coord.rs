//! Tile coordinates and tile maps

use crate::tile::Tile;
use std::collections::HashMap;
use std::sync::Arc;

/// Coordinate of a tile in the infinite tile grid.
///
/// The derived ordering is column-major (x, then y), so a sorted list of
/// coordinates groups vertical runs of tiles together, the layout the
/// strand partitioner and the row-reuse optimization rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    /// Create a new tile coordinate
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The coordinate offset by (dx, dy) tiles
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Sparse mapping from tile coordinate to shared tile.
///
/// Kernels require only point lookup and point insert; canonical tiles may
/// appear under many coordinates at once.
pub type TileMap = HashMap<TileCoord, Arc<Tile>>;

/// An ordered run of tile coordinates processed by one worker in sequence.
///
/// Strand order is what makes buffer row-reuse valid: entry `i + 1` is
/// expected to be the southern neighbor of entry `i`.
pub type Strand = Vec<TileCoord>;
