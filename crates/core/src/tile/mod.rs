//! Tile model: dense alpha tiles, coordinates, canonical tiles and
//! neighborhood assembly

mod constants;
mod coord;
mod grid;
mod neighborhood;

pub use constants::{is_opaque, is_transparent, opaque_tile, transparent_tile};
pub use coord::{Strand, TileCoord, TileMap};
pub use grid::Tile;
pub use neighborhood::{fill_from_nine_grid, nine_grid, slot, NineGrid, GRID_OFFSETS};

/// Side length of a tile in pixels.
pub const TILE_SIZE: usize = 64;
