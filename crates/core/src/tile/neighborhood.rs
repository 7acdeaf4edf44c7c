//! Nine-grid assembly and padded-buffer population
//!
//! Every kernel works on a tile plus its eight neighbors. The neighborhood
//! is a fixed-order sequence of nine shared tiles; kernels index it
//! positionally, so the order is part of the contract and never changes:
//! NW, N, NE, W, MID, E, SW, S, SE (raster reading order).

use crate::fix15::Chan;
use crate::tile::{transparent_tile, Tile, TileCoord, TileMap, TILE_SIZE};
use std::sync::Arc;

/// Positional indices into a [`NineGrid`].
pub mod slot {
    pub const NW: usize = 0;
    pub const N: usize = 1;
    pub const NE: usize = 2;
    pub const W: usize = 3;
    pub const MID: usize = 4;
    pub const E: usize = 5;
    pub const SW: usize = 6;
    pub const S: usize = 7;
    pub const SE: usize = 8;
}

/// Tile-coordinate offsets for each slot, in slot order.
pub const GRID_OFFSETS: [(i32, i32); 9] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (0, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// A 3×3 neighborhood of shared tiles in fixed raster order.
pub type NineGrid = [Arc<Tile>; 9];

/// Assemble the nine-grid around a coordinate.
///
/// Slots whose tile is missing from the map are filled with the canonical
/// transparent tile. No tiles are created or copied; the grid holds shared
/// references into the map.
pub fn nine_grid(coord: TileCoord, tiles: &TileMap) -> NineGrid {
    GRID_OFFSETS.map(|(dx, dy)| {
        tiles
            .get(&coord.offset(dx, dy))
            .cloned()
            .unwrap_or_else(transparent_tile)
    })
}

/// Copy a w×h rectangle of a tile into the destination buffer at (x, y),
/// reading from the tile starting at (px_x, px_y).
fn fill_section(
    dst: &mut [Vec<Chan>],
    x: usize,
    w: usize,
    y: usize,
    h: usize,
    tile: &Tile,
    px_x: usize,
    px_y: usize,
) {
    for row in 0..h {
        let src = tile.row(px_y + row);
        let dst_row = &mut dst[y + row];
        for i in 0..w {
            dst_row[x + i] = src[px_x + i];
        }
    }
}

/// Populate a `(TILE_SIZE + 2·radius)²` working buffer from a nine-grid.
///
/// The MID tile's (0, 0) lands at buffer (radius, radius); the border
/// strips come from the eight neighbors.
///
/// With `from_above` set, the previous population on this buffer used the
/// current grid's northern neighbor as its MID: the top `2·radius` rows of
/// the new layout already sit in the buffer, `TILE_SIZE` rows further up.
/// Rows are swapped into place (an O(1) pointer move each) and only the
/// MID band and the southern strip are re-read.
pub fn fill_from_nine_grid(
    radius: usize,
    dst: &mut [Vec<Chan>],
    from_above: bool,
    grid: &NineGrid,
) {
    let r = radius;
    let n = TILE_SIZE;
    let b = n - r;
    let e = n + r;

    if from_above {
        for i in 0..2 * r {
            dst.swap(i, n + i);
        }
        // west, mid, east: bottom n - r rows
        fill_section(dst, 0, r, 2 * r, b, &grid[slot::W], b, r);
        fill_section(dst, r, n, 2 * r, b, &grid[slot::MID], 0, r);
        fill_section(dst, e, r, 2 * r, b, &grid[slot::E], 0, r);
    } else {
        // nw, north, ne
        fill_section(dst, 0, r, 0, r, &grid[slot::NW], b, b);
        fill_section(dst, r, n, 0, r, &grid[slot::N], 0, b);
        fill_section(dst, e, r, 0, r, &grid[slot::NE], 0, b);

        // west, mid, east
        fill_section(dst, 0, r, r, n, &grid[slot::W], b, 0);
        fill_section(dst, r, n, r, n, &grid[slot::MID], 0, 0);
        fill_section(dst, e, r, r, n, &grid[slot::E], 0, 0);
    }
    // sw, south, se
    fill_section(dst, 0, r, e, r, &grid[slot::SW], b, 0);
    fill_section(dst, r, n, e, r, &grid[slot::S], 0, 0);
    fill_section(dst, e, r, e, r, &grid[slot::SE], 0, 0);
}
