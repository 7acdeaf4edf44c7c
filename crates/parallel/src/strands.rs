//! Strand partitioning of tile maps
//!
//! Kernel buffers can reuse rows when consecutive tiles in a strand are
//! vertically adjacent, so the partitioner splits a tile map's coordinates
//! into vertical runs. Fully opaque tiles whose whole neighborhood is
//! opaque cannot change under any of the kernels and are routed straight to
//! the output instead of into a strand.

use tilemorph_core::tile::{is_opaque, opaque_tile, transparent_tile, GRID_OFFSETS};
use tilemorph_core::{Strand, TileCoord, TileMap};

/// Whether `a` is the tile directly below (south of) `b`.
pub fn directly_below(a: TileCoord, b: TileCoord) -> bool {
    a.x == b.x && a.y == b.y + 1
}

/// Ensure every tile in the map has a full neighborhood of eight tiles,
/// inserting the transparent singleton where neighbors are missing.
///
/// Used ahead of dilation, which can overflow into previously empty
/// neighbors. The padded map should only be used as kernel input; the
/// inserted tiles are the shared read-only singleton.
pub fn complement_adjacent(tiles: &mut TileMap) {
    let mut missing: Vec<TileCoord> = Vec::new();
    for &coord in tiles.keys() {
        for (dx, dy) in GRID_OFFSETS {
            if (dx, dy) == (0, 0) {
                continue;
            }
            let adjacent = coord.offset(dx, dy);
            if !tiles.contains_key(&adjacent) {
                missing.push(adjacent);
            }
        }
    }
    for coord in missing {
        tiles.entry(coord).or_insert_with(transparent_tile);
    }
}

/// Whether all eight neighbors of `coord` are the opaque singleton.
fn adjacent_full(coord: TileCoord, tiles: &TileMap) -> bool {
    GRID_OFFSETS
        .iter()
        .filter(|&&(dx, dy)| (dx, dy) != (0, 0))
        .all(|&(dx, dy)| {
            tiles
                .get(&coord.offset(dx, dy))
                .is_some_and(|tile| is_opaque(tile))
        })
}

/// Partition a tile map into finished tiles and work strands.
///
/// Coordinates are visited in column-major order and grouped into
/// vertically contiguous strands (low y to high y), the order that keeps
/// buffer row-reuse valid. Opaque-singleton tiles that cannot change
/// (any opaque tile when `dilating`, otherwise opaque tiles with fully
/// opaque neighborhoods) are placed in the finished map and break the
/// strand they would have joined.
///
/// Returns `(finished, strands, strand_tile_count)`.
pub fn tile_partition(tiles: &TileMap, dilating: bool) -> (TileMap, Vec<Strand>, usize) {
    let mut finished = TileMap::new();
    let mut strands: Vec<Strand> = Vec::new();
    let mut strand: Strand = Vec::new();
    let mut previous: Option<TileCoord> = None;
    let mut strand_tiles = 0;

    let mut coords: Vec<TileCoord> = tiles.keys().copied().collect();
    coords.sort();

    for coord in coords {
        let full = is_opaque(&tiles[&coord]);
        if full && (dilating || adjacent_full(coord, tiles)) {
            finished.insert(coord, opaque_tile());
            if !strand.is_empty() {
                strands.push(std::mem::take(&mut strand));
            }
        } else if previous.map_or(true, |p| directly_below(coord, p)) {
            strand.push(coord);
            strand_tiles += 1;
        } else {
            strands.push(std::mem::take(&mut strand));
            strand.push(coord);
            strand_tiles += 1;
        }
        previous = Some(coord);
    }
    if !strand.is_empty() {
        strands.push(strand);
    }

    (finished, strands, strand_tiles)
}
