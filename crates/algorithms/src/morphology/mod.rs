//! Tile morphology for mask post-processing
//!
//! Constant-time morphological operations over sparse tile grids:
//! - **Dilation**: maximum filter (grows the filled region)
//! - **Erosion**: minimum filter (shrinks the filled region)
//!
//! Single tiles go through [`dilate`]/[`erode`] with a per-worker
//! [`MorphBucket`]; whole tile maps go through [`morph`] (caller-provided
//! strands) or [`morph_tiles`] (partitions, schedules and merges).

mod bucket;
mod element;

pub use bucket::MorphBucket;

use std::sync::Arc;

use tilemorph_core::tile::{is_transparent, nine_grid, slot};
use tilemorph_core::{
    Algorithm, Error, NineGrid, Result, Strand, Tile, TileCoord, TileMap, TILE_SIZE,
};
use tilemorph_parallel::{complement_adjacent, run_strands, tile_partition, StrandWorker};

use bucket::{Dilation, Erosion, MorphOp};

/// Parameters for a map-level morph
#[derive(Debug, Clone)]
pub struct MorphParams {
    /// Signed pixel offset: positive dilates, negative erodes; the
    /// magnitude is the structuring-element radius.
    pub offset: i32,
}

impl Default for MorphParams {
    fn default() -> Self {
        Self { offset: 1 }
    }
}

/// Morph algorithm (dilate/erode a tile map)
#[derive(Debug, Clone, Default)]
pub struct Morph;

impl Algorithm for Morph {
    type Input = TileMap;
    type Output = TileMap;
    type Params = MorphParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Morph"
    }

    fn description(&self) -> &'static str {
        "Grow or shrink the filled region by a disk of the given radius"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        morph_tiles(params.offset, input)
    }
}

fn generic_morph<O: MorphOp>(
    bucket: &mut MorphBucket,
    can_update: bool,
    grid: &NineGrid,
) -> (bool, Arc<Tile>) {
    if bucket.can_skip::<O>(&grid[slot::MID]) {
        // Input buffer untouched: the next tile cannot reuse rows
        return (false, O::fill_tile());
    }

    bucket.initiate(can_update, grid);
    let mut dst = Tile::new();
    bucket.run::<O>(can_update, &mut dst);
    (true, Arc::new(dst))
}

/// Dilate the center tile of a nine-grid.
///
/// Returns whether the kernel actually ran (false on a fast-path hit,
/// in which case the result is the canonical opaque tile) and the
/// resulting tile.
pub fn dilate(bucket: &mut MorphBucket, can_update: bool, grid: &NineGrid) -> (bool, Arc<Tile>) {
    generic_morph::<Dilation>(bucket, can_update, grid)
}

/// Erode the center tile of a nine-grid.
///
/// Fast-path hits resolve to the canonical transparent tile.
pub fn erode(bucket: &mut MorphBucket, can_update: bool, grid: &NineGrid) -> (bool, Arc<Tile>) {
    generic_morph::<Erosion>(bucket, can_update, grid)
}

/// Whether a morph result is completely transparent and can be dropped
/// from the output map.
///
/// A dilation of a non-transparent center can never come out empty, so
/// the uniformity scan only runs when that shortcut does not apply.
fn empty_result(offset: i32, mid: &Arc<Tile>, result: &Arc<Tile>) -> bool {
    if is_transparent(result) {
        return true;
    }
    if offset > 0 && !is_transparent(mid) {
        return false;
    }
    result.value(0, 0) == 0 && result.is_uniform()
}

/// Morph one strand of tiles in order, inserting non-empty results into
/// `morphed`.
///
/// Consecutive strand entries are vertically adjacent, so each kernel run
/// that produced a real output lets the next one reuse buffer rows.
pub fn morph_strand(
    offset: i32,
    bucket: &mut MorphBucket,
    strand: &[TileCoord],
    tiles: &TileMap,
    morphed: &mut TileMap,
) {
    let mut can_update = false;
    for &coord in strand {
        let grid = nine_grid(coord, tiles);
        let (updated, result) = if offset > 0 {
            dilate(bucket, can_update, &grid)
        } else {
            erode(bucket, can_update, &grid)
        };
        can_update = updated;

        if !empty_result(offset, &grid[slot::MID], &result) {
            morphed.insert(coord, result);
        }
    }
}

struct MorphWorker<'a> {
    offset: i32,
    tiles: &'a TileMap,
    bucket: MorphBucket,
}

impl StrandWorker for MorphWorker<'_> {
    fn process_strand(&mut self, strand: &[TileCoord], output: &mut TileMap) {
        morph_strand(self.offset, &mut self.bucket, strand, self.tiles, output);
    }
}

/// Dilate (positive offset) or erode (negative offset) the strands of a
/// tile map, merging results into `morphed`.
///
/// The offset magnitude is the structuring-element radius and must be in
/// `[1, TILE_SIZE]`; invalid offsets leave `morphed` untouched.
pub fn morph(
    offset: i32,
    morphed: &mut TileMap,
    tiles: &TileMap,
    strands: &[Strand],
) -> Result<()> {
    if offset == 0 || offset.unsigned_abs() as usize > TILE_SIZE {
        tracing::warn!(offset, "rejecting morph: offset out of range");
        return Err(Error::InvalidParameter {
            name: "offset",
            value: offset.to_string(),
            reason: format!("must be nonzero and within [-{0}, {0}]", TILE_SIZE),
        });
    }

    let radius = offset.unsigned_abs() as usize;
    run_strands(strands, morphed, || MorphWorker {
        offset,
        tiles,
        bucket: MorphBucket::build(radius),
    })
}

/// Morph a whole tile map: pad the neighborhood when dilating, partition
/// into strands, run the workers and fold the short-circuited tiles back
/// into the result.
pub fn morph_tiles(offset: i32, mut tiles: TileMap) -> Result<TileMap> {
    if offset > 0 {
        complement_adjacent(&mut tiles);
    }
    let (mut morphed, strands, _) = tile_partition(&tiles, offset > 0);
    morph(offset, &mut morphed, &tiles, &strands)?;
    Ok(morphed)
}
