//! Per-worker scratch and kernel for constant-time dilation/erosion
//!
//! The kernel is the Urbach-Wilkinson algorithm: a lookup table holds, for
//! every buffer column and every distinct chord length, the running
//! extremum of that many pixels, built incrementally by combining
//! overlapping shorter spans. Each output pixel then folds one table cell
//! per structuring-element row. Advancing to the next image row reuses the
//! whole table except one row, so recomputation stays logarithmic in the
//! radius per output row.

use std::sync::Arc;

use tilemorph_core::tile::{
    fill_from_nine_grid, opaque_tile, transparent_tile, NineGrid, Tile, TILE_SIZE,
};
use tilemorph_core::{Chan, Error, Result, FIX15_ONE};

use super::element::{disk_element, Chord};

/// Comparison fold for one morphological operation.
pub(crate) trait MorphOp {
    /// Fold seed for the per-pixel chord scan
    const INIT: Chan;
    /// Absorbing extremum; also the uniform fast-path fill value
    const LIM: Chan;
    fn cmp(a: Chan, b: Chan) -> Chan;
    /// Canonical tile a fast-path hit resolves to
    fn fill_tile() -> Arc<Tile>;
}

/// Maximum filter: grows opaque regions.
pub(crate) struct Dilation;

impl MorphOp for Dilation {
    const INIT: Chan = 0;
    const LIM: Chan = FIX15_ONE;

    fn cmp(a: Chan, b: Chan) -> Chan {
        a.max(b)
    }

    fn fill_tile() -> Arc<Tile> {
        opaque_tile()
    }
}

/// Minimum filter: shrinks opaque regions.
pub(crate) struct Erosion;

impl MorphOp for Erosion {
    const INIT: Chan = FIX15_ONE;
    const LIM: Chan = 0;

    fn cmp(a: Chan, b: Chan) -> Chan {
        a.min(b)
    }

    fn fill_tile() -> Arc<Tile> {
        transparent_tile()
    }
}

/// Per-worker scratch for dilation/erosion at one radius.
///
/// Owns the structuring-element tables, the padded input buffer and the
/// lookup table. All scratch is allocated up front; a bucket serves an
/// unbounded number of tiles on one worker and is never shared between
/// threads.
pub struct MorphBucket {
    radius: usize,
    /// Structuring element height (2 * radius + 1)
    height: usize,
    chords: Vec<Chord>,
    lengths: Vec<usize>,
    /// Lookup table: height x (TILE_SIZE + 2r) x distinct lengths
    table: Vec<Vec<Vec<Chan>>>,
    /// Padded input: (TILE_SIZE + 2r)^2
    input: Vec<Vec<Chan>>,
}

impl MorphBucket {
    /// Create a bucket for the given structuring-element radius.
    pub fn new(radius: usize) -> Result<Self> {
        if radius == 0 || radius > TILE_SIZE {
            return Err(Error::InvalidParameter {
                name: "radius",
                value: radius.to_string(),
                reason: format!("must be in [1, {}]", TILE_SIZE),
            });
        }
        Ok(Self::build(radius))
    }

    /// Build without validation; callers have range-checked the radius.
    pub(crate) fn build(radius: usize) -> Self {
        let height = 2 * radius + 1;
        let (chords, lengths) = disk_element(radius);
        let width = TILE_SIZE + 2 * radius;
        let table = vec![vec![vec![0; lengths.len()]; width]; height];
        let input = vec![vec![0; width]; width];
        Self {
            radius,
            height,
            chords,
            lengths,
            table,
            input,
        }
    }

    /// Structuring-element radius this bucket was built for.
    pub fn radius(&self) -> usize {
        self.radius
    }

    /// Load the padded input buffer from a nine-grid, reusing rows from
    /// the previous invocation when `can_update` holds.
    pub(crate) fn initiate(&mut self, can_update: bool, grid: &NineGrid) {
        fill_from_nine_grid(self.radius, &mut self.input, can_update, grid);
    }

    /// Shift the lookup table up one row; the old top row's storage
    /// becomes the new bottom row. Row containers move, data does not.
    fn rotate_lut(&mut self) {
        self.table.rotate_left(1);
    }

    /// Fill table row `row` from padded input row `y_px`: spans of length
    /// 1 are the pixels themselves, and each longer span is the fold of
    /// two shorter overlapping spans.
    fn populate_row<O: MorphOp>(&mut self, row: usize, y_px: usize) {
        let width = TILE_SIZE + 2 * self.radius;

        for x in 0..width {
            self.table[row][x][0] = self.input[y_px][x];
        }
        let mut prev_len = 1;
        for len_i in 1..self.lengths.len() {
            let len = self.lengths[len_i];
            let len_diff = len - prev_len;
            prev_len = len;
            for x in 0..=width - len {
                let ext = O::cmp(
                    self.table[row][x][len_i - 1],
                    self.table[row][x + len_diff][len_i - 1],
                );
                self.table[row][x][len_i] = ext;
            }
        }
    }

    /// Run the kernel over the padded input, writing the morphed center
    /// tile into `dst`.
    ///
    /// With `can_update`, the table rows built by the previous invocation
    /// are recycled and only the new bottom row is populated; otherwise
    /// the whole table is rebuilt from input rows 0..height.
    pub(crate) fn run<O: MorphOp>(&mut self, can_update: bool, dst: &mut Tile) {
        let r = self.radius;

        if can_update {
            self.populate_row::<O>(0, 2 * r);
            self.rotate_lut();
        } else {
            for dy in 0..self.height {
                self.populate_row::<O>(dy, dy);
            }
        }

        for y in 0..TILE_SIZE {
            for x in 0..TILE_SIZE {
                let mut ext = O::INIT;
                for c in 0..self.height {
                    let chord = self.chords[c];
                    let cx = (x as i32 + chord.x_offset + r as i32) as usize;
                    ext = O::cmp(ext, self.table[c][cx][chord.length_index]);
                    if ext == O::LIM {
                        break;
                    }
                }
                dst.data_mut()[(y, x)] = ext;
            }
            if y < TILE_SIZE - 1 {
                self.populate_row::<O>(0, y + 2 * r + 1);
                self.rotate_lut();
            }
        }
    }

    /// Whether the result is forced to the operation's limit without
    /// running the kernel.
    ///
    /// For radii whose disk covers the whole tile from its center, one
    /// limit-valued pixel in a small cross around the center of MID
    /// decides the entire output; for half that radius, four disks
    /// centered on the quarter points cover the tile together, so all
    /// four crosses must hit.
    pub(crate) fn can_skip<O: MorphOp>(&self, mid: &Tile) -> bool {
        const MAX_SEARCH_RADIUS: usize = 15;
        let r = self.radius;
        let r_limit = (TILE_SIZE as f64 * std::f64::consts::SQRT_2 / 2.0) as usize;

        // Structuring element covers the entire tile
        if r > r_limit {
            let range = (r - r_limit).min(MAX_SEARCH_RADIUS);
            let half = TILE_SIZE / 2 - 1;
            if check_lim(O::LIM, mid, half, half, range) {
                return true;
            }
        }
        // Four structuring elements can cover the tile
        if r > r_limit / 2 {
            let range = (r - r_limit / 2).min(MAX_SEARCH_RADIUS);
            let quarter = TILE_SIZE / 4;
            let lo = quarter - 1;
            let hi = 3 * quarter - 1;
            if check_lim(O::LIM, mid, lo, lo, range)
                && check_lim(O::LIM, mid, hi, lo, range)
                && check_lim(O::LIM, mid, hi, hi, range)
                && check_lim(O::LIM, mid, lo, hi, range)
            {
                return true;
            }
        }
        false
    }
}

/// Search a two-pixel-wide cross of half-width `w` around (cx, cy) for a
/// pixel equal to `lim`.
fn check_lim(lim: Chan, tile: &Tile, cx: usize, cy: usize, w: usize) -> bool {
    for y in 0..=1usize {
        for x in -(w as i32)..=w as i32 {
            let col = (cx as i32 + x) as usize;
            let row_t = (cy as i32 + x) as usize;
            if tile.value(cy + y, col) == lim || tile.value(row_t, cx + y) == lim {
                return true;
            }
        }
    }
    false
}
