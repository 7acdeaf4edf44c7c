//! Gap detection for gap-closing fills
//!
//! A gap is a pair of unfillable (zero-alpha) pixels within a maximum
//! distance of each other, with fillable pixels between them. The sweep
//! visits every zero pixel in a padded neighborhood buffer and searches an
//! approximate semicircle of octants for a matching zero pixel; the
//! fillable pixels on the line between the pair receive the pair's squared
//! separation, so the fill can later stop short of seeping through.
//!
//! Distances are recorded and consumed squared; no square root is ever
//! taken.

use tilemorph_core::tile::{fill_from_nine_grid, Tile, TILE_SIZE};
use tilemorph_core::{Chan, Error, NineGrid, Result};

/// "No gap detected" sentinel, strictly greater than any recordable
/// squared gap distance.
pub const DISTANCE_INF: Chan = (2 * TILE_SIZE * TILE_SIZE) as Chan;

/// A radii tile with every distance set to [`DISTANCE_INF`].
pub fn new_radii_tile() -> Tile {
    Tile::filled(DISTANCE_INF)
}

/// Per-worker scratch for gap detection at one maximum distance.
pub struct DistanceBucket {
    distance: usize,
    /// Padded alpha input: (TILE_SIZE + 2 * (distance + 1))^2
    input: Vec<Vec<Chan>>,
}

impl DistanceBucket {
    /// Create a bucket detecting gaps up to `distance` pixels long.
    pub fn new(distance: usize) -> Result<Self> {
        if distance == 0 || distance >= TILE_SIZE {
            return Err(Error::InvalidParameter {
                name: "distance",
                value: distance.to_string(),
                reason: format!("must be in [1, {}]", TILE_SIZE - 1),
            });
        }
        let side = TILE_SIZE + 2 * (distance + 1);
        Ok(Self {
            distance,
            input: vec![vec![0; side]; side],
        })
    }

    /// Maximum detectable gap length.
    pub fn distance(&self) -> usize {
        self.distance
    }
}

/// Octant reflection: maps sweep-local offsets into buffer coordinates.
type OctantFn = fn(i32, i32, i32, i32) -> (i32, i32);

fn top_right(x: i32, y: i32, xoffs: i32, yoffs: i32) -> (i32, i32) {
    (x + xoffs, y + yoffs)
}

fn top_center(x: i32, y: i32, xoffs: i32, yoffs: i32) -> (i32, i32) {
    (x - yoffs, y - xoffs)
}

fn bottom_center(x: i32, y: i32, xoffs: i32, yoffs: i32) -> (i32, i32) {
    (x - yoffs, y + xoffs)
}

fn bottom_right(x: i32, y: i32, xoffs: i32, yoffs: i32) -> (i32, i32) {
    (x + xoffs, y - yoffs)
}

/// Record a squared gap distance at a center-tile pixel, keeping the
/// minimum. Coordinates outside MID are ignored.
fn update_distance(radii: &mut Tile, (x, y): (i32, i32), new_distance: Chan) {
    if x < 0 || x > TILE_SIZE as i32 - 1 || y < 0 || y > TILE_SIZE as i32 - 1 {
        return;
    }
    let (row, col) = (y as usize, x as usize);
    if radii.value(row, col) > new_distance {
        radii.data_mut()[(row, col)] = new_distance;
    }
}

/// Search one octant around a zero pixel for another zero pixel within
/// the squared distance limit, marking the line between any pair found.
///
/// If either pixel on the one-step ray is already zero the regions are
/// adjacent rather than separated, and there is nothing to mark.
fn distance_search(
    x: i32,
    y: i32,
    distance: i32,
    alphas: &[Vec<Chan>],
    radii: &mut Tile,
    op: OctantFn,
) {
    let offs = distance + 1;
    let rx = x - offs;
    let ry = y - offs;

    let t1 = op(x, y, 0, -1);
    let t2 = op(x, y, 1, -1);
    if alphas[t1.1 as usize][t1.0 as usize] == 0 || alphas[t2.1 as usize][t2.0 as usize] == 0 {
        return;
    }

    for yoffs in 2..distance + 2 {
        let y_dist_sqr = (yoffs - 1) * (yoffs - 1);

        for xoffs in 0..=yoffs {
            let offs_dst = y_dist_sqr + xoffs * xoffs;
            if offs_dst >= 1 + distance * distance {
                break;
            }
            let c = op(x, y, xoffs, -yoffs);
            if alphas[c.1 as usize][c.0 as usize] == 0 {
                // Gap found: walk the line between the endpoints writing
                // double-width coverage
                let dx = xoffs as f32 / (yoffs - 1) as f32;
                let mut tx = 0.0_f32;
                let mut cx = 0;
                for cy in 1..yoffs {
                    update_distance(radii, op(rx, ry, cx, -cy), offs_dst as Chan);
                    tx += dx;
                    if tx.floor() as i32 > cx {
                        cx += 1;
                        update_distance(radii, op(rx, ry, cx, -cy), offs_dst as Chan);
                    }
                    update_distance(radii, op(rx, ry, cx + 1, -cy), offs_dst as Chan);
                }
            }
        }
    }
}

/// Search a nine-grid of flooded alpha tiles for gaps up to the bucket's
/// distance, writing squared gap lengths into the radii tile for the
/// center tile's pixels.
///
/// Existing radii values are only ever lowered, so a radii tile can
/// accumulate results across multiple neighborhoods.
pub fn find_gaps(bucket: &mut DistanceBucket, radii: &mut Tile, grid: &NineGrid) {
    let r = bucket.distance + 1;
    fill_from_nine_grid(r, &mut bucket.input, false, grid);

    let distance = bucket.distance as i32;
    let ri = r as i32;
    let n = TILE_SIZE as i32;
    let alphas = &bucket.input;

    // Check at most distance + 1 pixels around any point
    for y in 0..2 * ri + n - 1 {
        for x in 0..ri + n - 1 {
            if alphas[y as usize][x as usize] != 0 {
                continue;
            }
            if y >= ri {
                distance_search(x, y, distance, alphas, radii, top_right);
                distance_search(x, y, distance, alphas, radii, top_center);
            }
            if y < n + ri {
                distance_search(x, y, distance, alphas, radii, bottom_center);
                distance_search(x, y, distance, alphas, radii, bottom_right);
            }
        }
    }
}

/// Scan a w×h rectangle of a tile for any unfillable (zero) pixel.
fn any_unfillable(tile: &Tile, x: usize, w: usize, y: usize, h: usize) -> bool {
    for row in y..y + h {
        for col in x..x + w {
            if tile.value(row, col) == 0 {
                return true;
            }
        }
    }
    false
}

/// Whether the corners of the four tiles around an empty center rule out
/// any gap crossing it.
///
/// Each check pairs two d×d corner squares that meet diagonally across
/// the center tile's corner; a pair can only carry a crossing gap if both
/// squares contain an unfillable pixel. A `true` result guarantees no gap
/// of length <= `distance` crosses the center; `false` is conservative.
pub fn no_corner_gaps(
    distance: usize,
    north: &Tile,
    east: &Tile,
    south: &Tile,
    west: &Tile,
) -> Result<bool> {
    if distance == 0 || distance >= TILE_SIZE {
        return Err(Error::InvalidParameter {
            name: "distance",
            value: distance.to_string(),
            reason: format!("must be in [1, {}]", TILE_SIZE - 1),
        });
    }
    let d = distance;
    let n = TILE_SIZE;

    // NE corner of W against SW corner of N
    if any_unfillable(west, n - d, d, 0, d) && any_unfillable(north, 0, d, n - d, d) {
        return Ok(false);
    }
    // SE corner of W against NW corner of S
    if any_unfillable(west, n - d, d, n - d, d) && any_unfillable(south, 0, d, 0, d) {
        return Ok(false);
    }
    // SE corner of N against NW corner of E
    if any_unfillable(north, n - d, d, n - d, d) && any_unfillable(east, 0, d, 0, d) {
        return Ok(false);
    }
    // NE corner of S against SW corner of E
    if any_unfillable(south, n - d, d, 0, d) && any_unfillable(east, 0, d, n - d, d) {
        return Ok(false);
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tilemorph_core::tile::{opaque_tile, slot, transparent_tile};
    use tilemorph_core::FIX15_ONE;

    fn opaque_grid() -> NineGrid {
        std::array::from_fn(|_| opaque_tile())
    }

    #[test]
    fn test_bucket_validation() {
        assert!(DistanceBucket::new(0).is_err());
        assert!(DistanceBucket::new(TILE_SIZE).is_err());
        assert!(DistanceBucket::new(1).is_ok());
        assert!(DistanceBucket::new(TILE_SIZE - 1).is_ok());
    }

    #[test]
    fn test_no_gaps_in_solid_fill() {
        let mut bucket = DistanceBucket::new(4).unwrap();
        let mut radii = new_radii_tile();
        find_gaps(&mut bucket, &mut radii, &opaque_grid());
        assert!(radii.is_uniform());
        assert_eq!(radii.value(0, 0), DISTANCE_INF);
    }

    #[test]
    fn test_transparent_grid_marks_nothing() {
        // Contiguous emptiness is not a gap: every search stops at the
        // adjacent zero pixels.
        let grid: NineGrid = std::array::from_fn(|_| transparent_tile());
        let mut bucket = DistanceBucket::new(3).unwrap();
        let mut radii = new_radii_tile();
        find_gaps(&mut bucket, &mut radii, &grid);
        assert!(radii.is_uniform());
        assert_eq!(radii.value(0, 0), DISTANCE_INF);
    }

    #[test]
    fn test_vertical_gap_across_filled_band() {
        // Two zero pixels three apart in an otherwise solid center: the
        // two pixels between them receive the squared interior length.
        let mut mid = Tile::filled(FIX15_ONE);
        mid.set(30, 30, 0).unwrap();
        mid.set(33, 30, 0).unwrap();
        let mut grid = opaque_grid();
        grid[slot::MID] = Arc::new(mid);

        let mut bucket = DistanceBucket::new(3).unwrap();
        let mut radii = new_radii_tile();
        find_gaps(&mut bucket, &mut radii, &grid);

        assert_eq!(radii.value(31, 30), 4, "gap interior not marked");
        assert_eq!(radii.value(32, 30), 4, "gap interior not marked");
        assert_eq!(radii.value(10, 10), DISTANCE_INF, "far pixels must stay INF");
    }

    #[test]
    fn test_wide_gap_is_ignored() {
        let mut mid = Tile::filled(FIX15_ONE);
        mid.set(20, 30, 0).unwrap();
        mid.set(28, 30, 0).unwrap();
        let mut grid = opaque_grid();
        grid[slot::MID] = Arc::new(mid);

        let mut bucket = DistanceBucket::new(3).unwrap();
        let mut radii = new_radii_tile();
        find_gaps(&mut bucket, &mut radii, &grid);
        assert!(radii.is_uniform(), "gap longer than the distance was marked");
    }

    #[test]
    fn test_corner_gap_crosses_center_tile() {
        // Unfillable pixels in the W tile's NE corner and the N tile's SW
        // corner, diagonally across MID's corner: the pixel between them
        // lies in MID and must be marked.
        let mut west = Tile::filled(FIX15_ONE);
        west.set(1, TILE_SIZE - 1, 0).unwrap();
        let mut north = Tile::filled(FIX15_ONE);
        north.set(TILE_SIZE - 1, 1, 0).unwrap();

        let mut grid = opaque_grid();
        grid[slot::W] = Arc::new(west.clone());
        grid[slot::N] = Arc::new(north.clone());

        let mut bucket = DistanceBucket::new(3).unwrap();
        let mut radii = new_radii_tile();
        find_gaps(&mut bucket, &mut radii, &grid);
        assert!(
            radii.value(0, 0) < DISTANCE_INF,
            "corner-crossing gap missed"
        );

        // The corner predicate must refuse to rule this layout out
        let east = Tile::filled(FIX15_ONE);
        let south = Tile::filled(FIX15_ONE);
        assert!(!no_corner_gaps(3, &north, &east, &south, &west).unwrap());
    }

    #[test]
    fn test_no_corner_gaps_all_solid() {
        let solid = Tile::filled(FIX15_ONE);
        assert!(no_corner_gaps(3, &solid, &solid, &solid, &solid).unwrap());
    }

    #[test]
    fn test_no_corner_gaps_needs_both_corners() {
        // A zero in one corner square alone cannot carry a crossing gap
        let mut west = Tile::filled(FIX15_ONE);
        west.set(0, TILE_SIZE - 1, 0).unwrap();
        let solid = Tile::filled(FIX15_ONE);
        assert!(no_corner_gaps(3, &solid, &solid, &solid, &west).unwrap());
    }

    #[test]
    fn test_no_corner_gaps_validation() {
        let solid = Tile::filled(FIX15_ONE);
        assert!(no_corner_gaps(0, &solid, &solid, &solid, &solid).is_err());
        assert!(no_corner_gaps(TILE_SIZE, &solid, &solid, &solid, &solid).is_err());
    }

    #[test]
    fn test_corner_predicate_implies_no_updates() {
        // no_corner_gaps == true on solid cardinal neighbors means a gap
        // search over an empty center finds nothing.
        let solid = Tile::filled(FIX15_ONE);
        assert!(no_corner_gaps(2, &solid, &solid, &solid, &solid).unwrap());

        let mut grid = opaque_grid();
        grid[slot::MID] = transparent_tile();
        let mut bucket = DistanceBucket::new(2).unwrap();
        let mut radii = new_radii_tile();
        find_gaps(&mut bucket, &mut radii, &grid);
        assert!(radii.is_uniform());
        assert_eq!(radii.value(0, 0), DISTANCE_INF);
    }
}
