//! Separable fixed-point gaussian blur over tiles
//!
//! Weights are precomputed per radius and stored as fixed-point factors;
//! each tile is blurred horizontally into an intermediate buffer and then
//! vertically into the output. Whole-map feathering composes up to three
//! passes whose radii sum to the requested feather.

use std::sync::Arc;

use tilemorph_core::tile::{fill_from_nine_grid, nine_grid};
use tilemorph_core::{
    fix15_mul, fix15_short_clamp, Algorithm, Chan, Error, Fix15, NineGrid, Result, Tile,
    TileMap, FIX15_ONE, TILE_SIZE,
};
use tilemorph_parallel::{complement_adjacent, tile_partition};

/// Fixed-point gaussian multiplicands for a blur radius.
///
/// The low bits are forced on so the factor sum cannot round below one;
/// blurred pixels are clamped to `FIX15_ONE` anyway, which hides the
/// excess. Changing this changes output pixel-for-pixel.
fn blur_factors(radius: usize) -> Vec<Chan> {
    let sigma = (0.3 * radius as f64 + 0.3) as f32;
    let prelim_size = 6 * (sigma + 1.0).ceil() as i32;
    let mul = (1.0 / (2.0 * std::f64::consts::PI * (sigma as f64) * (sigma as f64)).sqrt()) as f32;
    let exp_mul = 1.0_f32 / (2.0 * sigma * sigma);

    let center = prelim_size / 2;
    let mut factors = Vec::with_capacity(prelim_size as usize);
    for i in 0..prelim_size {
        let d = center - i;
        let fac = (mul as f64) * f64::from(-((d * d) as f32 * exp_mul)).exp();
        factors.push(((FIX15_ONE as f64 * fac) as u32 | 3) as Chan);
    }
    factors
}

/// Per-worker scratch for the separable blur at one radius.
///
/// The effective radius is derived from the factor count, not the
/// requested radius; all buffers are sized for it up front.
pub struct BlurBucket {
    factors: Vec<Chan>,
    radius: usize,
    /// Padded input from the nine-grid: (TILE_SIZE + 2r)^2
    input: Vec<Vec<Chan>>,
    /// Horizontally blurred rows: (TILE_SIZE + 2r) x TILE_SIZE
    intermediate: Vec<Vec<Chan>>,
}

impl BlurBucket {
    /// Create a bucket for the given blur radius.
    pub fn new(radius: usize) -> Result<Self> {
        if radius == 0 || radius > TILE_SIZE {
            return Err(Error::InvalidParameter {
                name: "radius",
                value: radius.to_string(),
                reason: format!("must be in [1, {}]", TILE_SIZE),
            });
        }
        let factors = blur_factors(radius);
        let effective = (factors.len() - 1) / 2;
        let side = TILE_SIZE + 2 * effective;
        Ok(Self {
            factors,
            radius: effective,
            input: vec![vec![0; side]; side],
            intermediate: vec![vec![0; TILE_SIZE]; side],
        })
    }

    /// Effective kernel radius (derived from the factor table).
    pub fn radius(&self) -> usize {
        self.radius
    }

    fn initiate(&mut self, can_update: bool, grid: &NineGrid) {
        fill_from_nine_grid(self.radius, &mut self.input, can_update, grid);
    }

    fn run(&mut self, dst: &mut Tile) {
        let r = self.radius;

        // Horizontal pass over every padded row
        for y in 0..TILE_SIZE + 2 * r {
            for x in 0..TILE_SIZE {
                let mut blurred: Fix15 = 0;
                for k in 0..=2 * r {
                    blurred += fix15_mul(
                        self.input[y][x + k] as Fix15,
                        self.factors[k] as Fix15,
                    );
                }
                self.intermediate[y][x] = fix15_short_clamp(blurred);
            }
        }

        // Vertical pass into the output tile
        for x in 0..TILE_SIZE {
            for y in 0..TILE_SIZE {
                let mut blurred: Fix15 = 0;
                for k in 0..=2 * r {
                    blurred += fix15_mul(
                        self.intermediate[y + k][x] as Fix15,
                        self.factors[k] as Fix15,
                    );
                }
                dst.data_mut()[(y, x)] = fix15_short_clamp(blurred);
            }
        }
    }
}

/// Blur the center tile of a nine-grid into `dst`.
///
/// `can_update` reuses buffer rows from the previous call on this bucket,
/// valid when that call's center was the current grid's northern neighbor.
pub fn blur(bucket: &mut BlurBucket, can_update: bool, grid: &NineGrid, dst: &mut Tile) {
    bucket.initiate(can_update, grid);
    bucket.run(dst);
}

/// Three near-equal addends for a feather radius.
fn triples(num: usize) -> [usize; 3] {
    let fraction = num as f64 / 3.0;
    let whole = num / 3;
    let floor = fraction.floor() as usize;
    let ceil = fraction.ceil() as usize;
    if fraction - whole as f64 >= 0.5 {
        [ceil, ceil, floor]
    } else {
        [ceil, floor, floor]
    }
}

/// One blur pass over a tile map, returning the blurred (potential)
/// superset of tiles.
///
/// Opaque tiles with fully opaque neighborhoods pass through unchanged;
/// the rest are processed along strands so the bucket can reuse rows.
fn blur_pass(tiles: &TileMap, bucket: &mut BlurBucket) -> TileMap {
    let (mut blurred, strands, _) = tile_partition(tiles, false);
    for strand in &strands {
        let mut can_update = false;
        for &coord in strand {
            let grid = nine_grid(coord, tiles);
            let mut dst = Tile::new();
            blur(bucket, can_update, &grid, &mut dst);
            blurred.insert(coord, Arc::new(dst));
            can_update = true;
        }
    }
    blurred
}

/// Parameters for map-level feathering
#[derive(Debug, Clone)]
pub struct FeatherParams {
    /// Total feather radius in pixels
    pub feather: usize,
}

impl Default for FeatherParams {
    fn default() -> Self {
        Self { feather: 1 }
    }
}

/// Feather algorithm (gaussian-blur a tile map)
#[derive(Debug, Clone, Default)]
pub struct Feather;

impl Algorithm for Feather {
    type Input = TileMap;
    type Output = TileMap;
    type Params = FeatherParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Feather"
    }

    fn description(&self) -> &'static str {
        "Soften the filled region's edge with an approximate gaussian blur"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        feather(params.feather, input)
    }
}

/// Blur a whole tile map by a feather radius.
///
/// Radius 1 is a single pass; 2 is two radius-1 passes; anything larger
/// runs three passes whose radii sum to the feather. The tile coverage is
/// expanded once up front, assuming the total radius stays within one
/// tile.
pub fn feather(feather: usize, mut tiles: TileMap) -> Result<TileMap> {
    if feather == 0 || feather > TILE_SIZE {
        tracing::warn!(feather, "rejecting feather: radius out of range");
        return Err(Error::InvalidParameter {
            name: "feather",
            value: feather.to_string(),
            reason: format!("must be in [1, {}]", TILE_SIZE),
        });
    }

    let radii: Vec<usize> = match feather {
        1 => vec![1],
        2 => vec![1, 1],
        _ => triples(feather).to_vec(),
    };

    complement_adjacent(&mut tiles);
    let mut bucket = BlurBucket::new(radii[0])?;
    for (i, &radius) in radii.iter().enumerate() {
        if i > 0 && radius != radii[i - 1] {
            bucket = BlurBucket::new(radius)?;
        }
        tiles = blur_pass(&tiles, &mut bucket);
    }
    Ok(tiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilemorph_core::tile::{opaque_tile, slot, transparent_tile};
    use tilemorph_core::TileCoord;

    fn uniform_grid(value: Chan) -> NineGrid {
        let tile = Arc::new(Tile::filled(value));
        std::array::from_fn(|_| Arc::clone(&tile))
    }

    #[test]
    fn test_factor_table_shape() {
        // Radius 1: sigma 0.6 gives a 12-entry table, effective radius 5
        let factors = blur_factors(1);
        assert_eq!(factors.len(), 12);
        let bucket = BlurBucket::new(1).unwrap();
        assert_eq!(bucket.radius(), 5);
        // Low-bit floor is always present
        assert!(factors.iter().all(|&f| f & 3 == 3));
        // Symmetric around the center within the truncation
        assert_eq!(factors[5], factors[7]);
    }

    #[test]
    fn test_bucket_validation() {
        assert!(BlurBucket::new(0).is_err());
        assert!(BlurBucket::new(TILE_SIZE + 1).is_err());
        assert!(BlurBucket::new(TILE_SIZE).is_ok());
    }

    #[test]
    fn test_blur_preserves_uniform_neighborhood() {
        // A uniform half-opaque neighborhood must blur to within 2 ulp
        let v = FIX15_ONE / 2;
        let mut bucket = BlurBucket::new(5).unwrap();
        let mut dst = Tile::new();
        blur(&mut bucket, false, &uniform_grid(v), &mut dst);

        for row in 0..TILE_SIZE {
            for col in 0..TILE_SIZE {
                let got = dst.value(row, col) as i32;
                assert!(
                    (got - v as i32).abs() <= 2,
                    "uniform blur drifted at ({}, {}): {} vs {}",
                    row,
                    col,
                    got,
                    v
                );
            }
        }
    }

    #[test]
    fn test_blur_of_transparent_is_transparent() {
        let mut bucket = BlurBucket::new(3).unwrap();
        let mut dst = Tile::filled(1234);
        blur(&mut bucket, false, &uniform_grid(0), &mut dst);
        assert!(dst.is_uniform());
        assert_eq!(dst.value(0, 0), 0);
    }

    #[test]
    fn test_blur_saturates_at_opaque() {
        // The factor sum slightly exceeds one; opaque input must clamp
        let mut bucket = BlurBucket::new(2).unwrap();
        let mut dst = Tile::new();
        blur(&mut bucket, false, &uniform_grid(FIX15_ONE), &mut dst);
        assert!(dst.is_uniform());
        assert_eq!(dst.value(0, 0), FIX15_ONE);
    }

    #[test]
    fn test_blur_row_reuse_matches_fresh_run() {
        let mut pattern = Tile::new();
        for row in 0..TILE_SIZE {
            for col in 0..TILE_SIZE {
                pattern
                    .set(row, col, ((row * 5 + col * 3) % 8) as Chan * 4000)
                    .unwrap();
            }
        }
        let upper_mid = Arc::new(pattern);
        let lower_mid = Arc::new(Tile::filled(20000));

        let mut upper = uniform_grid(0);
        upper[slot::MID] = Arc::clone(&upper_mid);
        upper[slot::S] = Arc::clone(&lower_mid);
        let mut lower = uniform_grid(0);
        lower[slot::N] = upper_mid;
        lower[slot::MID] = lower_mid;

        let mut bucket = BlurBucket::new(1).unwrap();
        let mut first = Tile::new();
        blur(&mut bucket, false, &upper, &mut first);
        let mut reused = Tile::new();
        blur(&mut bucket, true, &lower, &mut reused);

        let mut fresh_bucket = BlurBucket::new(1).unwrap();
        let mut fresh = Tile::new();
        blur(&mut fresh_bucket, false, &lower, &mut fresh);

        assert_eq!(reused, fresh, "row reuse changed the blur result");
    }

    #[test]
    fn test_triples_sum() {
        for n in 3..=TILE_SIZE {
            let parts = triples(n);
            assert_eq!(parts.iter().sum::<usize>(), n, "triples({}) sum", n);
            assert!(parts[0] >= parts[1] && parts[1] >= parts[2]);
        }
    }

    #[test]
    fn test_feather_validation() {
        assert!(feather(0, TileMap::new()).is_err());
        assert!(feather(TILE_SIZE + 1, TileMap::new()).is_err());
    }

    #[test]
    fn test_feather_spreads_alpha_outward() {
        let mut tiles = TileMap::new();
        tiles.insert(TileCoord::new(0, 0), opaque_tile());
        let blurred = feather(3, tiles).unwrap();

        // The opaque tile's edge bleeds into its neighbors
        let east = &blurred[&TileCoord::new(1, 0)];
        assert!(east.value(TILE_SIZE / 2, 0) > 0, "no bleed into east tile");
        assert_eq!(east.value(TILE_SIZE / 2, TILE_SIZE - 1), 0);
        // Deep inside the opaque tile nothing changes
        let mid = &blurred[&TileCoord::new(0, 0)];
        assert_eq!(mid.value(TILE_SIZE / 2, TILE_SIZE / 2), FIX15_ONE);
    }

    #[test]
    fn test_feather_algorithm_entry() {
        let algo = Feather;
        assert_eq!(algo.name(), "Feather");
        let mut tiles = TileMap::new();
        tiles.insert(TileCoord::new(0, 0), transparent_tile());
        let out = algo.execute_default(tiles).unwrap();
        assert!(out.contains_key(&TileCoord::new(0, 0)));
    }
}
