//! Morphology demo: post-process a synthetic fill mask
//!
//! Builds a small sparse tile map holding a filled blob with a one-pixel
//! pinhole and a narrow channel, then runs the whole post-processing
//! pipeline over it:
//!   1. dilate by 3 (close the pinhole, grow the blob)
//!   2. erode by 3 (restore the outline: a morphological closing)
//!   3. feather by 4 (soften the edge)
//!   4. gap detection on the raw mask
//!
//! Run:
//!   cargo run -p tilemorph-algorithms --example morphology_demo

use std::sync::Arc;

use tilemorph_algorithms::blur::feather;
use tilemorph_algorithms::gaps::{find_gaps, new_radii_tile, DistanceBucket, DISTANCE_INF};
use tilemorph_algorithms::morphology::morph_tiles;
use tilemorph_core::tile::nine_grid;
use tilemorph_core::{Tile, TileCoord, TileMap, FIX15_ONE, TILE_SIZE};

fn main() {
    // --- 1. Synthetic mask: a filled disc with a pinhole ---
    let mut blob = Tile::new();
    let c = TILE_SIZE as i32 / 2;
    for row in 0..TILE_SIZE {
        for col in 0..TILE_SIZE {
            let dy = row as i32 - c;
            let dx = col as i32 - c;
            if dx * dx + dy * dy <= 20 * 20 {
                blob.set(row, col, FIX15_ONE).unwrap();
            }
        }
    }
    blob.set(30, 30, 0).unwrap(); // pinhole
    let mut tiles = TileMap::new();
    tiles.insert(TileCoord::new(0, 0), Arc::new(blob));
    println!("input: {} tile(s), coverage {:.1}%", tiles.len(), coverage(&tiles));

    // --- 2. Closing: dilate then erode ---
    let dilated = morph_tiles(3, tiles.clone()).expect("dilate failed");
    println!("dilated by 3: {} tile(s), coverage {:.1}%", dilated.len(), coverage(&dilated));

    let closed = morph_tiles(-3, dilated).expect("erode failed");
    println!("closed: {} tile(s), coverage {:.1}%", closed.len(), coverage(&closed));
    let mid = &closed[&TileCoord::new(0, 0)];
    println!("pinhole after closing: {}", mid.value(30, 30));

    // --- 3. Feathered edge ---
    let feathered = feather(4, closed).expect("feather failed");
    println!("feathered: {} tile(s)", feathered.len());

    // --- 4. Gap scan over the raw mask ---
    let grid = nine_grid(TileCoord::new(0, 0), &tiles);
    let mut bucket = DistanceBucket::new(3).expect("bad distance");
    let mut radii = new_radii_tile();
    find_gaps(&mut bucket, &mut radii, &grid);
    let gaps = (0..TILE_SIZE)
        .flat_map(|r| (0..TILE_SIZE).map(move |c| (r, c)))
        .filter(|&(r, c)| radii.value(r, c) < DISTANCE_INF)
        .count();
    println!("pixels on detected gaps: {}", gaps);
}

fn coverage(tiles: &TileMap) -> f64 {
    let mut filled = 0usize;
    let mut total = 0usize;
    for tile in tiles.values() {
        for row in 0..TILE_SIZE {
            for col in 0..TILE_SIZE {
                total += 1;
                if tile.value(row, col) > 0 {
                    filled += 1;
                }
            }
        }
    }
    100.0 * filled as f64 / total as f64
}
