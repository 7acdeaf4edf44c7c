//! Benchmarks for the tile kernels

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use tilemorph_algorithms::blur::{blur, BlurBucket};
use tilemorph_algorithms::gaps::{find_gaps, new_radii_tile, DistanceBucket};
use tilemorph_algorithms::morphology::{dilate, erode, MorphBucket};
use tilemorph_core::tile::NineGrid;
use tilemorph_core::{Chan, Tile, FIX15_ONE, TILE_SIZE};

fn pattern_grid() -> NineGrid {
    std::array::from_fn(|i| {
        let mut tile = Tile::new();
        for row in 0..TILE_SIZE {
            for col in 0..TILE_SIZE {
                let h = (row * 31 + col * 17 + i * 101) % 7;
                let v = match h {
                    0 => 0,
                    1 => FIX15_ONE,
                    k => (k as Chan) * 5000,
                };
                tile.set(row, col, v).unwrap();
            }
        }
        Arc::new(tile)
    })
}

fn bench_dilate(c: &mut Criterion) {
    let mut group = c.benchmark_group("morphology/dilate");
    let grid = pattern_grid();
    for radius in [1, 2, 4, 8, 16, 32] {
        let mut bucket = MorphBucket::new(radius).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(radius), &radius, |b, _| {
            b.iter(|| dilate(black_box(&mut bucket), false, &grid))
        });
    }
    group.finish();
}

fn bench_erode(c: &mut Criterion) {
    let mut group = c.benchmark_group("morphology/erode");
    let grid = pattern_grid();
    for radius in [1, 4, 16] {
        let mut bucket = MorphBucket::new(radius).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(radius), &radius, |b, _| {
            b.iter(|| erode(black_box(&mut bucket), false, &grid))
        });
    }
    group.finish();
}

fn bench_dilate_row_reuse(c: &mut Criterion) {
    // The from-above path repopulates one table row per output row
    let mut group = c.benchmark_group("morphology/dilate_reuse");
    let grid = pattern_grid();
    for radius in [4, 16] {
        let mut bucket = MorphBucket::new(radius).unwrap();
        // Prime the bucket so row reuse is valid
        dilate(&mut bucket, false, &grid);
        group.bench_with_input(BenchmarkId::from_parameter(radius), &radius, |b, _| {
            b.iter(|| dilate(black_box(&mut bucket), true, &grid))
        });
    }
    group.finish();
}

fn bench_blur(c: &mut Criterion) {
    let mut group = c.benchmark_group("blur/tile");
    let grid = pattern_grid();
    for radius in [1, 3, 8] {
        let mut bucket = BlurBucket::new(radius).unwrap();
        let mut dst = Tile::new();
        group.bench_with_input(BenchmarkId::from_parameter(radius), &radius, |b, _| {
            b.iter(|| blur(black_box(&mut bucket), false, &grid, &mut dst))
        });
    }
    group.finish();
}

fn bench_find_gaps(c: &mut Criterion) {
    let mut group = c.benchmark_group("gaps/find");
    let grid = pattern_grid();
    for distance in [2, 4, 8] {
        let mut bucket = DistanceBucket::new(distance).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(distance), &distance, |b, _| {
            b.iter(|| {
                let mut radii = new_radii_tile();
                find_gaps(black_box(&mut bucket), &mut radii, &grid);
                radii
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_dilate,
    bench_erode,
    bench_dilate_row_reuse,
    bench_blur,
    bench_find_gaps,
);
criterion_main!(benches);
