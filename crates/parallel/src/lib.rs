//! # Tilemorph Parallel
//!
//! Tile-parallel strand scheduling for tilemorph.
//!
//! This crate provides:
//! - Partitioning of tile maps into vertically contiguous strands
//! - A worker pool that claims strands from a shared atomic counter
//! - Serial merging of per-worker output maps

pub mod scheduler;
pub mod strands;

pub use scheduler::{run_strands, StrandWorker, MIN_STRANDS_PER_WORKER};
pub use strands::{complement_adjacent, directly_below, tile_partition};
