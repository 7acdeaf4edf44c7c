//! # Tilemorph Core
//!
//! Core types for the tilemorph mask post-processing engine.
//!
//! This crate provides:
//! - `Tile`: dense fixed-size alpha tile over 15-bit fixed-point channels
//! - `TileCoord` / `TileMap`: sparse tile grid addressing
//! - Canonical transparent/opaque tiles shared by reference
//! - Nine-grid neighborhood assembly and padded-buffer population
//! - Algorithm traits for a consistent API

pub mod error;
pub mod fix15;
pub mod tile;

pub use error::{Error, Result};
pub use fix15::{fix15_mul, fix15_short_clamp, Chan, Fix15, FIX15_ONE};
pub use tile::{NineGrid, Strand, Tile, TileCoord, TileMap, TILE_SIZE};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::fix15::{Chan, Fix15, FIX15_ONE};
    pub use crate::tile::{
        nine_grid, opaque_tile, slot, transparent_tile, NineGrid, Strand, Tile, TileCoord,
        TileMap, TILE_SIZE,
    };
    pub use crate::Algorithm;
}

/// Core trait for all map-level operations in tilemorph.
///
/// Algorithms are pure functions that transform input data according to
/// parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(
        &self,
        input: Self::Input,
        params: Self::Params,
    ) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
