//! # Tilemorph Algorithms
//!
//! Mask post-processing kernels for the tilemorph engine.
//!
//! ## Available Algorithm Categories
//!
//! - **morphology**: Constant-time dilation/erosion over disk structuring
//!   elements, with canonical-tile fast paths and strand-parallel map
//!   operations
//! - **blur**: Separable fixed-point gaussian blur and whole-map
//!   feathering
//! - **gaps**: Narrow-gap detection between unfillable regions for
//!   gap-closing fills

pub mod blur;
pub mod gaps;
pub mod morphology;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::blur::{blur, feather, BlurBucket, Feather, FeatherParams};
    pub use crate::gaps::{
        find_gaps, new_radii_tile, no_corner_gaps, DistanceBucket, DISTANCE_INF,
    };
    pub use crate::morphology::{
        dilate, erode, morph, morph_strand, morph_tiles, Morph, MorphBucket, MorphParams,
    };
    pub use tilemorph_core::prelude::*;
}
