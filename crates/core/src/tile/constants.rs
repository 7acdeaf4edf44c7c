//! Canonical shared tiles
//!
//! Two process-wide singleton tiles exist: the fully transparent tile and
//! the fully opaque tile. Both are lazily initialized, read-only and shared
//! by reference; fast paths return them directly and the drop/skip rules
//! test for them by pointer identity, never by content.

use crate::fix15::FIX15_ONE;
use crate::tile::Tile;
use once_cell::sync::Lazy;
use std::sync::Arc;

static TRANSPARENT: Lazy<Arc<Tile>> = Lazy::new(|| Arc::new(Tile::new()));

static OPAQUE: Lazy<Arc<Tile>> = Lazy::new(|| Arc::new(Tile::filled(FIX15_ONE)));

/// The canonical all-zero tile, shared by reference
pub fn transparent_tile() -> Arc<Tile> {
    Arc::clone(&TRANSPARENT)
}

/// The canonical all-opaque tile, shared by reference
pub fn opaque_tile() -> Arc<Tile> {
    Arc::clone(&OPAQUE)
}

/// Whether `tile` is the transparent singleton (pointer identity)
pub fn is_transparent(tile: &Arc<Tile>) -> bool {
    Arc::ptr_eq(tile, &TRANSPARENT)
}

/// Whether `tile` is the opaque singleton (pointer identity)
pub fn is_opaque(tile: &Arc<Tile>) -> bool {
    Arc::ptr_eq(tile, &OPAQUE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singletons_are_reference_stable() {
        assert!(Arc::ptr_eq(&transparent_tile(), &transparent_tile()));
        assert!(Arc::ptr_eq(&opaque_tile(), &opaque_tile()));
        assert!(!Arc::ptr_eq(&transparent_tile(), &opaque_tile()));
    }

    #[test]
    fn test_singleton_contents() {
        let t = transparent_tile();
        let o = opaque_tile();
        assert!(t.is_uniform());
        assert_eq!(t.value(0, 0), 0);
        assert!(o.is_uniform());
        assert_eq!(o.value(0, 0), FIX15_ONE);
    }

    #[test]
    fn test_identity_rejects_equal_content() {
        // A freshly built all-zero tile is equal in content but is not
        // the sentinel.
        let copy = Arc::new(Tile::new());
        assert!(!is_transparent(&copy));
        assert!(is_transparent(&transparent_tile()));
        assert!(is_opaque(&opaque_tile()));
    }
}
