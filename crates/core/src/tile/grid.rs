//! Main Tile type

use crate::error::{Error, Result};
use crate::fix15::Chan;
use crate::tile::TILE_SIZE;
use ndarray::{Array2, ArrayView1, ArrayView2, ArrayViewMut2};

/// A dense square tile of alpha channel values.
///
/// A `Tile` stores `TILE_SIZE × TILE_SIZE` fixed-point channel values in
/// row-major order. Tiles are the unit of work for every kernel in this
/// workspace; sparsity only exists at the tile-map level, never inside a
/// tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    /// Channel data stored in (row, col) order
    data: Array2<Chan>,
}

impl Tile {
    /// Create a new tile filled with zeros (fully transparent)
    pub fn new() -> Self {
        Self {
            data: Array2::zeros((TILE_SIZE, TILE_SIZE)),
        }
    }

    /// Create a new tile filled with a specific channel value
    pub fn filled(value: Chan) -> Self {
        Self {
            data: Array2::from_elem((TILE_SIZE, TILE_SIZE), value),
        }
    }

    /// Create a tile from an existing array, checking its shape
    pub fn from_array(data: Array2<Chan>) -> Result<Self> {
        let (rows, cols) = data.dim();
        if rows != TILE_SIZE || cols != TILE_SIZE {
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }
        Ok(Self { data })
    }

    /// Get value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<Chan> {
        self.data
            .get((row, col))
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                row,
                col,
                size: TILE_SIZE,
            })
    }

    /// Direct value access for kernel loops.
    ///
    /// Panics if the index is out of bounds; callers index within
    /// `TILE_SIZE` by construction.
    #[inline]
    pub fn value(&self, row: usize, col: usize) -> Chan {
        self.data[(row, col)]
    }

    /// Set value at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: Chan) -> Result<()> {
        if row >= TILE_SIZE || col >= TILE_SIZE {
            return Err(Error::IndexOutOfBounds {
                row,
                col,
                size: TILE_SIZE,
            });
        }
        self.data[(row, col)] = value;
        Ok(())
    }

    /// View of one row of the tile
    pub fn row(&self, row: usize) -> ArrayView1<'_, Chan> {
        self.data.row(row)
    }

    /// Whether every channel in the tile holds the same value
    pub fn is_uniform(&self) -> bool {
        let first = self.data[(0, 0)];
        self.data.iter().all(|&v| v == first)
    }

    /// Get a view of the underlying data
    pub fn view(&self) -> ArrayView2<'_, Chan> {
        self.data.view()
    }

    /// Get a mutable view of the underlying data
    pub fn view_mut(&mut self) -> ArrayViewMut2<'_, Chan> {
        self.data.view_mut()
    }

    /// Get a reference to the underlying array
    pub fn data(&self) -> &Array2<Chan> {
        &self.data
    }

    /// Get a mutable reference to the underlying array
    pub fn data_mut(&mut self) -> &mut Array2<Chan> {
        &mut self.data
    }
}

impl Default for Tile {
    fn default() -> Self {
        Self::new()
    }
}
