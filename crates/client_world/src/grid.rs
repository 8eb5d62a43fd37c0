//! Logical map coordinates and the grid-to-screen projection seam.
//!
//! A [`GridIndex`] is a position on the logical game grid. It is distinct
//! from any screen-space position; the rendering layer supplies a
//! [`Projection`] that maps grid indices to visual coordinates.

use serde::{Deserialize, Serialize};

/// A logical `(x, y)` map coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridIndex {
    pub x: i64,
    pub y: i64,
}

impl GridIndex {
    /// Create a grid index from raw coordinates.
    #[must_use]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for GridIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Maps logical grid indices to visual (screen-space) coordinates.
///
/// The rendering layer owns the actual projection; the world only needs the
/// two scalar mappings to position visuals on creation and movement.
pub trait Projection {
    /// The visual x coordinate for a grid index.
    fn visual_x(&self, index: GridIndex) -> f32;

    /// The visual y coordinate for a grid index.
    fn visual_y(&self, index: GridIndex) -> f32;
}

/// Uniform square-tile projection: grid index times tile size.
#[derive(Debug, Clone, Copy)]
pub struct TileProjection {
    /// Edge length of one tile in visual units.
    pub tile_size: f32,
}

impl TileProjection {
    #[must_use]
    pub const fn new(tile_size: f32) -> Self {
        Self { tile_size }
    }
}

impl Default for TileProjection {
    fn default() -> Self {
        Self::new(32.0)
    }
}

impl Projection for TileProjection {
    fn visual_x(&self, index: GridIndex) -> f32 {
        index.x as f32 * self.tile_size
    }

    fn visual_y(&self, index: GridIndex) -> f32 {
        index.y as f32 * self.tile_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_projection_scales_by_tile_size() {
        let proj = TileProjection::new(16.0);
        let index = GridIndex::new(3, -2);
        assert_eq!(proj.visual_x(index), 48.0);
        assert_eq!(proj.visual_y(index), -32.0);
    }

    #[test]
    fn test_grid_index_serialization_roundtrip() {
        let index = GridIndex::new(7, 11);
        let bytes = rmp_serde::to_vec(&index).unwrap();
        let restored: GridIndex = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(index, restored);
    }
}
