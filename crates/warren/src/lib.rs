//! # Warren
//!
//! Cell-grid spatial partition substrate for broad-phase candidate lookup.
//!
//! Warren divides the 2D plane into fixed-size square cells and tracks, for
//! every registered item, the set of cells its bounding box covers. Candidate
//! lists are bucketed per cell by a caller-chosen key (typically a coarse
//! collision category), so a narrow-phase tester can walk exactly the lists
//! it cares about:
//!
//! - **Bounded candidate lists**: Pairwise testing only considers items that
//!   share a cell, not the whole world
//! - **Keyed buckets**: Each cell holds one ordered list per key, so callers
//!   skip whole categories without scanning
//! - **Rebuild-friendly**: `clear` + re-`insert` each tick is the intended
//!   usage for worlds where most items move
//!
//! Warren is game-agnostic: it is generic over the item identifier and the
//! bucket key, and never inspects either beyond hashing and equality.
//!
//! ## Quick Start
//!
//! ```
//! use warren::{Aabb, CellGrid};
//! use glam::Vec2;
//!
//! let mut grid: CellGrid<u64, &str> = CellGrid::new(16.0);
//! grid.insert(1, "actor", Aabb::from_pos_size(Vec2::new(4.0, 4.0), Vec2::new(8.0, 12.0)));
//! grid.insert(2, "actor", Aabb::from_pos_size(Vec2::new(10.0, 6.0), Vec2::new(8.0, 12.0)));
//!
//! for cell in grid.cells_of(1) {
//!     let candidates = grid.candidates(*cell, "actor");
//!     assert!(candidates.contains(&2));
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod grid;

// Re-exports for convenience
pub use grid::CellGrid;

/// Axis-aligned bounding box in 2D, top-left origin, y-down.
///
/// Edges are inclusive: two boxes that merely touch are considered
/// overlapping. Broad-phase registration and narrow-phase box tests both
/// rely on this so that entities resting flush against each other still
/// produce a candidate pair.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Aabb {
    /// Minimum corner (top-left in screen coordinates)
    pub min: glam::Vec2,
    /// Maximum corner (bottom-right in screen coordinates)
    pub max: glam::Vec2,
}

impl Aabb {
    /// Create a box from min/max corners.
    #[must_use]
    pub fn new(min: glam::Vec2, max: glam::Vec2) -> Self {
        Self { min, max }
    }

    /// Create a box from a top-left position and a size.
    #[must_use]
    pub fn from_pos_size(pos: glam::Vec2, size: glam::Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    /// Get the center of the box.
    #[must_use]
    pub fn center(&self) -> glam::Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Get the size of the box.
    #[must_use]
    pub fn size(&self) -> glam::Vec2 {
        self.max - self.min
    }

    /// Check if a point is inside the box (edges inclusive).
    #[must_use]
    pub fn contains(&self, point: glam::Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Check if this box overlaps another (edges inclusive).
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}
