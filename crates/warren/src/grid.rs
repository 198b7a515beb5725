//! Cell-grid storage with per-key candidate buckets.
//!
//! The [`CellGrid`] is the broad phase of collision detection: items are
//! registered into every cell their bounding box covers, and each cell keeps
//! one insertion-ordered candidate list per bucket key. Consumers walk an
//! item's occupied cells and fetch only the buckets they have rules for.
//!
//! # Synchronization
//!
//! The grid does not track item movement. The owning loop is expected to
//! either `remove` + `insert` items that moved, or `clear` and re-`insert`
//! everything at the start of each tick (the cheaper option when most items
//! move every tick). Readers must never observe a half-refreshed grid;
//! refresh strictly before dispatch.
//!
//! # Determinism
//!
//! Candidate lists preserve insertion order. A loop that inserts items in a
//! deterministic order therefore gets deterministic candidate ordering,
//! regardless of `HashMap` iteration order, because lookups are always by
//! known cell and key.

use std::collections::HashMap;
use std::hash::Hash;

use glam::{IVec2, Vec2};
use tracing::trace;

use crate::Aabb;

/// Spatial-hash grid of fixed-size square cells.
///
/// Generic over the item identifier `I` and the bucket key `K`; both are
/// only hashed and compared. Each occupied cell holds one candidate list
/// per key, in insertion order.
///
/// # Example
///
/// ```
/// use warren::{Aabb, CellGrid};
/// use glam::Vec2;
///
/// let mut grid: CellGrid<u32, u8> = CellGrid::new(32.0);
/// grid.insert(7, 0, Aabb::from_pos_size(Vec2::ZERO, Vec2::new(8.0, 12.0)));
///
/// assert_eq!(grid.cells_of(7).len(), 1);
/// assert_eq!(grid.candidates(grid.cells_of(7)[0], 0), &[7]);
/// ```
#[derive(Debug, Clone)]
pub struct CellGrid<I, K> {
    /// Side length of a cell in world units.
    cell_size: f32,
    /// Per-cell candidate lists, bucketed by key.
    cells: HashMap<IVec2, HashMap<K, Vec<I>>>,
    /// Cells currently covered by each item.
    occupancy: HashMap<I, Vec<IVec2>>,
}

impl<I, K> CellGrid<I, K>
where
    I: Copy + Eq + Hash,
    K: Copy + Eq + Hash,
{
    /// Creates an empty grid with the given cell side length.
    ///
    /// # Panics
    ///
    /// Panics if `cell_size` is not strictly positive.
    #[must_use]
    pub fn new(cell_size: f32) -> Self {
        assert!(cell_size > 0.0, "cell_size must be positive");
        Self {
            cell_size,
            cells: HashMap::new(),
            occupancy: HashMap::new(),
        }
    }

    /// Returns the cell side length.
    #[must_use]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Returns the cell coordinate containing a point.
    #[must_use]
    pub fn cell_at(&self, point: Vec2) -> IVec2 {
        IVec2::new(
            (point.x / self.cell_size).floor() as i32,
            (point.y / self.cell_size).floor() as i32,
        )
    }

    /// Registers an item under `key` in every cell its box covers.
    ///
    /// Re-inserting an item replaces its previous registration entirely
    /// (old cells and key included).
    pub fn insert(&mut self, id: I, key: K, aabb: Aabb) {
        self.remove(id);

        let covered = self.cells_covering(aabb);
        for cell in &covered {
            self.cells
                .entry(*cell)
                .or_default()
                .entry(key)
                .or_default()
                .push(id);
        }
        self.occupancy.insert(id, covered);
    }

    /// Removes an item from every cell it occupies.
    ///
    /// Unknown items are a no-op.
    pub fn remove(&mut self, id: I) {
        let Some(cells) = self.occupancy.remove(&id) else {
            return;
        };
        for cell in cells {
            if let Some(buckets) = self.cells.get_mut(&cell) {
                for list in buckets.values_mut() {
                    list.retain(|other| *other != id);
                }
                buckets.retain(|_, list| !list.is_empty());
                if buckets.is_empty() {
                    self.cells.remove(&cell);
                }
            }
        }
    }

    /// Drops every item and cell, keeping the cell size.
    ///
    /// Intended for the rebuild-per-tick pattern.
    pub fn clear(&mut self) {
        trace!(items = self.occupancy.len(), "clearing cell grid");
        self.cells.clear();
        self.occupancy.clear();
    }

    /// Returns the cells currently covered by an item.
    ///
    /// Unregistered items yield an empty slice.
    #[must_use]
    pub fn cells_of(&self, id: I) -> &[IVec2] {
        self.occupancy.get(&id).map_or(&[], Vec::as_slice)
    }

    /// Returns the candidate list for `key` in `cell`, in insertion order.
    ///
    /// Cells or buckets that were never populated yield an empty slice.
    #[must_use]
    pub fn candidates(&self, cell: IVec2, key: K) -> &[I] {
        self.cells
            .get(&cell)
            .and_then(|buckets| buckets.get(&key))
            .map_or(&[], Vec::as_slice)
    }

    /// Returns the number of registered items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.occupancy.len()
    }

    /// Returns true if no items are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.occupancy.is_empty()
    }

    /// Returns the number of occupied cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Computes the cell coordinates covered by a box.
    fn cells_covering(&self, aabb: Aabb) -> Vec<IVec2> {
        let min = self.cell_at(aabb.min);
        let max = self.cell_at(aabb.max);

        let mut covered =
            Vec::with_capacity(((max.x - min.x + 1) * (max.y - min.y + 1)).max(0) as usize);
        for y in min.y..=max.y {
            for x in min.x..=max.x {
                covered.push(IVec2::new(x, y));
            }
        }
        covered
    }
}
