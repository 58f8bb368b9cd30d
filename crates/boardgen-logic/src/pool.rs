//! Free cell pool: the spatial allocator behind every board segment.
//!
//! The pool starts as every cell of a `columns` × `rows` grid and only ever
//! shrinks as objects are placed. `sample_valid_anchor` picks a random
//! member that can host a footprint, consumes it, and carves an exclusion
//! neighborhood around it so later placements cannot touch it.

use std::collections::HashSet;

use rand::Rng;

use crate::error::PlacementError;
use crate::grid::{Coord, Footprint};

/// Unoccupied cells of one board segment.
///
/// `cells` keeps a stable enumeration order for index-based sampling;
/// `members` mirrors it for constant-time lookups.
#[derive(Debug, Clone)]
pub struct FreeCellPool {
    columns: i32,
    rows: i32,
    cells: Vec<Coord>,
    members: HashSet<Coord>,
}

impl FreeCellPool {
    /// A full pool: every cell of the grid, column-major.
    pub fn new(columns: i32, rows: i32) -> Self {
        let capacity = (columns.max(0) * rows.max(0)) as usize;
        let mut cells = Vec::with_capacity(capacity);
        for x in 0..columns {
            for y in 0..rows {
                cells.push(Coord::new(x, y));
            }
        }
        let members = cells.iter().copied().collect();
        Self {
            columns,
            rows,
            cells,
            members,
        }
    }

    pub fn columns(&self) -> i32 {
        self.columns
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.members.contains(&Coord::new(x, y))
    }

    /// Members in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells.iter().copied()
    }

    /// Member at `index` in enumeration order.
    pub fn get(&self, index: usize) -> Option<Coord> {
        self.cells.get(index).copied()
    }

    /// Uniformly random enumeration index, or `None` when empty.
    pub fn sample_index(&self, rng: &mut impl Rng) -> Option<usize> {
        if self.cells.is_empty() {
            None
        } else {
            Some(rng.gen_range(0..self.cells.len()))
        }
    }

    /// Remove `(x, y)` if present. Absent cells are ignored.
    pub fn remove(&mut self, x: i32, y: i32) {
        let c = Coord::new(x, y);
        if self.members.remove(&c) {
            if let Some(i) = self.cells.iter().position(|&m| m == c) {
                self.cells.remove(i);
            }
        }
    }

    /// Remove the member at `index`, returning it. Out of range is a no-op.
    ///
    /// Order-preserving, so indices obtained from `sample_index` stay valid
    /// until the next mutation.
    pub fn remove_at(&mut self, index: usize) -> Option<Coord> {
        if index >= self.cells.len() {
            return None;
        }
        let c = self.cells.remove(index);
        self.members.remove(&c);
        Some(c)
    }

    /// Put a cell back. Only for collaborators returning a cell they were
    /// handed out; cells outside the grid or already present are ignored.
    pub fn restore(&mut self, x: i32, y: i32) -> bool {
        let c = Coord::new(x, y);
        if x < 0 || y < 0 || x >= self.columns || y >= self.rows {
            return false;
        }
        if !self.members.insert(c) {
            return false;
        }
        self.cells.push(c);
        true
    }

    /// Carve the buffer around a freshly placed anchor.
    ///
    /// For every `1 <= dx < width` and `1 <= dy < height` the eight cells
    /// at `(±dx, 0)`, `(0, ±dy)` and `(±dx, ±dy)` are removed. The anchor
    /// itself is left alone and a footprint with width or height 1 removes
    /// nothing.
    pub fn exclude_footprint_neighborhood(&mut self, anchor: Coord, footprint: Footprint) {
        for dx in 1..footprint.width {
            for dy in 1..footprint.height {
                self.remove(anchor.x + dx, anchor.y);
                self.remove(anchor.x - dx, anchor.y);
                self.remove(anchor.x, anchor.y + dy);
                self.remove(anchor.x, anchor.y - dy);
                self.remove(anchor.x + dx, anchor.y + dy);
                self.remove(anchor.x + dx, anchor.y - dy);
                self.remove(anchor.x - dx, anchor.y + dy);
                self.remove(anchor.x - dx, anchor.y - dy);
            }
        }
    }

    /// Whether `anchor` could host `footprint` right now: grown footprint in
    /// bounds and all four extremal cells still free.
    pub fn accepts(&self, anchor: Coord, footprint: Footprint) -> bool {
        footprint.grows_in_bounds(anchor, self.columns, self.rows)
            && footprint
                .extremal_cells(anchor)
                .iter()
                .all(|c| self.members.contains(c))
    }

    /// Rejection-sample an anchor for `footprint`, then commit it.
    ///
    /// Draws at most `max_attempts` uniformly random members. On success the
    /// anchor is removed, its exclusion neighborhood carved, and the anchor
    /// returned.
    pub fn sample_valid_anchor(
        &mut self,
        footprint: Footprint,
        max_attempts: u32,
        rng: &mut impl Rng,
    ) -> Result<Coord, PlacementError> {
        footprint.check_against(self.columns, self.rows)?;
        if self.cells.is_empty() {
            return Err(PlacementError::EmptyPool);
        }

        for _ in 0..max_attempts {
            let candidate = self.cells[rng.gen_range(0..self.cells.len())];
            if self.accepts(candidate, footprint) {
                self.remove(candidate.x, candidate.y);
                self.exclude_footprint_neighborhood(candidate, footprint);
                return Ok(candidate);
            }
        }

        Err(PlacementError::NoValidPlacement {
            footprint,
            attempts: max_attempts,
        })
    }
}
