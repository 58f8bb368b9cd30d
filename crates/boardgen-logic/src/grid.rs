//! Grid primitives shared by the pool, the populator and validation.

use serde::{Deserialize, Serialize};

use crate::error::PlacementError;

/// A cell on a board segment. `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Rectangular area an object occupies, measured from its anchor cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    pub width: i32,
    pub height: i32,
}

impl Footprint {
    /// Single-cell objects (obstacles, actors).
    pub const UNIT: Self = Self {
        width: 1,
        height: 1,
    };

    pub fn new(width: i32, height: i32) -> Result<Self, PlacementError> {
        let fp = Self { width, height };
        if width <= 0 || height <= 0 {
            return Err(PlacementError::InvalidFootprint {
                width,
                height,
                columns: None,
                rows: None,
            });
        }
        Ok(fp)
    }

    /// Reject non-positive sizes and footprints whose arms cannot fit on a
    /// `columns` × `rows` grid from any anchor.
    pub fn check_against(&self, columns: i32, rows: i32) -> Result<(), PlacementError> {
        let fp = Self::new(self.width, self.height)?;
        let (span_x, span_y) = fp.span();
        if span_x > columns || span_y > rows {
            return Err(PlacementError::InvalidFootprint {
                width: fp.width,
                height: fp.height,
                columns: Some(columns),
                rows: Some(rows),
            });
        }
        Ok(())
    }

    /// Cells covered end to end by the horizontal and vertical arms.
    pub fn span(&self) -> (i32, i32) {
        (2 * self.width - 1, 2 * self.height - 1)
    }

    /// The four cells at the ends of the footprint's arms:
    /// left, right, up, down of `anchor`.
    pub fn extremal_cells(&self, anchor: Coord) -> [Coord; 4] {
        [
            anchor.offset(-(self.width - 1), 0),
            anchor.offset(self.width - 1, 0),
            anchor.offset(0, self.height - 1),
            anchor.offset(0, -(self.height - 1)),
        ]
    }

    /// Whether `anchor` grown by this footprint stays inside a
    /// `columns` × `rows` grid.
    pub fn grows_in_bounds(&self, anchor: Coord, columns: i32, rows: i32) -> bool {
        anchor.x - self.width + 1 >= 0
            && anchor.x + self.width - 1 <= columns - 1
            && anchor.y - self.height + 1 >= 0
            && anchor.y + self.height - 1 <= rows - 1
    }
}

impl Default for Footprint {
    fn default() -> Self {
        Self::UNIT
    }
}

/// Geometry of one board segment: its size, the road band crossing it, and
/// the rejection-sampling ceiling used for every placement on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentLayout {
    pub columns: i32,
    pub rows: i32,
    /// Columns fully reserved for the north-south road.
    pub road_columns: Vec<i32>,
    /// Rows fully reserved for the east-west road.
    pub road_rows: Vec<i32>,
    /// Candidates drawn before a placement gives up.
    pub max_attempts: u32,
}

impl SegmentLayout {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 512;

    /// A `columns` × `rows` segment with a two-wide road through the middle.
    pub fn new(columns: i32, rows: i32) -> Self {
        Self {
            columns,
            rows,
            road_columns: centered_pair(columns),
            road_rows: centered_pair(rows),
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Same size, no road band.
    pub fn without_roads(mut self) -> Self {
        self.road_columns.clear();
        self.road_rows.clear();
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn cell_count(&self) -> usize {
        (self.columns.max(0) * self.rows.max(0)) as usize
    }

    pub fn in_bounds(&self, c: Coord) -> bool {
        c.x >= 0 && c.y >= 0 && c.x < self.columns && c.y < self.rows
    }

    pub fn is_road(&self, c: Coord) -> bool {
        self.road_columns.contains(&c.x) || self.road_rows.contains(&c.y)
    }
}

impl Default for SegmentLayout {
    fn default() -> Self {
        Self::new(10, 10)
    }
}

fn centered_pair(n: i32) -> Vec<i32> {
    if n < 2 {
        return Vec::new();
    }
    vec![n / 2 - 1, n / 2]
}

/// Row/column of a segment within the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentId {
    pub row: i32,
    pub col: i32,
}

/// Where a segment sits in the overall map. Only segment edges that are
/// also map edges get outer walls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentPosition {
    pub row: i32,
    pub col: i32,
    pub map_rows: i32,
    pub map_columns: i32,
}

impl SegmentPosition {
    pub fn new(row: i32, col: i32, map_rows: i32, map_columns: i32) -> Self {
        Self {
            row,
            col,
            map_rows,
            map_columns,
        }
    }

    pub fn id(&self) -> SegmentId {
        SegmentId {
            row: self.row,
            col: self.col,
        }
    }

    /// A lone segment: every edge is a world edge.
    pub fn standalone() -> Self {
        Self::new(0, 0, 1, 1)
    }

    /// Whether `c` lies on a segment edge that is also a world edge.
    pub fn is_world_edge(&self, c: Coord, layout: &SegmentLayout) -> bool {
        (c.x == 0 && self.col == 0)
            || (c.x == layout.columns - 1 && self.col == self.map_columns - 1)
            || (c.y == 0 && self.row == 0)
            || (c.y == layout.rows - 1 && self.row == self.map_rows - 1)
    }
}
