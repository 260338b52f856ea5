//! Spatial placement inside fixed-size item grids
//!
//! Items occupy axis-aligned rectangles of whole cells. The allocator finds
//! a free origin for a new footprint given the rectangles already present:
//! - `bitmap`: cell occupancy tracking (one bit per cell)
//! - `first_fit`: deterministic row-major first-fit search

pub mod bitmap;
pub mod first_fit;

use serde::{Deserialize, Serialize};

/// Grid size in cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDimensions {
    pub rows: u8,
    pub cols: u8,
}

impl GridDimensions {
    pub const fn new(rows: u8, cols: u8) -> Self {
        GridDimensions { rows, cols }
    }

    pub fn cells(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    /// Whether a footprint can fit at all on an empty grid of this size
    pub fn can_hold(&self, footprint: Footprint) -> bool {
        footprint.height <= self.rows && footprint.width <= self.cols
    }
}

/// Cell footprint of an item, from its base type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    pub width: u8,
    pub height: u8,
}

impl Footprint {
    pub const fn new(width: u8, height: u8) -> Self {
        Footprint { width, height }
    }
}

/// Grid origin of an item (top-left cell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: u8,
    pub column: u8,
}

impl Position {
    pub const fn new(row: u8, column: u8) -> Self {
        Position { row, column }
    }
}

/// Axis-aligned box `[row, row + height) x [column, column + width)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub row: u32,
    pub column: u32,
    pub height: u32,
    pub width: u32,
}

impl Rect {
    pub fn new(position: Position, footprint: Footprint) -> Self {
        Rect {
            row: position.row as u32,
            column: position.column as u32,
            height: footprint.height as u32,
            width: footprint.width as u32,
        }
    }

    /// Two boxes intersect iff both axis ranges overlap
    pub fn intersects(&self, other: &Rect) -> bool {
        self.row < other.row + other.height
            && other.row < self.row + self.height
            && self.column < other.column + other.width
            && other.column < self.column + self.width
    }

    /// Whether the box lies within `[0, rows) x [0, cols)`
    pub fn within(&self, dimensions: GridDimensions) -> bool {
        self.row + self.height <= dimensions.rows as u32
            && self.column + self.width <= dimensions.cols as u32
    }
}

/// Grid placement strategy
pub trait GridAllocator {
    /// Find an origin for `footprint` that stays in bounds and overlaps none of `occupied`
    ///
    /// Returns `None` when no legal placement exists.
    fn find_spot(&self, footprint: Footprint, occupied: &[Rect]) -> Option<Position>;

    /// Number of grid cells not covered by `occupied`
    fn free_cells(&self, occupied: &[Rect]) -> usize;

    /// Grid being allocated into
    fn dimensions(&self) -> GridDimensions;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(row: u32, column: u32, height: u32, width: u32) -> Rect {
        Rect {
            row,
            column,
            height,
            width,
        }
    }

    #[test]
    fn test_intersects() {
        let a = rect(0, 0, 2, 2);
        assert!(a.intersects(&rect(1, 1, 2, 2)));
        assert!(a.intersects(&rect(0, 0, 1, 1)));
        // Touching edges do not overlap
        assert!(!a.intersects(&rect(2, 0, 1, 1)));
        assert!(!a.intersects(&rect(0, 2, 1, 1)));
        // Overlap on one axis only
        assert!(!a.intersects(&rect(5, 0, 1, 2)));
    }

    #[test]
    fn test_within() {
        let dims = GridDimensions::new(4, 10);
        assert!(rect(2, 8, 2, 2).within(dims));
        assert!(!rect(3, 8, 2, 2).within(dims));
        assert!(!rect(0, 9, 1, 2).within(dims));
    }

    #[test]
    fn test_can_hold() {
        let cube = GridDimensions::new(4, 3);
        assert!(cube.can_hold(Footprint::new(2, 4)));
        assert!(!cube.can_hold(Footprint::new(4, 1)));
        assert_eq!(cube.cells(), 12);
    }
}
