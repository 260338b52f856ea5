//! Row-major first-fit placement
//!
//! Scans candidate origins row by row, column by column, and returns the first
//! one whose box stays inside the grid and overlaps no occupied cell. Results
//! are deterministic: lowest row wins, then lowest column. This is not a
//! bin-packer; users rely on predictable placement more than on density.

use super::bitmap::OccupancyBitmap;
use super::{Footprint, GridAllocator, GridDimensions, Position, Rect};

/// First-fit allocator for one grid size
#[derive(Debug, Clone, Copy)]
pub struct FirstFitAllocator {
    dimensions: GridDimensions,
}

impl FirstFitAllocator {
    pub fn new(dimensions: GridDimensions) -> Self {
        FirstFitAllocator { dimensions }
    }
}

impl GridAllocator for FirstFitAllocator {
    fn find_spot(&self, footprint: Footprint, occupied: &[Rect]) -> Option<Position> {
        if footprint.width == 0 || footprint.height == 0 || !self.dimensions.can_hold(footprint) {
            return None;
        }

        let bitmap = OccupancyBitmap::from_rects(self.dimensions, occupied);

        for row in 0..self.dimensions.rows {
            for column in 0..self.dimensions.cols {
                let position = Position::new(row, column);
                let candidate = Rect::new(position, footprint);
                if bitmap.is_free(&candidate) {
                    return Some(position);
                }
            }
        }

        None
    }

    fn free_cells(&self, occupied: &[Rect]) -> usize {
        OccupancyBitmap::from_rects(self.dimensions, occupied).free_cells()
    }

    fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }
}
