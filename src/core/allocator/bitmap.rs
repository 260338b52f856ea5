//! Cell occupancy bitmap
//!
//! Each bit represents one grid cell, row-major:
//! - 0 = free cell
//! - 1 = occupied cell

use super::{GridDimensions, Rect};
use serde::{Deserialize, Serialize};

/// Occupancy bitmap for one grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OccupancyBitmap {
    /// Bitmap words (each word = 64 cells)
    bitmap: Vec<u64>,

    dimensions: GridDimensions,

    /// Number of occupied cells
    occupied_cells: usize,
}

impl OccupancyBitmap {
    /// Create an empty bitmap covering `dimensions`
    pub fn new(dimensions: GridDimensions) -> Self {
        let num_words = dimensions.cells().div_ceil(64);
        OccupancyBitmap {
            bitmap: vec![0u64; num_words],
            dimensions,
            occupied_cells: 0,
        }
    }

    /// Build a bitmap with every rectangle in `occupied` marked
    pub fn from_rects(dimensions: GridDimensions, occupied: &[Rect]) -> Self {
        let mut bitmap = Self::new(dimensions);
        for rect in occupied {
            bitmap.mark(rect);
        }
        bitmap
    }

    /// Mark the cells of `rect` as occupied
    ///
    /// Cells outside the grid are ignored; overlapping marks are counted once.
    pub fn mark(&mut self, rect: &Rect) {
        let rows = self.dimensions.rows as u32;
        let cols = self.dimensions.cols as u32;
        for row in rect.row..(rect.row + rect.height).min(rows) {
            for column in rect.column..(rect.column + rect.width).min(cols) {
                let (word_idx, bit_idx) = self.locate(row, column);
                if self.bitmap[word_idx] & (1u64 << bit_idx) == 0 {
                    self.bitmap[word_idx] |= 1u64 << bit_idx;
                    self.occupied_cells += 1;
                }
            }
        }
    }

    /// Check if a specific cell is occupied
    pub fn is_occupied(&self, row: u32, column: u32) -> bool {
        if row >= self.dimensions.rows as u32 || column >= self.dimensions.cols as u32 {
            return false;
        }
        let (word_idx, bit_idx) = self.locate(row, column);
        (self.bitmap[word_idx] & (1u64 << bit_idx)) != 0
    }

    /// Check that `rect` is in bounds and every cell it covers is free
    pub fn is_free(&self, rect: &Rect) -> bool {
        if !rect.within(self.dimensions) {
            return false;
        }
        for row in rect.row..rect.row + rect.height {
            for column in rect.column..rect.column + rect.width {
                if self.is_occupied(row, column) {
                    return false;
                }
            }
        }
        true
    }

    pub fn occupied_cells(&self) -> usize {
        self.occupied_cells
    }

    pub fn free_cells(&self) -> usize {
        self.dimensions.cells() - self.occupied_cells
    }

    fn locate(&self, row: u32, column: u32) -> (usize, u32) {
        let cell = row as usize * self.dimensions.cols as usize + column as usize;
        (cell / 64, (cell % 64) as u32)
    }
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
    fn test_bitmap_creation() {
        let bitmap = OccupancyBitmap::new(GridDimensions::new(10, 10));
        assert_eq!(bitmap.free_cells(), 100);
        assert_eq!(bitmap.occupied_cells(), 0);
    }

    #[test]
    fn test_bitmap_mark() {
        let mut bitmap = OccupancyBitmap::new(GridDimensions::new(4, 10));
        bitmap.mark(&rect(1, 2, 2, 3));

        assert_eq!(bitmap.occupied_cells(), 6);
        assert!(bitmap.is_occupied(1, 2));
        assert!(bitmap.is_occupied(2, 4));
        assert!(!bitmap.is_occupied(0, 2));
        assert!(!bitmap.is_occupied(1, 5));
    }

    #[test]
    fn test_overlapping_marks_counted_once() {
        let mut bitmap = OccupancyBitmap::new(GridDimensions::new(4, 4));
        bitmap.mark(&rect(0, 0, 2, 2));
        bitmap.mark(&rect(1, 1, 2, 2));
        assert_eq!(bitmap.occupied_cells(), 7);
    }

    #[test]
    fn test_out_of_grid_cells_ignored() {
        let mut bitmap = OccupancyBitmap::new(GridDimensions::new(4, 3));
        bitmap.mark(&rect(3, 2, 4, 4));
        assert_eq!(bitmap.occupied_cells(), 1);
        assert!(!bitmap.is_occupied(9, 9));
    }

    #[test]
    fn test_is_free() {
        let bitmap = OccupancyBitmap::from_rects(GridDimensions::new(10, 10), &[rect(0, 0, 3, 2)]);
        assert!(!bitmap.is_free(&rect(2, 1, 1, 1)));
        assert!(bitmap.is_free(&rect(0, 2, 4, 2)));
        assert!(!bitmap.is_free(&rect(8, 8, 3, 1)));
    }

    #[test]
    fn test_word_boundary() {
        // 10x10 grid spans two words; cell 64 is row 6, column 4
        let mut bitmap = OccupancyBitmap::new(GridDimensions::new(10, 10));
        bitmap.mark(&rect(6, 3, 1, 2));
        assert!(bitmap.is_occupied(6, 3));
        assert!(bitmap.is_occupied(6, 4));
        assert_eq!(bitmap.free_cells(), 98);
    }
}
