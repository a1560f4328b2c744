// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Mapping between flat step indices and display cells.
//!
//! Visual rows are a fixed number of steps wide, independent of how tracks are
//! packed into bitmap words. A visual row only lines up with a musical track
//! when `steps_per_display_row` equals the track length; the engine refuses
//! to start otherwise.

use crate::error::{SequencerError, SequencerResult};

/// Largest cell edge in pixels
pub const MAX_CELL_SIZE: u32 = 1024;

/// Row and column of a cell on the display grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPosition {
    pub row: usize,
    pub col: usize,
}

/// Pure flat-index to cell mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridProjection {
    steps_per_display_row: usize,
    cell_size: u32,
    origin: (i32, i32),
}

impl GridProjection {
    pub fn new(
        steps_per_display_row: usize,
        cell_size: u32,
        origin: (i32, i32),
    ) -> SequencerResult<Self> {
        if steps_per_display_row == 0 {
            return Err(SequencerError::inconsistent("display rows need at least one step"));
        }
        if cell_size == 0 || cell_size > MAX_CELL_SIZE {
            return Err(SequencerError::inconsistent(format!(
                "cell size must be between 1 and {} pixels, got {}",
                MAX_CELL_SIZE, cell_size
            )));
        }
        Ok(Self {
            steps_per_display_row,
            cell_size,
            origin,
        })
    }

    pub fn steps_per_display_row(&self) -> usize {
        self.steps_per_display_row
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    pub fn origin(&self) -> (i32, i32) {
        self.origin
    }

    /// Cell holding a flat index
    pub fn project(&self, flat_index: usize) -> CellPosition {
        CellPosition {
            row: flat_index / self.steps_per_display_row,
            col: flat_index % self.steps_per_display_row,
        }
    }

    /// Flat index of a cell
    pub fn flat_index(&self, position: CellPosition) -> usize {
        position.row * self.steps_per_display_row + position.col
    }

    /// Track a cell is drawn in
    pub fn track_for_rendering(&self, flat_index: usize) -> usize {
        self.project(flat_index).row
    }

    /// Top-left pixel of a cell, saturating at the edges of the `i32` plane
    pub fn cell_origin(&self, flat_index: usize) -> (i32, i32) {
        let CellPosition { row, col } = self.project(flat_index);
        let offset = |origin: i32, cells: usize| {
            let pixels = i64::try_from(cells)
                .unwrap_or(i64::MAX)
                .saturating_mul(self.cell_size as i64);
            let position = (origin as i64).saturating_add(pixels);
            position.clamp(i32::MIN as i64, i32::MAX as i64) as i32
        };
        (offset(self.origin.0, col), offset(self.origin.1, row))
    }

    /// Pixel extent `(width, height)` of a grid holding `cell_count` cells,
    /// or `None` if it does not fit in `u32`
    pub fn extent(&self, cell_count: usize) -> Option<(u32, u32)> {
        let rows = cell_count.div_ceil(self.steps_per_display_row);
        let cols = cell_count.min(self.steps_per_display_row);
        let pixels = |cells: usize| u32::try_from(cells).ok()?.checked_mul(self.cell_size);
        Some((pixels(cols)?, pixels(rows)?))
    }

    /// Flat index under a pixel, if it lies on one of `cell_count` cells
    pub fn locate(&self, x: i32, y: i32, cell_count: usize) -> Option<usize> {
        let dx = x - self.origin.0;
        let dy = y - self.origin.1;
        if dx < 0 || dy < 0 {
            return None;
        }
        let col = (dx as u32 / self.cell_size) as usize;
        let row = (dy as u32 / self.cell_size) as usize;
        if col >= self.steps_per_display_row {
            return None;
        }
        let index = self.flat_index(CellPosition { row, col });
        (index < cell_count).then_some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project() {
        let projection = GridProjection::new(8, 10, (0, 0)).unwrap();
        assert_eq!(projection.project(0), CellPosition { row: 0, col: 0 });
        assert_eq!(projection.project(9), CellPosition { row: 1, col: 1 });
        assert_eq!(projection.track_for_rendering(15), 1);
    }

    #[test]
    fn test_round_trip_every_index() {
        for width in [4, 8, 16] {
            let projection = GridProjection::new(width, 8, (0, 0)).unwrap();
            for index in 0..64 {
                let position = projection.project(index);
                assert!(position.col < width);
                assert_eq!(projection.flat_index(position), index);
            }
        }
    }

    #[test]
    fn test_cell_origin_with_offset() {
        let projection = GridProjection::new(8, 10, (2, 3)).unwrap();
        assert_eq!(projection.cell_origin(0), (2, 3));
        assert_eq!(projection.cell_origin(9), (12, 13));
    }

    #[test]
    fn test_locate_inverts_cell_origin() {
        let projection = GridProjection::new(8, 10, (2, 3)).unwrap();
        for index in 0..16 {
            let (x, y) = projection.cell_origin(index);
            assert_eq!(projection.locate(x, y, 16), Some(index));
            assert_eq!(projection.locate(x + 9, y + 9, 16), Some(index));
        }
        assert_eq!(projection.locate(0, 0, 16), None);
        assert_eq!(projection.locate(82, 3, 16), None);
        assert_eq!(projection.locate(2, 23, 16), None);
    }

    #[test]
    fn test_extent() {
        let projection = GridProjection::new(8, 10, (0, 0)).unwrap();
        assert_eq!(projection.extent(16), Some((80, 20)));
        assert_eq!(projection.extent(4), Some((40, 10)));
        assert_eq!(projection.extent(usize::MAX), None);
    }

    #[test]
    fn test_cell_origin_saturates() {
        let projection = GridProjection::new(1, MAX_CELL_SIZE, (i32::MAX - 10, 0)).unwrap();
        assert_eq!(projection.cell_origin(0), (i32::MAX - 10, 0));
        assert_eq!(projection.cell_origin(1), (i32::MAX - 10, MAX_CELL_SIZE as i32));
        assert_eq!(projection.cell_origin(usize::MAX).1, i32::MAX);
    }

    #[test]
    fn test_rejects_zero_sizes() {
        assert!(GridProjection::new(0, 10, (0, 0)).is_err());
        assert!(GridProjection::new(8, 0, (0, 0)).is_err());
        assert!(GridProjection::new(8, MAX_CELL_SIZE + 1, (0, 0)).is_err());
        assert!(GridProjection::new(8, MAX_CELL_SIZE, (0, 0)).is_ok());
    }
}
