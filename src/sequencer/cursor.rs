// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Edit cursor over the flattened step space.

use super::grid::{GridShape, StepGrid};
use crate::error::SequencerResult;

/// Bounded position in `[0, len)`; saturates instead of wrapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    index: usize,
    len: usize,
}

impl Cursor {
    /// Create a cursor at index 0 for the given grid shape
    pub fn new(shape: GridShape) -> Self {
        Self {
            index: 0,
            len: shape.len(),
        }
    }

    /// Current flat index
    pub fn index(&self) -> usize {
        self.index
    }

    /// Move by `delta`, clamping to the first and last step
    pub fn move_by(&mut self, delta: isize) -> usize {
        let last = self.len.saturating_sub(1);
        self.index = if delta.is_negative() {
            self.index.saturating_sub(delta.unsigned_abs())
        } else {
            self.index.saturating_add(delta as usize).min(last)
        };
        self.index
    }

    /// Flip the step under the cursor, returning its new state
    pub fn toggle_at_cursor(&self, grid: &mut StepGrid) -> SequencerResult<bool> {
        grid.toggle(self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape() -> GridShape {
        GridShape::new(2, 8).unwrap()
    }

    #[test]
    fn test_starts_at_zero() {
        assert_eq!(Cursor::new(shape()).index(), 0);
    }

    #[test]
    fn test_saturates_at_start() {
        let mut cursor = Cursor::new(shape());
        assert_eq!(cursor.move_by(-1), 0);
        assert_eq!(cursor.move_by(-5), 0);
    }

    #[test]
    fn test_saturates_at_end() {
        let mut cursor = Cursor::new(shape());
        for _ in 0..40 {
            cursor.move_by(1);
        }
        assert_eq!(cursor.index(), 15);
        cursor.move_by(-1);
        assert_eq!(cursor.index(), 14);
    }

    #[test]
    fn test_mixed_walk_stays_in_bounds() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(42);
        let mut cursor = Cursor::new(shape());
        for _ in 0..10_000 {
            let delta = if rng.gen_bool(0.5) { 1 } else { -1 };
            let index = cursor.move_by(delta);
            assert!(index < 16);
        }
    }

    #[test]
    fn test_toggle_at_cursor() {
        let mut grid = StepGrid::empty(shape());
        let mut cursor = Cursor::new(shape());
        cursor.move_by(3);
        assert!(cursor.toggle_at_cursor(&mut grid).unwrap());
        assert!(grid.is_armed(0, 3).unwrap());
        assert!(!cursor.toggle_at_cursor(&mut grid).unwrap());
    }
}
