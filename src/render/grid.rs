// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Cell glyphs for the step grid.
//!
//! Armed cells are filled with a diagonal cross, unarmed cells are an outline.
//! The playback column is drawn inverted, and the cursor is a small square in
//! the middle of its cell in the opposite colour to what is under it.

use super::{Display, GridProjection, PixelColor};
use crate::sequencer::StepGrid;

/// Side of the cursor marker in pixels
const CURSOR_SIZE: u32 = 4;

/// Everything needed to draw one frame
#[derive(Debug, Clone, Copy)]
pub struct GridSnapshot<'a> {
    pub grid: &'a StepGrid,
    pub cursor: usize,
    pub active_step: usize,
}

/// Draws grid snapshots through a `Display`
#[derive(Debug, Clone, Copy)]
pub struct GridPainter {
    projection: GridProjection,
}

impl GridPainter {
    pub fn new(projection: GridProjection) -> Self {
        Self { projection }
    }

    pub fn projection(&self) -> &GridProjection {
        &self.projection
    }

    /// Clear, draw every cell and present
    pub fn paint(&self, display: &mut impl Display, snapshot: GridSnapshot<'_>) {
        display.clear();

        let shape = snapshot.grid.shape();
        for flat_index in 0..shape.len() {
            let step = flat_index % shape.steps_per_track;
            let armed = snapshot.grid.is_armed_at(flat_index).unwrap_or(false);
            self.paint_cell(
                display,
                flat_index,
                armed,
                step == snapshot.active_step,
                flat_index == snapshot.cursor,
            );
        }

        display.present();
    }

    fn paint_cell(
        &self,
        display: &mut impl Display,
        flat_index: usize,
        armed: bool,
        in_playback_column: bool,
        has_cursor: bool,
    ) {
        let (x, y) = self.projection.cell_origin(flat_index);
        let size = self.projection.cell_size();

        let background = if in_playback_column {
            PixelColor::On
        } else {
            PixelColor::Off
        };
        let foreground = background.inverted();

        if in_playback_column {
            display.fill_rect(x, y, size, size, background);
        }

        if armed {
            display.fill_rect(x, y, size, size, foreground);
            display.draw_rect(x, y, size, size, foreground);
            let x_end = x.saturating_add(size as i32 - 1);
            let y_end = y.saturating_add(size as i32 - 1);
            display.draw_line(x, y, x_end, y_end, background);
            display.draw_line(x, y_end, x_end, y, background);
        } else {
            display.draw_rect(x, y, size, size, foreground);
        }

        if has_cursor {
            let interior = if armed { foreground } else { background };
            let marker = CURSOR_SIZE.min(size.saturating_sub(2));
            if marker > 0 {
                let inset = (size / 2 - marker / 2) as i32;
                display.fill_rect(
                    x.saturating_add(inset),
                    y.saturating_add(inset),
                    marker,
                    marker,
                    interior.inverted(),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::FrameBuffer;
    use crate::sequencer::GridShape;

    /// Records calls instead of drawing
    #[derive(Default)]
    struct CallLog {
        calls: Vec<String>,
    }

    impl Display for CallLog {
        fn size(&self) -> (u32, u32) {
            (128, 32)
        }
        fn clear(&mut self) {
            self.calls.push("clear".to_string());
        }
        fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: PixelColor) {
            self.calls.push(format!("fill {} {} {} {} {:?}", x, y, w, h, color));
        }
        fn draw_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: PixelColor) {
            self.calls.push(format!("rect {} {} {} {} {:?}", x, y, w, h, color));
        }
        fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: PixelColor) {
            self.calls.push(format!("line {} {} {} {} {:?}", x0, y0, x1, y1, color));
        }
        fn present(&mut self) {
            self.calls.push("present".to_string());
        }
    }

    fn painter() -> GridPainter {
        GridPainter::new(GridProjection::new(8, 10, (0, 0)).unwrap())
    }

    fn grid() -> StepGrid {
        StepGrid::from_words(GridShape::new(2, 8).unwrap(), &[0b0010_0101, 0b1000_1000]).unwrap()
    }

    #[test]
    fn test_call_sequence() {
        let grid = StepGrid::from_words(GridShape::new(1, 2).unwrap(), &[0b01]).unwrap();
        let painter = GridPainter::new(GridProjection::new(2, 10, (0, 0)).unwrap());
        let mut log = CallLog::default();
        painter.paint(
            &mut log,
            GridSnapshot {
                grid: &grid,
                cursor: 1,
                active_step: 1,
            },
        );

        assert_eq!(
            log.calls,
            vec![
                "clear",
                // Armed, outside the playback column
                "fill 0 0 10 10 On",
                "rect 0 0 10 10 On",
                "line 0 0 9 9 Off",
                "line 0 9 9 0 Off",
                // Unarmed, in the playback column, with cursor
                "fill 10 0 10 10 On",
                "rect 10 0 10 10 Off",
                "fill 13 3 4 4 Off",
                "present",
            ]
        );
    }

    #[test]
    fn test_armed_and_unarmed_pixels() {
        let grid = grid();
        let mut fb = FrameBuffer::new(128, 32);
        painter().paint(
            &mut fb,
            GridSnapshot {
                grid: &grid,
                cursor: 15,
                active_step: 7,
            },
        );

        // Step 0 of track 0 is armed: lit interior, dark cross
        assert!(fb.pixel(2, 1));
        assert!(!fb.pixel(0, 0));
        assert!(!fb.pixel(5, 5));
        // Step 1 of track 0 is unarmed: border only
        assert!(fb.pixel(10, 5));
        assert!(!fb.pixel(15, 5));
        assert_eq!(fb.present_count(), 1);
    }

    #[test]
    fn test_playback_column_is_inverted() {
        let grid = grid();
        let mut fb = FrameBuffer::new(128, 32);
        painter().paint(
            &mut fb,
            GridSnapshot {
                grid: &grid,
                cursor: 15,
                active_step: 1,
            },
        );

        // Track 0 step 1 is unarmed but in the playback column: lit interior
        assert!(fb.pixel(15, 5));
        assert!(!fb.pixel(10, 5));
        // Track 1 step 1 likewise
        assert!(fb.pixel(15, 15));
    }

    #[test]
    fn test_cursor_marker() {
        let grid = grid();
        let mut fb = FrameBuffer::new(128, 32);
        painter().paint(
            &mut fb,
            GridSnapshot {
                grid: &grid,
                cursor: 9,
                active_step: 0,
            },
        );

        // Cell 9 is track 1 step 1 at (10, 10): unarmed, so the marker is lit
        assert!(fb.pixel(14, 14));
        assert!(!fb.pixel(12, 12));
    }
}
