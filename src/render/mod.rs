// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Drawing of the step grid onto a monochrome display.
//!
//! The engine only talks to the `Display` trait; the terminal front end and
//! the in-memory frame buffer are both implementations of it.

pub mod framebuffer;
pub mod grid;
pub mod projection;

pub use framebuffer::FrameBuffer;
pub use grid::{GridPainter, GridSnapshot};
pub use projection::{CellPosition, GridProjection, MAX_CELL_SIZE};

/// Pixel colour on a monochrome panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelColor {
    Off,
    On,
}

impl PixelColor {
    /// The opposite colour
    pub fn inverted(self) -> Self {
        match self {
            PixelColor::Off => PixelColor::On,
            PixelColor::On => PixelColor::Off,
        }
    }
}

/// Drawing target with rectangle and line primitives.
///
/// Coordinates are in pixels with the origin at the top-left corner.
/// Implementations clip anything that falls outside the surface.
pub trait Display {
    /// Surface size as `(width, height)`
    fn size(&self) -> (u32, u32);

    /// Set every pixel to `Off`
    fn clear(&mut self);

    /// Fill a rectangle
    fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: PixelColor);

    /// Draw a one-pixel rectangle outline
    fn draw_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: PixelColor);

    /// Draw a line between two points, both inclusive
    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: PixelColor);

    /// Push the drawn frame to the physical surface
    fn present(&mut self);
}
