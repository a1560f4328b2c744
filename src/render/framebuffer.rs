// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! In-memory monochrome frame buffer.

use super::{Display, PixelColor};

/// A `Display` that draws into a plain pixel array
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<bool>,
    presented: u64,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![false; width as usize * height as usize],
            presented: 0,
        }
    }

    /// Whether a pixel is lit; pixels off the surface read as unlit
    pub fn pixel(&self, x: i32, y: i32) -> bool {
        self.offset(x, y).is_some_and(|i| self.pixels[i])
    }

    /// Number of lit pixels
    pub fn lit_count(&self) -> usize {
        self.pixels.iter().filter(|p| **p).count()
    }

    /// Number of completed `present` calls
    pub fn present_count(&self) -> u64 {
        self.presented
    }

    /// Rows of pixels, top first
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.pixels.chunks(self.width.max(1) as usize)
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    fn set(&mut self, x: i32, y: i32, color: PixelColor) {
        if let Some(i) = self.offset(x, y) {
            self.pixels[i] = color == PixelColor::On;
        }
    }
}

impl Display for FrameBuffer {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.pixels.fill(false);
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: PixelColor) {
        for py in y..y.saturating_add(h as i32) {
            for px in x..x.saturating_add(w as i32) {
                self.set(px, py, color);
            }
        }
    }

    fn draw_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: PixelColor) {
        if w == 0 || h == 0 {
            return;
        }
        let right = x.saturating_add(w as i32 - 1);
        let bottom = y.saturating_add(h as i32 - 1);
        self.draw_line(x, y, right, y, color);
        self.draw_line(x, bottom, right, bottom, color);
        self.draw_line(x, y, x, bottom, color);
        self.draw_line(right, y, right, bottom, color);
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: PixelColor) {
        // Bresenham, all octants
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);

        loop {
            self.set(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn present(&mut self) {
        self.presented += 1;
    }
}
