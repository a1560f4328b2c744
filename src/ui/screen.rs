// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Frame buffer widget.
//!
//! Two pixel rows share one terminal row through half-block characters.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Paragraph, Widget},
};

use crate::render::{Display, FrameBuffer};

/// Text rows for a frame buffer, one per pair of pixel rows
pub fn half_block_lines(frame: &FrameBuffer) -> Vec<String> {
    let (width, height) = frame.size();
    (0..height.div_ceil(2))
        .map(|row| {
            let top = (row * 2) as i32;
            (0..width as i32)
                .map(|x| match (frame.pixel(x, top), frame.pixel(x, top + 1)) {
                    (true, true) => '█',
                    (true, false) => '▀',
                    (false, true) => '▄',
                    (false, false) => ' ',
                })
                .collect()
        })
        .collect()
}

/// Renders a `FrameBuffer` as a monochrome panel
pub struct ScreenWidget<'a> {
    frame: &'a FrameBuffer,
    block: Option<Block<'a>>,
}

impl<'a> ScreenWidget<'a> {
    pub fn new(frame: &'a FrameBuffer) -> Self {
        Self { frame, block: None }
    }

    /// Set the block wrapper
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl Widget for ScreenWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = if let Some(block) = self.block {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };

        let lines: Vec<Line> = half_block_lines(self.frame)
            .into_iter()
            .map(Line::from)
            .collect();
        Paragraph::new(lines)
            .style(Style::default().fg(Color::LightCyan).bg(Color::Black))
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::PixelColor;

    #[test]
    fn test_half_blocks() {
        let mut frame = FrameBuffer::new(4, 3);
        frame.fill_rect(0, 0, 1, 2, PixelColor::On);
        frame.fill_rect(1, 0, 1, 1, PixelColor::On);
        frame.fill_rect(2, 1, 1, 1, PixelColor::On);
        frame.fill_rect(3, 2, 1, 1, PixelColor::On);

        let lines = half_block_lines(&frame);
        assert_eq!(lines, vec!["█▀▄ ".to_string(), "   ▀".to_string()]);
    }

    #[test]
    fn test_widget_renders_rows() {
        let mut frame = FrameBuffer::new(2, 2);
        frame.fill_rect(0, 0, 2, 2, PixelColor::On);

        let area = Rect::new(0, 0, 2, 1);
        let mut buf = Buffer::empty(area);
        ScreenWidget::new(&frame).render(area, &mut buf);
        let text: String = buf.content.iter().map(|cell| cell.symbol()).collect();
        assert_eq!(text, "██");
    }
}
