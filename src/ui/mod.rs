// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Terminal front end for pewbox.
//!
//! Provides a ratatui-based `Display` that shows the panel's pixels with
//! half-block characters, together with a transport/gate status panel and the
//! key help line.

mod screen;
mod transport;

pub use screen::{half_block_lines, ScreenWidget};
pub use transport::{PanelStatus, TransportWidget};

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use tracing::warn;

use crate::input::BINDINGS;
use crate::render::{Display, FrameBuffer, PixelColor};

/// How long a status message stays visible
const MESSAGE_TIMEOUT: Duration = Duration::from_secs(3);

/// Terminal-backed monochrome display
pub struct TerminalDisplay {
    /// Pixels drawn since the last clear
    frame: FrameBuffer,
    /// Status shown under the panel
    status: PanelStatus,
    /// Transient message and when it was set
    message: Option<(String, Instant)>,
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalDisplay {
    /// Take over the terminal and present a `width` x `height` pixel panel
    pub fn new(width: u32, height: u32) -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;

        Ok(Self {
            frame: FrameBuffer::new(width, height),
            status: PanelStatus::default(),
            message: None,
            terminal,
        })
    }

    /// Update the status panel; shown on the next `present`
    pub fn set_status(&mut self, status: PanelStatus) {
        self.status = status;
    }

    /// Show a message for a few seconds
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some((message.into(), Instant::now()));
    }

    /// The pixels of the last drawn frame
    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    /// Wait up to `timeout` for a key press
    pub fn poll_key(&self, timeout: Duration) -> io::Result<Option<(KeyCode, KeyModifiers)>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                Ok(Some((key.code, key.modifiers)))
            }
            _ => Ok(None),
        }
    }

    fn draw(&mut self) -> io::Result<()> {
        if self
            .message
            .as_ref()
            .is_some_and(|(_, at)| at.elapsed() > MESSAGE_TIMEOUT)
        {
            self.message = None;
        }

        let frame_buffer = &self.frame;
        let status = &self.status;
        let message = self.message.as_ref().map(|(text, _)| text.as_str());
        let (_, pixel_rows) = frame_buffer.size();

        self.terminal.draw(|frame| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(pixel_rows.div_ceil(2) as u16 + 2), // Panel
                    Constraint::Length(4),                                 // Status
                    Constraint::Length(1),                                 // Message
                    Constraint::Length(1),                                 // Help
                    Constraint::Min(0),
                ])
                .split(frame.area());

            frame.render_widget(
                ScreenWidget::new(frame_buffer)
                    .block(Block::default().borders(Borders::ALL).title(" pewbox ")),
                chunks[0],
            );
            frame.render_widget(
                TransportWidget::new(status)
                    .block(Block::default().borders(Borders::ALL).title(" Transport ")),
                chunks[1],
            );
            if let Some(text) = message {
                frame.render_widget(
                    Paragraph::new(text).style(Style::default().fg(Color::Yellow)),
                    chunks[2],
                );
            }
            render_help(frame, chunks[3]);
        })?;

        Ok(())
    }

    fn cleanup(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Display for TerminalDisplay {
    fn size(&self) -> (u32, u32) {
        self.frame.size()
    }

    fn clear(&mut self) {
        self.frame.clear();
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: PixelColor) {
        self.frame.fill_rect(x, y, w, h, color);
    }

    fn draw_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: PixelColor) {
        self.frame.draw_rect(x, y, w, h, color);
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: PixelColor) {
        self.frame.draw_line(x0, y0, x1, y1, color);
    }

    fn present(&mut self) {
        self.frame.present();
        if let Err(e) = self.draw() {
            warn!(error = %e, "terminal draw failed");
        }
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Render the key help line
fn render_help(frame: &mut Frame, area: Rect) {
    let mut spans = Vec::new();
    for binding in BINDINGS {
        spans.push(Span::styled(
            format!(" {} ", binding.keys),
            Style::default().fg(Color::Black).bg(Color::Gray),
        ));
        spans.push(Span::styled(
            format!(" {}  ", binding.description),
            Style::default().fg(Color::DarkGray),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
