// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Transport and gate status widget.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};

use crate::sequencer::{GateLines, SequencerEngine};

/// Snapshot of the engine for the status panel
#[derive(Debug, Clone, PartialEq)]
pub struct PanelStatus {
    /// Tempo in BPM
    pub bpm: f64,
    /// Whether the clock is advancing
    pub running: bool,
    /// Playback column
    pub active_step: usize,
    /// Steps per track
    pub steps: usize,
    /// Cursor as (track, step)
    pub cursor: (usize, usize),
    /// Output line levels, track 0 first
    pub gates: Vec<bool>,
    /// Pulses emitted per track
    pub pulses: Vec<u64>,
}

impl Default for PanelStatus {
    fn default() -> Self {
        Self {
            bpm: 120.0,
            running: false,
            active_step: 0,
            steps: 0,
            cursor: (0, 0),
            gates: Vec::new(),
            pulses: Vec::new(),
        }
    }
}

impl PanelStatus {
    /// Capture the engine state and the current output lines
    pub fn capture(engine: &SequencerEngine, lines: &GateLines) -> Self {
        let tracks = engine.grid().shape().tracks;
        Self {
            bpm: engine.clock().bpm(),
            running: engine.clock().is_running(),
            active_step: engine.clock().active_step(),
            steps: engine.clock().steps(),
            cursor: engine.cursor_position(),
            gates: (0..tracks).map(|t| lines.level(t)).collect(),
            pulses: (0..tracks).map(|t| lines.pulses(t)).collect(),
        }
    }
}

/// Status widget for transport, position, cursor and gate LEDs
pub struct TransportWidget<'a> {
    status: &'a PanelStatus,
    block: Option<Block<'a>>,
}

impl<'a> TransportWidget<'a> {
    /// Create a new transport widget
    pub fn new(status: &'a PanelStatus) -> Self {
        Self {
            status,
            block: None,
        }
    }

    /// Set the block wrapper
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    fn transport_line(&self) -> Line<'static> {
        let status = self.status;
        let (indicator, style) = if status.running {
            ("▶ PLAY", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        } else {
            ("■ STOP", Style::default().fg(Color::Yellow))
        };

        Line::from(vec![
            Span::styled(format!("{:8}", indicator), style),
            Span::styled(
                format!("{:>6.1} BPM  ", status.bpm),
                Style::default().fg(Color::Magenta),
            ),
            Span::styled(
                format!("step {:>2}/{:<2}  ", status.active_step + 1, status.steps),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("cursor T{} S{}", status.cursor.0 + 1, status.cursor.1 + 1),
                Style::default().fg(Color::White),
            ),
        ])
    }

    fn gate_line(&self) -> Line<'static> {
        let mut spans = vec![Span::styled("gates ", Style::default().fg(Color::DarkGray))];
        for (track, high) in self.status.gates.iter().enumerate() {
            let (led, style) = if *high {
                ("●", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
            } else {
                ("○", Style::default().fg(Color::DarkGray))
            };
            let pulses = self.status.pulses.get(track).copied().unwrap_or(0);
            spans.push(Span::raw(format!("{}:", track + 1)));
            spans.push(Span::styled(led, style));
            spans.push(Span::styled(
                format!(" {:<5} ", pulses),
                Style::default().fg(Color::DarkGray),
            ));
        }
        Line::from(spans)
    }
}

impl Widget for TransportWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = vec![self.transport_line(), self.gate_line()];
        let area = if let Some(block) = self.block {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };

        Paragraph::new(lines).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered_text(widget: TransportWidget<'_>, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        buf.content.iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_transport_line() {
        let status = PanelStatus {
            bpm: 96.0,
            running: true,
            active_step: 2,
            steps: 8,
            cursor: (1, 1),
            gates: vec![false, true],
            pulses: vec![4, 7],
        };

        let text = rendered_text(TransportWidget::new(&status), 80, 2);
        assert!(text.contains("PLAY"));
        assert!(text.contains("96.0 BPM"));
        assert!(text.contains("step  3/8"));
        assert!(text.contains("cursor T2 S2"));
        assert!(text.contains("1:○"));
        assert!(text.contains("2:●"));
    }

    #[test]
    fn test_stopped_indicator() {
        let status = PanelStatus::default();
        let text = rendered_text(TransportWidget::new(&status), 60, 2);
        assert!(text.contains("STOP"));
    }
}
