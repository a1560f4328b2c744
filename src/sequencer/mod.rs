// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Sequencer core.
//!
//! This module provides the step-sequencing state and the engine that owns it:
//! - Bitmap step grid with a fixed shape
//! - Bounded edit cursor
//! - Per-track trigger gates
//! - `SequencerEngine`, the single owner driven once per poll

pub mod cursor;
pub mod gate;
pub mod grid;

pub use cursor::Cursor;
pub use gate::{check_gate_length, GateLines, GateOutput, GateState, TriggerGateController};
pub use grid::{GridShape, StepGrid, MAX_STEPS_PER_TRACK, MAX_TRACKS};

use std::time::Duration;

use tracing::{debug, error, info, trace, warn};

use crate::config::EngineConfig;
use crate::error::SequencerResult;
use crate::input::{InputEvent, InputEvents, LineLevels, RotaryDecoder};
use crate::midi::TransportEvent;
use crate::render::{Display, GridPainter, GridSnapshot};
use crate::timing::{
    check_tempo, tick_period, ClockPoll, PlaybackClock, TransportState, MAX_BPM, MIN_BPM,
};

/// What happened during one engine poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollReport {
    /// Decoded panel input, already applied
    pub input: InputEvents,
    /// Clock outcome
    pub clock: ClockPoll,
}

/// Owns the grid, cursor, clock, gates and input decoder.
///
/// All mutation goes through its methods; the poll loop is the only caller.
#[derive(Debug, Clone)]
pub struct SequencerEngine {
    grid: StepGrid,
    cursor: Cursor,
    clock: PlaybackClock,
    gates: TriggerGateController,
    decoder: RotaryDecoder,
    painter: GridPainter,
}

impl SequencerEngine {
    /// Build an engine from a configuration, refusing inconsistent settings.
    ///
    /// `initial` seeds the decoder's previous line levels; `now` anchors the
    /// first clock period.
    pub fn new(config: &EngineConfig, initial: LineLevels, now: Duration) -> SequencerResult<Self> {
        config.validate()?;

        let shape = config.shape()?;
        let grid = StepGrid::from_words(shape, &config.pattern_words()?)?;
        let mut clock = PlaybackClock::new(config.timing.tempo_bpm, shape.steps_per_track, now)?;
        if !config.timing.autostart {
            clock.pause();
        }

        info!(
            tracks = shape.tracks,
            steps = shape.steps_per_track,
            bpm = config.timing.tempo_bpm,
            gate_ms = config.timing.gate_length_ms,
            armed = grid.armed_count(),
            "sequencer engine ready"
        );

        Ok(Self {
            cursor: Cursor::new(shape),
            gates: TriggerGateController::new(shape.tracks, config.gate_length()),
            decoder: RotaryDecoder::new(initial, config.input.switch_active_low),
            painter: GridPainter::new(config.projection()?),
            grid,
            clock,
        })
    }

    /// Run one poll cycle: input, edits, clock, then gates
    pub fn poll(
        &mut self,
        levels: LineLevels,
        now: Duration,
        output: &mut impl GateOutput,
    ) -> PollReport {
        let input = self.decoder.poll(levels);
        for event in input.iter() {
            self.apply_input(event);
        }

        let clock = self.clock.poll(now);
        self.gates.poll(&self.grid, clock, now, output);

        PollReport { input, clock }
    }

    /// Apply one decoded input event to the cursor or grid
    pub fn apply_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::RotatePositive => {
                let index = self.cursor.move_by(1);
                debug!(cursor = index, "cursor moved");
            }
            InputEvent::RotateNegative => {
                let index = self.cursor.move_by(-1);
                debug!(cursor = index, "cursor moved");
            }
            InputEvent::SwitchPressed => match self.cursor.toggle_at_cursor(&mut self.grid) {
                Ok(armed) => debug!(cursor = self.cursor.index(), armed, "step toggled"),
                Err(e) => error!(error = %e, "cursor toggle failed"),
            },
            InputEvent::SwitchReleased => {}
        }
    }

    /// React to an external transport event
    pub fn handle_transport(
        &mut self,
        event: TransportEvent,
        now: Duration,
        output: &mut impl GateOutput,
    ) {
        match event {
            TransportEvent::Start | TransportEvent::Continue => {
                if !self.clock.is_running() {
                    info!(?event, step = self.clock.active_step(), "transport running");
                }
                self.clock.resume(now);
            }
            TransportEvent::Stop => {
                if self.clock.is_running() {
                    info!(step = self.clock.active_step(), "transport stopped");
                }
                self.clock.pause();
                self.gates.close_all(output);
            }
            TransportEvent::Clock => trace!("external clock pulse ignored"),
        }
    }

    /// Flip between running and paused
    pub fn toggle_transport(&mut self, now: Duration, output: &mut impl GateOutput) {
        let event = match self.clock.state() {
            TransportState::Running => TransportEvent::Stop,
            TransportState::Paused => TransportEvent::Continue,
        };
        self.handle_transport(event, now, output);
    }

    /// Change tempo, keeping the gate shorter than the new period
    pub fn set_tempo(&mut self, bpm: f64) -> SequencerResult<()> {
        check_tempo(bpm)?;
        check_gate_length(self.gates.gate_length(), tick_period(bpm))?;
        self.clock.set_tempo(bpm)
    }

    /// Shift tempo by `delta` BPM, clamped to the supported range
    pub fn nudge_tempo(&mut self, delta: f64) -> SequencerResult<f64> {
        let bpm = (self.clock.bpm() + delta).clamp(MIN_BPM, MAX_BPM);
        self.set_tempo(bpm)?;
        Ok(bpm)
    }

    /// Change the pulse length, keeping it shorter than the current period
    pub fn set_gate_length(&mut self, gate_length: Duration) -> SequencerResult<()> {
        check_gate_length(gate_length, self.clock.tick_period())?;
        self.gates.set_gate_length(gate_length);
        debug!(gate_ms = gate_length.as_millis() as u64, "gate length changed");
        Ok(())
    }

    /// Apply the live parameters of a reloaded configuration.
    ///
    /// Only tempo and gate length change at runtime. Differences in shape,
    /// pattern or display layout are reported and ignored.
    pub fn apply_live_config(&mut self, config: &EngineConfig) -> SequencerResult<()> {
        config.validate()?;

        if config.shape()? != self.grid.shape() {
            warn!("grid shape changes need a restart, ignoring");
        }
        let live = self.grid.words();
        let pattern_differs = config
            .pattern_words()?
            .iter()
            .enumerate()
            .any(|(track, word)| live.get(track) != Some(word));
        if pattern_differs {
            warn!("pattern changes do not replace the live grid, ignoring");
        }
        if config.projection()? != *self.painter.projection() {
            warn!("display layout changes need a restart, ignoring");
        }

        let gate_length = config.gate_length();
        let period = tick_period(config.timing.tempo_bpm);
        check_gate_length(gate_length, period)?;

        // Order the two updates so the gate is never longer than the period
        if period > self.clock.tick_period() {
            self.clock.set_tempo(config.timing.tempo_bpm)?;
            self.gates.set_gate_length(gate_length);
        } else {
            self.gates.set_gate_length(gate_length);
            self.clock.set_tempo(config.timing.tempo_bpm)?;
        }

        info!(
            bpm = config.timing.tempo_bpm,
            gate_ms = config.timing.gate_length_ms,
            "live config applied"
        );
        Ok(())
    }

    /// Draw the current grid, cursor and playback column
    pub fn render(&self, display: &mut impl Display) {
        self.painter.paint(
            display,
            GridSnapshot {
                grid: &self.grid,
                cursor: self.cursor.index(),
                active_step: self.clock.active_step(),
            },
        );
    }

    /// Close every gate, e.g. before shutting down
    pub fn close_gates(&mut self, output: &mut impl GateOutput) {
        self.gates.close_all(output);
    }

    /// The step grid being played
    pub fn grid(&self) -> &StepGrid {
        &self.grid
    }

    /// Flat index under the edit cursor
    pub fn cursor(&self) -> usize {
        self.cursor.index()
    }

    /// Cursor position as (track, step)
    pub fn cursor_position(&self) -> (usize, usize) {
        let steps = self.grid.shape().steps_per_track;
        (self.cursor.index() / steps, self.cursor.index() % steps)
    }

    /// Playback clock and transport state
    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    /// Per-track gate state machines
    pub fn gates(&self) -> &TriggerGateController {
        &self.gates
    }

    /// Encoder decoder state
    pub fn decoder(&self) -> &RotaryDecoder {
        &self.decoder
    }
}
