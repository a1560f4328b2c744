// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Per-track trigger gates.
//!
//! Each track owns a small `Closed`/`Open` state machine. A gate opens when
//! the playback column lands on an armed step and closes after a fixed gate
//! length, so consecutive armed steps still produce separate pulses.

use std::time::Duration;

use tracing::trace;

use super::grid::StepGrid;
use crate::error::{SequencerError, SequencerResult};
use crate::timing::ClockPoll;

/// A pulse must be non-zero and end before the next step can start one
pub fn check_gate_length(gate_length: Duration, tick_period: Duration) -> SequencerResult<()> {
    if gate_length.is_zero() {
        return Err(SequencerError::inconsistent("gate length must be non-zero"));
    }
    if gate_length >= tick_period {
        return Err(SequencerError::inconsistent(format!(
            "gate length {}ms must be shorter than the {}ms step period",
            gate_length.as_millis(),
            tick_period.as_millis()
        )));
    }
    Ok(())
}

/// Sink for the binary per-track output lines
pub trait GateOutput {
    /// Drive the output line of `track` high or low
    fn set_line(&mut self, track: usize, high: bool);
}

/// State of one track's gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Closed,
    /// Asserted since the contained timestamp
    Open { since: Duration },
}

impl GateState {
    pub fn is_open(&self) -> bool {
        matches!(self, GateState::Open { .. })
    }
}

/// Gate state machines for every track
#[derive(Debug, Clone)]
pub struct TriggerGateController {
    gates: Vec<GateState>,
    gate_length: Duration,
}

impl TriggerGateController {
    /// Create controllers for `tracks` tracks, all closed
    pub fn new(tracks: usize, gate_length: Duration) -> Self {
        Self {
            gates: vec![GateState::Closed; tracks],
            gate_length,
        }
    }

    /// How long each pulse is held
    pub fn gate_length(&self) -> Duration {
        self.gate_length
    }

    /// Change the pulse length; open gates use the new length immediately
    pub fn set_gate_length(&mut self, gate_length: Duration) {
        self.gate_length = gate_length;
    }

    /// State of a track's gate, if the track exists
    pub fn state(&self, track: usize) -> Option<GateState> {
        self.gates.get(track).copied()
    }

    /// Whether a track's output is currently asserted
    pub fn is_open(&self, track: usize) -> bool {
        self.state(track).is_some_and(|s| s.is_open())
    }

    /// Number of tracks currently asserted
    pub fn open_count(&self) -> usize {
        self.gates.iter().filter(|g| g.is_open()).count()
    }

    /// Re-evaluate every gate for this poll.
    ///
    /// Expired gates close first and drive their line low. If the clock
    /// ticked, each track then opens on an armed step or is forced closed on
    /// an unarmed one. A tick that re-opens a line which is still high drops
    /// it low first, so every trigger is its own pulse.
    pub fn poll(
        &mut self,
        grid: &StepGrid,
        clock: ClockPoll,
        now: Duration,
        output: &mut impl GateOutput,
    ) {
        for (track, gate) in self.gates.iter_mut().enumerate() {
            if let GateState::Open { since } = *gate {
                if now.saturating_sub(since) >= self.gate_length {
                    *gate = GateState::Closed;
                    trace!(track, "gate expired");
                    output.set_line(track, false);
                }
            }

            if !clock.ticked {
                continue;
            }

            // Shapes match by construction, so a missing step reads as unarmed
            let armed = grid.is_armed(track, clock.active_step).unwrap_or(false);
            if armed {
                if gate.is_open() {
                    output.set_line(track, false);
                }
                *gate = GateState::Open { since: now };
                trace!(track, step = clock.active_step, "gate opened");
                output.set_line(track, true);
            } else if gate.is_open() {
                *gate = GateState::Closed;
                trace!(track, step = clock.active_step, "gate forced closed");
                output.set_line(track, false);
            }
        }
    }

    /// Close every open gate immediately
    pub fn close_all(&mut self, output: &mut impl GateOutput) {
        for (track, gate) in self.gates.iter_mut().enumerate() {
            if gate.is_open() {
                *gate = GateState::Closed;
                trace!(track, "gate forced closed");
                output.set_line(track, false);
            }
        }
    }
}

/// In-memory output lines with a rising-edge counter per track
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GateLines {
    levels: Vec<bool>,
    pulses: Vec<u64>,
}

impl GateLines {
    pub fn new(tracks: usize) -> Self {
        Self {
            levels: vec![false; tracks],
            pulses: vec![0; tracks],
        }
    }

    /// Current level of a line (low for unknown tracks)
    pub fn level(&self, track: usize) -> bool {
        self.levels.get(track).copied().unwrap_or(false)
    }

    /// All line levels, track 0 first
    pub fn levels(&self) -> &[bool] {
        &self.levels
    }

    /// Rising edges seen on a line
    pub fn pulses(&self, track: usize) -> u64 {
        self.pulses.get(track).copied().unwrap_or(0)
    }
}

impl GateOutput for GateLines {
    fn set_line(&mut self, track: usize, high: bool) {
        if track >= self.levels.len() {
            self.levels.resize(track + 1, false);
            self.pulses.resize(track + 1, 0);
        }
        if high && !self.levels[track] {
            self.pulses[track] += 1;
        }
        self.levels[track] = high;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::grid::GridShape;
    use crate::timing::PlaybackClock;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn grid(words: &[u32]) -> StepGrid {
        StepGrid::from_words(GridShape::new(2, 8).unwrap(), words).unwrap()
    }

    fn tick(step: usize) -> ClockPoll {
        ClockPoll {
            ticked: true,
            active_step: step,
        }
    }

    fn idle(step: usize) -> ClockPoll {
        ClockPoll {
            ticked: false,
            active_step: step,
        }
    }

    #[test]
    fn test_opens_on_armed_tick() {
        let grid = grid(&[0b10, 0b00]);
        let mut gates = TriggerGateController::new(2, ms(20));
        let mut lines = GateLines::new(2);

        gates.poll(&grid, tick(1), ms(500), &mut lines);
        assert!(gates.is_open(0));
        assert!(!gates.is_open(1));
        assert!(lines.level(0));
        assert!(!lines.level(1));
        assert_eq!(gates.state(0), Some(GateState::Open { since: ms(500) }));
    }

    #[test]
    fn test_closes_after_gate_length_without_tick() {
        let grid = grid(&[0b10, 0b00]);
        let mut gates = TriggerGateController::new(2, ms(20));
        let mut lines = GateLines::new(2);

        gates.poll(&grid, tick(1), ms(500), &mut lines);
        gates.poll(&grid, idle(1), ms(519), &mut lines);
        assert!(lines.level(0));
        gates.poll(&grid, idle(1), ms(520), &mut lines);
        assert!(!lines.level(0));
        assert_eq!(gates.open_count(), 0);
    }

    #[test]
    fn test_back_to_back_steps_are_discrete_pulses() {
        let grid = grid(&[0b11, 0b00]);
        let mut gates = TriggerGateController::new(2, ms(20));
        let mut lines = GateLines::new(2);
        let mut clock = PlaybackClock::new(120.0, 8, Duration::ZERO).unwrap();

        // Step 1 fires at 500ms, step 0 at 4000ms, step 1 again at 4500ms
        let mut last_level = false;
        let mut falling_edges = 0;
        for t in (0..=4600).step_by(5) {
            let now = ms(t);
            let poll = clock.poll(now);
            gates.poll(&grid, poll, now, &mut lines);
            if last_level && !lines.level(0) {
                falling_edges += 1;
            }
            last_level = lines.level(0);
        }

        // Each pulse closes before the next armed step opens a new one
        assert_eq!(lines.pulses(0), 3);
        assert_eq!(falling_edges, 3);
        assert_eq!(lines.pulses(1), 0);
    }

    #[test]
    fn test_expiry_and_trigger_in_one_poll_stay_separate() {
        let grid = grid(&[0b11, 0b00]);
        let mut gates = TriggerGateController::new(2, ms(20));
        let mut lines = GateLines::new(2);
        let mut clock = PlaybackClock::new(120.0, 8, Duration::ZERO).unwrap();

        // Polls land only on step boundaries, so the 4000ms gate expires in
        // the same poll that the 4500ms step re-opens it
        for k in 1..=9u64 {
            let now = ms(k * 500);
            let poll = clock.poll(now);
            gates.poll(&grid, poll, now, &mut lines);
        }

        assert_eq!(lines.pulses(0), 3);
        assert!(lines.level(0));
        assert_eq!(gates.state(0), Some(GateState::Open { since: ms(4500) }));
    }

    #[test]
    fn test_retrigger_while_open_drops_line_first() {
        let grid = grid(&[0b11, 0b00]);
        let mut gates = TriggerGateController::new(2, ms(400));
        let mut lines = GateLines::new(2);

        gates.poll(&grid, tick(0), ms(0), &mut lines);
        gates.poll(&grid, tick(1), ms(100), &mut lines);
        assert_eq!(lines.pulses(0), 2);
        assert!(lines.level(0));
    }

    #[test]
    fn test_unarmed_tick_forces_closed() {
        let grid = grid(&[0b01, 0b00]);
        let mut gates = TriggerGateController::new(2, ms(400));
        let mut lines = GateLines::new(2);

        gates.poll(&grid, tick(0), ms(0), &mut lines);
        assert!(lines.level(0));
        gates.poll(&grid, tick(1), ms(100), &mut lines);
        assert!(!lines.level(0));
    }

    #[test]
    fn test_close_all() {
        let grid = grid(&[0b01, 0b01]);
        let mut gates = TriggerGateController::new(2, ms(20));
        let mut lines = GateLines::new(2);

        gates.poll(&grid, tick(0), ms(0), &mut lines);
        assert_eq!(gates.open_count(), 2);
        gates.close_all(&mut lines);
        assert_eq!(lines.levels(), &[false, false]);
        assert_eq!(lines.pulses(1), 1);
    }

    #[test]
    fn test_check_gate_length() {
        assert!(check_gate_length(ms(20), ms(500)).is_ok());
        assert!(check_gate_length(ms(499), ms(500)).is_ok());
        assert!(check_gate_length(ms(500), ms(500)).is_err());
        assert!(check_gate_length(Duration::ZERO, ms(500)).is_err());
    }

    #[test]
    fn test_gate_lines_counts_rising_edges() {
        let mut lines = GateLines::new(1);
        lines.set_line(0, true);
        lines.set_line(0, true);
        lines.set_line(0, false);
        lines.set_line(0, true);
        assert_eq!(lines.pulses(0), 2);
        lines.set_line(3, true);
        assert!(lines.level(3));
    }
}
