// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Non-blocking playback clock.
//!
//! The clock advances one shared playback column per tempo period. It never
//! sleeps: the poll loop asks it once per iteration whether a tick is due.

use std::time::Duration;

use tracing::{debug, trace};

use crate::error::{SequencerError, SequencerResult};

/// Slowest supported tempo
pub const MIN_BPM: f64 = 20.0;

/// Fastest supported tempo
pub const MAX_BPM: f64 = 300.0;

/// Whether the clock is allowed to advance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Running,
    Paused,
}

/// Outcome of one clock poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockPoll {
    /// Whether the playback column advanced during this poll
    pub ticked: bool,
    /// Playback column after the poll
    pub active_step: usize,
}

/// Tempo-driven step clock
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    /// Current tempo in BPM
    bpm: f64,
    /// Time between steps, derived from `bpm`
    period: Duration,
    /// Steps in the cycle
    steps: usize,
    /// Current playback column
    active_step: usize,
    /// Nominal time of the most recent tick
    last_tick: Duration,
    state: TransportState,
}

impl PlaybackClock {
    /// Create a running clock at step 0 whose first period starts at `now`
    pub fn new(bpm: f64, steps: usize, now: Duration) -> SequencerResult<Self> {
        if steps == 0 {
            return Err(SequencerError::inconsistent("clock needs at least one step"));
        }
        check_tempo(bpm)?;
        Ok(Self {
            bpm,
            period: tick_period(bpm),
            steps,
            active_step: 0,
            last_tick: now,
            state: TransportState::Running,
        })
    }

    /// Current tempo in BPM
    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Time between ticks at the current tempo
    pub fn tick_period(&self) -> Duration {
        self.period
    }

    /// Current playback column
    pub fn active_step(&self) -> usize {
        self.active_step
    }

    /// Number of steps in one cycle
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Current transport state
    pub fn state(&self) -> TransportState {
        self.state
    }

    /// Whether the clock advances on poll
    pub fn is_running(&self) -> bool {
        self.state == TransportState::Running
    }

    /// Change tempo.
    ///
    /// Takes effect on the next poll. The last tick time is kept, so the
    /// first interval after a change can be off by up to one old period.
    pub fn set_tempo(&mut self, bpm: f64) -> SequencerResult<()> {
        check_tempo(bpm)?;
        self.bpm = bpm;
        self.period = tick_period(bpm);
        debug!(bpm, period_ms = self.period.as_millis() as u64, "tempo changed");
        Ok(())
    }

    /// Resume ticking; the next tick is due one full period after `now`
    pub fn resume(&mut self, now: Duration) {
        if self.state != TransportState::Running {
            self.state = TransportState::Running;
            self.last_tick = now;
        }
    }

    /// Stop ticking and keep the playback column where it is
    pub fn pause(&mut self) {
        self.state = TransportState::Paused;
    }

    /// Advance at most one step if a period has elapsed
    pub fn poll(&mut self, now: Duration) -> ClockPoll {
        if self.state != TransportState::Running {
            return self.idle();
        }

        let elapsed = now.saturating_sub(self.last_tick);
        if elapsed < self.period {
            return self.idle();
        }

        // Additive advance keeps long-run tempo exact despite poll jitter
        self.last_tick += self.period;

        // Whole periods still outstanding are dropped rather than batched
        // into later polls; the phase of the beat grid is kept.
        let behind = now.saturating_sub(self.last_tick);
        if behind >= self.period {
            let skipped = behind.as_nanos() / self.period.as_nanos();
            let remainder = behind.as_nanos() % self.period.as_nanos();
            self.last_tick = now - Duration::from_nanos(remainder as u64);
            debug!(skipped = skipped as u64, "clock fell behind, dropping missed ticks");
        }

        self.active_step = (self.active_step + 1) % self.steps;
        trace!(step = self.active_step, "tick");

        ClockPoll {
            ticked: true,
            active_step: self.active_step,
        }
    }

    fn idle(&self) -> ClockPoll {
        ClockPoll {
            ticked: false,
            active_step: self.active_step,
        }
    }
}

/// Time between ticks for a tempo (one step per beat)
pub fn tick_period(bpm: f64) -> Duration {
    Duration::from_secs_f64(60.0 / bpm)
}

/// Reject tempos outside the supported range
pub fn check_tempo(bpm: f64) -> SequencerResult<()> {
    if !bpm.is_finite() || !(MIN_BPM..=MAX_BPM).contains(&bpm) {
        return Err(SequencerError::inconsistent(format!(
            "tempo {} BPM outside {}..={} BPM",
            bpm, MIN_BPM, MAX_BPM
        )));
    }
    Ok(())
}
