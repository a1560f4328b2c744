// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Timing and clock module.
//!
//! This module provides the playback clock and the time source the poll
//! loop reads once per iteration.

pub mod clock;

pub use clock::{check_tempo, tick_period, ClockPoll, PlaybackClock, TransportState, MAX_BPM, MIN_BPM};

use std::time::{Duration, Instant};

/// Monotonic time since some fixed epoch
pub trait TimeSource {
    fn now(&self) -> Duration;
}

/// Wall-clock time source anchored at construction
#[derive(Debug, Clone, Copy)]
pub struct MonotonicTime {
    epoch: Instant,
}

impl MonotonicTime {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for MonotonicTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicTime {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_time_advances() {
        let time = MonotonicTime::new();
        let first = time.now();
        std::thread::sleep(Duration::from_millis(2));
        assert!(time.now() > first);
    }
}
