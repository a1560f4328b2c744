// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration system for pewbox.
//!
//! This module provides the data structures for the grid shape, initial
//! pattern, tempo and gate settings, display geometry and input wiring,
//! loaded from YAML or TOML files.

pub mod watcher;

pub use watcher::{validate_config, ConfigEvent, ConfigWatcher};

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::{SequencerError, SequencerResult};
use crate::render::GridProjection;
use crate::sequencer::{check_gate_length, GridShape, StepGrid};
use crate::timing::clock::{check_tempo, tick_period};

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct EngineConfig {
    /// Grid shape and initial pattern
    #[serde(default)]
    pub grid: GridConfig,
    /// Tempo and gate settings
    #[serde(default)]
    pub timing: TimingConfig,
    /// Display geometry
    #[serde(default)]
    pub display: DisplayConfig,
    /// Encoder wiring
    #[serde(default)]
    pub input: InputConfig,
    /// External transport source
    #[serde(default)]
    pub midi: MidiConfig,
}

impl EngineConfig {
    /// Load a configuration file; `.toml` files are read as TOML, anything else as YAML
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        if is_toml(path) {
            Self::from_toml(&contents)
        } else {
            Self::from_yaml(&contents)
        }
    }

    /// Parse a configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse YAML configuration")
    }

    /// Parse a configuration from a TOML string
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse TOML configuration")
    }

    /// Serialize to a YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration to YAML")
    }

    /// Serialize to a TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).context("Failed to serialize configuration to TOML")
    }

    /// Save to a file, choosing the format from the extension
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let text = if is_toml(path) {
            self.to_toml()?
        } else {
            self.to_yaml()?
        };
        fs::write(path, text).with_context(|| format!("Failed to write config file: {:?}", path))
    }

    /// Check that every setting is usable and that they agree with each other
    pub fn validate(&self) -> SequencerResult<()> {
        let shape = self.shape()?;
        StepGrid::from_words(shape, &self.pattern_words()?)?;

        let row = self.steps_per_display_row();
        if row != shape.steps_per_track {
            return Err(SequencerError::inconsistent(format!(
                "display rows of {} steps do not line up with tracks of {} steps",
                row, shape.steps_per_track
            )));
        }

        check_tempo(self.timing.tempo_bpm)?;
        if self.timing.gate_length_ms == 0 {
            return Err(SequencerError::inconsistent("gate length must be at least 1 ms"));
        }
        check_gate_length(self.gate_length(), self.tick_period())?;

        let projection = self.projection()?;
        let [x, y] = self.display.origin;
        if x < 0 || y < 0 {
            return Err(SequencerError::inconsistent(format!(
                "grid origin ({}, {}) is off the display",
                x, y
            )));
        }
        let (w, h) = projection.extent(shape.len()).ok_or_else(|| {
            SequencerError::inconsistent(format!(
                "a grid of {} cells at {} pixels per cell is too large to draw",
                shape.len(),
                self.display.cell_size
            ))
        })?;
        let right = x as u64 + w as u64;
        let bottom = y as u64 + h as u64;
        if right > self.display.width as u64 || bottom > self.display.height as u64 {
            return Err(SequencerError::inconsistent(format!(
                "a {}x{} pixel grid at ({}, {}) does not fit a {}x{} display",
                w, h, x, y, self.display.width, self.display.height
            )));
        }

        Ok(())
    }

    /// Grid dimensions
    pub fn shape(&self) -> SequencerResult<GridShape> {
        GridShape::new(self.grid.tracks, self.grid.steps_per_track)
    }

    /// Initial pattern as bitmap words
    pub fn pattern_words(&self) -> SequencerResult<Vec<u32>> {
        self.grid.pattern.iter().map(PatternWord::to_word).collect()
    }

    /// Steps drawn per display row, defaulting to the track length
    pub fn steps_per_display_row(&self) -> usize {
        self.display
            .steps_per_display_row
            .unwrap_or(self.grid.steps_per_track)
    }

    /// Cell layout on the display
    pub fn projection(&self) -> SequencerResult<GridProjection> {
        let [x, y] = self.display.origin;
        GridProjection::new(self.steps_per_display_row(), self.display.cell_size, (x, y))
    }

    /// Time between steps at the configured tempo
    pub fn tick_period(&self) -> Duration {
        tick_period(self.timing.tempo_bpm)
    }

    /// Configured gate length
    pub fn gate_length(&self) -> Duration {
        Duration::from_millis(self.timing.gate_length_ms)
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "toml")
}

/// Grid configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GridConfig {
    /// Number of tracks
    #[serde(default = "default_tracks")]
    pub tracks: usize,
    /// Steps per track (at most 32)
    #[serde(default = "default_steps_per_track")]
    pub steps_per_track: usize,
    /// One word per track; missing tracks start empty
    #[serde(default = "default_pattern")]
    pub pattern: Vec<PatternWord>,
}

fn default_tracks() -> usize {
    2
}
fn default_steps_per_track() -> usize {
    8
}
fn default_pattern() -> Vec<PatternWord> {
    vec![
        PatternWord::Bits("00100101".to_string()),
        PatternWord::Bits("10001000".to_string()),
    ]
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            tracks: default_tracks(),
            steps_per_track: default_steps_per_track(),
            pattern: default_pattern(),
        }
    }
}

/// A track's initial pattern
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PatternWord {
    /// Bitmap as a number, bit 0 = step 0
    Value(u32),
    /// Bitmap written most significant bit first, e.g. `"00100101"` or
    /// `"0b0010_0101"`; the rightmost digit is step 0
    Bits(String),
}

impl PatternWord {
    /// Resolve to a bitmap word
    pub fn to_word(&self) -> SequencerResult<u32> {
        match self {
            PatternWord::Value(v) => Ok(*v),
            PatternWord::Bits(text) => parse_bits(text),
        }
    }
}

fn parse_bits(text: &str) -> SequencerResult<u32> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix("0b")
        .or_else(|| trimmed.strip_prefix('B'))
        .unwrap_or(trimmed);

    let mut word: u32 = 0;
    let mut count = 0;
    for c in digits.chars().filter(|c| *c != '_') {
        let bit = match c {
            '0' => 0,
            '1' => 1,
            _ => {
                return Err(SequencerError::inconsistent(format!(
                    "pattern {:?} is not a binary string",
                    text
                )))
            }
        };
        count += 1;
        if count > u32::BITS {
            return Err(SequencerError::inconsistent(format!(
                "pattern {:?} is wider than 32 steps",
                text
            )));
        }
        word = (word << 1) | bit;
    }

    if count == 0 {
        return Err(SequencerError::inconsistent("empty pattern string"));
    }
    Ok(word)
}

/// Tempo and gate configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimingConfig {
    /// Tempo in BPM, one step per beat
    #[serde(default = "default_tempo")]
    pub tempo_bpm: f64,
    /// Length of each trigger pulse
    #[serde(default = "default_gate_length_ms")]
    pub gate_length_ms: u64,
    /// Start playing without waiting for a transport Start
    #[serde(default = "default_autostart")]
    pub autostart: bool,
}

fn default_tempo() -> f64 {
    120.0
}
fn default_gate_length_ms() -> u64 {
    20
}
fn default_autostart() -> bool {
    true
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tempo_bpm: default_tempo(),
            gate_length_ms: default_gate_length_ms(),
            autostart: default_autostart(),
        }
    }
}

/// Display geometry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayConfig {
    /// Panel width in pixels
    #[serde(default = "default_width")]
    pub width: u32,
    /// Panel height in pixels
    #[serde(default = "default_height")]
    pub height: u32,
    /// Side of one grid cell in pixels
    #[serde(default = "default_cell_size")]
    pub cell_size: u32,
    /// Top-left pixel of the grid
    #[serde(default)]
    pub origin: [i32; 2],
    /// Cells per display row; must match the track length
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps_per_display_row: Option<usize>,
}

fn default_width() -> u32 {
    128
}
fn default_height() -> u32 {
    32
}
fn default_cell_size() -> u32 {
    10
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            cell_size: default_cell_size(),
            origin: [0, 0],
            steps_per_display_row: None,
        }
    }
}

/// Encoder wiring
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputConfig {
    /// The switch line reads low while pressed
    #[serde(default = "default_switch_active_low")]
    pub switch_active_low: bool,
}

fn default_switch_active_low() -> bool {
    true
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            switch_active_low: default_switch_active_low(),
        }
    }
}

/// External transport source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MidiConfig {
    /// MIDI input port index to follow for Start/Stop/Continue
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<usize>,
}
