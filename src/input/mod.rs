// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Front panel input.
//!
//! This module provides:
//! - Rotary encoder decoding into discrete events
//! - Keyboard emulation of the encoder for the terminal front end

pub mod encoder;
pub mod keyboard;

pub use encoder::{InputEvent, InputEvents, InputLines, LineLevels, RotaryDecoder};
pub use keyboard::{command_for_key, PanelCommand, SimulatedPanel, BINDINGS};
