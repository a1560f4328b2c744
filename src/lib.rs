// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! pewbox: a step trigger sequencer engine.
//!
//! A fixed grid of tracks and steps is played by a tempo clock. Armed steps
//! fire short trigger pulses on per-track output lines, and a rotary encoder
//! moves an edit cursor and toggles steps. Everything runs from one
//! non-blocking poll loop owned by [`sequencer::SequencerEngine`].

pub mod config;
pub mod error;
pub mod input;
pub mod midi;
pub mod render;
pub mod sequencer;
pub mod timing;
pub mod ui;

pub use error::{SequencerError, SequencerResult};
