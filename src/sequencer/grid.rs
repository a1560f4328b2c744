// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Bitmap-backed step grid.
//!
//! One `u32` word per track, one bit per step. Bit 0 of a word is step 0 of
//! that track, so the pattern `0b00100101` arms steps 0, 2 and 5.

use crate::error::{SequencerError, SequencerResult};

/// Widest track a single bitmap word can hold
pub const MAX_STEPS_PER_TRACK: usize = u32::BITS as usize;

/// Most tracks a grid may hold
pub const MAX_TRACKS: usize = 256;

/// Fixed dimensions of a step grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridShape {
    /// Number of tracks (bitmap words)
    pub tracks: usize,
    /// Steps in every track (bits used per word)
    pub steps_per_track: usize,
}

impl GridShape {
    /// Create a validated shape
    pub fn new(tracks: usize, steps_per_track: usize) -> SequencerResult<Self> {
        if tracks == 0 || tracks > MAX_TRACKS {
            return Err(SequencerError::inconsistent(format!(
                "tracks must be between 1 and {}, got {}",
                MAX_TRACKS, tracks
            )));
        }
        if steps_per_track == 0 || steps_per_track > MAX_STEPS_PER_TRACK {
            return Err(SequencerError::inconsistent(format!(
                "steps per track must be between 1 and {}, got {}",
                MAX_STEPS_PER_TRACK, steps_per_track
            )));
        }
        Ok(Self {
            tracks,
            steps_per_track,
        })
    }

    /// Size of the flattened step space
    pub fn len(&self) -> usize {
        self.tracks * self.steps_per_track
    }

    /// A validated shape is never empty; provided for API symmetry
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Split a flat index into `(track, step)`
    pub fn decompose(&self, flat_index: usize) -> SequencerResult<(usize, usize)> {
        if flat_index >= self.len() {
            return Err(SequencerError::out_of_range("flat index", flat_index, self.len()));
        }
        Ok((
            flat_index / self.steps_per_track,
            flat_index % self.steps_per_track,
        ))
    }

    /// Join `(track, step)` into a flat index
    pub fn flatten(&self, track: usize, step: usize) -> SequencerResult<usize> {
        self.check(track, step)?;
        Ok(track * self.steps_per_track + step)
    }

    fn check(&self, track: usize, step: usize) -> SequencerResult<()> {
        if track >= self.tracks {
            return Err(SequencerError::out_of_range("track", track, self.tracks));
        }
        if step >= self.steps_per_track {
            return Err(SequencerError::out_of_range("step", step, self.steps_per_track));
        }
        Ok(())
    }

    /// Mask of the bits a track word may use
    fn word_mask(&self) -> u32 {
        if self.steps_per_track == MAX_STEPS_PER_TRACK {
            u32::MAX
        } else {
            (1u32 << self.steps_per_track) - 1
        }
    }
}

/// The armed/disarmed state of every step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepGrid {
    shape: GridShape,
    words: Vec<u32>,
}

impl StepGrid {
    /// Create a grid with nothing armed
    pub fn empty(shape: GridShape) -> Self {
        Self {
            shape,
            words: vec![0; shape.tracks],
        }
    }

    /// Create a grid from one word per track.
    ///
    /// Fewer words than tracks leaves the remaining tracks empty.
    pub fn from_words(shape: GridShape, words: &[u32]) -> SequencerResult<Self> {
        if words.len() > shape.tracks {
            return Err(SequencerError::inconsistent(format!(
                "{} pattern words supplied for {} tracks",
                words.len(),
                shape.tracks
            )));
        }

        let mask = shape.word_mask();
        let mut grid = Self::empty(shape);
        for (track, &word) in words.iter().enumerate() {
            if word & !mask != 0 {
                return Err(SequencerError::inconsistent(format!(
                    "track {} pattern {:#b} has bits beyond step {}",
                    track,
                    word,
                    shape.steps_per_track - 1
                )));
            }
            grid.words[track] = word;
        }
        Ok(grid)
    }

    /// Grid dimensions
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    /// Check whether a step is armed
    pub fn is_armed(&self, track: usize, step: usize) -> SequencerResult<bool> {
        self.shape.check(track, step)?;
        Ok(self.words[track] & (1 << step) != 0)
    }

    /// Check a step by flat index
    pub fn is_armed_at(&self, flat_index: usize) -> SequencerResult<bool> {
        let (track, step) = self.shape.decompose(flat_index)?;
        self.is_armed(track, step)
    }

    /// Flip the step addressed by a flat index, returning its new state
    pub fn toggle(&mut self, flat_index: usize) -> SequencerResult<bool> {
        let (track, step) = self.shape.decompose(flat_index)?;
        self.words[track] ^= 1 << step;
        Ok(self.words[track] & (1 << step) != 0)
    }

    /// Raw bitmap word for a track
    pub fn word(&self, track: usize) -> SequencerResult<u32> {
        self.words
            .get(track)
            .copied()
            .ok_or_else(|| SequencerError::out_of_range("track", track, self.shape.tracks))
    }

    /// All bitmap words, track 0 first
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Number of armed steps across all tracks
    pub fn armed_count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }
}
