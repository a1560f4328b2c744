// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Rotary encoder decoding.
//!
//! The encoder latches on a high `clk` level and reads low between detents,
//! so a rotation is only counted on a rising `clk` edge. The level of `dt` at
//! that moment gives the direction: equal levels turn counterclockwise
//! (negative), differing levels turn clockwise (positive).

/// Raw levels of the encoder lines for one poll (`true` = high)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineLevels {
    /// Phase A
    pub clk: bool,
    /// Phase B
    pub dt: bool,
    /// Momentary switch
    pub sw: bool,
}

impl LineLevels {
    pub fn new(clk: bool, dt: bool, sw: bool) -> Self {
        Self { clk, dt, sw }
    }
}

/// Anything that can be sampled for encoder line levels
pub trait InputLines {
    /// Read all three lines once
    fn sample(&mut self) -> LineLevels;
}

/// A single decoded input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    RotatePositive,
    RotateNegative,
    SwitchPressed,
    SwitchReleased,
}

/// Events decoded from one poll: at most one rotation and one switch edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputEvents {
    pub rotation: Option<InputEvent>,
    pub switch: Option<InputEvent>,
}

impl InputEvents {
    /// Whether nothing happened
    pub fn is_empty(&self) -> bool {
        self.rotation.is_none() && self.switch.is_none()
    }

    /// Rotation first, then the switch edge
    pub fn iter(&self) -> impl Iterator<Item = InputEvent> {
        self.rotation.into_iter().chain(self.switch)
    }
}

/// Edge-detecting decoder for a rotary encoder with push switch
#[derive(Debug, Clone)]
pub struct RotaryDecoder {
    previous_clk: bool,
    previous_sw: bool,
    /// Level the switch line reads while pressed
    active_level: bool,
    /// Flipped on every press
    toggled: bool,
}

impl RotaryDecoder {
    /// Create a decoder seeded with the lines' resting levels
    pub fn new(initial: LineLevels, switch_active_low: bool) -> Self {
        Self {
            previous_clk: initial.clk,
            previous_sw: initial.sw,
            active_level: !switch_active_low,
            toggled: false,
        }
    }

    /// Latch toggled by each switch press
    pub fn toggled(&self) -> bool {
        self.toggled
    }

    /// Whether the switch was held down at the last poll
    pub fn is_pressed(&self) -> bool {
        self.previous_sw == self.active_level
    }

    /// Decode one sample of the lines
    pub fn poll(&mut self, levels: LineLevels) -> InputEvents {
        InputEvents {
            rotation: self.decode_rotation(levels),
            switch: self.decode_switch(levels.sw),
        }
    }

    fn decode_rotation(&mut self, levels: LineLevels) -> Option<InputEvent> {
        if levels.clk == self.previous_clk {
            return None;
        }
        self.previous_clk = levels.clk;

        // Only the latching edge counts
        if !levels.clk {
            return None;
        }

        if levels.dt == levels.clk {
            Some(InputEvent::RotateNegative)
        } else {
            Some(InputEvent::RotatePositive)
        }
    }

    fn decode_switch(&mut self, sw: bool) -> Option<InputEvent> {
        if sw == self.previous_sw {
            return None;
        }
        self.previous_sw = sw;

        if sw == self.active_level {
            self.toggled = !self.toggled;
            Some(InputEvent::SwitchPressed)
        } else {
            Some(InputEvent::SwitchReleased)
        }
    }
}
