// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Keyboard emulation of the front panel.
//!
//! Key presses are turned into the line levels a real encoder would produce,
//! so the decoder sees exactly the same edges as on hardware.

use std::collections::VecDeque;

use crossterm::event::{KeyCode, KeyModifiers};

use super::encoder::{InputLines, LineLevels};

/// Action requested from the keyboard
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelCommand {
    /// Turn the encoder one detent clockwise
    RotatePositive,
    /// Turn the encoder one detent counterclockwise
    RotateNegative,
    /// Press and release the encoder switch
    Click,
    /// Adjust tempo by a delta in BPM
    AdjustTempo(f64),
    /// Pause or resume playback
    ToggleTransport,
    /// Leave the application
    Quit,
}

/// A key binding shown in the help line
#[derive(Debug, Clone)]
pub struct KeyBinding {
    /// Key label for display
    pub keys: &'static str,
    /// What the key does
    pub description: &'static str,
}

/// Default bindings, in display order
pub const BINDINGS: &[KeyBinding] = &[
    KeyBinding {
        keys: "←/h",
        description: "cursor back",
    },
    KeyBinding {
        keys: "→/l",
        description: "cursor forward",
    },
    KeyBinding {
        keys: "space",
        description: "toggle step",
    },
    KeyBinding {
        keys: "+/-",
        description: "tempo",
    },
    KeyBinding {
        keys: "p",
        description: "play/pause",
    },
    KeyBinding {
        keys: "q",
        description: "quit",
    },
];

/// Map a key event to a panel command
pub fn command_for_key(code: KeyCode, modifiers: KeyModifiers) -> Option<PanelCommand> {
    match (code, modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(PanelCommand::Quit),
        (KeyCode::Char('q'), _) | (KeyCode::Esc, _) => Some(PanelCommand::Quit),

        (KeyCode::Right, _) | (KeyCode::Char('l'), _) => Some(PanelCommand::RotatePositive),
        (KeyCode::Left, _) | (KeyCode::Char('h'), _) => Some(PanelCommand::RotateNegative),
        (KeyCode::Char(' '), _) | (KeyCode::Enter, _) => Some(PanelCommand::Click),

        (KeyCode::Char('+'), _) | (KeyCode::Char('='), _) => Some(PanelCommand::AdjustTempo(1.0)),
        (KeyCode::Char('-'), _) => Some(PanelCommand::AdjustTempo(-1.0)),
        (KeyCode::Up, KeyModifiers::SHIFT) => Some(PanelCommand::AdjustTempo(10.0)),
        (KeyCode::Down, KeyModifiers::SHIFT) => Some(PanelCommand::AdjustTempo(-10.0)),

        (KeyCode::Char('p'), _) => Some(PanelCommand::ToggleTransport),
        _ => None,
    }
}

/// Emulated encoder lines fed by panel commands.
///
/// Each detent is queued as a latch sample followed by a return to rest, and
/// a click as a press sample followed by a release, one sample per poll.
#[derive(Debug, Clone)]
pub struct SimulatedPanel {
    pending: VecDeque<LineLevels>,
    rest: LineLevels,
}

impl SimulatedPanel {
    /// Create a panel whose switch line idles at the inactive level
    pub fn new(switch_active_low: bool) -> Self {
        Self {
            pending: VecDeque::new(),
            rest: LineLevels::new(false, false, switch_active_low),
        }
    }

    /// Levels read when nothing is happening
    pub fn rest(&self) -> LineLevels {
        self.rest
    }

    /// Queue the line samples for an encoder command; other commands are ignored
    pub fn push(&mut self, command: PanelCommand) {
        let rest = self.rest;
        match command {
            PanelCommand::RotatePositive => {
                self.pending.push_back(LineLevels { clk: true, dt: false, ..rest });
                self.pending.push_back(rest);
            }
            PanelCommand::RotateNegative => {
                self.pending.push_back(LineLevels { clk: true, dt: true, ..rest });
                self.pending.push_back(rest);
            }
            PanelCommand::Click => {
                self.pending.push_back(LineLevels { sw: !rest.sw, ..rest });
                self.pending.push_back(rest);
            }
            _ => {}
        }
    }

    /// Samples still waiting to be read
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl InputLines for SimulatedPanel {
    fn sample(&mut self) -> LineLevels {
        self.pending.pop_front().unwrap_or(self.rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::encoder::{InputEvent, RotaryDecoder};

    fn drain(panel: &mut SimulatedPanel, decoder: &mut RotaryDecoder) -> Vec<InputEvent> {
        let mut events = Vec::new();
        while panel.pending() > 0 {
            events.extend(decoder.poll(panel.sample()).iter());
        }
        events
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(
            command_for_key(KeyCode::Right, KeyModifiers::NONE),
            Some(PanelCommand::RotatePositive)
        );
        assert_eq!(
            command_for_key(KeyCode::Char('h'), KeyModifiers::NONE),
            Some(PanelCommand::RotateNegative)
        );
        assert_eq!(
            command_for_key(KeyCode::Char(' '), KeyModifiers::NONE),
            Some(PanelCommand::Click)
        );
        assert_eq!(
            command_for_key(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Some(PanelCommand::Quit)
        );
        assert_eq!(
            command_for_key(KeyCode::Up, KeyModifiers::SHIFT),
            Some(PanelCommand::AdjustTempo(10.0))
        );
        assert_eq!(command_for_key(KeyCode::Char('z'), KeyModifiers::NONE), None);
    }

    #[test]
    fn test_panel_rests_when_idle() {
        let mut panel = SimulatedPanel::new(true);
        assert_eq!(panel.sample(), LineLevels::new(false, false, true));
    }

    #[test]
    fn test_panel_drives_decoder() {
        let mut panel = SimulatedPanel::new(true);
        let mut decoder = RotaryDecoder::new(panel.rest(), true);

        panel.push(PanelCommand::RotatePositive);
        panel.push(PanelCommand::RotatePositive);
        panel.push(PanelCommand::RotateNegative);
        panel.push(PanelCommand::Click);
        panel.push(PanelCommand::Quit);

        assert_eq!(
            drain(&mut panel, &mut decoder),
            vec![
                InputEvent::RotatePositive,
                InputEvent::RotatePositive,
                InputEvent::RotateNegative,
                InputEvent::SwitchPressed,
                InputEvent::SwitchReleased,
            ]
        );
    }
}
