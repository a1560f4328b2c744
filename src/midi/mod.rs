// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! MIDI transport source.
//!
//! This module parses incoming MIDI bytes and maps the transport-related
//! messages onto the sequencer's Start/Stop/Continue events.

pub mod input;

pub use input::{list_sources, print_sources, MidiTransportInput};

/// MIDI message constants
pub mod messages {
    // Channel Voice Messages (upper nibble, lower nibble is channel 0-15)
    pub const NOTE_OFF: u8 = 0x80;
    pub const NOTE_ON: u8 = 0x90;
    pub const POLY_AFTERTOUCH: u8 = 0xA0;
    pub const CONTROL_CHANGE: u8 = 0xB0;
    pub const PROGRAM_CHANGE: u8 = 0xC0;
    pub const CHANNEL_AFTERTOUCH: u8 = 0xD0;
    pub const PITCH_BEND: u8 = 0xE0;

    // System Real-Time Messages
    pub const TIMING_CLOCK: u8 = 0xF8;
    pub const START: u8 = 0xFA;
    pub const CONTINUE: u8 = 0xFB;
    pub const STOP: u8 = 0xFC;

    // Channel Mode Messages (controller numbers)
    pub const ALL_NOTES_OFF: u8 = 123;
}

/// Parsed MIDI message types
#[derive(Debug, Clone, PartialEq)]
pub enum MidiMessage {
    /// Note On: channel (0-15), note (0-127), velocity (0-127)
    NoteOn { channel: u8, note: u8, velocity: u8 },
    /// Note Off: channel (0-15), note (0-127), velocity (0-127)
    NoteOff { channel: u8, note: u8, velocity: u8 },
    /// Control Change: channel (0-15), controller (0-127), value (0-127)
    ControlChange { channel: u8, controller: u8, value: u8 },
    /// Program Change: channel (0-15), program (0-127)
    ProgramChange { channel: u8, program: u8 },
    /// Pitch Bend: channel (0-15), value (-8192 to 8191)
    PitchBend { channel: u8, value: i16 },
    /// Channel Aftertouch: channel (0-15), pressure (0-127)
    ChannelAftertouch { channel: u8, pressure: u8 },
    /// Poly Aftertouch: channel (0-15), note (0-127), pressure (0-127)
    PolyAftertouch { channel: u8, note: u8, pressure: u8 },
    /// MIDI Clock tick
    TimingClock,
    /// Start playback
    Start,
    /// Continue playback
    Continue,
    /// Stop playback
    Stop,
    /// Unknown/unparsed message
    Unknown(Vec<u8>),
}

impl MidiMessage {
    /// Parse raw MIDI bytes into a MidiMessage
    pub fn parse(data: &[u8]) -> Option<Self> {
        let (&status, rest) = data.split_first()?;

        // System Real-Time messages (single byte)
        match status {
            messages::TIMING_CLOCK => return Some(MidiMessage::TimingClock),
            messages::START => return Some(MidiMessage::Start),
            messages::CONTINUE => return Some(MidiMessage::Continue),
            messages::STOP => return Some(MidiMessage::Stop),
            _ => {}
        }

        let channel = status & 0x0F;
        let data1 = rest.first().map(|b| b & 0x7F);
        let data2 = rest.get(1).map(|b| b & 0x7F);

        let parsed = match (status & 0xF0, data1, data2) {
            (messages::NOTE_OFF, Some(note), Some(velocity)) => MidiMessage::NoteOff {
                channel,
                note,
                velocity,
            },
            // Note On with velocity 0 is equivalent to Note Off
            (messages::NOTE_ON, Some(note), Some(0)) => MidiMessage::NoteOff {
                channel,
                note,
                velocity: 0,
            },
            (messages::NOTE_ON, Some(note), Some(velocity)) => MidiMessage::NoteOn {
                channel,
                note,
                velocity,
            },
            (messages::CONTROL_CHANGE, Some(controller), Some(value)) => {
                MidiMessage::ControlChange {
                    channel,
                    controller,
                    value,
                }
            }
            (messages::PROGRAM_CHANGE, Some(program), _) => {
                MidiMessage::ProgramChange { channel, program }
            }
            (messages::PITCH_BEND, Some(lsb), Some(msb)) => MidiMessage::PitchBend {
                channel,
                value: (((msb as i16) << 7) | lsb as i16) - 8192,
            },
            (messages::CHANNEL_AFTERTOUCH, Some(pressure), _) => {
                MidiMessage::ChannelAftertouch { channel, pressure }
            }
            (messages::POLY_AFTERTOUCH, Some(note), Some(pressure)) => {
                MidiMessage::PolyAftertouch {
                    channel,
                    note,
                    pressure,
                }
            }
            _ => MidiMessage::Unknown(data.to_vec()),
        };
        Some(parsed)
    }
}

/// Transport events the sequencer reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEvent {
    Start,
    Stop,
    Continue,
    /// External clock pulse; the internal tempo clock does not follow it
    Clock,
}

impl TransportEvent {
    /// Map a MIDI message onto a transport event.
    ///
    /// All Notes Off on any channel stops playback.
    pub fn from_message(message: &MidiMessage) -> Option<Self> {
        match message {
            MidiMessage::Start => Some(TransportEvent::Start),
            MidiMessage::Stop => Some(TransportEvent::Stop),
            MidiMessage::Continue => Some(TransportEvent::Continue),
            MidiMessage::TimingClock => Some(TransportEvent::Clock),
            MidiMessage::ControlChange {
                controller: messages::ALL_NOTES_OFF,
                ..
            } => Some(TransportEvent::Stop),
            _ => None,
        }
    }
}
