// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! MIDI input connection for the transport collaborator.
//!
//! Messages arrive on midir's callback thread and are handed to the poll loop
//! through a channel, so the loop only ever does non-blocking reads.

use std::sync::mpsc::{self, Receiver, Sender};

use anyhow::{anyhow, Result};
use midir::{Ignore, MidiInput, MidiInputConnection};
use tracing::info;

use super::{MidiMessage, TransportEvent};

const CLIENT_NAME: &str = "pewbox";

/// Live connection to one MIDI input port
pub struct MidiTransportInput {
    _connection: MidiInputConnection<()>,
    receiver: Receiver<MidiMessage>,
    port_name: String,
}

impl MidiTransportInput {
    /// Connect to the MIDI source at `source_index`
    pub fn connect(source_index: usize) -> Result<Self> {
        let mut midi_in = MidiInput::new(CLIENT_NAME)
            .map_err(|e| anyhow!("Failed to create MIDI client: {}", e))?;
        // Realtime bytes carry the transport, so nothing is filtered
        midi_in.ignore(Ignore::None);

        let ports = midi_in.ports();
        let port = ports
            .get(source_index)
            .ok_or_else(|| anyhow!("MIDI source {} not found", source_index))?;
        let port_name = midi_in
            .port_name(port)
            .unwrap_or_else(|_| format!("Unknown {}", source_index));

        let (tx, rx): (Sender<MidiMessage>, Receiver<MidiMessage>) = mpsc::channel();

        let connection = midi_in
            .connect(
                port,
                "pewbox-transport",
                move |_timestamp_us, data, _| {
                    if let Some(msg) = MidiMessage::parse(data) {
                        let _ = tx.send(msg);
                    }
                },
                (),
            )
            .map_err(|e| anyhow!("Failed to connect to MIDI source {}: {}", source_index, e))?;

        info!(source = source_index, port = %port_name, "MIDI transport connected");

        Ok(Self {
            _connection: connection,
            receiver: rx,
            port_name,
        })
    }

    /// Name of the connected port
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Try to receive the next raw MIDI message (non-blocking)
    pub fn try_recv_message(&self) -> Option<MidiMessage> {
        self.receiver.try_recv().ok()
    }

    /// Try to receive the next transport event (non-blocking).
    ///
    /// Messages with no transport meaning are discarded.
    pub fn try_recv(&self) -> Option<TransportEvent> {
        while let Some(msg) = self.try_recv_message() {
            if let Some(event) = TransportEvent::from_message(&msg) {
                return Some(event);
            }
        }
        None
    }

    /// Receive all pending transport events
    pub fn recv_all(&self) -> Vec<TransportEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.try_recv() {
            events.push(event);
        }
        events
    }
}

/// List all available MIDI sources
pub fn list_sources() -> Result<Vec<(usize, String)>> {
    let midi_in = MidiInput::new(CLIENT_NAME)
        .map_err(|e| anyhow!("Failed to create MIDI client: {}", e))?;

    Ok(midi_in
        .ports()
        .iter()
        .enumerate()
        .map(|(i, port)| {
            let name = midi_in
                .port_name(port)
                .unwrap_or_else(|_| format!("Unknown {}", i));
            (i, name)
        })
        .collect())
}

/// Print all available MIDI sources to stdout
pub fn print_sources() -> Result<()> {
    let sources = list_sources()?;
    if sources.is_empty() {
        println!("No MIDI sources found.");
    } else {
        println!("Available MIDI sources (inputs):");
        for (i, name) in sources {
            println!("  {}: {}", i, name);
        }
    }
    Ok(())
}
