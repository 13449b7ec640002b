// Copyright (c) 2024 Mike Tsao. All rights reserved.

//! Talking to external MIDI output devices.

use crate::{
    midi::{new_note_off, new_note_on, u4, LiveEvent, MidiChannel, MidiMessage, REPLAY_VELOCITY},
    traits::NoteTransition,
};
use midir::{MidiOutput, MidiOutputConnection};
use std::fmt;
use thiserror::Error;

/// The client name the OS's MIDI subsystem shows for our connections.
const CLIENT_NAME: &str = "crim2s";

/// Ways the MIDI interface can fail before or during a performance.
#[derive(Debug, Error)]
pub enum MidiError {
    /// Zero output ports exist. Fatal; there is nothing to perform into.
    #[error("no MIDI output ports are available")]
    NoPortAvailable,
    /// The caller asked for a port index the system doesn't have.
    #[error("MIDI output port {index} doesn't exist ({available} available)")]
    PortOutOfRange {
        #[allow(missing_docs)]
        index: usize,
        #[allow(missing_docs)]
        available: usize,
    },
    #[allow(missing_docs)]
    #[error(transparent)]
    Init(#[from] midir::InitError),
    #[allow(missing_docs)]
    #[error(transparent)]
    Connect(#[from] midir::ConnectError<MidiOutput>),
    #[allow(missing_docs)]
    #[error(transparent)]
    Send(#[from] midir::SendError),
}

/// Identifies one of the system's MIDI output ports.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MidiPortDescriptor {
    #[allow(missing_docs)]
    pub index: usize,
    #[allow(missing_docs)]
    pub name: String,
}
impl fmt::Display for MidiPortDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{}: {}", self.index, self.name))
    }
}

/// [MidiSink] owns one open output connection and renders transitions into
/// the fixed 3-byte messages the synthesizer side expects: activation
/// `[0x90, key, 64]`, deactivation `[0x80, key, 64]`.
pub struct MidiSink {
    conn: MidiOutputConnection,
    channel: MidiChannel,
}
impl fmt::Debug for MidiSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MidiSink")
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}
impl MidiSink {
    /// Describes the available output ports without opening any of them.
    pub fn ports() -> Result<Vec<MidiPortDescriptor>, MidiError> {
        let output = MidiOutput::new(CLIENT_NAME)?;
        Ok(output
            .ports()
            .iter()
            .enumerate()
            .map(|(index, port)| MidiPortDescriptor {
                index,
                name: output
                    .port_name(port)
                    .unwrap_or_else(|_| "unknown".to_string()),
            })
            .collect())
    }

    /// Opens the first available output port.
    pub fn open_default() -> Result<Self, MidiError> {
        Self::open(0)
    }

    /// Opens the output port at `index`. Everything goes out on channel 0,
    /// whatever channel the log recorded.
    pub fn open(index: usize) -> Result<Self, MidiError> {
        let output = MidiOutput::new(CLIENT_NAME)?;
        let ports = output.ports();
        if ports.is_empty() {
            return Err(MidiError::NoPortAvailable);
        }
        let port = ports.get(index).ok_or(MidiError::PortOutOfRange {
            index,
            available: ports.len(),
        })?;
        let conn = output.connect(port, "crim2s-out")?;
        Ok(Self {
            conn,
            channel: MidiChannel::default(),
        })
    }

    /// Sends one live message on the sink's channel.
    pub fn send(&mut self, message: MidiMessage) -> Result<(), MidiError> {
        let event = LiveEvent::Midi {
            channel: u4::from(self.channel.0),
            message,
        };
        let mut buffer = Vec::with_capacity(3);
        // Writing into a Vec can't fail.
        let _ = event.write(&mut buffer);
        self.conn.send(&buffer)?;
        Ok(())
    }

    /// Renders a transition into its 3-byte message and sends it.
    pub fn send_transition(&mut self, transition: &NoteTransition) -> Result<(), MidiError> {
        let message = match transition {
            NoteTransition::Activate { key, .. } => new_note_on(*key, REPLAY_VELOCITY),
            NoteTransition::Deactivate { key, .. } => new_note_off(*key, REPLAY_VELOCITY),
        };
        self.send(message)
    }
}
