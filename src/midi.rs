// Copyright (c) 2024 Mike Tsao. All rights reserved.

//! Management of the MIDI-related information that flows within the system.

use derive_more::Display as DeriveDisplay;
use serde::{Deserialize, Serialize};

pub use midly::live::LiveEvent;
pub use midly::{
    num::{u4, u7},
    MidiMessage,
};

/// Recommended imports for easy onboarding.
pub mod prelude {
    pub use super::{
        new_note_off, new_note_on, u4, u7, LiveEvent, MidiChannel, MidiMessage, REPLAY_VELOCITY,
    };
}

/// Newtype for MIDI channel.
#[derive(
    Clone, Copy, Debug, Default, DeriveDisplay, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub struct MidiChannel(pub u8);
#[allow(missing_docs)]
impl MidiChannel {
    pub const MIN_VALUE: u8 = 0;
    pub const MAX_VALUE: u8 = 15; // inclusive

    pub const fn new(value: u8) -> Self {
        Self(value)
    }
}
impl From<u4> for MidiChannel {
    fn from(value: u4) -> Self {
        Self(value.as_int())
    }
}
impl From<u8> for MidiChannel {
    fn from(value: u8) -> Self {
        Self(value)
    }
}
impl From<MidiChannel> for u8 {
    fn from(value: MidiChannel) -> Self {
        value.0
    }
}

/// The velocity the replay programs attach to every message they send. The
/// log's original velocities affect only whether a note_on counts as an
/// activation, never what goes out the port.
pub const REPLAY_VELOCITY: u8 = 64;

/// Convenience function to make a note-on [MidiMessage].
pub fn new_note_on(note: u8, vel: u8) -> MidiMessage {
    MidiMessage::NoteOn {
        key: u7::from(note),
        vel: u7::from(vel),
    }
}

/// Convenience function to make a note-off [MidiMessage].
pub fn new_note_off(note: u8, vel: u8) -> MidiMessage {
    MidiMessage::NoteOff {
        key: u7::from(note),
        vel: u7::from(vel),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(channel: MidiChannel, message: MidiMessage) -> Vec<u8> {
        let mut buffer = Vec::new();
        let event = LiveEvent::Midi {
            channel: u4::from(channel.0),
            message,
        };
        event.write(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn note_messages_render_to_three_bytes() {
        assert_eq!(
            render(MidiChannel(0), new_note_on(60, REPLAY_VELOCITY)),
            vec![0x90, 60, 64]
        );
        assert_eq!(
            render(MidiChannel(0), new_note_off(60, REPLAY_VELOCITY)),
            vec![0x80, 60, 64]
        );
    }

    #[test]
    fn channel_lands_in_status_nibble() {
        assert_eq!(
            render(MidiChannel(3), new_note_on(72, 100)),
            vec![0x93, 72, 100]
        );
    }
}
