// Copyright (c) 2024 Mike Tsao. All rights reserved.

#![warn(missing_docs)]

//! `crim2s` replays note events captured in the crim2s text log format. It
//! parses a log into a timeline of notes per track, walks that timeline
//! against a wall clock, and reports each note's activation and
//! deactivation exactly once so that a synthesizer can be triggered and a
//! renderer can be redrawn. Everything visual beyond the shared pitch-class
//! palette lives outside this crate.

/// Creation and representation of note timelines.
pub mod composition;
/// MIDI message construction and related types.
pub mod midi;
/// Talking to external MIDI output devices.
pub mod midi_interface;
/// Pitch-class colors and the strategies for blending them.
pub mod palette;
/// Reading the crim2s log format.
pub mod parser;
/// Replays a parsed timeline against a wall clock.
pub mod player;
/// Reads a streaming crim2s event source on a background thread.
pub mod stream;
/// Handles wall-clock and musical time.
pub mod time;
/// Describes major system interfaces.
pub mod traits;
/// Drives a performer once per rendering frame.
pub mod transport;
/// Various helpers.
pub mod util;

/// Recommended imports for easy onboarding.
pub mod prelude {
    pub use crate::{
        composition::{NoteEvent, Timeline, TimelineBuilder, Track, TrackBuilder},
        midi::prelude::*,
        midi_interface::{MidiError, MidiPortDescriptor, MidiSink},
        palette::{Color, MixStrategy, PitchClass, TrackColorState},
        parser::{EventRecord, LogHeader, ParseError, ParseWarning, ParsedLog},
        player::TimelinePlayer,
        stream::{LogStreamEvent, LogStreamService, StreamPlayer},
        time::{Tempo, Tick, TicksPerBeat},
        traits::{NoteTransition, Performs, TransitionsFn},
        transport::Transport,
    };
}
