// Copyright (c) 2024 Mike Tsao. All rights reserved.

//! Creation and representation of note timelines.

use crate::time::{Tick, TicksPerBeat};
use delegate::delegate;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// A [NoteEvent] is a single played note: which key it sounds, and the tick
/// range during which it sounds. The two transition flags are playback
/// state, not score data; each moves from false to true at most once per
/// performance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NoteEvent {
    /// The MIDI key code for the note. 69 is (usually) A4.
    pub key: u8,
    /// When the note starts sounding.
    pub start: Tick,
    /// When the note stops sounding. A resolved end can precede `start`;
    /// playback treats that as a zero-length note, not as corruption.
    pub end: Tick,

    #[serde(skip)]
    activated: bool,
    #[serde(skip)]
    deactivated: bool,
}
impl NoteEvent {
    /// Creates a [NoteEvent] from a key and a start/end tick pair.
    pub fn new_with(key: u8, start: Tick, end: Tick) -> Self {
        Self {
            key,
            start,
            end,
            activated: false,
            deactivated: false,
        }
    }

    /// Whether the playback clock has crossed `start`.
    pub fn is_activated(&self) -> bool {
        self.activated
    }

    /// Whether the playback clock has crossed `end`.
    pub fn is_deactivated(&self) -> bool {
        self.deactivated
    }

    pub(crate) fn mark_activated(&mut self) {
        self.activated = true;
    }

    pub(crate) fn mark_deactivated(&mut self) {
        self.deactivated = true;
    }

    pub(crate) fn clear_transitions(&mut self) {
        self.activated = false;
        self.deactivated = false;
    }
}

/// One voice's notes, in the order the log opened them. That insertion
/// order is load-bearing: note_off resolution picks the oldest still-open
/// note of the same key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(default)]
#[serde(rename_all = "kebab-case")]
pub struct Track {
    #[allow(missing_docs)]
    #[builder(setter(each(name = "note", into)))]
    pub notes: Vec<NoteEvent>,
}

/// The full parse result: tick resolution plus every declared track.
/// Immutable after parsing except for the per-note transition flags.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(default)]
#[serde(rename_all = "kebab-case")]
pub struct Timeline {
    ticks_per_beat: TicksPerBeat,
    #[builder(setter(each(name = "track", into)))]
    tracks: Vec<Track>,
}
impl Timeline {
    /// Creates a [Timeline] with `track_count` empty tracks.
    pub fn new_with(ticks_per_beat: TicksPerBeat, track_count: usize) -> Self {
        Self {
            ticks_per_beat,
            tracks: vec![Track::default(); track_count],
        }
    }

    pub(crate) fn from_parts(ticks_per_beat: TicksPerBeat, tracks: Vec<Track>) -> Self {
        Self {
            ticks_per_beat,
            tracks,
        }
    }

    #[allow(missing_docs)]
    pub fn ticks_per_beat(&self) -> TicksPerBeat {
        self.ticks_per_beat
    }

    #[allow(missing_docs)]
    pub fn tracks(&self) -> &[Track] {
        self.tracks.as_ref()
    }

    pub(crate) fn tracks_mut(&mut self) -> &mut Vec<Track> {
        &mut self.tracks
    }

    delegate! {
        to self.tracks {
            /// How many tracks the log declared.
            #[call(len)]
            pub fn track_count(&self) -> usize;
            /// Whether the log declared no tracks at all.
            pub fn is_empty(&self) -> bool;
        }
    }

    /// Total number of notes across every track.
    pub fn note_count(&self) -> usize {
        self.tracks.iter().map(|track| track.notes.len()).sum()
    }

    /// The largest end tick anywhere in the timeline, or zero when there
    /// are no notes.
    pub fn final_tick(&self) -> Tick {
        self.tracks
            .iter()
            .flat_map(|track| track.notes.iter())
            .map(|note| note.end)
            .max()
            .unwrap_or(0)
    }
}
