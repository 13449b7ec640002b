// Copyright (c) 2024 Mike Tsao. All rights reserved.

//! Describes major system interfaces.

/// The one-time state change a note undergoes when the playback clock
/// crosses its start or end tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoteTransition {
    /// The clock crossed the note's start tick.
    Activate {
        /// Which track the note belongs to.
        track: usize,
        /// The MIDI key code.
        key: u8,
    },
    /// The clock crossed the note's end tick.
    Deactivate {
        #[allow(missing_docs)]
        track: usize,
        #[allow(missing_docs)]
        key: u8,
    },
}
impl NoteTransition {
    #[allow(missing_docs)]
    pub fn track(&self) -> usize {
        match self {
            Self::Activate { track, .. } | Self::Deactivate { track, .. } => *track,
        }
    }

    #[allow(missing_docs)]
    pub fn key(&self) -> u8 {
        match self {
            Self::Activate { key, .. } | Self::Deactivate { key, .. } => *key,
        }
    }

    /// Whether this is the note turning on.
    pub fn is_activation(&self) -> bool {
        matches!(self, Self::Activate { .. })
    }
}

/// The callback through which a [Performs] implementation reports
/// transitions. One call might forward them to a synthesizer, update a
/// color state, or both; the performer doesn't care.
pub type TransitionsFn<'a> = dyn FnMut(NoteTransition) + 'a;

/// Something that can be polled once per rendering frame and emits each
/// note transition exactly once.
pub trait Performs: Send {
    /// Performs work for the wall-clock time elapsed since playback
    /// started, reporting any transitions through `transitions_fn`.
    /// Implementations must tolerate any number of polls with
    /// non-decreasing elapsed times without re-emitting a transition that
    /// already fired.
    fn poll(&mut self, elapsed_seconds: f64, transitions_fn: &mut TransitionsFn);

    /// Returns true when no further transitions can ever be emitted. The
    /// frame loop keeps running until every performer says so.
    fn is_finished(&self) -> bool;

    /// Tells the performer to start reporting transitions when polled.
    fn play(&mut self) {}

    /// Tells the performer to stop. A play() after a stop() resumes.
    fn stop(&mut self) {}

    /// Rewinds to the beginning, allowing every transition to fire again.
    fn skip_to_start(&mut self) {}

    /// Whether the performer is currently playing.
    fn is_performing(&self) -> bool {
        false
    }
}
