// Copyright (c) 2024 Mike Tsao. All rights reserved.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A tick offset in a crim2s log. Signed: nothing guarantees that a note's
/// end comes after its start, and playback tolerates either order.
pub type Tick = i64;

/// Beats per minute.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tempo(pub f64);
impl Default for Tempo {
    fn default() -> Self {
        Self(128.0)
    }
}
impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{:0.2} BPM", self.0))
    }
}
impl From<f64> for Tempo {
    fn from(value: f64) -> Self {
        Self(value)
    }
}
impl Tempo {
    /// The largest value we'll allow.
    pub const MAX_VALUE: f64 = 1024.0;

    /// The smallest value we'll allow. Zero is degenerate: a zero-BPM
    /// performance never advances.
    pub const MIN_VALUE: f64 = 0.0;

    /// A getter for the raw value.
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Beats per second.
    pub fn bps(&self) -> f64 {
        self.0 / 60.0
    }
}

/// The tick resolution a log was captured at. Logs whose header omits the
/// field get the mido default of 480.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicksPerBeat(pub u32);
impl Default for TicksPerBeat {
    fn default() -> Self {
        Self(480)
    }
}
impl fmt::Display for TicksPerBeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{} ticks/beat", self.0))
    }
}
impl TicksPerBeat {
    #[allow(missing_docs)]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// A getter for the raw value.
    pub fn value(&self) -> u32 {
        self.0
    }

    /// How many ticks elapse per wall-clock second at the given tempo.
    pub fn ticks_per_second(&self, tempo: Tempo) -> f64 {
        self.0 as f64 * tempo.bps()
    }

    /// Converts a tick offset to wall-clock seconds at the given tempo.
    pub fn seconds_for_tick(&self, tick: Tick, tempo: Tempo) -> f64 {
        tick as f64 / self.ticks_per_second(tempo)
    }
}
