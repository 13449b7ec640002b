// Copyright (c) 2024 Mike Tsao. All rights reserved.

//! Pitch-class colors and the strategies for blending them.
//!
//! Every visualizer shares one 12-entry palette, indexed by pitch class, so
//! the same note looks the same everywhere. What happens when several notes
//! sound at once is the renderer's only real choice, and it's a closed one:
//! saturating sum or sequential average.

use crate::traits::NoteTransition;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumCount, EnumIter, EnumString, FromRepr};

/// An RGB color. The palette carries no alpha; renderers add their own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Color {
    #[allow(missing_docs)]
    pub r: u8,
    #[allow(missing_docs)]
    pub g: u8,
    #[allow(missing_docs)]
    pub b: u8,
}
impl Color {
    /// What an idle track shows.
    pub const BLACK: Self = Self::new(0, 0, 0);

    #[allow(missing_docs)]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// The palette entry for a MIDI key, by pitch class.
    pub fn for_key(key: u8) -> Self {
        PitchClass::from_key(key).color()
    }
}

/// The twelve pitch classes, in palette order starting at C.
#[derive(Clone, Copy, Debug, EnumCount, EnumIter, Eq, FromRepr, PartialEq)]
#[allow(missing_docs)]
pub enum PitchClass {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}
impl PitchClass {
    /// The pitch class of a MIDI key. Key 0 is a C.
    pub fn from_key(key: u8) -> Self {
        Self::from_repr((key % 12) as usize).unwrap_or(Self::C)
    }

    /// This pitch class's fixed palette entry.
    pub fn color(&self) -> Color {
        NOTE_PALETTE[*self as usize]
    }
}

/// The shared palette: a rainbow walk from C=red around to B=rose.
pub const NOTE_PALETTE: [Color; 12] = [
    Color::new(255, 0, 0),
    Color::new(255, 127, 0),
    Color::new(255, 255, 0),
    Color::new(127, 255, 0),
    Color::new(0, 255, 0),
    Color::new(0, 255, 127),
    Color::new(0, 255, 255),
    Color::new(0, 127, 255),
    Color::new(0, 0, 255),
    Color::new(127, 0, 255),
    Color::new(255, 0, 255),
    Color::new(255, 0, 127),
];

/// How simultaneous note colors combine into one track color.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, EnumIter, EnumString, Eq, PartialEq,
    Serialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "lowercase")]
pub enum MixStrategy {
    /// Per-channel saturating add. Stacked notes head toward white.
    #[default]
    Sum,
    /// Sequential pairwise mean, in activation order. Later notes weigh
    /// more than earlier ones; that bias is part of the look.
    Average,
}
impl MixStrategy {
    /// Blends two colors.
    pub fn mix(&self, a: Color, b: Color) -> Color {
        match self {
            Self::Sum => Color::new(
                a.r.saturating_add(b.r),
                a.g.saturating_add(b.g),
                a.b.saturating_add(b.b),
            ),
            Self::Average => Color::new(
                ((a.r as u16 + b.r as u16) / 2) as u8,
                ((a.g as u16 + b.g as u16) / 2) as u8,
                ((a.b as u16 + b.b as u16) / 2) as u8,
            ),
        }
    }

    /// Folds a whole set of active colors into one. Black when empty.
    pub fn blend(&self, colors: &[Color]) -> Color {
        if colors.is_empty() {
            return Color::BLACK;
        }
        colors
            .iter()
            .skip(1)
            .fold(colors[0], |mixed, color| self.mix(mixed, *color))
    }
}

/// The colors of one track's currently sounding notes, plus their blend.
/// Feed it every transition for its track and read [color](Self::color)
/// each frame.
#[derive(Clone, Debug)]
pub struct TrackColorState {
    strategy: MixStrategy,
    active: Vec<Color>,
    current: Color,
}
impl TrackColorState {
    #[allow(missing_docs)]
    pub fn new_with(strategy: MixStrategy) -> Self {
        Self {
            strategy,
            active: Vec::default(),
            current: Color::BLACK,
        }
    }

    /// Applies one transition to the active-color set.
    pub fn apply(&mut self, transition: NoteTransition) {
        match transition {
            NoteTransition::Activate { key, .. } => self.note_activated(key),
            NoteTransition::Deactivate { key, .. } => self.note_deactivated(key),
        }
    }

    #[allow(missing_docs)]
    pub fn note_activated(&mut self, key: u8) {
        self.active.push(Color::for_key(key));
        self.current = self.strategy.blend(&self.active);
    }

    /// Removes the first occurrence of the key's color. Octave-apart notes
    /// share a color, so removal is first-match, mirroring the note_off
    /// resolution policy.
    pub fn note_deactivated(&mut self, key: u8) {
        let color = Color::for_key(key);
        if let Some(position) = self.active.iter().position(|c| *c == color) {
            self.active.remove(position);
        } else {
            log::warn!("no active color for key {key}; releases outnumber presses");
        }
        self.current = self.strategy.blend(&self.active);
    }

    /// The current blend of every active note.
    pub fn color(&self) -> Color {
        self.current
    }

    /// How many notes are sounding right now.
    pub fn active_notes(&self) -> usize {
        self.active.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::{EnumCount, IntoEnumIterator};

    #[test]
    fn palette_covers_every_pitch_class() {
        assert_eq!(NOTE_PALETTE.len(), PitchClass::COUNT);
        for (index, pitch_class) in PitchClass::iter().enumerate() {
            assert_eq!(pitch_class.color(), NOTE_PALETTE[index]);
        }
        assert_eq!(PitchClass::from_key(60), PitchClass::C);
        assert_eq!(PitchClass::from_key(61), PitchClass::CSharp);
        assert_eq!(PitchClass::from_key(71), PitchClass::B);
        assert_eq!(
            Color::for_key(60),
            Color::for_key(72),
            "octaves share a color"
        );
        assert_eq!(Color::for_key(60), Color::new(255, 0, 0));
    }

    #[test]
    fn sum_saturates_per_channel() {
        let strategy = MixStrategy::Sum;
        assert_eq!(
            strategy.mix(Color::new(200, 10, 0), Color::new(100, 10, 0)),
            Color::new(255, 20, 0)
        );
    }

    #[test]
    fn average_is_a_sequential_fold() {
        let strategy = MixStrategy::Average;
        assert_eq!(
            strategy.mix(Color::new(100, 0, 0), Color::new(200, 0, 0)),
            Color::new(150, 0, 0)
        );
        // ((a+b)/2 + c)/2, not (a+b+c)/3.
        assert_eq!(
            strategy.blend(&[
                Color::new(100, 0, 0),
                Color::new(200, 0, 0),
                Color::new(50, 0, 0),
            ]),
            Color::new(100, 0, 0)
        );
    }

    #[test]
    fn blend_of_nothing_is_black() {
        for strategy in MixStrategy::iter() {
            assert_eq!(strategy.blend(&[]), Color::BLACK);
        }
    }

    #[test]
    fn strategies_parse_from_cli_spelling() {
        assert_eq!(MixStrategy::from_str("sum").unwrap(), MixStrategy::Sum);
        assert_eq!(
            MixStrategy::from_str("average").unwrap(),
            MixStrategy::Average
        );
        assert!(
            MixStrategy::from_str("multiply").is_err(),
            "the strategy set is closed"
        );
    }

    #[test]
    fn track_color_state_follows_transitions() {
        let mut state = TrackColorState::new_with(MixStrategy::Sum);
        assert_eq!(state.color(), Color::BLACK);

        state.apply(NoteTransition::Activate { track: 0, key: 60 }); // red
        assert_eq!(state.color(), Color::new(255, 0, 0));

        state.apply(NoteTransition::Activate { track: 0, key: 64 }); // green
        assert_eq!(state.active_notes(), 2);
        assert_eq!(state.color(), Color::new(255, 255, 0));

        state.apply(NoteTransition::Deactivate { track: 0, key: 60 });
        assert_eq!(state.color(), Color::new(0, 255, 0));

        state.apply(NoteTransition::Deactivate { track: 0, key: 64 });
        assert_eq!(state.color(), Color::BLACK);
        assert_eq!(state.active_notes(), 0);
    }

    #[test]
    fn excess_release_leaves_state_consistent() {
        let mut state = TrackColorState::new_with(MixStrategy::Average);
        state.note_deactivated(60);
        assert_eq!(state.color(), Color::BLACK);
        assert_eq!(state.active_notes(), 0);
    }
}
