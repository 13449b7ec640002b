// Copyright (c) 2024 Mike Tsao. All rights reserved.

use crate::{
    composition::Timeline,
    time::Tempo,
    traits::{NoteTransition, Performs, TransitionsFn},
};

/// Parts of [TimelinePlayer] that aren't part of the score itself.
#[derive(Debug, Default)]
struct TimelinePlayerEphemerals {
    ticks_per_second: f64,
    is_performing: bool,
}

/// [TimelinePlayer] walks a parsed [Timeline] against a wall clock,
/// reporting each note's activation and deactivation exactly once.
///
/// The player is polled, not interrupt-driven: the frame loop calls
/// [poll](Performs::poll) with the elapsed seconds since playback started,
/// and the player does a full linear scan of every track. The per-note
/// flags only ever move from false to true, which is what makes repeated
/// polling idempotent. There are no playback-time error conditions, only
/// transitions that have or haven't fired yet.
#[derive(Debug)]
pub struct TimelinePlayer {
    timeline: Timeline,
    tempo: Tempo,
    e: TimelinePlayerEphemerals,
}
impl TimelinePlayer {
    /// Creates a player that owns the timeline for the playback session.
    pub fn new_with(timeline: Timeline, tempo: Tempo) -> Self {
        let ticks_per_second = timeline.ticks_per_beat().ticks_per_second(tempo);
        Self {
            timeline,
            tempo,
            e: TimelinePlayerEphemerals {
                ticks_per_second,
                is_performing: false,
            },
        }
    }

    #[allow(missing_docs)]
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    #[allow(missing_docs)]
    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    /// Gives the timeline back, e.g. to replay it at a different tempo.
    pub fn into_timeline(self) -> Timeline {
        self.timeline
    }
}
impl Performs for TimelinePlayer {
    fn poll(&mut self, elapsed_seconds: f64, transitions_fn: &mut TransitionsFn) {
        if !self.e.is_performing {
            return;
        }
        let ticks_per_second = self.e.ticks_per_second;
        for (track_index, track) in self.timeline.tracks_mut().iter_mut().enumerate() {
            for note in track.notes.iter_mut() {
                // Activation is checked first so a zero-length note still
                // reports a well-ordered on/off pair within one poll.
                if !note.is_activated() && elapsed_seconds >= note.start as f64 / ticks_per_second {
                    note.mark_activated();
                    transitions_fn(NoteTransition::Activate {
                        track: track_index,
                        key: note.key,
                    });
                }
                // Independent of the activation check: a malformed log can
                // put a note's end before its start, and the release must
                // still fire exactly once.
                if !note.is_deactivated() && elapsed_seconds >= note.end as f64 / ticks_per_second {
                    note.mark_deactivated();
                    transitions_fn(NoteTransition::Deactivate {
                        track: track_index,
                        key: note.key,
                    });
                }
            }
        }
    }

    fn is_finished(&self) -> bool {
        self.timeline.tracks().iter().all(|track| {
            track
                .notes
                .iter()
                .all(|note| note.is_activated() && note.is_deactivated())
        })
    }

    fn play(&mut self) {
        self.e.is_performing = true;
    }

    fn stop(&mut self) {
        self.e.is_performing = false;
    }

    fn skip_to_start(&mut self) {
        for track in self.timeline.tracks_mut().iter_mut() {
            for note in track.notes.iter_mut() {
                note.clear_transitions();
            }
        }
    }

    fn is_performing(&self) -> bool {
        self.e.is_performing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        composition::{NoteEvent, TimelineBuilder, TrackBuilder},
        time::TicksPerBeat,
    };

    // 480 ticks/beat at 120 BPM puts one tick at ~1.04ms and tick 960 at
    // exactly one second.
    fn one_note_player(start: i64, end: i64) -> TimelinePlayer {
        let timeline = TimelineBuilder::default()
            .ticks_per_beat(TicksPerBeat(480))
            .track(
                TrackBuilder::default()
                    .note(NoteEvent::new_with(60, start, end))
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();
        let mut player = TimelinePlayer::new_with(timeline, Tempo(120.0));
        player.play();
        player
    }

    fn collect(player: &mut TimelinePlayer, elapsed_seconds: f64) -> Vec<NoteTransition> {
        let mut transitions = Vec::default();
        player.poll(elapsed_seconds, &mut |t| transitions.push(t));
        transitions
    }

    #[test]
    fn transitions_fire_at_their_thresholds() {
        let mut player = one_note_player(0, 960);
        assert_eq!(
            collect(&mut player, 0.0),
            vec![NoteTransition::Activate { track: 0, key: 60 }]
        );
        assert!(!player.is_finished());
        assert_eq!(
            collect(&mut player, 1.0),
            vec![NoteTransition::Deactivate { track: 0, key: 60 }]
        );
        assert!(player.is_finished());
        assert!(collect(&mut player, 2.0).is_empty());
    }

    #[test]
    fn nothing_fires_before_the_threshold() {
        let mut player = one_note_player(960, 1920);
        assert!(collect(&mut player, 0.5).is_empty());
        assert_eq!(collect(&mut player, 1.0).len(), 1);
    }

    #[test]
    fn repolling_at_the_same_time_emits_nothing_new() {
        let mut player = one_note_player(0, 960);
        assert_eq!(collect(&mut player, 1.5).len(), 2);
        assert!(
            collect(&mut player, 1.5).is_empty(),
            "flags are monotone; a second poll at the same time is a no-op"
        );
    }

    #[test]
    fn zero_length_note_reports_on_before_off_in_one_poll() {
        let mut player = one_note_player(480, 480);
        let transitions = collect(&mut player, 2.0);
        assert_eq!(
            transitions,
            vec![
                NoteTransition::Activate { track: 0, key: 60 },
                NoteTransition::Deactivate { track: 0, key: 60 },
            ]
        );
    }

    #[test]
    fn deactivation_can_run_ahead_of_activation() {
        // A malformed log resolved this note's end before its start.
        let mut player = one_note_player(1920, 0);
        assert_eq!(
            collect(&mut player, 0.0),
            vec![NoteTransition::Deactivate { track: 0, key: 60 }]
        );
        assert!(
            !player.is_finished(),
            "the activation is still owed, so the performance isn't over"
        );
        assert_eq!(
            collect(&mut player, 2.0),
            vec![NoteTransition::Activate { track: 0, key: 60 }]
        );
        assert!(player.is_finished());
    }

    #[test]
    fn paused_player_emits_nothing() {
        let mut player = one_note_player(0, 960);
        player.stop();
        assert!(!player.is_performing());
        assert!(collect(&mut player, 5.0).is_empty());

        player.play();
        assert_eq!(collect(&mut player, 5.0).len(), 2);
    }

    #[test]
    fn skip_to_start_allows_a_replay() {
        let mut player = one_note_player(0, 960);
        assert_eq!(collect(&mut player, 2.0).len(), 2);
        assert!(player.is_finished());

        player.skip_to_start();
        assert!(!player.is_finished());
        assert_eq!(collect(&mut player, 2.0).len(), 2, "everything fires again");
    }

    #[test]
    fn empty_timeline_is_finished_immediately() {
        let timeline = TimelineBuilder::default().build().unwrap();
        let mut player = TimelinePlayer::new_with(timeline, Tempo::default());
        player.play();
        assert!(player.is_finished());
        assert!(collect(&mut player, 10.0).is_empty());
    }

    #[test]
    fn tracks_report_their_own_indices() {
        let timeline = TimelineBuilder::default()
            .ticks_per_beat(TicksPerBeat(480))
            .track(
                TrackBuilder::default()
                    .note(NoteEvent::new_with(60, 0, 480))
                    .build()
                    .unwrap(),
            )
            .track(
                TrackBuilder::default()
                    .note(NoteEvent::new_with(72, 0, 480))
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();
        let mut player = TimelinePlayer::new_with(timeline, Tempo(120.0));
        player.play();
        let transitions = collect(&mut player, 0.0);
        assert_eq!(
            transitions,
            vec![
                NoteTransition::Activate { track: 0, key: 60 },
                NoteTransition::Activate { track: 1, key: 72 },
            ]
        );
    }
}
