// Copyright (c) 2024 Mike Tsao. All rights reserved.

//! End-to-end checks of the parse → play pipeline through the public API.

use crim2s::prelude::*;
use std::io::Cursor;

const DEMO_LOG: &str = include_str!("../res/demo.crim2s");

fn collect(player: &mut TimelinePlayer, elapsed_seconds: f64) -> Vec<NoteTransition> {
    let mut transitions = Vec::default();
    player.poll(elapsed_seconds, &mut |t| transitions.push(t));
    transitions
}

#[test]
fn single_note_round_trip() {
    let parsed = ParsedLog::read(Cursor::new(
        "Ticks per beat: 480\n\
         Número de pistas: 1\n\
         Eventos:\n\
         Time=0 Track=0 note_on channel=0 note=60 velocity=64\n\
         Time=960 Track=0 note_off channel=0 note=60 velocity=0\n",
    ))
    .unwrap();
    assert!(parsed.warnings.is_empty());
    assert_eq!(parsed.timeline.track_count(), 1);
    assert_eq!(
        parsed.timeline.tracks()[0].notes,
        vec![NoteEvent::new_with(60, 0, 960)]
    );

    // 480 ticks/beat at 120 BPM is 960 ticks per second.
    let mut player = TimelinePlayer::new_with(parsed.timeline, Tempo(120.0));
    player.play();
    assert_eq!(
        collect(&mut player, 0.0),
        vec![NoteTransition::Activate { track: 0, key: 60 }]
    );
    assert_eq!(
        collect(&mut player, 1.0),
        vec![NoteTransition::Deactivate { track: 0, key: 60 }]
    );
    assert!(collect(&mut player, 2.0).is_empty());
    assert!(player.is_finished());
}

#[test]
fn demo_log_parses_clean_and_plays_through() {
    let parsed = ParsedLog::read(Cursor::new(DEMO_LOG)).unwrap();
    assert!(parsed.warnings.is_empty(), "the demo log has no anomalies");
    assert_eq!(parsed.timeline.track_count(), 2);
    assert_eq!(parsed.timeline.note_count(), 6);
    assert_eq!(parsed.timeline.final_tick(), 1920);

    let mut player = TimelinePlayer::new_with(parsed.timeline, Tempo(120.0));
    player.play();

    // Walk well past the end in a few polls; every note must turn on and
    // off exactly once.
    let mut transitions = Vec::default();
    for elapsed in [0.0, 0.5, 1.0, 1.5, 2.0, 10.0] {
        player.poll(elapsed, &mut |t| transitions.push(t));
    }
    assert!(player.is_finished());
    assert_eq!(transitions.len(), 12);
    assert_eq!(
        transitions.iter().filter(|t| t.is_activation()).count(),
        6,
        "one activation per note"
    );

    // The sink would render these as fixed 3-byte messages; the color
    // state follows along per track.
    let mut colors = [
        TrackColorState::new_with(MixStrategy::Sum),
        TrackColorState::new_with(MixStrategy::Sum),
    ];
    for transition in &transitions {
        colors[transition.track()].apply(*transition);
    }
    assert_eq!(colors[0].color(), Color::BLACK, "everything released");
    assert_eq!(colors[1].color(), Color::BLACK);
}

#[test]
fn unterminated_note_borrows_the_global_final_tick() {
    let parsed = ParsedLog::read(Cursor::new(
        "Número de pistas: 2\n\
         Eventos:\n\
         Time=0 Track=0 note_on channel=0 note=60 velocity=64\n\
         Time=100 Track=1 note_on channel=0 note=72 velocity=64\n\
         Time=2000 Track=1 note_off channel=0 note=72 velocity=0\n",
    ))
    .unwrap();
    let unterminated = &parsed.timeline.tracks()[0].notes[0];
    assert_eq!(unterminated.end, 2000);
}

#[test]
fn anomalous_lines_do_not_stop_a_parse() {
    let parsed = ParsedLog::read(Cursor::new(
        "Ticks per beat: 480\n\
         Número de pistas: 1\n\
         Eventos:\n\
         Time=0 Track=7 note_on channel=0 note=60 velocity=64\n\
         garbage that matches nothing\n\
         Time=0 Track=0 note_on channel=0 note=60 velocity=64\n\
         Time=480 Track=0 note_off channel=0 note=60 velocity=0\n",
    ))
    .unwrap();
    assert_eq!(parsed.warnings.len(), 1, "only the out-of-range track");
    assert_eq!(parsed.timeline.track_count(), 1);
    assert_eq!(parsed.timeline.note_count(), 1);
}
