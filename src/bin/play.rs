// Copyright (c) 2024 Mike Tsao. All rights reserved.

//! Replays a crim2s log file to a MIDI output port, maintaining the
//! per-track color state that a renderer draws from.

use anyhow::{anyhow, ensure, Context};
use crim2s::prelude::*;
use std::env;

/// Overrides the default output port index (0).
const PORT_ENV_VAR: &str = "CRIM2S_MIDI_PORT";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 || args.len() > 4 {
        eprintln!("usage: {} <log.crim2s> <bpm> [sum|average]", args[0]);
        std::process::exit(1);
    }
    let path = &args[1];
    let bpm: f64 = args[2]
        .parse()
        .with_context(|| format!("{} isn't a tempo in BPM", args[2]))?;
    ensure!(bpm > 0.0, "tempo must be positive");
    let strategy = match args.get(3) {
        Some(s) => s
            .parse::<MixStrategy>()
            .map_err(|_| anyhow!("unknown mix strategy {s} (use sum or average)"))?,
        None => MixStrategy::default(),
    };

    let parsed = ParsedLog::load(path)?;
    if !parsed.warnings.is_empty() {
        log::info!("{} records skipped while parsing", parsed.warnings.len());
    }
    ensure!(!parsed.timeline.is_empty(), "no tracks found in {path}");

    let port = env::var(PORT_ENV_VAR)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(0);
    let mut sink = MidiSink::open(port)?;

    let mut colors: Vec<TrackColorState> = (0..parsed.timeline.track_count())
        .map(|_| TrackColorState::new_with(strategy))
        .collect();

    let mut player = TimelinePlayer::new_with(parsed.timeline, Tempo(bpm));
    log::info!(
        "playing {path} ({} notes) at {} on port {port}",
        player.timeline().note_count(),
        player.tempo()
    );

    Transport::default().run(&mut player, &mut |transition| {
        if let Err(e) = sink.send_transition(&transition) {
            log::error!("MIDI send: {e}");
        }
        let state = &mut colors[transition.track()];
        state.apply(transition);
        let color = state.color();
        log::debug!(
            "track {} {} key {} -> rgb({}, {}, {})",
            transition.track(),
            if transition.is_activation() { "on" } else { "off" },
            transition.key(),
            color.r,
            color.g,
            color.b
        );
    });

    Ok(())
}
