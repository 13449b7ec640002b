// Copyright (c) 2024 Mike Tsao. All rights reserved.

//! Interprets a streaming crim2s source (a named pipe fed by a live MIDI
//! extractor, or stdin), triggering the MIDI output as records arrive.

use anyhow::anyhow;
use crim2s::prelude::*;
use std::{
    env,
    fs::File,
    io::{self, BufRead, BufReader},
};

/// Overrides the default output port index (0).
const PORT_ENV_VAR: &str = "CRIM2S_MIDI_PORT";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("usage: {} <pipe|-> [sum|average]", args[0]);
        std::process::exit(1);
    }
    let source = &args[1];
    let strategy = match args.get(2) {
        Some(s) => s
            .parse::<MixStrategy>()
            .map_err(|_| anyhow!("unknown mix strategy {s} (use sum or average)"))?,
        None => MixStrategy::default(),
    };

    let reader: Box<dyn BufRead + Send> = if source == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        Box::new(BufReader::new(
            File::open(source).map_err(|e| anyhow!("couldn't open {source}: {e}"))?,
        ))
    };

    let port = env::var(PORT_ENV_VAR)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(0);
    let mut sink = MidiSink::open(port)?;

    let mut colors: Vec<TrackColorState> = Vec::default();
    let mut player = StreamPlayer::new_with(LogStreamService::spawn(reader));
    log::info!("interpreting {source} on port {port}");

    Transport::default().run(&mut player, &mut |transition| {
        if transition.track() >= colors.len() {
            // Streams don't pre-declare a usable track count; grow as
            // records name new tracks.
            colors.resize_with(transition.track() + 1, || {
                TrackColorState::new_with(strategy)
            });
        }
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

    player.exit();
    Ok(())
}
