// Copyright (c) 2024 Mike Tsao. All rights reserved.

//! Lists the MIDI output ports the player programs can open, in the order
//! their indices are assigned.

use crim2s::prelude::*;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let ports = MidiSink::ports()?;
    if ports.is_empty() {
        println!("no MIDI output ports are available");
    } else {
        for port in ports {
            println!("{port}");
        }
    }
    Ok(())
}
