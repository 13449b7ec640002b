// Copyright (c) 2024 Mike Tsao. All rights reserved.

//! Prints the parsed form of a crim2s log as JSON: what the players will
//! actually see after header defaults, FIFO pairing, and unterminated-note
//! resolution.

use crim2s::prelude::*;
use std::env;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("usage: {} <log.crim2s>", args[0]);
        std::process::exit(1);
    }

    let parsed = ParsedLog::load(&args[1])?;
    if !parsed.warnings.is_empty() {
        log::info!("{} records skipped while parsing", parsed.warnings.len());
    }
    println!("{}", serde_json::to_string_pretty(&parsed.timeline)?);
    Ok(())
}
