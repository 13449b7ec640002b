// Copyright (c) 2024 Mike Tsao. All rights reserved.

use crate::traits::{Performs, TransitionsFn};
use std::time::{Duration, Instant};

// Matches the 60Hz render loops this crate's players were lifted out of.
const DEFAULT_FRAME_RATE: usize = 60;

/// [Transport] owns the frame loop: it starts a wall clock, polls a
/// performer with monotonically non-decreasing elapsed seconds, and sleeps
/// a fixed period between polls until the performer reports it is
/// finished. The performer needs no timers of its own.
#[derive(Clone, Copy, Debug)]
pub struct Transport {
    frame_rate: usize,
}
impl Default for Transport {
    fn default() -> Self {
        Self {
            frame_rate: DEFAULT_FRAME_RATE,
        }
    }
}
impl Transport {
    #[allow(missing_docs)]
    pub fn new_with(frame_rate: usize) -> Self {
        Self {
            frame_rate: frame_rate.max(1),
        }
    }

    #[allow(missing_docs)]
    pub fn frame_rate(&self) -> usize {
        self.frame_rate
    }

    /// Plays the performer to completion. Each frame polls before checking
    /// for completion, so transitions due on the final frame still fire.
    pub fn run(&self, performer: &mut dyn Performs, transitions_fn: &mut TransitionsFn) {
        let period = Duration::from_secs_f64(1.0 / self.frame_rate as f64);
        performer.play();
        let start = Instant::now();
        loop {
            performer.poll(start.elapsed().as_secs_f64(), transitions_fn);
            if performer.is_finished() {
                break;
            }
            std::thread::sleep(period);
        }
        performer.stop();
    }
}
