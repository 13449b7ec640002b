// Copyright (c) 2024 Mike Tsao. All rights reserved.

//! Reads a streaming crim2s event source on a background thread.
//!
//! The real-time pipeline points a named pipe at us: a producer writes the
//! crim2s header and then event lines as they happen, and the consumer
//! interprets each record the moment it arrives. The reader thread owns the
//! sending half of a bounded channel; the frame loop drains the receiving
//! half completely every poll. There is no shared stop flag: closing the
//! channel is the shutdown signal in both directions.

use crate::{
    parser::{EventRecord, LogHeader},
    traits::{NoteTransition, Performs, TransitionsFn},
    util::ChannelPair,
};
use crossbeam_channel::{Receiver, TryRecvError};
use std::{io::BufRead, thread::JoinHandle};

/// What the reader thread reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogStreamEvent {
    /// The header was consumed; event records follow.
    Started(LogHeader),
    /// One decoded event line.
    Record(EventRecord),
}

// How many records can sit in flight between the reader and the frame loop
// before the reader blocks.
const STREAM_CAPACITY: usize = 256;

/// [LogStreamService] owns the background thread that feeds events from an
/// unbounded source (named pipe, stdin) into a channel.
#[derive(Debug)]
pub struct LogStreamService {
    receiver: Receiver<LogStreamEvent>,
    handle: JoinHandle<()>,
}
impl LogStreamService {
    /// Spawns the reader thread. It consumes the header first, then one
    /// record per line, and exits on EOF, on a read error, or when the
    /// receiver is gone. Unparseable lines are skipped, same as the file
    /// parser.
    pub fn spawn(mut reader: impl BufRead + Send + 'static) -> Self {
        let ChannelPair { sender, receiver } = ChannelPair::new_bounded(STREAM_CAPACITY);
        let handle = std::thread::spawn(move || {
            match LogHeader::read(&mut reader) {
                Ok(header) => {
                    if sender.send(LogStreamEvent::Started(header)).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    log::warn!("stream header: {e}");
                    return;
                }
            }
            let mut line = String::new();
            loop {
                line.clear();
                match reader.read_line(&mut line) {
                    Ok(0) => return,
                    Ok(_) => {
                        if let Some(record) = EventRecord::parse(&line) {
                            if sender.send(LogStreamEvent::Record(record)).is_err() {
                                // Receiver dropped; we're being shut down.
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        log::warn!("stream read: {e}");
                        return;
                    }
                }
            }
        });
        Self { receiver, handle }
    }

    /// The receiving half. Drain it fully each frame with `try_iter` or
    /// let [StreamPlayer] do it.
    pub fn events(&self) -> &Receiver<LogStreamEvent> {
        &self.receiver
    }

    /// Drops the receiver, which tells the reader to stop at its next send,
    /// then joins the thread. A reader blocked on a silent pipe only
    /// notices at its next line; no timeout is applied.
    pub fn exit(self) {
        let Self { receiver, handle } = self;
        drop(receiver);
        let _ = handle.join();
    }
}

/// Adapts drained stream records to note transitions. Records are acted on
/// the moment they arrive, since the stream's producer already spaced them
/// in real time, so the poll's elapsed time is ignored.
#[derive(Debug)]
pub struct StreamPlayer {
    service: Option<LogStreamService>,
    header: Option<LogHeader>,
    source_done: bool,
    is_performing: bool,
}
impl StreamPlayer {
    #[allow(missing_docs)]
    pub fn new_with(service: LogStreamService) -> Self {
        Self {
            service: Some(service),
            header: None,
            source_done: false,
            is_performing: false,
        }
    }

    /// The stream's header, once the reader has gotten that far.
    pub fn header(&self) -> Option<LogHeader> {
        self.header
    }

    /// Shuts the reader thread down and joins it.
    pub fn exit(&mut self) {
        if let Some(service) = self.service.take() {
            service.exit();
        }
        self.source_done = true;
    }
}
impl Performs for StreamPlayer {
    fn poll(&mut self, _elapsed_seconds: f64, transitions_fn: &mut TransitionsFn) {
        if !self.is_performing {
            return;
        }
        let Some(service) = self.service.as_ref() else {
            return;
        };
        // Drain fully; a partial drain would smear one frame's on/off
        // pairs across several.
        loop {
            match service.events().try_recv() {
                Ok(LogStreamEvent::Started(header)) => self.header = Some(header),
                Ok(LogStreamEvent::Record(record)) => {
                    let transition = if record.is_activation() {
                        NoteTransition::Activate {
                            track: record.track,
                            key: record.key,
                        }
                    } else {
                        NoteTransition::Deactivate {
                            track: record.track,
                            key: record.key,
                        }
                    };
                    transitions_fn(transition);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.source_done = true;
                    break;
                }
            }
        }
    }

    fn is_finished(&self) -> bool {
        self.source_done
    }

    fn play(&mut self) {
        self.is_performing = true;
    }

    fn stop(&mut self) {
        self.is_performing = false;
    }

    fn is_performing(&self) -> bool {
        self.is_performing
    }
}
