// Copyright (c) 2024 Mike Tsao. All rights reserved.

//! Reading the crim2s log format.
//!
//! A crim2s log is line-oriented text: a short header (tick resolution,
//! declared track count), a marker line, then a flat list of timestamped
//! note_on/note_off records as mido prints them. The reader is deliberately
//! lenient: anything it doesn't recognize is skipped, anomalies worth
//! hearing about become [ParseWarning]s, and only failing to open the
//! source at all is fatal.

use crate::{
    composition::{NoteEvent, Timeline, Track},
    midi::MidiChannel,
    time::{Tick, TicksPerBeat},
};
use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Things that end a parse before it produces a timeline.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The log source couldn't be opened at all.
    #[error("couldn't open {}: {source}", .path.display())]
    FileNotFound {
        #[allow(missing_docs)]
        path: PathBuf,
        #[allow(missing_docs)]
        source: io::Error,
    },
    /// The log source died mid-read.
    #[error("couldn't read from the log source: {0}")]
    Read(#[from] io::Error),
}

/// Non-fatal anomalies found while parsing. Each is logged, the affected
/// record is skipped, and the parse continues.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseWarning {
    /// An event named a track the header never declared.
    #[error("line {line}: track {track} out of range ({declared} tracks declared)")]
    TrackOutOfRange {
        #[allow(missing_docs)]
        line: usize,
        #[allow(missing_docs)]
        track: usize,
        #[allow(missing_docs)]
        declared: usize,
    },
    /// A release arrived with no still-open note to resolve.
    #[error("line {line}: note_off for key {key} on track {track} matches no open note")]
    UnmatchedNoteOff {
        #[allow(missing_docs)]
        line: usize,
        #[allow(missing_docs)]
        track: usize,
        #[allow(missing_docs)]
        key: u8,
    },
}

/// Which message an event line carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    #[allow(missing_docs)]
    NoteOn,
    #[allow(missing_docs)]
    NoteOff,
}
impl MessageKind {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "note_on" => Some(Self::NoteOn),
            "note_off" => Some(Self::NoteOff),
            _ => None,
        }
    }
}

/// One event line, decoded but not yet applied to a timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventRecord {
    /// Absolute tick offset from the start of the performance.
    pub time: Tick,
    /// Which track the record belongs to.
    pub track: usize,
    #[allow(missing_docs)]
    pub kind: MessageKind,
    #[allow(missing_docs)]
    pub channel: MidiChannel,
    /// The MIDI key code.
    pub key: u8,
    /// The key press velocity as captured, 0-127.
    pub velocity: u8,
}
impl EventRecord {
    /// Whether this record opens a note. A note_on with velocity zero is
    /// the running-status idiom for a release and counts as note_off.
    pub fn is_activation(&self) -> bool {
        self.kind == MessageKind::NoteOn && self.velocity > 0
    }

    /// Decodes one event line of the shape `Time=<int> Track=<int>
    /// <msgType> channel=<int> note=<int> velocity=<int>`. Trailing fields
    /// (mido appends its delta as `time=<int>`) are ignored. Anything that
    /// doesn't match the shape yields `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace();
        let time = tokens.next()?.strip_prefix("Time=")?.parse().ok()?;
        let track = tokens.next()?.strip_prefix("Track=")?.parse().ok()?;
        let kind = MessageKind::from_token(tokens.next()?)?;
        let channel = MidiChannel(tokens.next()?.strip_prefix("channel=")?.parse().ok()?);
        let key: u8 = tokens.next()?.strip_prefix("note=")?.parse().ok()?;
        let velocity = tokens.next()?.strip_prefix("velocity=")?.parse().ok()?;
        if key > 127 {
            return None;
        }
        Some(Self {
            time,
            track,
            kind,
            channel,
            key,
            velocity,
        })
    }
}

/// The header that precedes a log's event section.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogHeader {
    /// Tick resolution; defaults to 480 when the header omits it.
    pub ticks_per_beat: TicksPerBeat,
    /// How many tracks the event section may reference.
    pub track_count: usize,
}
impl Default for LogHeader {
    fn default() -> Self {
        Self {
            ticks_per_beat: TicksPerBeat::default(),
            track_count: 0,
        }
    }
}
impl LogHeader {
    /// Consumes header lines up to and including the event marker. Both the
    /// original Spanish spellings ("Número de pistas:", "Eventos:") and
    /// their English equivalents are accepted; unrecognized header lines
    /// (title, total duration) are skipped, and fields that never appear
    /// keep their defaults.
    pub fn read(reader: &mut impl BufRead) -> Result<Self, ParseError> {
        let mut lines_read = 0;
        Self::read_counted(reader, &mut lines_read)
    }

    fn read_counted(reader: &mut impl BufRead, lines_read: &mut usize) -> Result<Self, ParseError> {
        let mut header = Self::default();
        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            *lines_read += 1;
            let line = line.trim();
            if line.starts_with("Eventos:") || line.starts_with("Events:") {
                break;
            }
            if let Some(rest) = line.strip_prefix("Ticks per beat:") {
                if let Ok(value) = rest.trim().parse() {
                    header.ticks_per_beat = TicksPerBeat(value);
                }
            } else if let Some((label, value)) = line.split_once(':') {
                if label.ends_with("pistas") || label == "Tracks" || label == "Number of tracks" {
                    if let Ok(value) = value.trim().parse() {
                        header.track_count = value;
                    }
                }
            }
        }
        Ok(header)
    }
}

// A note_on waiting for its note_off. The unresolved end stays None until
// a release matches or finalization substitutes the global maximum.
#[derive(Clone, Debug)]
struct PendingNote {
    key: u8,
    start: Tick,
    end: Option<Tick>,
}

/// A fully parsed log: the timeline plus whatever the parser had to skip.
#[derive(Debug)]
pub struct ParsedLog {
    #[allow(missing_docs)]
    pub timeline: Timeline,
    /// Everything non-fatal that went wrong, in encounter order.
    pub warnings: Vec<ParseWarning>,
}
impl ParsedLog {
    /// Opens and parses a crim2s log file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ParseError::FileNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        Self::read(BufReader::new(file))
    }

    /// Parses a crim2s log from any buffered reader.
    pub fn read(mut reader: impl BufRead) -> Result<Self, ParseError> {
        let mut line_number = 0;
        let header = LogHeader::read_counted(&mut reader, &mut line_number)?;

        let mut open_tracks: Vec<Vec<PendingNote>> = vec![Vec::default(); header.track_count];
        let mut warnings = Vec::default();

        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            line_number += 1;
            let Some(record) = EventRecord::parse(&line) else {
                continue;
            };
            if record.track >= open_tracks.len() {
                let warning = ParseWarning::TrackOutOfRange {
                    line: line_number,
                    track: record.track,
                    declared: open_tracks.len(),
                };
                log::warn!("{warning}");
                warnings.push(warning);
                continue;
            }
            if record.is_activation() {
                open_tracks[record.track].push(PendingNote {
                    key: record.key,
                    start: record.time,
                    end: None,
                });
            } else if let Some(open) = open_tracks[record.track]
                .iter_mut()
                .find(|note| note.key == record.key && note.end.is_none())
            {
                // Oldest still-open note of that key wins: FIFO, not a stack.
                open.end = Some(record.time);
            } else {
                let warning = ParseWarning::UnmatchedNoteOff {
                    line: line_number,
                    track: record.track,
                    key: record.key,
                };
                log::warn!("{warning}");
                warnings.push(warning);
            }
        }

        // Unterminated notes end when the latest terminated note ends,
        // across the whole log rather than per track.
        let final_tick = open_tracks
            .iter()
            .flatten()
            .filter_map(|note| note.end)
            .max()
            .unwrap_or(0);
        let tracks = open_tracks
            .into_iter()
            .map(|notes| Track {
                notes: notes
                    .into_iter()
                    .map(|note| {
                        NoteEvent::new_with(note.key, note.start, note.end.unwrap_or(final_tick))
                    })
                    .collect(),
            })
            .collect();

        Ok(Self {
            timeline: Timeline::from_parts(header.ticks_per_beat, tracks),
            warnings,
        })
    }
}
