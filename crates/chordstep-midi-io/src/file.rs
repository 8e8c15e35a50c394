//! MIDI File I/O
//!
//! Standard MIDI File (SMF) parsing with the `midly` crate. Tracks are kept
//! delta-timed and separate; merging them into one sequence is the core's job.

use crate::error::Result;
use chordstep_core::{Track, TrackEvent, TrackEventKind, TrackParser};
use midly::{MidiMessage, Smf, Timing, TrackEventKind as SmfEventKind};
use std::path::Path;
use tracing::debug;

/// A parsed MIDI file, one delta-timed event list per track.
#[derive(Debug, Clone)]
pub struct ParsedMidiFile {
    pub tracks: Vec<Track>,

    /// Ticks per quarter note, `None` for timecode-based files
    pub ticks_per_beat: Option<u16>,
}

impl ParsedMidiFile {
    /// Load and parse a MIDI file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        Self::parse(&data)
    }

    /// Parse MIDI file from bytes
    pub fn parse(data: &[u8]) -> Result<Self> {
        let smf = Smf::parse(data)?;

        let ticks_per_beat = match smf.header.timing {
            Timing::Metrical(tpb) => Some(tpb.as_int()),
            // Only relative order matters for grouping, so timecode ticks are fine
            Timing::Timecode(_, _) => None,
        };

        debug!(
            "Parsing MIDI file: {} tracks, {:?} ticks per beat",
            smf.tracks.len(),
            ticks_per_beat
        );

        let tracks: Vec<Track> = smf.tracks.iter().map(|t| Self::parse_track(t)).collect();

        debug!(
            "Parsed {} note-ons across {} tracks",
            tracks
                .iter()
                .flatten()
                .filter(|e| matches!(e.kind, TrackEventKind::NoteOn { .. }))
                .count(),
            tracks.len()
        );

        Ok(Self {
            tracks,
            ticks_per_beat,
        })
    }

    /// Convert a single track, keeping every event so deltas stay correct.
    fn parse_track(track: &[midly::TrackEvent]) -> Track {
        track
            .iter()
            .map(|event| TrackEvent {
                delta: event.delta.as_int(),
                kind: Self::convert_event(&event.kind),
            })
            .collect()
    }

    fn convert_event(kind: &SmfEventKind) -> TrackEventKind {
        match kind {
            SmfEventKind::Midi { message, .. } => match message {
                // Velocity 0 is a note-off
                MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => TrackEventKind::NoteOn {
                    note: key.as_int(),
                    velocity: vel.as_int(),
                },
                MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                    TrackEventKind::NoteOff { note: key.as_int() }
                }
                _ => TrackEventKind::Other,
            },
            // Meta events and sysex only carry time
            _ => TrackEventKind::Other,
        }
    }
}

/// [`TrackParser`] backed by `midly`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmfParser;

impl TrackParser for SmfParser {
    fn parse(&self, data: &[u8]) -> chordstep_core::Result<Vec<Track>> {
        Ok(ParsedMidiFile::parse(data)?.tracks)
    }
}
