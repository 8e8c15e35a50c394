//! Parsed-track representation handed over by a file parser.
//!
//! A track is an ordered list of delta-timed events, exactly as they appear in
//! a Standard MIDI File chunk. Only [`TrackEventKind::NoteOn`] contributes to a
//! [`Sequence`](crate::Sequence); everything else only advances time.

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackEventKind {
    NoteOn { note: u8, velocity: u8 },
    NoteOff { note: u8 },
    /// Any event that carries time but no note (meta, sysex, controllers)
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackEvent {
    /// Ticks since the previous event in the same track
    pub delta: u32,
    pub kind: TrackEventKind,
}

impl TrackEvent {
    pub fn note_on(delta: u32, note: u8, velocity: u8) -> Self {
        Self {
            delta,
            kind: TrackEventKind::NoteOn { note, velocity },
        }
    }

    pub fn note_off(delta: u32, note: u8) -> Self {
        Self {
            delta,
            kind: TrackEventKind::NoteOff { note },
        }
    }

    pub fn other(delta: u32) -> Self {
        Self {
            delta,
            kind: TrackEventKind::Other,
        }
    }
}

pub type Track = Vec<TrackEvent>;

/// Turns raw file bytes into tracks.
pub trait TrackParser {
    fn parse(&self, data: &[u8]) -> Result<Vec<Track>>;
}

impl<F> TrackParser for F
where
    F: Fn(&[u8]) -> Result<Vec<Track>>,
{
    fn parse(&self, data: &[u8]) -> Result<Vec<Track>> {
        self(data)
    }
}
