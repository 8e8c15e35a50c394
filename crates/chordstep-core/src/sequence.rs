//! Sequence building and group indexing.
//!
//! A [`Sequence`] is the flat, time-sorted list of note-ons taken from every
//! track of the loaded material. Groups (chords sharing one onset time) are
//! never stored; [`group_end`] computes them on demand.

use crate::event::NoteEvent;
use crate::track::{Track, TrackEventKind};
use std::ops::Range;
use std::sync::Arc;
use tracing::debug;

/// Immutable, time-sorted note-ons. Clone is cheap (Arc internally).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sequence {
    events: Arc<[NoteEvent]>,
}

impl Sequence {
    /// Build a sequence from parsed tracks.
    ///
    /// Time restarts at 0 for every track. Note-ons with velocity 0 are
    /// note-offs and are skipped. Every event is stamped with `channel`.
    pub fn from_tracks(tracks: &[Track], channel: u8) -> Self {
        let mut events = Vec::new();

        for track in tracks {
            let mut absolute_time = 0u64;
            for event in track {
                absolute_time += event.delta as u64;
                if let TrackEventKind::NoteOn { note, velocity } = event.kind {
                    if velocity > 0 {
                        events.push(NoteEvent::new(note, velocity, channel, absolute_time));
                    }
                }
            }
        }

        // Stable: ties keep extraction order
        events.sort_by_key(|e| e.time);

        debug!(
            "Built sequence: {} note events from {} tracks",
            events.len(),
            tracks.len()
        );

        Self {
            events: events.into(),
        }
    }

    /// Build from events that may be unsorted.
    pub fn from_events(mut events: Vec<NoteEvent>) -> Self {
        events.sort_by_key(|e| e.time);
        Self {
            events: events.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[NoteEvent] {
        &self.events
    }

    pub fn get(&self, index: usize) -> Option<&NoteEvent> {
        self.events.get(index)
    }

    /// Exclusive end of the group starting at `start`.
    pub fn group_end(&self, start: usize) -> usize {
        group_end(&self.events, start)
    }

    /// Iterate over every group as an index range, in time order.
    pub fn groups(&self) -> Groups<'_> {
        Groups {
            events: &self.events,
            position: 0,
        }
    }
}

/// Exclusive upper bound of the run of events sharing `events[start].time`.
///
/// Returns `start` unchanged when `start` is at or past the end.
pub fn group_end(events: &[NoteEvent], start: usize) -> usize {
    let Some(first) = events.get(start) else {
        return start;
    };
    let mut end = start + 1;
    while end < events.len() && events[end].time == first.time {
        end += 1;
    }
    end
}

/// Iterator over the group partition of a sequence.
pub struct Groups<'a> {
    events: &'a [NoteEvent],
    position: usize,
}

impl<'a> Groups<'a> {
    /// Start iterating from an arbitrary index.
    pub fn starting_at(events: &'a [NoteEvent], position: usize) -> Self {
        Self { events, position }
    }
}

impl Iterator for Groups<'_> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.position;
        let end = group_end(self.events, start);
        if end == start {
            return None;
        }
        self.position = end;
        Some(start..end)
    }
}
