//! Performance engine: one accepted trigger plays the next group.
//!
//! The engine owns the loaded [`Sequence`], the advance cursor, the map of
//! notes sounding per physical key, and the sustain state. Every handler runs
//! to completion on the caller's thread; nothing advances on its own.

use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::event::OutputCommand;
use crate::input::PerformanceListener;
use crate::output::NoteOutput;
use crate::sequence::Sequence;
use crate::track::{Track, TrackParser};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::ops::Range;
use tracing::{debug, trace, warn};

/// Notes sounding because of one physical key.
pub type ActiveNotes = SmallVec<[u8; 8]>;

/// What a call to [`PerformanceEngine::trigger`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// Arrived inside the debounce window of the previous accepted trigger
    Debounced,
    /// Accepted, but nothing to play (no output, empty or exhausted sequence)
    Idle,
    /// Played the group at this index range
    Played(Range<usize>),
}

pub struct PerformanceEngine<O, C = SystemClock> {
    config: EngineConfig,
    sequence: Sequence,
    cursor: usize,
    active_notes: HashMap<u8, ActiveNotes>,
    sustain: bool,
    last_trigger_ms: Option<u64>,
    output: Option<O>,
    clock: C,
}

impl<O: NoteOutput> PerformanceEngine<O, SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock::new())
    }
}

impl<O: NoteOutput> Default for PerformanceEngine<O, SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: NoteOutput, C: Clock> PerformanceEngine<O, C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            config: EngineConfig::default(),
            sequence: Sequence::default(),
            cursor: 0,
            active_notes: HashMap::new(),
            sustain: false,
            last_trigger_ms: None,
            output: None,
            clock,
        }
    }

    pub fn with_config(config: EngineConfig, clock: C) -> Result<Self> {
        config.validate()?;
        let mut engine = Self::with_clock(clock);
        engine.config = config;
        Ok(engine)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ==================== Output ====================

    /// Replace the selected output, returning the previous one.
    ///
    /// Selecting an output does not replay the current sustain state.
    pub fn select_output(&mut self, output: Option<O>) -> Option<O> {
        debug!(
            "Output {}",
            if output.is_some() { "selected" } else { "cleared" }
        );
        std::mem::replace(&mut self.output, output)
    }

    pub fn has_output(&self) -> bool {
        self.output.is_some()
    }

    pub fn output(&self) -> Option<&O> {
        self.output.as_ref()
    }

    pub fn output_mut(&mut self) -> Option<&mut O> {
        self.output.as_mut()
    }

    // ==================== Loading ====================

    /// Replace the sequence and rewind the cursor.
    ///
    /// Notes already sounding stay tracked so their keys can still release them.
    pub fn load(&mut self, sequence: Sequence) {
        debug!(
            "Loaded sequence: {} events, {} groups",
            sequence.len(),
            sequence.groups().count()
        );
        self.sequence = sequence;
        self.cursor = 0;
    }

    pub fn load_tracks(&mut self, tracks: &[Track]) {
        self.load(Sequence::from_tracks(tracks, self.config.channel));
    }

    /// Parse `data` and load it. On failure nothing changes.
    ///
    /// Returns the number of events in the new sequence.
    pub fn load_bytes<P: TrackParser + ?Sized>(
        &mut self,
        parser: &P,
        data: &[u8],
    ) -> Result<usize> {
        let tracks = parser.parse(data).map_err(|e| {
            warn!("Failed to parse sequence: {}", e);
            e
        })?;
        self.load_tracks(&tracks);
        Ok(self.sequence.len())
    }

    // ==================== Performance ====================

    /// Physical note-on: play the next group with the performer's velocity.
    pub fn trigger(&mut self, key: u8, velocity: u8) -> TriggerOutcome {
        let now = self.clock.now_ms();
        if let Some(last) = self.last_trigger_ms {
            if now.saturating_sub(last) < self.config.debounce_ms {
                trace!(
                    "Trigger from key {} debounced ({} ms)",
                    key,
                    now.saturating_sub(last)
                );
                return TriggerOutcome::Debounced;
            }
        }
        self.last_trigger_ms = Some(now);

        let channel = self.config.channel;
        let Some(output) = self.output.as_mut() else {
            return TriggerOutcome::Idle;
        };
        if self.cursor >= self.sequence.len() {
            return TriggerOutcome::Idle;
        }

        let start = self.cursor;
        let end = self.sequence.group_end(start);
        let sounding = self.active_notes.entry(key).or_default();
        for event in &self.sequence.events()[start..end] {
            output.send(OutputCommand::NoteOn {
                channel,
                note: event.note,
                velocity,
            });
            sounding.push(event.note);
        }
        self.cursor = end;

        debug!(
            "Key {} played group {}..{} ({} remaining)",
            key,
            start,
            end,
            self.sequence.len() - end
        );
        TriggerOutcome::Played(start..end)
    }

    /// Physical note-off: stop every note this key started.
    ///
    /// Returns the number of notes stopped. With no output selected the
    /// notes stay tracked.
    pub fn release(&mut self, key: u8) -> usize {
        let channel = self.config.channel;
        let Some(output) = self.output.as_mut() else {
            return 0;
        };
        let Some(notes) = self.active_notes.remove(&key) else {
            return 0;
        };
        for &note in &notes {
            output.send(OutputCommand::NoteOff { channel, note });
        }
        trace!("Key {} released {} notes", key, notes.len());
        notes.len()
    }

    /// Sustain pedal controller value.
    pub fn sustain(&mut self, value: u8) {
        self.sustain = value > self.config.sustain_threshold;
        let command = OutputCommand::ControlChange {
            channel: self.config.channel,
            controller: self.config.sustain_controller,
            value: if self.sustain { 127 } else { 0 },
        };
        if let Some(output) = self.output.as_mut() {
            output.send(command);
        }
    }

    // ==================== State ====================

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.sequence.len()
    }

    pub fn remaining_groups(&self) -> usize {
        crate::sequence::Groups::starting_at(self.sequence.events(), self.cursor).count()
    }

    pub fn sustain_on(&self) -> bool {
        self.sustain
    }

    pub fn active_notes(&self, key: u8) -> Option<&[u8]> {
        self.active_notes.get(&key).map(|notes| notes.as_slice())
    }

    pub fn active_key_count(&self) -> usize {
        self.active_notes.len()
    }
}

impl<O: NoteOutput, C: Clock> PerformanceListener for PerformanceEngine<O, C> {
    fn on_trigger(&mut self, key: u8, velocity: u8) {
        self.trigger(key, velocity);
    }

    fn on_release(&mut self, key: u8) {
        self.release(key);
    }

    fn on_sustain(&mut self, value: u8) {
        self.sustain(value);
    }

    fn sustain_controller(&self) -> u8 {
        self.config.sustain_controller
    }
}

impl<O, C> std::fmt::Debug for PerformanceEngine<O, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerformanceEngine")
            .field("sequence_len", &self.sequence.len())
            .field("cursor", &self.cursor)
            .field("active_keys", &self.active_notes.len())
            .field("sustain", &self.sustain)
            .field("has_output", &self.output.is_some())
            .finish()
    }
}
