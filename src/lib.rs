//! # chordstep - Live MIDI Performance Engine
//!
//! Load a Standard MIDI File and play it one chord at a time: every key the
//! performer presses plays the next group of simultaneous notes, at the
//! velocity of that press, and releasing the key stops exactly those notes.
//!
//! ## Architecture
//!
//! chordstep is an umbrella crate that coordinates:
//! - **chordstep-core** - Sequence grouping, trigger/release engine, sustain
//! - **chordstep-midi-io** - SMF parsing, hardware ports, broadcast, remote fetch
//!
//! ## Quick Start
//!
//! ```ignore
//! use chordstep::prelude::*;
//!
//! let mut session = Session::builder()
//!     .output_device(0)
//!     .listen_inputs()
//!     .build()?;
//!
//! session.load_file("prelude.mid")?;
//! loop {
//!     session.run_for(std::time::Duration::from_millis(100));
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `midi-hardware` - Hardware MIDI I/O via midir (default)
//! - `remote` - Fetching the preset sequences over HTTP (default)

/// Re-export of chordstep-core for direct access
pub use chordstep_core as core;

/// Re-export of chordstep-midi-io for direct access
pub use chordstep_midi_io as midi_io;

pub use chordstep_core::{
    Clock, CommandRecorder, EngineConfig, InputEvent, LocalControl, ManualClock, NoteEvent,
    NoteOutput, OutputCommand, PerformanceEngine, PerformanceListener, Sequence, SystemClock,
    TriggerOutcome,
};

pub use chordstep_midi_io::{DeviceAccess, MidiOutputDevice, ParsedMidiFile, SmfParser};

#[cfg(feature = "midi-hardware")]
pub use chordstep_midi_io::{MidiInputManager, MidiOutputManager, MidirAccess};

mod error;
pub use error::{Error, Result};

mod builder;
mod session;
mod source;

pub use builder::SessionBuilder;
pub use session::{Session, SessionEvent};
pub use source::RemoteSource;

/// Convenience prelude for common imports
pub mod prelude {
    pub use crate::{RemoteSource, Session, SessionBuilder, SessionEvent};

    pub use crate::core::{
        EngineConfig, InputEvent, LocalControl, NoteOutput, PerformanceEngine, TriggerOutcome,
    };

    #[cfg(feature = "midi-hardware")]
    pub use crate::midi_io::{MidiInputManager, MidiOutputManager};
}
