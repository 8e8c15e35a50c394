//! MIDI I/O for chordstep.
//!
//! Standard MIDI File parsing, hardware ports, broadcast to all outputs, and
//! remote file retrieval.
//!
//! Feature gates: `midi-io` (hardware I/O via midir), `remote` (HTTP via ureq).

pub mod error;
pub use error::{Error, Result};

mod file;
pub use file::{ParsedMidiFile, SmfParser};

pub mod io;
pub use io::{MidiInputDevice, MidiOutputDevice, MidiOutputMessage};

#[cfg(feature = "midi-io")]
pub use io::{MidiInputManager, MidiOutputManager};

pub mod broadcast;
pub use broadcast::DeviceAccess;

#[cfg(feature = "midi-io")]
pub use broadcast::MidirAccess;

#[cfg(feature = "remote")]
pub mod remote;
