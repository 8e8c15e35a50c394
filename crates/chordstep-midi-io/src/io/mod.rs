//! Hardware MIDI I/O.
//!
//! Device enumeration, connection, and real-time I/O via midir.
//! The managers require the `midi-io` feature.

mod input;
mod output;

pub use input::MidiInputDevice;
#[cfg(feature = "midi-io")]
pub use input::MidiInputManager;
pub use output::{MidiOutputDevice, MidiOutputMessage};
#[cfg(feature = "midi-io")]
pub use output::MidiOutputManager;
