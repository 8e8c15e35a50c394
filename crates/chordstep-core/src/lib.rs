//! Sequence-grouping and trigger-advance core for chordstep.
//!
//! Turns time-stamped note events into chronological groups, plays one group
//! per accepted performer trigger, and tracks which physical key started which
//! notes so the matching release stops exactly those.
//!
//! ```ignore
//! use chordstep_core::{CommandRecorder, PerformanceEngine, Sequence};
//!
//! let output = CommandRecorder::new();
//! let mut engine = PerformanceEngine::new();
//! engine.select_output(Some(output.clone()));
//! engine.load(Sequence::from_tracks(&tracks, 0));
//!
//! engine.trigger(36, 100); // plays the first chord at velocity 100
//! engine.release(36);      // stops it
//! ```

pub mod error;
pub use error::{Error, Result};

mod clock;
pub use clock::{Clock, ManualClock, SystemClock};

pub mod config;
pub use config::EngineConfig;

mod event;
pub use event::{NoteEvent, OutputCommand};

mod track;
pub use track::{Track, TrackEvent, TrackEventKind, TrackParser};

pub mod sequence;
pub use sequence::{group_end, Groups, Sequence};

mod output;
pub use output::{CommandRecorder, NoteOutput};

mod input;
pub use input::{InputEvent, PerformanceListener};

mod engine;
pub use engine::{ActiveNotes, PerformanceEngine, TriggerOutcome};

pub mod local_control;
pub use local_control::LocalControl;
