//! Builder for configuring and constructing a [`Session`].

use crate::session::Session;
use crate::Result;
use chordstep_core::{Clock, EngineConfig, NoteOutput};
use chordstep_midi_io::DeviceAccess;

#[cfg(feature = "midi-hardware")]
use chordstep_midi_io::{MidirAccess, MidiOutputManager};

/// Output selection applied by [`SessionBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq)]
enum OutputChoice {
    Index(usize),
    Name(String),
}

/// # Example
///
/// ```ignore
/// use chordstep::prelude::*;
///
/// let mut session = Session::builder()
///     .output_name("piano")
///     .listen_inputs()
///     .build()?;
///
/// session.load_remote(RemoteSource::BachPrelude);
/// ```
#[derive(Debug, Clone)]
pub struct SessionBuilder {
    config: EngineConfig,
    output: Option<OutputChoice>,
    listen_inputs: bool,
    reset_programs: bool,
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            output: None,
            listen_inputs: false,
            reset_programs: true,
        }
    }
}

impl SessionBuilder {
    /// Default: 50
    pub fn debounce_ms(mut self, ms: u64) -> Self {
        self.config.debounce_ms = ms;
        self
    }

    /// Wire channel 0-15. Default: 0
    pub fn channel(mut self, channel: u8) -> Self {
        self.config.channel = channel;
        self
    }

    /// Default: 64
    pub fn sustain_controller(mut self, controller: u8) -> Self {
        self.config.sustain_controller = controller;
        self
    }

    pub fn sustain_threshold(mut self, threshold: u8) -> Self {
        self.config.sustain_threshold = threshold;
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn output_device(mut self, index: usize) -> Self {
        self.output = Some(OutputChoice::Index(index));
        self
    }

    /// Case-insensitive partial match against output device names.
    pub fn output_name(mut self, name: impl Into<String>) -> Self {
        self.output = Some(OutputChoice::Name(name.into()));
        self
    }

    /// Subscribe to every input device when built.
    pub fn listen_inputs(mut self) -> Self {
        self.listen_inputs = true;
        self
    }

    /// Skip the program change normally sent to every output on start-up.
    pub fn skip_program_reset(mut self) -> Self {
        self.reset_programs = false;
        self
    }

    /// Build against any output, clock and device access.
    ///
    /// No output is selected; hand one over with [`Session::select_output`].
    pub fn build_with<O, C, A>(self, clock: C, access: A) -> Result<Session<O, C>>
    where
        O: NoteOutput,
        C: Clock,
        A: DeviceAccess + 'static,
    {
        let session = Session::new(self.config, clock, Box::new(access))?;
        if self.reset_programs {
            session.reset_programs();
        }
        Ok(session)
    }

    /// Build on the hardware MIDI stack.
    #[cfg(feature = "midi-hardware")]
    pub fn build(self) -> Result<Session<MidiOutputManager>> {
        let output = self.output.clone();
        let listen_inputs = self.listen_inputs;
        let mut session = self.build_with(chordstep_core::SystemClock::new(), MidirAccess)?;

        match output {
            Some(OutputChoice::Index(index)) => session.connect_output(index)?,
            Some(OutputChoice::Name(name)) => session.connect_output_by_name(&name)?,
            None => {}
        }
        if listen_inputs {
            session.listen_all_inputs()?;
        }
        Ok(session)
    }
}
