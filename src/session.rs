//! Performer session: the single event queue in front of the engine.
//!
//! Device callbacks and fetch workers never touch the engine directly. They
//! post a [`SessionEvent`] and the session applies events one at a time, each
//! to completion, on the thread that drains the queue.
//!
//! Loads are not serialized: when two fetches are in flight the one that
//! completes last replaces the sequence.

use crate::error::Result;
use chordstep_core::{
    Clock, EngineConfig, InputEvent, LocalControl, NoteOutput, PerformanceEngine, SystemClock,
};
use chordstep_midi_io::broadcast::{self, DeviceAccess};
use chordstep_midi_io::SmfParser;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

#[cfg(feature = "midi-hardware")]
use chordstep_midi_io::{MidiInputManager, MidiOutputManager};

#[cfg(feature = "remote")]
use crate::source::RemoteSource;

/// Something that happened outside the queue thread.
#[derive(Debug)]
pub enum SessionEvent {
    Input(InputEvent),
    /// A background fetch finished
    Fetched {
        name: String,
        result: std::result::Result<Vec<u8>, String>,
    },
}

impl From<InputEvent> for SessionEvent {
    fn from(event: InputEvent) -> Self {
        SessionEvent::Input(event)
    }
}

pub struct Session<O: NoteOutput, C: Clock = SystemClock> {
    engine: PerformanceEngine<O, C>,
    access: Box<dyn DeviceAccess>,
    events_tx: Sender<SessionEvent>,
    events_rx: Receiver<SessionEvent>,
    source_name: Option<String>,
    local_control: Option<LocalControl>,
    #[cfg(feature = "midi-hardware")]
    input: Option<MidiInputManager>,
}

impl<O: NoteOutput, C: Clock> Session<O, C> {
    pub(crate) fn new(
        config: EngineConfig,
        clock: C,
        access: Box<dyn DeviceAccess>,
    ) -> Result<Self> {
        let (events_tx, events_rx) = unbounded();
        Ok(Self {
            engine: PerformanceEngine::with_config(config, clock)?,
            access,
            events_tx,
            events_rx,
            source_name: None,
            local_control: None,
            #[cfg(feature = "midi-hardware")]
            input: None,
        })
    }

    // ==================== Event queue ====================

    /// Handle for posting events from other threads.
    pub fn sender(&self) -> Sender<SessionEvent> {
        self.events_tx.clone()
    }

    /// Apply one event.
    pub fn handle(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Input(input) => input.dispatch(&mut self.engine),
            SessionEvent::Fetched { name, result } => match result {
                Ok(data) => {
                    // Failure is already logged and leaves the sequence intact
                    let _ = self.load_bytes(name, &data);
                }
                Err(e) => warn!("Error fetching {}: {}", name, e),
            },
        }
    }

    /// Apply every event already queued. Returns how many were handled.
    pub fn process_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle(event);
            handled += 1;
        }
        handled
    }

    /// Block handling events until `timeout` elapses.
    pub fn run_for(&mut self, timeout: Duration) -> usize {
        let deadline = Instant::now() + timeout;
        let mut handled = 0;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.events_rx.recv_timeout(remaining) {
                Ok(event) => {
                    self.handle(event);
                    handled += 1;
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        handled
    }

    // ==================== Loading ====================

    /// Parse and load `data`, remembering `name` as the current source.
    pub fn load_bytes(&mut self, name: impl Into<String>, data: &[u8]) -> Result<usize> {
        let name = name.into();
        let count = self.engine.load_bytes(&SmfParser, data)?;
        debug!("Loaded {}: {} notes", name, count);
        self.source_name = Some(name);
        Ok(count)
    }

    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| {
            warn!("Failed to read {}: {}", path.display(), e);
            e
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.load_bytes(name, &data)
    }

    /// Run `fetch` on a worker thread and post its result to the queue.
    ///
    /// Nothing is loaded until the result is handled.
    pub fn spawn_load<F>(&self, name: impl Into<String>, fetch: F)
    where
        F: FnOnce() -> std::result::Result<Vec<u8>, String> + Send + 'static,
    {
        let name = name.into();
        let sender = self.events_tx.clone();
        let spawned = thread::Builder::new()
            .name("sequence-fetch".to_string())
            .spawn(move || {
                let result = fetch();
                let _ = sender.send(SessionEvent::Fetched { name, result });
            });
        if let Err(e) = spawned {
            warn!("Failed to start fetch worker: {}", e);
        }
    }

    /// Fetch one of the preset sequences in the background.
    #[cfg(feature = "remote")]
    pub fn load_remote(&self, source: RemoteSource) {
        let url = source.url();
        self.spawn_load(source.name(), move || {
            chordstep_midi_io::remote::fetch(url).map_err(|e| e.to_string())
        });
    }

    // ==================== Output & device controls ====================

    pub fn select_output(&mut self, output: Option<O>) -> Option<O> {
        self.engine.select_output(output)
    }

    /// Switch local control on every output. Returns how many devices got it.
    pub fn set_local_control(&mut self, mode: LocalControl) -> usize {
        self.local_control = Some(mode);
        broadcast::send_local_control(self.access.as_ref(), mode)
    }

    /// Program change on every output, as sent at start-up.
    pub fn reset_programs(&self) -> usize {
        broadcast::send_program_change(self.access.as_ref(), self.engine.config().channel, 0)
    }

    // ==================== State ====================

    pub fn engine(&self) -> &PerformanceEngine<O, C> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut PerformanceEngine<O, C> {
        &mut self.engine
    }

    /// Display name of the most recently loaded sequence.
    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    pub fn local_control(&self) -> Option<LocalControl> {
        self.local_control
    }

    pub fn cursor(&self) -> usize {
        self.engine.cursor()
    }

    pub fn sequence_len(&self) -> usize {
        self.engine.sequence().len()
    }

    pub fn sustain(&self) -> bool {
        self.engine.sustain_on()
    }
}

#[cfg(feature = "midi-hardware")]
impl Session<MidiOutputManager> {
    /// Start configuring a hardware session.
    pub fn builder() -> crate::SessionBuilder {
        crate::SessionBuilder::default()
    }
}

#[cfg(feature = "midi-hardware")]
impl<C: Clock> Session<MidiOutputManager, C> {
    /// Connect the output device at `index` and hand it to the engine.
    ///
    /// An index no device is listed under fails and keeps the current
    /// output. The previous output is dropped, so note-offs for keys still
    /// held go to the new device.
    pub fn connect_output(&mut self, index: usize) -> Result<()> {
        let output = MidiOutputManager::new();
        output.connect(index)?;
        self.engine.select_output(Some(output));
        Ok(())
    }

    pub fn connect_output_by_name(&mut self, name: &str) -> Result<()> {
        let output = MidiOutputManager::new();
        output.connect_by_name(name)?;
        self.engine.select_output(Some(output));
        Ok(())
    }

    pub fn disconnect_output(&mut self) {
        if let Some(output) = self.engine.select_output(None) {
            output.disconnect();
        }
    }

    /// Subscribe to every available input device.
    pub fn listen_all_inputs(&mut self) -> Result<()> {
        let input = self.input.get_or_insert_with(MidiInputManager::new);
        input.connect_all(self.events_tx.clone())?;
        Ok(())
    }

    pub fn connected_inputs(&self) -> Vec<String> {
        self.input
            .as_ref()
            .map(|input| input.connected_devices())
            .unwrap_or_default()
    }
}

impl<O: NoteOutput, C: Clock> std::fmt::Debug for Session<O, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("engine", &self.engine)
            .field("source_name", &self.source_name)
            .field("local_control", &self.local_control)
            .field("pending_events", &self.events_rx.len())
            .finish()
    }
}
