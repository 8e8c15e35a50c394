//! MIDI output: the selected device, driven from a dedicated thread.
//!
//! The engine only ever sees [`MidiOutputManager`] through `NoteOutput`.
//! Commands are queued to the output thread and sent fire-and-forget.

#![cfg_attr(not(feature = "midi-io"), allow(unused_imports, dead_code))]

use crate::error::{Error, Result};
use chordstep_core::{NoteOutput, OutputCommand};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
#[cfg(feature = "midi-io")]
use midir::{MidiOutput, MidiOutputConnection};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiOutputMessage {
    pub bytes: Vec<u8>,
}

impl MidiOutputMessage {
    pub fn program_change(channel: u8, program: u8) -> Self {
        Self {
            bytes: vec![0xC0 | channel.min(15), program & 0x7F],
        }
    }

    pub fn from_command(command: &OutputCommand) -> Self {
        Self {
            bytes: command.to_bytes(),
        }
    }
}

impl From<&OutputCommand> for MidiOutputMessage {
    fn from(command: &OutputCommand) -> Self {
        Self::from_command(command)
    }
}

impl From<OutputCommand> for MidiOutputMessage {
    fn from(command: OutputCommand) -> Self {
        Self::from_command(&command)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiOutputDevice {
    pub index: usize,
    pub name: String,
}

enum Command {
    Connect(usize),
    Disconnect,
    Send(MidiOutputMessage),
    Shutdown,
}

/// Name of the connected device, `None` while disconnected.
type ConnectedName = Arc<arc_swap::ArcSwap<Option<String>>>;

/// State owned by the output thread.
#[cfg(feature = "midi-io")]
struct OutputThread {
    connection: Option<MidiOutputConnection>,
    connected: ConnectedName,
}

#[cfg(feature = "midi-io")]
impl OutputThread {
    fn run(mut self, commands: Receiver<Command>) {
        loop {
            match commands.recv_timeout(Duration::from_millis(100)) {
                Ok(Command::Connect(index)) => self.connect(index),
                Ok(Command::Disconnect) => self.close(),
                Ok(Command::Send(message)) => self.send(&message),
                Ok(Command::Shutdown) | Err(RecvTimeoutError::Disconnected) => {
                    self.close();
                    break;
                }
                Err(RecvTimeoutError::Timeout) => {}
            }
        }
    }

    fn connect(&mut self, index: usize) {
        self.close();
        match open_port(index) {
            Ok((connection, name)) => {
                debug!("Connected MIDI output {}: {}", index, name);
                self.connection = Some(connection);
                self.connected.store(Arc::new(Some(name)));
            }
            Err(e) => warn!("Failed to connect MIDI output {}: {}", index, e),
        }
    }

    fn close(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.close();
        }
        self.connected.store(Arc::new(None));
    }

    fn send(&mut self, message: &MidiOutputMessage) {
        match self.connection.as_mut() {
            Some(connection) => {
                if let Err(e) = connection.send(&message.bytes) {
                    debug!("Failed to send MIDI message: {}", e);
                }
            }
            None => trace!("Dropping {:02X?}: no output connected", message.bytes),
        }
    }
}

#[cfg(feature = "midi-io")]
fn open_port(index: usize) -> Result<(MidiOutputConnection, String)> {
    let midi_output = MidiOutput::new("chordstep-midi-output")?;
    let ports = midi_output.ports();
    let port = ports
        .get(index)
        .ok_or_else(|| Error::MidiDevice(format!("MIDI output device {} not found", index)))?;
    let name = midi_output
        .port_name(port)
        .unwrap_or_else(|_| format!("Device {}", index));
    let connection = midi_output.connect(port, "chordstep-output")?;
    Ok((connection, name))
}

/// The selected output device.
#[cfg(feature = "midi-io")]
pub struct MidiOutputManager {
    commands: Sender<Command>,
    connected: ConnectedName,
}

#[cfg(feature = "midi-io")]
impl MidiOutputManager {
    pub fn new() -> Self {
        let (commands, receiver) = bounded(1024);
        let connected: ConnectedName = Arc::new(arc_swap::ArcSwap::from_pointee(None));

        let worker = OutputThread {
            connection: None,
            connected: Arc::clone(&connected),
        };
        thread::Builder::new()
            .name("midi-output-thread".to_string())
            .spawn(move || worker.run(receiver))
            .expect("Failed to spawn MIDI output thread");

        Self {
            commands,
            connected,
        }
    }

    pub fn list_devices() -> Vec<MidiOutputDevice> {
        match MidiOutput::new("chordstep-device-list") {
            Ok(midi_output) => midi_output
                .ports()
                .iter()
                .enumerate()
                .map(|(index, port)| MidiOutputDevice {
                    index,
                    name: midi_output
                        .port_name(port)
                        .unwrap_or_else(|_| format!("Unknown Device {}", index)),
                })
                .collect(),
            Err(e) => {
                warn!("MIDI output unavailable: {}", e);
                Vec::new()
            }
        }
    }

    /// Connect the device at `index`.
    ///
    /// Fails if no such device is listed. The port itself is opened on the
    /// output thread.
    pub fn connect(&self, index: usize) -> Result<()> {
        let devices = Self::list_devices();
        let device = device_at(&devices, index)?;
        self.queue_connect(device)
    }

    /// Connect the first device whose name contains `name`, ignoring case.
    pub fn connect_by_name(&self, name: &str) -> Result<()> {
        let devices = Self::list_devices();
        let device = find_device(&devices, name).ok_or_else(|| {
            Error::MidiDevice(format!("No MIDI output device found matching '{}'", name))
        })?;
        self.queue_connect(device)
    }

    fn queue_connect(&self, device: &MidiOutputDevice) -> Result<()> {
        debug!("Connecting MIDI output {}: {}", device.index, device.name);
        self.commands
            .send(Command::Connect(device.index))
            .map_err(|_| Error::MidiDevice("MIDI output thread not running".to_string()))
    }

    pub fn disconnect(&self) {
        let _ = self.commands.send(Command::Disconnect);
    }

    pub fn send_message(&self, message: MidiOutputMessage) {
        if let Err(e) = self.commands.try_send(Command::Send(message)) {
            debug!("MIDI output command channel full or disconnected: {}", e);
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load().is_some()
    }

    pub fn connected_device_name(&self) -> Option<String> {
        self.connected.load().as_ref().clone()
    }
}

#[cfg(feature = "midi-io")]
impl Default for MidiOutputManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "midi-io")]
impl Drop for MidiOutputManager {
    fn drop(&mut self) {
        let _ = self.commands.send(Command::Shutdown);
    }
}

#[cfg(feature = "midi-io")]
impl NoteOutput for MidiOutputManager {
    fn send(&mut self, command: OutputCommand) {
        self.send_message(command.into());
    }
}

#[cfg(feature = "midi-io")]
impl std::fmt::Debug for MidiOutputManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MidiOutputManager")
            .field("connected_device", &self.connected_device_name())
            .finish()
    }
}

/// The listed device with `index`.
pub(crate) fn device_at(devices: &[MidiOutputDevice], index: usize) -> Result<&MidiOutputDevice> {
    devices
        .iter()
        .find(|d| d.index == index)
        .ok_or_else(|| {
            Error::MidiDevice(format!(
                "MIDI output device {} not found ({} available)",
                index,
                devices.len()
            ))
        })
}

/// Case-insensitive partial name match.
pub(crate) fn find_device<'a>(
    devices: &'a [MidiOutputDevice],
    name: &str,
) -> Option<&'a MidiOutputDevice> {
    let needle = name.to_lowercase();
    devices
        .iter()
        .find(|d| d.name.to_lowercase().contains(&needle))
}
