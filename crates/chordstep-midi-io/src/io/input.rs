//! MIDI Input Manager
//!
//! Subscribes to every available input device and forwards decoded
//! performer events. Connections live on a dedicated thread for platform
//! thread-safety.

#![cfg_attr(not(feature = "midi-io"), allow(unused_imports, dead_code))]

use chordstep_core::InputEvent;
use crossbeam_channel::{bounded, Receiver, Sender};
#[cfg(feature = "midi-io")]
use midir::{Ignore, MidiInput, MidiInputConnection};
use std::sync::Arc;
use std::thread;
use tracing::{debug, trace, warn};

/// Information about an available MIDI input device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiInputDevice {
    /// Device index (for connection)
    pub index: usize,
    /// Device name
    pub name: String,
}

type InputCallback = Arc<dyn Fn(InputEvent) + Send + Sync>;

/// Commands sent to the MIDI thread
enum MidiCommand {
    ConnectAll(InputCallback),
    Disconnect,
    Shutdown,
}

#[cfg(feature = "midi-io")]
pub struct MidiInputManager {
    command_sender: Sender<MidiCommand>,
    connected_devices: Arc<arc_swap::ArcSwap<Vec<String>>>,
}

#[cfg(feature = "midi-io")]
impl MidiInputManager {
    pub fn new() -> Self {
        let (command_sender, command_receiver) = bounded(16);
        let connected_devices = Arc::new(arc_swap::ArcSwap::from_pointee(Vec::new()));
        let connected_devices_clone = Arc::clone(&connected_devices);

        thread::Builder::new()
            .name("midi-input-thread".to_string())
            .spawn(move || {
                Self::midi_thread(command_receiver, connected_devices_clone);
            })
            .expect("Failed to spawn MIDI input thread");

        Self {
            command_sender,
            connected_devices,
        }
    }

    fn midi_thread(
        command_receiver: Receiver<MidiCommand>,
        connected_devices: Arc<arc_swap::ArcSwap<Vec<String>>>,
    ) {
        let mut connections: Vec<MidiInputConnection<()>> = Vec::new();

        loop {
            match command_receiver.recv_timeout(std::time::Duration::from_millis(100)) {
                Ok(MidiCommand::ConnectAll(callback)) => {
                    connections.clear();

                    let mut names = Vec::new();
                    for device in Self::list_devices() {
                        match Self::connect_to_device(device.index, callback.clone()) {
                            Ok(conn) => {
                                debug!("Listening on MIDI input {}: {}", device.index, device.name);
                                connections.push(conn);
                                names.push(device.name);
                            }
                            Err(e) => {
                                warn!("Failed to connect MIDI input {}: {}", device.name, e);
                            }
                        }
                    }
                    connected_devices.store(Arc::new(names));
                }
                Ok(MidiCommand::Disconnect) => {
                    connections.clear();
                    connected_devices.store(Arc::new(Vec::new()));
                }
                Ok(MidiCommand::Shutdown) => {
                    break;
                }
                Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                    // No command, continue running
                }
                Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                    break;
                }
            }
        }
    }

    fn connect_to_device(
        device_index: usize,
        callback: InputCallback,
    ) -> crate::error::Result<MidiInputConnection<()>> {
        let mut midi_input = MidiInput::new("chordstep-midi-input")?;
        midi_input.ignore(Ignore::All);

        let ports = midi_input.ports();
        let port = ports.get(device_index).ok_or_else(|| {
            crate::error::Error::MidiDevice(format!("MIDI device {} not found", device_index))
        })?;

        let connection = midi_input.connect(
            port,
            "chordstep-input",
            move |_timestamp, message, _| match InputEvent::from_bytes(message) {
                Some(event) => callback(event),
                None => trace!("Ignoring MIDI message {:02X?}", message),
            },
            (),
        )?;

        Ok(connection)
    }

    pub fn list_devices() -> Vec<MidiInputDevice> {
        let mut devices = Vec::new();
        match MidiInput::new("chordstep-device-list") {
            Ok(midi_input) => {
                let ports = midi_input.ports();
                for (index, port) in ports.iter().enumerate() {
                    let name = midi_input
                        .port_name(port)
                        .unwrap_or_else(|_| format!("Unknown Device {}", index));
                    devices.push(MidiInputDevice { index, name });
                }
            }
            Err(e) => warn!("MIDI input unavailable: {}", e),
        }
        devices
    }

    /// Listen on every input, posting decoded events to `sender`.
    ///
    /// Replaces any earlier subscription.
    pub fn connect_all<T>(&self, sender: Sender<T>) -> crate::error::Result<()>
    where
        T: From<InputEvent> + Send + 'static,
    {
        let callback: InputCallback = Arc::new(move |event| {
            if sender.send(T::from(event)).is_err() {
                trace!("Input event dropped: receiver gone");
            }
        });
        self.command_sender
            .send(MidiCommand::ConnectAll(callback))
            .map_err(|_| {
                crate::error::Error::MidiDevice("MIDI input thread not running".to_string())
            })
    }

    pub fn disconnect(&self) {
        let _ = self.command_sender.send(MidiCommand::Disconnect);
    }

    pub fn connected_devices(&self) -> Vec<String> {
        self.connected_devices.load().as_ref().clone()
    }

    pub fn is_connected(&self) -> bool {
        !self.connected_devices.load().is_empty()
    }
}

#[cfg(feature = "midi-io")]
impl Default for MidiInputManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "midi-io")]
impl Drop for MidiInputManager {
    fn drop(&mut self) {
        let _ = self.command_sender.send(MidiCommand::Shutdown);
    }
}
