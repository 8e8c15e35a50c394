//! Broadcast to every connected output.
//!
//! Works at the raw device level, independent of whichever output the
//! engine has selected. Used for local-control toggling and the start-up
//! program change.

use crate::error::Result;
use crate::io::{MidiOutputDevice, MidiOutputMessage};
use chordstep_core::LocalControl;
use tracing::{debug, warn};

/// Lowest-level output access: enumerate and send raw bytes.
pub trait DeviceAccess {
    fn outputs(&self) -> Result<Vec<MidiOutputDevice>>;

    fn send_raw(&self, device: &MidiOutputDevice, bytes: &[u8]) -> Result<()>;
}

/// Send `bytes` to every output. Returns how many devices accepted them.
///
/// Failures are logged and never propagate.
pub fn broadcast<A: DeviceAccess + ?Sized>(access: &A, bytes: &[u8]) -> usize {
    let devices = match access.outputs() {
        Ok(devices) => devices,
        Err(e) => {
            warn!("Error accessing MIDI devices: {}", e);
            return 0;
        }
    };

    let mut sent = 0;
    for device in &devices {
        match access.send_raw(device, bytes) {
            Ok(()) => sent += 1,
            Err(e) => warn!("Failed to send to MIDI output {}: {}", device.name, e),
        }
    }
    debug!(
        "Broadcast {:02X?} to {}/{} outputs",
        bytes,
        sent,
        devices.len()
    );
    sent
}

pub fn send_local_control<A: DeviceAccess + ?Sized>(access: &A, mode: LocalControl) -> usize {
    broadcast(access, &mode.message())
}

pub fn send_program_change<A: DeviceAccess + ?Sized>(
    access: &A,
    channel: u8,
    program: u8,
) -> usize {
    broadcast(access, &MidiOutputMessage::program_change(channel, program).bytes)
}

/// [`DeviceAccess`] through midir, opening a short-lived connection per send.
#[cfg(feature = "midi-io")]
#[derive(Debug, Clone, Copy, Default)]
pub struct MidirAccess;

#[cfg(feature = "midi-io")]
impl DeviceAccess for MidirAccess {
    fn outputs(&self) -> Result<Vec<MidiOutputDevice>> {
        let midi_output = midir::MidiOutput::new("chordstep-broadcast")?;
        Ok(midi_output
            .ports()
            .iter()
            .enumerate()
            .map(|(index, port)| MidiOutputDevice {
                index,
                name: midi_output
                    .port_name(port)
                    .unwrap_or_else(|_| format!("Unknown Device {}", index)),
            })
            .collect())
    }

    fn send_raw(&self, device: &MidiOutputDevice, bytes: &[u8]) -> Result<()> {
        let midi_output = midir::MidiOutput::new("chordstep-broadcast")?;
        let ports = midi_output.ports();
        let port = ports.get(device.index).ok_or_else(|| {
            crate::error::Error::MidiDevice(format!("MIDI output {} disappeared", device.name))
        })?;
        let mut connection = midi_output.connect(port, "chordstep-broadcast")?;
        connection.send(bytes)?;
        connection.close();
        Ok(())
    }
}
