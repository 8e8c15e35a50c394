//! Note events taken from loaded material and commands sent to the output.

use serde::{Deserialize, Serialize};

/// A note-on extracted from the loaded material.
///
/// `time` is the absolute tick position within its source track. The stored
/// velocity is kept for reference only; playback always uses the performer's
/// live velocity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub note: u8,
    pub velocity: u8,
    /// Wire channel (0-15)
    pub channel: u8,
    pub time: u64,
}

impl NoteEvent {
    pub fn new(note: u8, velocity: u8, channel: u8, time: u64) -> Self {
        Self {
            note: note & 0x7F,
            velocity: velocity & 0x7F,
            channel: channel.min(15),
            time,
        }
    }
}

/// A message the engine asks the selected output to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputCommand {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    ProgramChange { channel: u8, program: u8 },
}

impl OutputCommand {
    /// Raw MIDI 1.0 bytes for this command.
    pub fn to_bytes(&self) -> Vec<u8> {
        match *self {
            OutputCommand::NoteOn {
                channel,
                note,
                velocity,
            } => vec![0x90 | channel.min(15), note & 0x7F, velocity & 0x7F],
            OutputCommand::NoteOff { channel, note } => {
                vec![0x80 | channel.min(15), note & 0x7F, 0]
            }
            OutputCommand::ControlChange {
                channel,
                controller,
                value,
            } => vec![0xB0 | channel.min(15), controller & 0x7F, value & 0x7F],
            OutputCommand::ProgramChange { channel, program } => {
                vec![0xC0 | channel.min(15), program & 0x7F]
            }
        }
    }

    pub fn note(&self) -> Option<u8> {
        match *self {
            OutputCommand::NoteOn { note, .. } | OutputCommand::NoteOff { note, .. } => Some(note),
            _ => None,
        }
    }
}
