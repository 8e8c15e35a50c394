//! Performer input: decoded device messages and the listener they drive.

use crate::config::SUSTAIN_CONTROLLER;

/// A message from the performer's controller that the engine cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    NoteOn { key: u8, velocity: u8 },
    NoteOff { key: u8 },
    ControlChange { controller: u8, value: u8 },
}

impl InputEvent {
    /// Decode a raw MIDI 1.0 message. Channel is ignored; every channel of
    /// the input counts. Note-on with velocity 0 decodes as note-off.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let (&status, data) = bytes.split_first()?;
        let &[d1, d2, ..] = data else {
            return None;
        };
        let (d1, d2) = (d1 & 0x7F, d2 & 0x7F);

        match status & 0xF0 {
            0x90 if d2 > 0 => Some(InputEvent::NoteOn {
                key: d1,
                velocity: d2,
            }),
            0x90 | 0x80 => Some(InputEvent::NoteOff { key: d1 }),
            0xB0 => Some(InputEvent::ControlChange {
                controller: d1,
                value: d2,
            }),
            _ => None,
        }
    }

    /// Route this event to the matching listener callback.
    ///
    /// Controllers other than the listener's sustain controller are dropped.
    pub fn dispatch<L: PerformanceListener + ?Sized>(self, listener: &mut L) {
        match self {
            InputEvent::NoteOn { key, velocity } => listener.on_trigger(key, velocity),
            InputEvent::NoteOff { key } => listener.on_release(key),
            InputEvent::ControlChange { controller, value } => {
                if controller == listener.sustain_controller() {
                    listener.on_sustain(value);
                }
            }
        }
    }
}

/// Subscriber for performer input.
pub trait PerformanceListener {
    fn on_trigger(&mut self, key: u8, velocity: u8);

    fn on_release(&mut self, key: u8);

    fn on_sustain(&mut self, value: u8);

    fn sustain_controller(&self) -> u8 {
        SUSTAIN_CONTROLLER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Log(Vec<String>);

    impl PerformanceListener for Log {
        fn on_trigger(&mut self, key: u8, velocity: u8) {
            self.0.push(format!("trigger {key} {velocity}"));
        }
        fn on_release(&mut self, key: u8) {
            self.0.push(format!("release {key}"));
        }
        fn on_sustain(&mut self, value: u8) {
            self.0.push(format!("sustain {value}"));
        }
    }

    #[test]
    fn test_decode_note_messages() {
        assert_eq!(
            InputEvent::from_bytes(&[0x90, 36, 100]),
            Some(InputEvent::NoteOn {
                key: 36,
                velocity: 100
            })
        );
        assert_eq!(
            InputEvent::from_bytes(&[0x95, 36, 0]),
            Some(InputEvent::NoteOff { key: 36 })
        );
        assert_eq!(
            InputEvent::from_bytes(&[0x8F, 38, 64]),
            Some(InputEvent::NoteOff { key: 38 })
        );
    }

    #[test]
    fn test_decode_control_change() {
        assert_eq!(
            InputEvent::from_bytes(&[0xB0, 64, 127]),
            Some(InputEvent::ControlChange {
                controller: 64,
                value: 127
            })
        );
    }

    #[test]
    fn test_decode_ignores_other_messages() {
        assert_eq!(InputEvent::from_bytes(&[]), None);
        assert_eq!(InputEvent::from_bytes(&[0x90, 60]), None);
        assert_eq!(InputEvent::from_bytes(&[0xC0, 1]), None);
        assert_eq!(InputEvent::from_bytes(&[0xE0, 0, 64]), None);
        assert_eq!(InputEvent::from_bytes(&[0xF8]), None);
    }

    #[test]
    fn test_dispatch_routes_and_filters_controllers() {
        let mut log = Log::default();
        InputEvent::NoteOn {
            key: 36,
            velocity: 90,
        }
        .dispatch(&mut log);
        InputEvent::ControlChange {
            controller: 7,
            value: 100,
        }
        .dispatch(&mut log);
        InputEvent::ControlChange {
            controller: 64,
            value: 100,
        }
        .dispatch(&mut log);
        InputEvent::NoteOff { key: 36 }.dispatch(&mut log);

        assert_eq!(log.0, vec!["trigger 36 90", "sustain 100", "release 36"]);
    }
}
