//! Session tests: event queue, background loads, and device broadcast.
//!
//! Run without hardware: output goes to a `CommandRecorder` and broadcast to
//! an in-memory device list.

use chordstep::midi_io::Result as MidiResult;
use chordstep::{
    CommandRecorder, DeviceAccess, InputEvent, LocalControl, ManualClock, MidiOutputDevice,
    OutputCommand, Session, SessionBuilder, SessionEvent,
};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Clone, Default)]
struct FakeDevices {
    sent: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
}

impl FakeDevices {
    fn sent(&self) -> Vec<(String, Vec<u8>)> {
        self.sent.lock().unwrap().clone()
    }
}

impl DeviceAccess for FakeDevices {
    fn outputs(&self) -> MidiResult<Vec<MidiOutputDevice>> {
        Ok(["Piano", "Synth"]
            .iter()
            .enumerate()
            .map(|(index, name)| MidiOutputDevice {
                index,
                name: name.to_string(),
            })
            .collect())
    }

    fn send_raw(&self, device: &MidiOutputDevice, bytes: &[u8]) -> MidiResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push((device.name.clone(), bytes.to_vec()));
        Ok(())
    }
}

/// Single-track file at 96 ticks per beat.
fn smf(body: &[u8]) -> Vec<u8> {
    let mut data = vec![
        0x4D, 0x54, 0x68, 0x64, 0x00, 0x00, 0x00, 0x06, 0x00, 0x00, 0x00, 0x01, 0x00, 0x60,
    ];
    data.extend_from_slice(b"MTrk");
    data.extend_from_slice(&(body.len() as u32).to_be_bytes());
    data.extend_from_slice(body);
    data
}

/// C4+E4, then G4.
fn chord_then_note() -> Vec<u8> {
    smf(&[
        0x00, 0x90, 60, 80, //
        0x00, 0x90, 64, 80, //
        0x60, 0x90, 67, 80, //
        0x60, 0x80, 60, 0, //
        0x00, 0xFF, 0x2F, 0x00,
    ])
}

/// A single D4.
fn single_note() -> Vec<u8> {
    smf(&[0x00, 0x90, 62, 80, 0x60, 0x80, 62, 0, 0x00, 0xFF, 0x2F, 0x00])
}

struct Harness {
    session: Session<CommandRecorder, ManualClock>,
    recorder: CommandRecorder,
    clock: ManualClock,
    devices: FakeDevices,
}

fn harness() -> Harness {
    let clock = ManualClock::new(0);
    let devices = FakeDevices::default();
    let recorder = CommandRecorder::new();
    let mut session = SessionBuilder::default()
        .skip_program_reset()
        .build_with(clock.clone(), devices.clone())
        .unwrap();
    session.select_output(Some(recorder.clone()));
    Harness {
        session,
        recorder,
        clock,
        devices,
    }
}

/// Drain the queue until `count` events were handled or a second passes.
fn process_until(session: &mut Session<CommandRecorder, ManualClock>, count: usize) -> usize {
    let deadline = Instant::now() + Duration::from_secs(1);
    let mut handled = 0;
    while handled < count && Instant::now() < deadline {
        handled += session.process_pending();
        std::thread::sleep(Duration::from_millis(2));
    }
    handled
}

#[test]
fn test_input_events_through_queue() {
    let mut h = harness();
    h.session.load_bytes("chords.mid", &chord_then_note()).unwrap();
    assert_eq!(h.session.source_name(), Some("chords.mid"));
    assert_eq!(h.session.sequence_len(), 3);

    let sender = h.session.sender();
    sender
        .send(InputEvent::NoteOn { key: 40, velocity: 90 }.into())
        .unwrap();
    sender.send(InputEvent::NoteOff { key: 40 }.into()).unwrap();
    assert_eq!(h.session.process_pending(), 2);

    assert_eq!(h.session.cursor(), 2);
    assert_eq!(
        h.recorder.take(),
        vec![
            OutputCommand::NoteOn {
                channel: 0,
                note: 60,
                velocity: 90
            },
            OutputCommand::NoteOn {
                channel: 0,
                note: 64,
                velocity: 90
            },
            OutputCommand::NoteOff {
                channel: 0,
                note: 60
            },
            OutputCommand::NoteOff {
                channel: 0,
                note: 64
            },
        ]
    );
}

#[test]
fn test_sustain_pedal_through_queue() {
    let mut h = harness();
    h.session.handle(
        InputEvent::ControlChange {
            controller: 64,
            value: 100,
        }
        .into(),
    );
    assert!(h.session.sustain());
    assert_eq!(
        h.recorder.take(),
        vec![OutputCommand::ControlChange {
            channel: 0,
            controller: 64,
            value: 127
        }]
    );

    h.session.handle(
        InputEvent::ControlChange {
            controller: 64,
            value: 10,
        }
        .into(),
    );
    assert!(!h.session.sustain());
}

#[test]
fn test_debounce_applies_to_queued_triggers() {
    let mut h = harness();
    h.session.load_bytes("chords.mid", &chord_then_note()).unwrap();
    h.clock.set(1000);

    let sender = h.session.sender();
    sender
        .send(InputEvent::NoteOn { key: 40, velocity: 90 }.into())
        .unwrap();
    sender
        .send(InputEvent::NoteOn { key: 41, velocity: 90 }.into())
        .unwrap();
    h.session.process_pending();

    // Second press landed inside the window
    assert_eq!(h.session.cursor(), 2);
    assert!(h.session.engine().active_notes(41).is_none());

    h.clock.advance(100);
    h.session.handle(InputEvent::NoteOn { key: 41, velocity: 90 }.into());
    assert_eq!(h.session.cursor(), 3);
}

#[test]
fn test_failed_fetch_keeps_current_sequence() {
    let mut h = harness();
    h.session.load_bytes("chords.mid", &chord_then_note()).unwrap();
    h.session.handle(InputEvent::NoteOn { key: 40, velocity: 90 }.into());

    h.session.handle(SessionEvent::Fetched {
        name: "Dream nº1 (Rafael Gimeno).mid".to_string(),
        result: Err("connection refused".to_string()),
    });
    h.session.handle(SessionEvent::Fetched {
        name: "broken.mid".to_string(),
        result: Ok(b"garbage".to_vec()),
    });

    assert_eq!(h.session.source_name(), Some("chords.mid"));
    assert_eq!(h.session.sequence_len(), 3);
    assert_eq!(h.session.cursor(), 2);
}

#[test]
fn test_successful_fetch_replaces_sequence() {
    let mut h = harness();
    h.session.load_bytes("chords.mid", &chord_then_note()).unwrap();
    h.session.handle(InputEvent::NoteOn { key: 40, velocity: 90 }.into());

    let data = single_note();
    h.session.spawn_load("single.mid", move || Ok(data));
    assert_eq!(process_until(&mut h.session, 1), 1);

    assert_eq!(h.session.source_name(), Some("single.mid"));
    assert_eq!(h.session.sequence_len(), 1);
    assert_eq!(h.session.cursor(), 0);
    assert!(!h.session.engine().is_finished());
}

#[test]
fn test_last_completed_fetch_wins() {
    let mut h = harness();
    let (gate_tx, gate_rx) = crossbeam_channel::bounded::<()>(0);

    let slow = chord_then_note();
    h.session.spawn_load("slow.mid", move || {
        let _ = gate_rx.recv();
        Ok(slow)
    });
    let fast = single_note();
    h.session.spawn_load("fast.mid", move || Ok(fast));

    assert_eq!(process_until(&mut h.session, 1), 1);
    assert_eq!(h.session.source_name(), Some("fast.mid"));

    gate_tx.send(()).unwrap();
    assert_eq!(process_until(&mut h.session, 1), 1);
    assert_eq!(h.session.source_name(), Some("slow.mid"));
    assert_eq!(h.session.sequence_len(), 3);
}

#[test]
fn test_local_control_broadcast() {
    let mut h = harness();
    assert_eq!(h.session.local_control(), None);

    assert_eq!(h.session.set_local_control(LocalControl::Off), 2);
    assert_eq!(h.session.local_control(), Some(LocalControl::Off));
    assert_eq!(
        h.devices.sent(),
        vec![
            ("Piano".to_string(), vec![0xB0, 0x7A, 0x00]),
            ("Synth".to_string(), vec![0xB0, 0x7A, 0x00]),
        ]
    );

    h.session.set_local_control(LocalControl::from_enabled(true));
    assert_eq!(h.devices.sent()[2].1, vec![0xB0, 0x7A, 0x7F]);

    // Broadcast bypasses the selected output
    assert!(h.recorder.is_empty());
}

#[test]
fn test_program_change_sent_on_build() {
    let devices = FakeDevices::default();
    let _session: Session<CommandRecorder, ManualClock> = SessionBuilder::default()
        .build_with(ManualClock::new(0), devices.clone())
        .unwrap();
    assert_eq!(
        devices.sent(),
        vec![
            ("Piano".to_string(), vec![0xC0, 0x00]),
            ("Synth".to_string(), vec![0xC0, 0x00]),
        ]
    );
}

#[test]
fn test_load_file_uses_file_name() {
    let mut h = harness();
    let path = std::env::temp_dir().join(format!("chordstep-{}.mid", std::process::id()));
    std::fs::write(&path, chord_then_note()).unwrap();

    let count = h.session.load_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(count, 3);
    assert_eq!(
        h.session.source_name(),
        path.file_name().and_then(|n| n.to_str())
    );
}

#[test]
fn test_load_missing_file_is_io_error() {
    let mut h = harness();
    let result = h.session.load_file("/nonexistent/chordstep/missing.mid");
    assert!(matches!(result, Err(chordstep::Error::Io(_))));
    assert_eq!(h.session.source_name(), None);
}

#[test]
fn test_no_output_selected_holds_position() {
    let mut h = harness();
    h.session.load_bytes("chords.mid", &chord_then_note()).unwrap();
    let previous = h.session.select_output(None);
    assert!(previous.is_some());

    h.session.handle(InputEvent::NoteOn { key: 40, velocity: 90 }.into());
    assert_eq!(h.session.cursor(), 0);
    assert!(h.recorder.is_empty());
}

#[test]
#[cfg(feature = "midi-hardware")]
fn test_unlisted_output_index_is_rejected() {
    let result = Session::builder()
        .skip_program_reset()
        .output_device(usize::MAX)
        .build();
    assert!(matches!(
        result,
        Err(chordstep::Error::Midi(chordstep::midi_io::Error::MidiDevice(_)))
    ));
}

#[test]
#[cfg(feature = "midi-hardware")]
fn test_unlisted_output_keeps_engine_without_output() {
    let mut session = Session::builder().skip_program_reset().build().unwrap();
    session.load_bytes("chords.mid", &chord_then_note()).unwrap();

    assert!(session.connect_output(usize::MAX).is_err());
    assert!(!session.engine().has_output());

    session.handle(InputEvent::NoteOn { key: 40, velocity: 90 }.into());
    assert_eq!(session.cursor(), 0);
    assert!(session.engine().active_notes(40).is_none());
}

#[test]
#[ignore] // Requires MIDI hardware
#[cfg(feature = "midi-hardware")]
fn test_hardware_session() {
    let _ = tracing_subscriber::fmt::try_init();
    let mut session = Session::builder().output_device(0).build().unwrap();
    session.listen_all_inputs().unwrap();
    session.run_for(Duration::from_millis(200));
    println!("Inputs: {:?}", session.connected_inputs());
}
