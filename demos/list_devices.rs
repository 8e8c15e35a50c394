//! # List Devices
//!
//! Print every MIDI input and output the system reports.
//!
//! ```bash
//! cargo run --example list_devices
//! ```

use chordstep::{MidiInputManager, MidiOutputManager};

fn main() {
    tracing_subscriber::fmt::init();

    println!("Outputs:");
    for device in MidiOutputManager::list_devices() {
        println!("  [{}] {}", device.index, device.name);
    }

    println!("Inputs:");
    for device in MidiInputManager::list_devices() {
        println!("  [{}] {}", device.index, device.name);
    }
}
