//! # Perform
//!
//! Load a sequence and play it chord by chord from any connected keyboard.
//!
//! ```bash
//! cargo run --example perform -- <output-name> [file.mid | bach | dream] [--local-off]
//! ```

use chordstep::prelude::*;
use std::time::Duration;

fn main() -> chordstep::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chordstep=debug,chordstep_core=debug".into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let output = args.next().unwrap_or_default();
    let source = args.next().unwrap_or_else(|| "bach".to_string());
    let local_off = args.any(|arg| arg == "--local-off");

    let mut session = Session::builder()
        .output_name(output)
        .listen_inputs()
        .build()?;

    match source.as_str() {
        "bach" => session.load_remote(RemoteSource::BachPrelude),
        "dream" => session.load_remote(RemoteSource::Dream),
        path => {
            session.load_file(path)?;
        }
    }

    if local_off {
        session.set_local_control(LocalControl::Off);
    }

    println!("Press any key to play the next chord. Ctrl-C to quit.");
    loop {
        session.run_for(Duration::from_secs(1));
        if session.engine().is_finished() && session.sequence_len() > 0 {
            println!("End of {}", session.source_name().unwrap_or("sequence"));
            break;
        }
    }

    if local_off {
        session.set_local_control(LocalControl::On);
    }
    Ok(())
}
