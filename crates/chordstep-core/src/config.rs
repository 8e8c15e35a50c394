//! Engine configuration.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Trigger debounce window in milliseconds.
pub const DEBOUNCE_MS: u64 = 50;

/// Sustain pedal controller number.
pub const SUSTAIN_CONTROLLER: u8 = 64;

/// Controller values above this switch sustain on.
pub const SUSTAIN_THRESHOLD: u8 = 63;

/// Wire channel for all engine output (logical channel 1).
pub const OUTPUT_CHANNEL: u8 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub debounce_ms: u64,
    /// Wire channel (0-15) every note is sent on
    pub channel: u8,
    pub sustain_controller: u8,
    pub sustain_threshold: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEBOUNCE_MS,
            channel: OUTPUT_CHANNEL,
            sustain_controller: SUSTAIN_CONTROLLER,
            sustain_threshold: SUSTAIN_THRESHOLD,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.channel > 15 {
            return Err(Error::InvalidConfig(format!(
                "channel {} out of range 0-15",
                self.channel
            )));
        }
        if self.sustain_controller > 127 {
            return Err(Error::InvalidConfig(format!(
                "sustain controller {} out of range 0-127",
                self.sustain_controller
            )));
        }
        if self.sustain_threshold > 127 {
            return Err(Error::InvalidConfig(format!(
                "sustain threshold {} out of range 0-127",
                self.sustain_threshold
            )));
        }
        Ok(())
    }
}
