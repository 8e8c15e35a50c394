//! Local-control messages.
//!
//! Local control decides whether a keyboard's own keys drive its internal
//! sound engine. It is unrelated to performance state and is broadcast to
//! every output rather than the selected one.

use serde::{Deserialize, Serialize};

/// Channel-mode controller for local control.
pub const LOCAL_CONTROL_CC: u8 = 0x7A;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocalControl {
    On,
    Off,
}

impl LocalControl {
    pub fn from_enabled(enabled: bool) -> Self {
        if enabled {
            LocalControl::On
        } else {
            LocalControl::Off
        }
    }

    pub fn is_on(self) -> bool {
        matches!(self, LocalControl::On)
    }

    /// Three-byte control change on channel 1.
    pub fn message(self) -> [u8; 3] {
        [0xB0, LOCAL_CONTROL_CC, if self.is_on() { 0x7F } else { 0x00 }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(LocalControl::On.message(), [0xB0, 0x7A, 0x7F]);
        assert_eq!(LocalControl::Off.message(), [0xB0, 0x7A, 0x00]);
        assert_eq!(LocalControl::from_enabled(true), LocalControl::On);
        assert!(!LocalControl::from_enabled(false).is_on());
    }
}
