//! Output seam between the engine and a device gateway.

use crate::event::OutputCommand;
use parking_lot::Mutex;
use std::sync::Arc;

/// Destination for engine output. Sends are fire-and-forget.
pub trait NoteOutput {
    fn send(&mut self, command: OutputCommand);
}

impl<T: NoteOutput + ?Sized> NoteOutput for Box<T> {
    fn send(&mut self, command: OutputCommand) {
        (**self).send(command)
    }
}

/// Records every command it is asked to send. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct CommandRecorder {
    commands: Arc<Mutex<Vec<OutputCommand>>>,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<OutputCommand> {
        self.commands.lock().clone()
    }

    /// Return and clear everything recorded so far.
    pub fn take(&self) -> Vec<OutputCommand> {
        std::mem::take(&mut *self.commands.lock())
    }

    pub fn len(&self) -> usize {
        self.commands.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.lock().is_empty()
    }
}

impl NoteOutput for CommandRecorder {
    fn send(&mut self, command: OutputCommand) {
        self.commands.lock().push(command);
    }
}
