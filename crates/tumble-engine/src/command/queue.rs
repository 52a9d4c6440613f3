use crossbeam_channel::{Receiver, Sender};

use crate::api::types::BodyId;
use crate::core::body::BodyDesc;
use crate::core::math::Vector2;
use crate::extensions::rotation::SpinDirection;

/// A mutation of the sandbox requested by the presentation layer.
/// Commands are applied between ticks, never during one.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddBody(BodyDesc),
    RemoveBody(BodyId),
    SetGravity { direction: Vector2, magnitude: f64 },
    StartRotation {
        body: BodyId,
        duration: f64,
        direction: Option<SpinDirection>,
    },
    StopRotation(BodyId),
}

/// Single-threaded command queue.
/// The UI layer pushes commands; the sandbox drains them before each tick.
pub struct CommandQueue {
    commands: Vec<Command>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self {
            commands: Vec::with_capacity(16),
        }
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Drain all pending commands in submission order.
    pub fn drain(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer half of a cross-thread command channel. Cloneable.
pub type CommandSender = Sender<Command>;

/// Consumer half, owned by whoever ticks the sandbox.
pub type CommandReceiver = Receiver<Command>;

/// Create an unbounded channel for submitting commands from a thread other than
/// the one driving the ticks.
pub fn command_channel() -> (CommandSender, CommandReceiver) {
    crossbeam_channel::unbounded()
}
