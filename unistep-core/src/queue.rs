//! Bounded command queue
//!
//! FIFO of raw command lines between any number of producers and the
//! single control task. Producers never block: a full queue is reported
//! back so the caller can apply its own backpressure.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;
use heapless::String;

use unistep_protocol::MotionCommand;

use crate::config::{COMMAND_TEXT_LEN, QUEUE_DEPTH};
use crate::error::StepperError;

/// Owned copy of a queued command line
pub type CommandText = String<COMMAND_TEXT_LEN>;

/// Command queue with `QUEUE_DEPTH` slots
pub struct CommandQueue<M: RawMutex> {
    channel: Channel<M, CommandText, QUEUE_DEPTH>,
}

impl<M: RawMutex> Default for CommandQueue<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> CommandQueue<M> {
    /// Create an empty queue
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Queue a raw command line without waiting
    ///
    /// Fails with `ParseError` if the line does not fit a slot and with
    /// `QueueFull` if every slot is taken.
    pub fn enqueue(&self, text: &str) -> Result<(), StepperError> {
        let mut line = CommandText::new();
        line.push_str(text).map_err(|_| StepperError::ParseError)?;
        self.channel
            .try_send(line)
            .map_err(|_| StepperError::QueueFull)
    }

    /// Queue an already built command
    pub fn enqueue_command(&self, cmd: &MotionCommand) -> Result<(), StepperError> {
        self.channel
            .try_send(cmd.encode())
            .map_err(|_| StepperError::QueueFull)
    }

    /// Wait for the next command line
    pub async fn receive(&self) -> CommandText {
        self.channel.receive().await
    }

    /// Take the next command line if one is waiting
    pub fn try_receive(&self) -> Option<CommandText> {
        self.channel.try_receive().ok()
    }

    /// Number of waiting commands
    pub fn len(&self) -> usize {
        self.channel.len()
    }

    /// Check if no command is waiting
    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    /// Check if every slot is taken
    pub fn is_full(&self) -> bool {
        self.channel.is_full()
    }
}
