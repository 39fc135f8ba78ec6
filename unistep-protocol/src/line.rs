//! Line assembly for byte streams carrying motion commands.
//!
//! Lines are terminated by `\n`; a `\r` directly before it is dropped, any
//! other `\r` stays part of the line. Blank lines
//! are skipped. A line longer than the buffer is discarded up to the next
//! terminator and reported once as [`LineError::Overflow`].

use heapless::{String, Vec};

use crate::command::MAX_COMMAND_LEN;

/// Errors that can occur while assembling a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    /// Line exceeded the buffer and was discarded
    Overflow,
    /// Line was not valid UTF-8
    InvalidUtf8,
}

/// Byte-at-a-time line assembler
#[derive(Debug, Clone)]
pub struct LineAssembler<const N: usize = MAX_COMMAND_LEN> {
    buffer: Vec<u8, N>,
    /// Dropping bytes until the next terminator
    discarding: bool,
    /// A `\r` was seen and is kept back until the next byte
    carriage_return: bool,
}

impl<const N: usize> Default for LineAssembler<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> LineAssembler<N> {
    /// Create an empty assembler
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            discarding: false,
            carriage_return: false,
        }
    }

    /// Drop any partial line
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.discarding = false;
        self.carriage_return = false;
    }

    /// Feed a single byte
    ///
    /// Returns `Ok(Some(line))` when a complete non-empty line is available,
    /// `Ok(None)` when more bytes are needed, or `Err` when a line was dropped.
    pub fn feed(&mut self, byte: u8) -> Result<Option<String<N>>, LineError> {
        match byte {
            b'\n' => {
                self.carriage_return = false;
                if self.discarding {
                    self.reset();
                    return Ok(None);
                }
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                let bytes = core::mem::take(&mut self.buffer);
                String::from_utf8(bytes)
                    .map(Some)
                    .map_err(|_| LineError::InvalidUtf8)
            }
            _ if self.discarding => Ok(None),
            b'\r' => {
                // Only the last one before the terminator is dropped
                if self.carriage_return {
                    self.push(b'\r')?;
                }
                self.carriage_return = true;
                Ok(None)
            }
            _ => {
                if self.carriage_return {
                    self.carriage_return = false;
                    self.push(b'\r')?;
                }
                self.push(byte)?;
                Ok(None)
            }
        }
    }

    fn push(&mut self, byte: u8) -> Result<(), LineError> {
        if self.buffer.push(byte).is_err() {
            self.buffer.clear();
            self.carriage_return = false;
            self.discarding = true;
            return Err(LineError::Overflow);
        }
        Ok(())
    }
}
