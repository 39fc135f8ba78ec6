//! Unistep motion command protocol
//!
//! This crate defines the text format producers use to request relative
//! moves from the stepper subsystem, and a line assembler for byte
//! streams (UART) that carry those commands.
//!
//! # Command Format
//!
//! One command per line:
//! ```text
//! STP<id>,<dir>,<angle>
//!  │   │    │     └── relative angle in whole degrees
//!  │   │    └──────── 0 = negative, 1 = positive
//!  │   └───────────── motor index
//!  └───────────────── literal tag
//! ```
//!
//! Example: `STP0,1,45` turns motor 0 by 45° in the positive direction.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod line;

pub use command::{
    Direction, MotionCommand, ParseError, COMMAND_TAG, FIELD_SEPARATOR, MAX_COMMAND_LEN,
};
pub use line::{LineAssembler, LineError};
