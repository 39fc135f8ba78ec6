//! Board-agnostic core logic for the unipolar stepper sequencer
//!
//! This crate contains everything that does not depend on a specific
//! board or executor:
//!
//! - Half-step energization table and winding patterns
//! - Per-motor sequencer state and its step clock transitions
//! - Motor state table with one lock per motor
//! - Bounded command queue and the setpoint applier
//! - Hardware abstraction traits (winding outputs, step clocks)
//! - Signal-based step clock bank for executor tasks
//! - Configuration constants and unit conversion

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod clock_bank;
pub mod config;
pub mod error;
pub mod queue;
pub mod sequencer;
pub mod stepper;
pub mod table;
pub mod traits;
pub mod units;

pub use clock_bank::ClockBank;
pub use error::{ErrorFlags, StepperError};
pub use stepper::Stepper;
