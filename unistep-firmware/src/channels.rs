//! Shared stepper state
//!
//! The subsystem and the step clock bank live in statics so every task
//! (and any producer) can reach them without passing references around.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use unistep_core::config::MOTOR_COUNT;
use unistep_core::{ClockBank, Stepper};

use crate::config::OVERWRITE_POLICY;

/// Stepper subsystem as used on the target
pub type FirmwareStepper = Stepper<CriticalSectionRawMutex, MOTOR_COUNT>;

/// Motor table, command queue and error flags
pub static STEPPER: FirmwareStepper = Stepper::new(OVERWRITE_POLICY);

/// Arm signals of the per-motor step clock tasks
pub static CLOCKS: ClockBank<CriticalSectionRawMutex, MOTOR_COUNT> = ClockBank::new();
