//! Stepper subsystem bring-up and producer API
//!
//! [`init_stepper_subsystem`] starts the step clock tasks before the
//! control task. Clock tasks only move a motor when armed, and only the
//! control task arms them, so a failed bring-up leaves every motor still.

use defmt::*;
use embassy_executor::Spawner;

use unistep_core::config::MOTOR_COUNT;
use unistep_core::traits::WindingOutput;
use unistep_core::StepperError;

use crate::board::MotorDriver;
use crate::channels::{FirmwareStepper, STEPPER};
use crate::tasks::{control_task, step_clock_task};

/// Subsystem bring-up failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum InitError {
    /// The step clock task of a motor could not be spawned
    ClockTask { motor: usize },
    /// The control task could not be spawned
    ControlTask,
}

/// De-energize every motor and start the step clocks and the control task
pub fn init_stepper_subsystem(
    spawner: Spawner,
    motors: [MotorDriver; MOTOR_COUNT],
) -> Result<&'static FirmwareStepper, InitError> {
    for (motor, mut driver) in motors.into_iter().enumerate() {
        driver.release();
        spawner
            .spawn(step_clock_task(motor, driver))
            .map_err(|_| InitError::ClockTask { motor })?;
    }

    // On failure the clock tasks above stay registered but never move a
    // motor: only the control task arms them, and the error stops bring-up.
    spawner
        .spawn(control_task())
        .map_err(|_| InitError::ControlTask)?;

    info!("Stepper subsystem started: {} motors", MOTOR_COUNT);
    Ok(&STEPPER)
}

/// Queue a raw command line for the control task
///
/// Never blocks; fails with `QueueFull` when the queue is full.
pub fn send_motion_command(text: &str) -> Result<(), StepperError> {
    STEPPER.send_motion_command(text)
}

/// Remaining angle of the current move of `motor`, in whole degrees
pub fn pending_angle(motor: usize) -> Result<u32, StepperError> {
    STEPPER.pending_angle(motor)
}
