//! Per-motor step clock task
//!
//! Sleeps until its motor is armed, then emits one step per period until
//! the motor has nothing pending. The windings stay energized while idle
//! so the motor holds its position.

use defmt::*;
use embassy_time::Ticker;

use unistep_core::config::MOTOR_COUNT;
use unistep_core::sequencer::ClockState;

use crate::board::MotorDriver;
use crate::channels::{CLOCKS, STEPPER};
use crate::config::STEP_PERIOD;

/// Step clock for one motor
#[embassy_executor::task(pool_size = MOTOR_COUNT)]
pub async fn step_clock_task(motor: usize, mut driver: MotorDriver) {
    if let Err(e) = CLOCKS.register(motor) {
        error!("Step clock {}: cannot register: {:?}", motor, e);
        return;
    }
    info!("Step clock {} started", motor);

    loop {
        if let Err(e) = CLOCKS.wait_armed(motor).await {
            error!("Step clock {}: {:?}", motor, e);
            return;
        }

        // First step lands one period after arming
        let mut ticker = Ticker::every(STEP_PERIOD);
        loop {
            ticker.next().await;
            match STEPPER.step(motor, &mut driver) {
                Ok(ClockState::Running) => {}
                Ok(ClockState::Idle) => break,
                Err(e) => {
                    warn!("Step clock {}: {:?}", motor, e);
                    break;
                }
            }
        }

        if let Ok(state) = STEPPER.snapshot(motor) {
            debug!(
                "Motor {} idle: position={}, phase={}",
                motor,
                state.absolute_position(),
                state.sequencer().index()
            );
        }
        if driver.write_faults() > 0 {
            warn!("Motor {}: {} winding write faults", motor, driver.write_faults());
        }
    }
}
