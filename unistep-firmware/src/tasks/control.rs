//! Control task
//!
//! Single consumer of the command queue. Each line is parsed, converted
//! to steps and applied to its motor; rejected lines are logged and
//! dropped, and the loop carries on with the next one.
//!
//! A heartbeat runs every `command_timeout_ms` whether or not commands
//! keep arriving, so latched error flags are always reported and cleared.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::Ticker;

use unistep_core::config::MOTOR_COUNT;
use unistep_core::units::angle_to_steps;
use unistep_protocol::MotionCommand;

use crate::channels::{CLOCKS, STEPPER};
use crate::config::{COMMAND_TIMEOUT, STEP_TIMING};
use crate::subsystem::pending_angle;

/// Control task - applies queued motion commands
#[embassy_executor::task]
pub async fn control_task() {
    info!("Control task started");

    let mut heartbeat_ticker = Ticker::every(COMMAND_TIMEOUT);

    loop {
        let line = match select(STEPPER.next_command(), heartbeat_ticker.next()).await {
            Either::First(line) => line,
            Either::Second(()) => {
                heartbeat();
                continue;
            }
        };

        match STEPPER.dispatch(&CLOCKS, &line) {
            Ok(cmd) => log_setpoint(&cmd),
            Err(e) => {
                warn!("Rejected command '{}': {:?}", line.as_str(), e);
            }
        }
    }
}

/// Log an accepted setpoint with its expected duration
fn log_setpoint(cmd: &MotionCommand) {
    let duration_ms = angle_to_steps(cmd.angle_deg)
        .map(|steps| STEP_TIMING.move_duration_ms(steps))
        .unwrap_or(0);
    debug!(
        "Setpoint: motor={} dir={:?} angle={} ({} ms)",
        cmd.motor, cmd.direction, cmd.angle_deg, duration_ms
    );
}

/// Log pending motion and any errors latched since the last heartbeat
fn heartbeat() {
    for motor in 0..MOTOR_COUNT {
        if let Ok(angle) = pending_angle(motor) {
            trace!("Heartbeat: motor {} pending {} deg", motor, angle);
        }
    }

    let errors = STEPPER.take_errors();
    if !errors.is_empty() {
        warn!("Errors since last heartbeat: {=u8:#b}", errors.bits());
    }
}
