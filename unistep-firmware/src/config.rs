//! Stepper configuration
//!
//! Constants generated by build.rs from stepper.toml. The build fails if
//! any value is out of range, so the conversions below cannot fail at
//! runtime.

use embassy_time::Duration;

use unistep_core::config::{OverwritePolicy, StepTiming};
use unistep_protocol::{Direction, MotionCommand};

include!(concat!(env!("OUT_DIR"), "/stepper_config.rs"));

/// Step clock timing
pub const STEP_TIMING: StepTiming = match StepTiming::new(STEP_PERIOD_MS) {
    Ok(timing) => timing,
    Err(_) => panic!("step_period_ms out of range"),
};

/// Step clock period
pub const STEP_PERIOD: Duration = Duration::from_millis(STEP_TIMING.period_ms() as u64);

/// Control task heartbeat interval
pub const COMMAND_TIMEOUT: Duration = Duration::from_millis(COMMAND_TIMEOUT_MS);

/// Demo move queued by the demo task
#[cfg_attr(not(feature = "demo"), allow(dead_code))]
pub const DEMO_COMMAND: MotionCommand = MotionCommand::new(
    DEMO_MOTOR,
    match Direction::from_code(DEMO_DIRECTION) {
        Some(direction) => direction,
        None => panic!("demo direction must be 0 or 1"),
    },
    DEMO_ANGLE_DEG,
);

/// Interval between demo moves
#[cfg_attr(not(feature = "demo"), allow(dead_code))]
pub const DEMO_INTERVAL: Duration = Duration::from_millis(DEMO_INTERVAL_MS);
