//! Configuration constants and types
//!
//! Motor count, queue depth and the step period are fixed at compile time.
//! The firmware picks its step period and overwrite policy from
//! `stepper.toml`; the ranges are enforced here.

/// Number of motors driven by the subsystem
pub const MOTOR_COUNT: usize = 3;

/// Maximum number of commands waiting for the consumer
pub const QUEUE_DEPTH: usize = 10;

/// Half-steps per output shaft revolution (28BYJ-48 with 1:64 gearbox)
pub const STEPS_PER_REVOLUTION: u32 = 4096;

/// Degrees per output shaft revolution
pub const DEGREES_PER_REVOLUTION: u32 = 360;

/// Default step clock period in milliseconds
pub const DEFAULT_STEP_PERIOD_MS: u32 = 2;

/// Shortest step period the motor follows reliably
pub const MIN_STEP_PERIOD_MS: u32 = 1;

/// Longest supported step period
pub const MAX_STEP_PERIOD_MS: u32 = 4;

/// Maximum length of a queued command line
pub const COMMAND_TEXT_LEN: usize = unistep_protocol::MAX_COMMAND_LEN;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Step period outside `MIN_STEP_PERIOD_MS..=MAX_STEP_PERIOD_MS`
    InvalidStepPeriod,
}

/// Step clock timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepTiming {
    period_ms: u32,
}

impl Default for StepTiming {
    fn default() -> Self {
        Self {
            period_ms: DEFAULT_STEP_PERIOD_MS,
        }
    }
}

impl StepTiming {
    /// Create a timing with the given period, checking the supported range
    pub const fn new(period_ms: u32) -> Result<Self, ConfigError> {
        if period_ms < MIN_STEP_PERIOD_MS || period_ms > MAX_STEP_PERIOD_MS {
            return Err(ConfigError::InvalidStepPeriod);
        }
        Ok(Self { period_ms })
    }

    /// Step period in milliseconds
    pub const fn period_ms(&self) -> u32 {
        self.period_ms
    }

    /// Step rate in steps per second
    pub const fn steps_per_second(&self) -> u32 {
        1000 / self.period_ms
    }

    /// Time needed to emit `steps` steps, in milliseconds
    pub const fn move_duration_ms(&self, steps: u32) -> u64 {
        steps as u64 * self.period_ms as u64
    }
}

/// What happens to the tracked position when a setpoint replaces a move
/// that still has pending steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OverwritePolicy {
    /// Keep the position credited for the replaced move, as if it finished
    #[default]
    Optimistic,
    /// Remove the replaced move's un-emitted steps from the position first
    Reconcile,
}
