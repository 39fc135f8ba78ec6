//! Step clock trait
//!
//! Every motor has its own periodic step clock. The setpoint applier only
//! needs to wake it; the clock stops by itself once the motor has no
//! pending steps.

/// Arming failed because the motor has no running step clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockUnavailable;

/// Bank of per-motor step clocks, addressed by motor index
pub trait StepClock {
    /// Start (or keep running) the step clock of `motor`
    fn arm(&self, motor: usize) -> Result<(), ClockUnavailable>;
}
