//! Signal-based step clock bank
//!
//! One arm signal per motor. Each step clock task registers its motor when
//! it starts and then parks on [`ClockBank::wait_armed`]. Arming a motor
//! whose task never registered fails, so the setpoint applier can roll
//! back instead of recording motion that will never happen.
//!
//! A repeated arm while the clock is still running leaves the signal set;
//! the task then wakes once more after finishing, finds nothing pending
//! and goes back to sleep.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;

use crate::error::StepperError;
use crate::traits::{ClockUnavailable, StepClock};

/// Arm signals for `N` step clocks
pub struct ClockBank<M: RawMutex, const N: usize> {
    arm: [Signal<M, ()>; N],
    registered: Mutex<M, Cell<[bool; N]>>,
}

impl<M: RawMutex, const N: usize> Default for ClockBank<M, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex, const N: usize> ClockBank<M, N> {
    /// Create a bank with no registered clocks
    pub const fn new() -> Self {
        Self {
            arm: [const { Signal::new() }; N],
            registered: Mutex::new(Cell::new([false; N])),
        }
    }

    /// Mark the step clock of `motor` as running
    pub fn register(&self, motor: usize) -> Result<(), StepperError> {
        if motor >= N {
            return Err(StepperError::InvalidMotorId);
        }
        self.registered.lock(|cell| {
            let mut registered = cell.get();
            registered[motor] = true;
            cell.set(registered);
        });
        Ok(())
    }

    /// Check if the step clock of `motor` has registered
    pub fn is_registered(&self, motor: usize) -> bool {
        self.registered
            .lock(|cell| cell.get().get(motor).copied().unwrap_or(false))
    }

    /// Wait until `motor` is armed
    pub async fn wait_armed(&self, motor: usize) -> Result<(), StepperError> {
        let signal = self.arm.get(motor).ok_or(StepperError::InvalidMotorId)?;
        signal.wait().await;
        Ok(())
    }

    /// Check if an arm request is waiting for `motor`
    pub fn is_armed(&self, motor: usize) -> bool {
        self.arm.get(motor).is_some_and(Signal::signaled)
    }
}

impl<M: RawMutex, const N: usize> StepClock for ClockBank<M, N> {
    fn arm(&self, motor: usize) -> Result<(), ClockUnavailable> {
        if !self.is_registered(motor) {
            return Err(ClockUnavailable);
        }
        self.arm[motor].signal(());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OverwritePolicy;
    use crate::sequencer::{ClockState, WindingPattern};
    use crate::traits::WindingOutput;
    use crate::Stepper;
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    type Bank = ClockBank<NoopRawMutex, 3>;

    struct NullOutput;

    impl WindingOutput for NullOutput {
        fn write(&mut self, _pattern: WindingPattern) {}
    }

    #[test]
    fn test_unregistered_clock_is_unavailable() {
        let bank = Bank::new();
        assert!(!bank.is_registered(0));
        assert_eq!(bank.arm(0), Err(ClockUnavailable));
        assert!(!bank.is_armed(0));
    }

    #[test]
    fn test_arm_after_register() {
        let bank = Bank::new();
        bank.register(1).unwrap();

        assert!(bank.arm(1).is_ok());
        assert!(bank.is_armed(1));
        assert!(!bank.is_armed(0));

        block_on(bank.wait_armed(1)).unwrap();
        assert!(!bank.is_armed(1));
    }

    #[test]
    fn test_register_out_of_range() {
        let bank = Bank::new();
        assert_eq!(bank.register(3), Err(StepperError::InvalidMotorId));
        assert!(!bank.is_registered(3));
        assert_eq!(bank.arm(3), Err(ClockUnavailable));
        assert_eq!(
            block_on(bank.wait_armed(3)),
            Err(StepperError::InvalidMotorId)
        );
    }

    #[test]
    fn test_repeated_arm_wakes_once() {
        let bank = Bank::new();
        bank.register(0).unwrap();
        bank.arm(0).unwrap();
        bank.arm(0).unwrap();

        block_on(bank.wait_armed(0)).unwrap();
        assert!(!bank.is_armed(0));
    }

    #[test]
    fn test_dispatch_through_bank() {
        let stepper: Stepper<NoopRawMutex, 3> = Stepper::new(OverwritePolicy::Optimistic);
        let bank = Bank::new();

        // No clock task yet: the move is refused and nothing is recorded
        assert_eq!(
            stepper.dispatch(&bank, "STP2,1,45"),
            Err(StepperError::ClockUnavailable)
        );
        assert_eq!(stepper.snapshot(2).unwrap().absolute_position(), 0);

        bank.register(2).unwrap();
        stepper.dispatch(&bank, "STP2,1,45").unwrap();
        block_on(bank.wait_armed(2)).unwrap();

        let mut out = NullOutput;
        let mut ticks = 0;
        while stepper.step(2, &mut out).unwrap() == ClockState::Running {
            ticks += 1;
        }
        assert_eq!(ticks + 1, 512);
        assert_eq!(stepper.snapshot(2).unwrap().absolute_position(), 512);
        assert!(stepper
            .take_errors()
            .contains(StepperError::ClockUnavailable.flag()));
    }
}
