//! Motor state table
//!
//! Fixed arena of motor records addressed by motor index. Each record has
//! its own blocking mutex so the step clock of one motor never waits on
//! another motor's setpoint.
//!
//! The raw mutex type is chosen by the caller: `CriticalSectionRawMutex`
//! on the target, `NoopRawMutex` in single-threaded tests.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::error::StepperError;
use crate::sequencer::{MotorState, Tick};

/// Table of `N` motor records
pub struct MotorTable<M: RawMutex, const N: usize> {
    motors: [Mutex<M, RefCell<MotorState>>; N],
}

impl<M: RawMutex, const N: usize> Default for MotorTable<M, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex, const N: usize> MotorTable<M, N> {
    /// Create a table with every motor zeroed
    pub const fn new() -> Self {
        Self {
            motors: [const { Mutex::new(RefCell::new(MotorState::new())) }; N],
        }
    }

    /// Number of motors
    pub const fn len(&self) -> usize {
        N
    }

    /// Check if the table has no motors
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Run `f` with exclusive access to one motor record
    pub fn with_motor<R>(
        &self,
        motor: usize,
        f: impl FnOnce(&mut MotorState) -> R,
    ) -> Result<R, StepperError> {
        let slot = self.motors.get(motor).ok_or(StepperError::InvalidMotorId)?;
        Ok(slot.lock(|cell| f(&mut *cell.borrow_mut())))
    }

    /// Copy of one motor record
    pub fn snapshot(&self, motor: usize) -> Result<MotorState, StepperError> {
        self.with_motor(motor, |state| *state)
    }

    /// Advance one motor by a step clock period
    pub fn tick(&self, motor: usize) -> Result<Tick, StepperError> {
        self.with_motor(motor, MotorState::tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OverwritePolicy;
    use crate::sequencer::ClockState;
    use crate::traits::Direction;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    type Table = MotorTable<NoopRawMutex, 3>;

    #[test]
    fn test_new_table_is_zeroed() {
        let table = Table::new();
        assert_eq!(table.len(), 3);
        for id in 0..3 {
            assert_eq!(table.snapshot(id).unwrap(), MotorState::new());
        }
    }

    #[test]
    fn test_invalid_motor_id() {
        let table = Table::new();
        assert_eq!(table.snapshot(3), Err(StepperError::InvalidMotorId));
        assert_eq!(table.tick(usize::MAX), Err(StepperError::InvalidMotorId));
        assert_eq!(
            table.with_motor(7, |state| state.cancel()),
            Err(StepperError::InvalidMotorId)
        );
    }

    #[test]
    fn test_motors_are_independent() {
        let table = Table::new();
        table
            .with_motor(1, |state| {
                state.apply(8, Direction::Negative, OverwritePolicy::Optimistic)
            })
            .unwrap();

        table.tick(1).unwrap();
        assert_eq!(table.tick(0).unwrap(), Tick::Stopped);

        let moved = table.snapshot(1).unwrap();
        assert_eq!(moved.pending_steps(), 7);
        assert_eq!(moved.clock(), ClockState::Running);
        assert_eq!(table.snapshot(0).unwrap(), MotorState::new());
        assert_eq!(table.snapshot(2).unwrap(), MotorState::new());
    }
}
