//! Per-motor sequencer state
//!
//! One `MotorState` exists per motor for the lifetime of the firmware.
//! The setpoint applier writes a new relative move into it and the motor's
//! step clock consumes the move one tick at a time:
//!
//! ```text
//!            apply(steps > 0)
//!   ┌──────┐ ─────────────────▶ ┌─────────┐
//!   │ Idle │                    │ Running │ ◀─┐ tick (pending > 0)
//!   └──────┘ ◀───────────────── └─────────┘ ──┘
//!        tick emitting the last step, or cancel()
//! ```
//!
//! The absolute position is credited when a move is accepted, not as steps
//! are emitted.

use super::pattern::{map, SequencerState, WindingPattern};
use crate::config::OverwritePolicy;
use crate::traits::Direction;

/// Step clock state as tracked by the motor record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockState {
    /// No ticks until the next setpoint
    Idle,
    /// Emitting pending steps
    Running,
}

/// Outcome of one step clock tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Tick {
    /// Nothing pending; the clock must stop
    Stopped,
    /// One step emitted; write `pattern` to the windings
    Stepped {
        /// Pattern for the new sequencer state
        pattern: WindingPattern,
        /// This was the last pending step and the clock is now idle
        finished: bool,
    },
}

/// Sequencer record for one motor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotorState {
    /// Current position in the energization cycle
    sequencer: SequencerState,
    /// Steps of the current move not yet emitted
    pending_steps: u32,
    /// Direction of the current move
    direction: Direction,
    /// Steps credited since power-on, including pending ones
    absolute_position: i64,
    /// Step clock state
    clock: ClockState,
}

impl Default for MotorState {
    fn default() -> Self {
        Self::new()
    }
}

impl MotorState {
    /// Create a zeroed record (state 0, nothing pending, positive, idle)
    pub const fn new() -> Self {
        Self {
            sequencer: SequencerState::ZERO,
            pending_steps: 0,
            direction: Direction::Positive,
            absolute_position: 0,
            clock: ClockState::Idle,
        }
    }

    /// Current sequencer state
    pub fn sequencer(&self) -> SequencerState {
        self.sequencer
    }

    /// Steps not yet emitted
    pub fn pending_steps(&self) -> u32 {
        self.pending_steps
    }

    /// Direction of the current (or last) move
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Absolute position in steps
    pub fn absolute_position(&self) -> i64 {
        self.absolute_position
    }

    /// Step clock state
    pub fn clock(&self) -> ClockState {
        self.clock
    }

    /// Check if a move is in progress
    pub fn is_moving(&self) -> bool {
        self.clock == ClockState::Running
    }

    /// Accept a relative move, replacing any pending one
    ///
    /// Returns `true` if the step clock has to be armed. A zero-step move
    /// changes nothing and returns `false`.
    pub fn apply(&mut self, steps: u32, direction: Direction, policy: OverwritePolicy) -> bool {
        if steps == 0 {
            return false;
        }

        if policy == OverwritePolicy::Reconcile {
            self.retract_pending();
        }

        self.pending_steps = steps;
        self.direction = direction;
        self.absolute_position = self
            .absolute_position
            .saturating_add(i64::from(direction.sign()) * i64::from(steps));
        self.clock = ClockState::Running;
        true
    }

    /// Advance by one step clock period
    pub fn tick(&mut self) -> Tick {
        if self.pending_steps == 0 {
            self.clock = ClockState::Idle;
            return Tick::Stopped;
        }

        self.sequencer = self.sequencer.advance(self.direction);
        self.pending_steps -= 1;

        let finished = self.pending_steps == 0;
        if finished {
            self.clock = ClockState::Idle;
        }

        Tick::Stepped {
            pattern: map(self.sequencer),
            finished,
        }
    }

    /// Abort the current move
    ///
    /// The steps not yet emitted are removed from the absolute position so
    /// that it matches the partially completed move. Returns the number of
    /// steps dropped.
    pub fn cancel(&mut self) -> u32 {
        let dropped = self.retract_pending();
        self.clock = ClockState::Idle;
        dropped
    }

    fn retract_pending(&mut self) -> u32 {
        let dropped = self.pending_steps;
        self.absolute_position = self
            .absolute_position
            .saturating_sub(i64::from(self.direction.sign()) * i64::from(dropped));
        self.pending_steps = 0;
        dropped
    }
}
