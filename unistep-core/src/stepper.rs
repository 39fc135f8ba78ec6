//! Stepper subsystem
//!
//! Ties the motor table and the command queue together and implements
//! the setpoint applier. A single `Stepper` is shared (usually as a
//! `static`) by:
//!
//! - producers, which call [`Stepper::send_motion_command`]
//! - the control task, which waits on [`Stepper::next_command`] and hands
//!   each line to [`Stepper::dispatch`]
//! - one step clock per motor, which calls [`Stepper::step`] every period
//!
//! # Usage
//!
//! ```ignore
//! static STEPPER: Stepper<CriticalSectionRawMutex> = Stepper::new(OverwritePolicy::Optimistic);
//!
//! // Control task:
//! let line = STEPPER.next_command().await;
//! if let Err(e) = STEPPER.dispatch(&clocks, &line) {
//!     warn!("rejected {}: {:?}", line.as_str(), e);
//! }
//!
//! // Step clock of motor 0, every period while running:
//! let state = STEPPER.step(0, &mut driver)?;
//! ```

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use unistep_protocol::MotionCommand;

use crate::config::{OverwritePolicy, MOTOR_COUNT};
use crate::error::{ErrorFlags, StepperError};
use crate::queue::{CommandQueue, CommandText};
use crate::sequencer::{ClockState, MotorState, Tick};
use crate::table::MotorTable;
use crate::traits::{Direction, StepClock, WindingOutput};
use crate::units::{angle_to_steps, steps_to_angle};

/// Stepper subsystem for `N` motors
pub struct Stepper<M: RawMutex, const N: usize = MOTOR_COUNT> {
    table: MotorTable<M, N>,
    queue: CommandQueue<M>,
    errors: Mutex<M, Cell<ErrorFlags>>,
    policy: OverwritePolicy,
}

impl<M: RawMutex, const N: usize> Stepper<M, N> {
    /// Create a subsystem with every motor idle at position 0
    pub const fn new(policy: OverwritePolicy) -> Self {
        Self {
            table: MotorTable::new(),
            queue: CommandQueue::new(),
            errors: Mutex::new(Cell::new(ErrorFlags::NONE)),
            policy,
        }
    }

    /// Number of motors
    pub const fn motor_count(&self) -> usize {
        N
    }

    /// The command queue
    pub fn queue(&self) -> &CommandQueue<M> {
        &self.queue
    }

    /// Queue a raw command line for the control task
    ///
    /// Never blocks; fails with `QueueFull` when the queue is full. A
    /// refused line latches its error flag.
    pub fn send_motion_command(&self, text: &str) -> Result<(), StepperError> {
        let result = self.queue.enqueue(text);
        if let Err(e) = result {
            self.raise(e.flag());
        }
        result
    }

    /// Wait for the next queued command line
    pub async fn next_command(&self) -> CommandText {
        self.queue.receive().await
    }

    /// Start a relative move on one motor
    ///
    /// A zero-step move succeeds without touching the motor. Otherwise the
    /// move replaces any pending one, the position is credited right away,
    /// and the motor's step clock is armed. If arming fails the motor record
    /// is restored.
    pub fn apply_relative_setpoint<C: StepClock + ?Sized>(
        &self,
        clock: &C,
        motor: usize,
        steps: u32,
        direction: Direction,
    ) -> Result<(), StepperError> {
        let (previous, arm) = self.table.with_motor(motor, |state| {
            let previous = *state;
            let arm = state.apply(steps, direction, self.policy);
            (previous, arm)
        })?;

        if !arm {
            return Ok(());
        }

        if let Err(e) = clock.arm(motor) {
            self.table.with_motor(motor, |state| *state = previous)?;
            return Err(e.into());
        }

        Ok(())
    }

    /// Parse one command line and apply it
    ///
    /// On failure the matching error flag is latched and the command is
    /// dropped. Returns the accepted command.
    pub fn dispatch<C: StepClock + ?Sized>(
        &self,
        clock: &C,
        text: &str,
    ) -> Result<MotionCommand, StepperError> {
        let result = self.try_dispatch(clock, text);
        if let Err(e) = result {
            self.raise(e.flag());
        }
        result
    }

    fn try_dispatch<C: StepClock + ?Sized>(
        &self,
        clock: &C,
        text: &str,
    ) -> Result<MotionCommand, StepperError> {
        let cmd = MotionCommand::parse(text)?;
        let motor = usize::from(cmd.motor);
        if motor >= N {
            return Err(StepperError::InvalidMotorId);
        }
        let steps = angle_to_steps(cmd.angle_deg).ok_or(StepperError::InvalidAngle)?;
        self.apply_relative_setpoint(clock, motor, steps, cmd.direction)?;
        Ok(cmd)
    }

    /// Run one step clock period for `motor` and drive its windings
    ///
    /// Returns the clock state after the tick; the caller stops ticking
    /// once it is `Idle`.
    pub fn step<O: WindingOutput + ?Sized>(
        &self,
        motor: usize,
        output: &mut O,
    ) -> Result<ClockState, StepperError> {
        match self.table.tick(motor)? {
            Tick::Stopped => Ok(ClockState::Idle),
            Tick::Stepped { pattern, finished } => {
                output.write(pattern);
                Ok(if finished {
                    ClockState::Idle
                } else {
                    ClockState::Running
                })
            }
        }
    }

    /// Abort the current move of `motor`
    ///
    /// Returns the number of steps that were dropped.
    pub fn cancel(&self, motor: usize) -> Result<u32, StepperError> {
        self.table.with_motor(motor, MotorState::cancel)
    }

    /// Remaining angle of the current move, in whole degrees
    pub fn pending_angle(&self, motor: usize) -> Result<u32, StepperError> {
        self.table
            .with_motor(motor, |state| steps_to_angle(state.pending_steps()))
    }

    /// Copy of one motor record
    pub fn snapshot(&self, motor: usize) -> Result<MotorState, StepperError> {
        self.table.snapshot(motor)
    }

    /// Latch error flags
    pub fn raise(&self, flags: ErrorFlags) {
        self.errors.lock(|cell| cell.set(cell.get() | flags));
    }

    /// Latched error flags, without clearing them
    pub fn errors(&self) -> ErrorFlags {
        self.errors.lock(Cell::get)
    }

    /// Read and clear the latched error flags
    pub fn take_errors(&self) -> ErrorFlags {
        self.errors.lock(|cell| cell.replace(ErrorFlags::NONE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QUEUE_DEPTH;
    use crate::sequencer::{SequencerState, WindingPattern};
    use crate::traits::ClockUnavailable;
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    type TestStepper = Stepper<NoopRawMutex, 3>;

    /// Clock bank that records arm requests
    #[derive(Default)]
    struct MockClock {
        armed: Cell<[u32; 3]>,
        broken: Cell<bool>,
    }

    impl MockClock {
        fn broken() -> Self {
            let clock = Self::default();
            clock.broken.set(true);
            clock
        }

        fn arm_count(&self, motor: usize) -> u32 {
            self.armed.get()[motor]
        }
    }

    impl StepClock for MockClock {
        fn arm(&self, motor: usize) -> Result<(), ClockUnavailable> {
            if self.broken.get() {
                return Err(ClockUnavailable);
            }
            let mut armed = self.armed.get();
            armed[motor] += 1;
            self.armed.set(armed);
            Ok(())
        }
    }

    /// Winding output that records every pattern written
    #[derive(Default)]
    struct RecordingOutput {
        writes: std::vec::Vec<WindingPattern>,
    }

    impl WindingOutput for RecordingOutput {
        fn write(&mut self, pattern: WindingPattern) {
            self.writes.push(pattern);
        }
    }

    fn run_until_idle(stepper: &TestStepper, motor: usize, out: &mut RecordingOutput) -> u32 {
        let mut ticks = 0;
        loop {
            ticks += 1;
            if stepper.step(motor, out).unwrap() == ClockState::Idle {
                return ticks;
            }
        }
    }

    #[test]
    fn test_apply_arms_clock() {
        let stepper = TestStepper::new(OverwritePolicy::Optimistic);
        let clock = MockClock::default();

        stepper
            .apply_relative_setpoint(&clock, 1, 100, Direction::Negative)
            .unwrap();

        let state = stepper.snapshot(1).unwrap();
        assert_eq!(state.pending_steps(), 100);
        assert_eq!(state.direction(), Direction::Negative);
        assert_eq!(state.absolute_position(), -100);
        assert_eq!(state.clock(), ClockState::Running);
        assert_eq!(clock.arm_count(1), 1);
        assert_eq!(clock.arm_count(0), 0);
    }

    #[test]
    fn test_apply_zero_steps_does_not_arm() {
        let stepper = TestStepper::new(OverwritePolicy::Optimistic);
        let clock = MockClock::default();

        stepper
            .apply_relative_setpoint(&clock, 0, 0, Direction::Negative)
            .unwrap();

        assert_eq!(stepper.snapshot(0).unwrap(), MotorState::new());
        assert_eq!(clock.arm_count(0), 0);
    }

    #[test]
    fn test_apply_invalid_motor() {
        let stepper = TestStepper::new(OverwritePolicy::Optimistic);
        let clock = MockClock::default();

        assert_eq!(
            stepper.apply_relative_setpoint(&clock, 3, 10, Direction::Positive),
            Err(StepperError::InvalidMotorId)
        );
        // Checked before the zero-step shortcut
        assert_eq!(
            stepper.apply_relative_setpoint(&clock, 3, 0, Direction::Positive),
            Err(StepperError::InvalidMotorId)
        );
    }

    #[test]
    fn test_arm_failure_restores_motor() {
        let stepper = TestStepper::new(OverwritePolicy::Optimistic);
        let clock = MockClock::broken();

        assert_eq!(
            stepper.apply_relative_setpoint(&clock, 2, 512, Direction::Positive),
            Err(StepperError::ClockUnavailable)
        );
        assert_eq!(stepper.snapshot(2).unwrap(), MotorState::new());
    }

    #[test]
    fn test_forty_five_degree_command() {
        let stepper = TestStepper::new(OverwritePolicy::Optimistic);
        let clock = MockClock::default();
        let mut out = RecordingOutput::default();

        stepper.send_motion_command("STP0,1,45").unwrap();
        let line = block_on(stepper.next_command());
        let cmd = stepper.dispatch(&clock, &line).unwrap();
        assert_eq!(cmd.angle_deg, 45);

        let state = stepper.snapshot(0).unwrap();
        assert_eq!(state.absolute_position(), 512);
        assert_eq!(state.pending_steps(), 512);
        assert_eq!(state.clock(), ClockState::Running);
        assert_eq!(stepper.pending_angle(0).unwrap(), 45);

        assert_eq!(run_until_idle(&stepper, 0, &mut out), 512);

        let state = stepper.snapshot(0).unwrap();
        assert_eq!(state.pending_steps(), 0);
        assert_eq!(state.sequencer(), SequencerState::ZERO);
        assert_eq!(state.clock(), ClockState::Idle);
        assert_eq!(stepper.pending_angle(0).unwrap(), 0);

        assert_eq!(out.writes.len(), 512);
        assert_eq!(out.writes[0].bits(), 0b0100);
        assert_eq!(out.writes[511].bits(), 0b1100);
    }

    #[test]
    fn test_idle_tick_writes_nothing() {
        let stepper = TestStepper::new(OverwritePolicy::Optimistic);
        let mut out = RecordingOutput::default();

        assert_eq!(stepper.step(0, &mut out), Ok(ClockState::Idle));
        assert!(out.writes.is_empty());
        assert_eq!(stepper.step(5, &mut out), Err(StepperError::InvalidMotorId));
    }

    #[test]
    fn test_overwrite_while_running() {
        let stepper = TestStepper::new(OverwritePolicy::Optimistic);
        let clock = MockClock::default();
        let mut out = RecordingOutput::default();

        stepper
            .apply_relative_setpoint(&clock, 0, 100, Direction::Positive)
            .unwrap();
        for _ in 0..30 {
            stepper.step(0, &mut out).unwrap();
        }
        stepper
            .apply_relative_setpoint(&clock, 0, 8, Direction::Positive)
            .unwrap();

        assert_eq!(run_until_idle(&stepper, 0, &mut out), 8);
        let state = stepper.snapshot(0).unwrap();
        // Credited 100 + 8 although only 38 steps were emitted
        assert_eq!(state.absolute_position(), 108);
        assert_eq!(clock.arm_count(0), 2);
    }

    #[test]
    fn test_reconcile_policy_tracks_emitted_steps() {
        let stepper = TestStepper::new(OverwritePolicy::Reconcile);
        let clock = MockClock::default();
        let mut out = RecordingOutput::default();

        stepper
            .apply_relative_setpoint(&clock, 0, 100, Direction::Positive)
            .unwrap();
        for _ in 0..30 {
            stepper.step(0, &mut out).unwrap();
        }
        stepper
            .apply_relative_setpoint(&clock, 0, 8, Direction::Positive)
            .unwrap();
        run_until_idle(&stepper, 0, &mut out);

        assert_eq!(stepper.snapshot(0).unwrap().absolute_position(), 38);
        assert_eq!(out.writes.len(), 38);
    }

    #[test]
    fn test_cancel_stops_motor() {
        let stepper = TestStepper::new(OverwritePolicy::Optimistic);
        let clock = MockClock::default();
        let mut out = RecordingOutput::default();

        stepper.dispatch(&clock, "STP2,0,90").unwrap();
        for _ in 0..24 {
            stepper.step(2, &mut out).unwrap();
        }

        assert_eq!(stepper.cancel(2), Ok(1024 - 24));
        let state = stepper.snapshot(2).unwrap();
        assert_eq!(state.absolute_position(), -24);
        assert_eq!(state.clock(), ClockState::Idle);
        assert_eq!(stepper.step(2, &mut out), Ok(ClockState::Idle));
        assert_eq!(stepper.cancel(9), Err(StepperError::InvalidMotorId));
    }

    #[test]
    fn test_bad_commands_latch_flags() {
        let stepper = TestStepper::new(OverwritePolicy::Optimistic);
        let clock = MockClock::default();

        assert_eq!(
            stepper.dispatch(&clock, "garbage"),
            Err(StepperError::ParseError)
        );
        assert_eq!(
            stepper.dispatch(&clock, "STP3,1,45"),
            Err(StepperError::InvalidMotorId)
        );
        assert_eq!(
            stepper.dispatch(&clock, "STP0,5,45"),
            Err(StepperError::InvalidDirection)
        );
        assert_eq!(
            stepper.dispatch(&clock, "STP0,1,4294967295"),
            Err(StepperError::InvalidAngle)
        );

        let flags = stepper.errors();
        assert!(flags.contains(ErrorFlags::PARSE));
        assert!(flags.contains(ErrorFlags::INVALID_MOTOR_ID));
        assert!(flags.contains(ErrorFlags::INVALID_DIRECTION));
        assert!(flags.contains(ErrorFlags::INVALID_ANGLE));

        assert_eq!(stepper.take_errors(), flags);
        assert!(stepper.errors().is_empty());

        for id in 0..3 {
            assert_eq!(stepper.snapshot(id).unwrap(), MotorState::new());
        }
    }

    #[test]
    fn test_arm_failure_latches_flag() {
        let stepper = TestStepper::new(OverwritePolicy::Optimistic);
        let clock = MockClock::broken();

        assert_eq!(
            stepper.dispatch(&clock, "STP1,1,10"),
            Err(StepperError::ClockUnavailable)
        );
        assert!(stepper.take_errors().contains(ErrorFlags::CLOCK_UNAVAILABLE));
    }

    #[test]
    fn test_pipeline_continues_after_bad_command() {
        let stepper = TestStepper::new(OverwritePolicy::Optimistic);
        let clock = MockClock::default();

        stepper.send_motion_command("STP9,1,45").unwrap();
        stepper.send_motion_command("STP1,1,").unwrap();
        stepper.send_motion_command("STP1,0,360").unwrap();

        let mut accepted = 0;
        while let Some(line) = stepper.queue().try_receive() {
            if stepper.dispatch(&clock, &line).is_ok() {
                accepted += 1;
            }
        }

        assert_eq!(accepted, 1);
        assert_eq!(stepper.snapshot(1).unwrap().absolute_position(), -4096);
        assert_eq!(clock.arm_count(1), 1);
    }

    #[test]
    fn test_zero_angle_command_is_accepted() {
        let stepper = TestStepper::new(OverwritePolicy::Optimistic);
        let clock = MockClock::default();

        assert!(stepper.dispatch(&clock, "STP0,0,0").is_ok());
        assert_eq!(stepper.snapshot(0).unwrap(), MotorState::new());
        assert_eq!(clock.arm_count(0), 0);
        assert!(stepper.errors().is_empty());
    }

    #[test]
    fn test_queue_backpressure() {
        let stepper = TestStepper::new(OverwritePolicy::Optimistic);
        for _ in 0..QUEUE_DEPTH {
            stepper.send_motion_command("STP0,1,1").unwrap();
        }
        assert_eq!(
            stepper.send_motion_command("STP0,1,1"),
            Err(StepperError::QueueFull)
        );

        assert!(stepper.errors().contains(ErrorFlags::QUEUE_FULL));

        block_on(stepper.next_command());
        assert!(stepper.send_motion_command("STP0,1,1").is_ok());
    }

    #[test]
    fn test_refused_line_latches_flag() {
        let stepper = TestStepper::new(OverwritePolicy::Optimistic);
        let long = "STP0,1,000000000000000000000000000000000000000000000045";

        assert_eq!(
            stepper.send_motion_command(long),
            Err(StepperError::ParseError)
        );
        assert_eq!(stepper.take_errors(), ErrorFlags::PARSE);
        assert!(stepper.queue().is_empty());
    }
}
