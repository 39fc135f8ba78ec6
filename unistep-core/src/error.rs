//! Error kinds and the error notification flags

use unistep_protocol::ParseError;

use crate::traits::ClockUnavailable;

/// Errors reported by the stepper subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepperError {
    /// Motor index outside the motor table
    InvalidMotorId,
    /// Direction field is not a known direction
    InvalidDirection,
    /// Angle converts to more steps than a setpoint can hold
    InvalidAngle,
    /// Command text could not be parsed
    ParseError,
    /// Command queue already holds `QUEUE_DEPTH` commands
    QueueFull,
    /// The motor's step clock could not be armed
    ClockUnavailable,
}

impl StepperError {
    /// Notification flag for this error kind
    pub const fn flag(self) -> ErrorFlags {
        match self {
            StepperError::InvalidMotorId => ErrorFlags::INVALID_MOTOR_ID,
            StepperError::InvalidDirection => ErrorFlags::INVALID_DIRECTION,
            StepperError::InvalidAngle => ErrorFlags::INVALID_ANGLE,
            StepperError::ParseError => ErrorFlags::PARSE,
            StepperError::QueueFull => ErrorFlags::QUEUE_FULL,
            StepperError::ClockUnavailable => ErrorFlags::CLOCK_UNAVAILABLE,
        }
    }
}

impl From<ParseError> for StepperError {
    fn from(e: ParseError) -> Self {
        match e {
            ParseError::Malformed => StepperError::ParseError,
            ParseError::InvalidDirection => StepperError::InvalidDirection,
        }
    }
}

impl From<ClockUnavailable> for StepperError {
    fn from(_: ClockUnavailable) -> Self {
        StepperError::ClockUnavailable
    }
}

/// Error notification bits, one per error kind
///
/// Latched by the subsystem when a command is rejected and cleared when
/// read with `Stepper::take_errors`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ErrorFlags(u8);

impl ErrorFlags {
    pub const NONE: Self = Self(0);
    pub const INVALID_MOTOR_ID: Self = Self(1 << 0);
    pub const INVALID_DIRECTION: Self = Self(1 << 1);
    pub const INVALID_ANGLE: Self = Self(1 << 2);
    pub const PARSE: Self = Self(1 << 3);
    pub const QUEUE_FULL: Self = Self(1 << 4);
    pub const CLOCK_UNAVAILABLE: Self = Self(1 << 5);

    /// Raw bit representation
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Check if no flag is set
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Check if every flag in `other` is set
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Flags set in either
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Set the flags in `other`
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }
}

impl core::ops::BitOr for ErrorFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}
