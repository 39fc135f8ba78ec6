//! Motion command parsing and encoding.
//!
//! A command is a single line of ASCII text:
//! - TAG: the literal `STP`
//! - ID: decimal motor index, directly after the tag
//! - DIR: `0` (negative) or `1` (positive)
//! - ANGLE: whole degrees, unsigned
//!
//! Fields after the tag are separated by `,`.

use core::fmt::Write;
use core::str::FromStr;

use heapless::String;

/// Literal tag that starts every motion command
pub const COMMAND_TAG: &str = "STP";

/// Separator between the id, direction and angle fields
pub const FIELD_SEPARATOR: char = ',';

/// Maximum length of a command line in bytes
pub const MAX_COMMAND_LEN: usize = 48;

/// Motor rotation direction
///
/// Which physical rotation is "positive" depends on how the windings are
/// wired to the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Sequencer walks the energization table backwards
    Negative,
    /// Sequencer walks the energization table forwards
    Positive,
}

impl Direction {
    /// Sign applied to step counts moving in this direction
    pub const fn sign(self) -> i32 {
        match self {
            Direction::Negative => -1,
            Direction::Positive => 1,
        }
    }

    /// Decode the numeric direction field
    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Direction::Negative),
            1 => Some(Direction::Positive),
            _ => None,
        }
    }

    /// Numeric direction field value
    pub const fn code(self) -> u8 {
        match self {
            Direction::Negative => 0,
            Direction::Positive => 1,
        }
    }
}

/// Errors that can occur while parsing a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Missing tag, wrong field count, or a non-numeric field
    Malformed,
    /// Direction field is numeric but not 0 or 1
    InvalidDirection,
}

/// A relative move request for one motor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionCommand {
    /// Target motor index (range checked by the consumer)
    pub motor: u8,
    /// Rotation direction
    pub direction: Direction,
    /// Relative angle in whole degrees
    pub angle_deg: u32,
}

impl MotionCommand {
    /// Create a new command
    pub const fn new(motor: u8, direction: Direction, angle_deg: u32) -> Self {
        Self {
            motor,
            direction,
            angle_deg,
        }
    }

    /// Parse a command line
    ///
    /// Leading and trailing whitespace (including `\r\n`) is ignored.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let body = text
            .trim()
            .strip_prefix(COMMAND_TAG)
            .ok_or(ParseError::Malformed)?;

        let mut fields = body.split(FIELD_SEPARATOR);
        let motor: u8 = parse_field(fields.next())?;
        let direction_code: u32 = parse_field(fields.next())?;
        let angle_deg: u32 = parse_field(fields.next())?;

        if fields.next().is_some() {
            return Err(ParseError::Malformed);
        }

        let direction = Direction::from_code(direction_code).ok_or(ParseError::InvalidDirection)?;

        Ok(Self {
            motor,
            direction,
            angle_deg,
        })
    }

    /// Encode this command as a line (without terminator)
    pub fn encode(&self) -> String<MAX_COMMAND_LEN> {
        let mut line = String::new();
        // Longest possible command ("STP255,1,4294967295") fits the buffer
        let _ = write!(
            line,
            "{}{}{}{}{}{}",
            COMMAND_TAG,
            self.motor,
            FIELD_SEPARATOR,
            self.direction.code(),
            FIELD_SEPARATOR,
            self.angle_deg
        );
        line
    }
}

impl FromStr for MotionCommand {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_field<T: FromStr>(field: Option<&str>) -> Result<T, ParseError> {
    field
        .filter(|f| f.bytes().all(|b| b.is_ascii_digit()))
        .ok_or(ParseError::Malformed)?
        .parse()
        .map_err(|_| ParseError::Malformed)
}
