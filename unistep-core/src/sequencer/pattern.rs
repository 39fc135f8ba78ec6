//! Half-step energization table
//!
//! Maps the sequencer state to the four winding outputs of a unipolar
//! motor. Windings are named A to D in driver input order; bit 3 of the
//! pattern is A and bit 0 is D. Consecutive states alternate between one
//! and two energized windings and differ in exactly one output.

use crate::traits::Direction;

/// Number of states in the half-step cycle
pub const SEQUENCE_LEN: u8 = 8;

/// Position in the 8-state energization cycle
///
/// Always in `0..SEQUENCE_LEN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SequencerState(u8);

impl SequencerState {
    /// State 0 (windings A and B energized)
    pub const ZERO: Self = Self(0);

    /// Create a state, returning `None` outside the cycle
    pub const fn new(index: u8) -> Option<Self> {
        if index < SEQUENCE_LEN {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Index into the energization table
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Next state when stepping in `direction`, wrapping 7→0 and 0→7
    pub const fn advance(self, direction: Direction) -> Self {
        match direction {
            Direction::Positive => Self((self.0 + 1) % SEQUENCE_LEN),
            Direction::Negative => Self((self.0 + SEQUENCE_LEN - 1) % SEQUENCE_LEN),
        }
    }
}

/// Energization of the four windings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WindingPattern(u8);

impl WindingPattern {
    /// All windings off
    pub const OFF: Self = Self(0);

    const MASK: u8 = 0b1111;

    /// Create a pattern from its 4-bit representation (A = bit 3)
    pub const fn from_bits(bits: u8) -> Option<Self> {
        if bits & !Self::MASK == 0 {
            Some(Self(bits))
        } else {
            None
        }
    }

    /// 4-bit representation (A = bit 3)
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Output levels in driver input order `[A, B, C, D]`
    pub const fn windings(self) -> [bool; 4] {
        [
            self.0 & 0b1000 != 0,
            self.0 & 0b0100 != 0,
            self.0 & 0b0010 != 0,
            self.0 & 0b0001 != 0,
        ]
    }

    /// Number of energized windings
    pub const fn energized(self) -> u32 {
        self.0.count_ones()
    }
}

/// Unipolar half-step table, indexed by sequencer state
pub const HALF_STEP_TABLE: [WindingPattern; SEQUENCE_LEN as usize] = [
    WindingPattern(0b1100),
    WindingPattern(0b0100),
    WindingPattern(0b0110),
    WindingPattern(0b0010),
    WindingPattern(0b0011),
    WindingPattern(0b0001),
    WindingPattern(0b1001),
    WindingPattern(0b1000),
];

/// Winding pattern for a sequencer state
pub const fn map(state: SequencerState) -> WindingPattern {
    HALF_STEP_TABLE[state.0 as usize]
}
