//! Step sequencer
//!
//! Half-step energization table and the per-motor state it is driven by.

pub mod motor;
pub mod pattern;

pub use motor::{ClockState, MotorState, Tick};
pub use pattern::{map, SequencerState, WindingPattern, HALF_STEP_TABLE, SEQUENCE_LEN};
