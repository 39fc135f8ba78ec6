//! Hardware abstraction traits
//!
//! These traits define the interface between the sequencer logic
//! and board-specific implementations.

pub mod clock;
pub mod winding;

pub use clock::{ClockUnavailable, StepClock};
pub use unistep_protocol::Direction;
pub use winding::WindingOutput;
