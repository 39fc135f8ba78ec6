//! Winding output trait
//!
//! Abstracts over the four outputs that energize a unipolar stepper's
//! coils (ULN2003 darlington array, discrete transistors, etc.)

use crate::sequencer::WindingPattern;

/// Four-channel winding output
pub trait WindingOutput {
    /// Drive the outputs to `pattern`
    ///
    /// Called once per step from the motor's step clock.
    fn write(&mut self, pattern: WindingPattern);

    /// De-energize all windings
    ///
    /// The motor no longer holds position after this.
    fn release(&mut self) {
        self.write(WindingPattern::OFF);
    }
}
