//! ULN2003 unipolar stepper driver
//!
//! The ULN2003 darlington array sinks one motor coil per input, so the
//! four inputs IN1..IN4 map directly to windings A..D of the pattern.
//!
//! This driver provides:
//! - Four-pin output of the half-step patterns
//! - Skipping pins whose level does not change between steps
//! - Counting of GPIO write failures (the step clock cannot stop to
//!   handle them)
//!
//! # Usage
//!
//! ```ignore
//! let mut driver = Uln2003::new(in1, in2, in3, in4);
//! driver.release();
//!
//! // In the step clock:
//! STEPPER.step(0, &mut driver)?;
//! ```

use embedded_hal::digital::{OutputPin, PinState};

use unistep_core::sequencer::WindingPattern;
use unistep_core::traits::WindingOutput;

/// Four-input unipolar driver
pub struct Uln2003<A, B, C, D> {
    in1: A,
    in2: B,
    in3: C,
    in4: D,
    /// Pattern currently on the pins (None until the first write)
    current: Option<WindingPattern>,
    /// Pin writes that returned an error
    write_faults: u32,
}

impl<A, B, C, D> Uln2003<A, B, C, D>
where
    A: OutputPin,
    B: OutputPin,
    C: OutputPin,
    D: OutputPin,
{
    /// Create a driver from the four input pins (IN1..IN4)
    ///
    /// The pins are left untouched until the first write.
    pub fn new(in1: A, in2: B, in3: C, in4: D) -> Self {
        Self {
            in1,
            in2,
            in3,
            in4,
            current: None,
            write_faults: 0,
        }
    }

    /// Pattern last written to the pins
    pub fn pattern(&self) -> Option<WindingPattern> {
        self.current
    }

    /// Number of failed pin writes since creation
    pub fn write_faults(&self) -> u32 {
        self.write_faults
    }

    /// Release the pins
    pub fn free(self) -> (A, B, C, D) {
        (self.in1, self.in2, self.in3, self.in4)
    }

    fn drive(pin: &mut impl OutputPin, high: bool) -> bool {
        pin.set_state(PinState::from(high)).is_ok()
    }
}

impl<A, B, C, D> WindingOutput for Uln2003<A, B, C, D>
where
    A: OutputPin,
    B: OutputPin,
    C: OutputPin,
    D: OutputPin,
{
    fn write(&mut self, pattern: WindingPattern) {
        let levels = pattern.windings();
        // All pins are "changed" before the first write
        let changed = match self.current {
            Some(current) => current.bits() ^ pattern.bits(),
            None => 0b1111,
        };

        let mut ok = true;
        if changed & 0b1000 != 0 {
            ok &= Self::drive(&mut self.in1, levels[0]);
        }
        if changed & 0b0100 != 0 {
            ok &= Self::drive(&mut self.in2, levels[1]);
        }
        if changed & 0b0010 != 0 {
            ok &= Self::drive(&mut self.in3, levels[2]);
        }
        if changed & 0b0001 != 0 {
            ok &= Self::drive(&mut self.in4, levels[3]);
        }

        if ok {
            self.current = Some(pattern);
        } else {
            // Unknown pin state; rewrite every pin next time
            self.current = None;
            self.write_faults = self.write_faults.saturating_add(1);
        }
    }
}
