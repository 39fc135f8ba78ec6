//! Angle and step conversion
//!
//! Both directions truncate, so converting steps back to degrees reports
//! only whole degrees still pending.

use crate::config::{DEGREES_PER_REVOLUTION, STEPS_PER_REVOLUTION};

/// Convert a relative angle to a step count
///
/// Returns `None` if the step count does not fit in `u32`.
pub fn angle_to_steps(angle_deg: u32) -> Option<u32> {
    let steps = u64::from(angle_deg) * u64::from(STEPS_PER_REVOLUTION)
        / u64::from(DEGREES_PER_REVOLUTION);
    u32::try_from(steps).ok()
}

/// Convert a step count to whole degrees
pub fn steps_to_angle(steps: u32) -> u32 {
    // Quotient is always smaller than `steps`
    (u64::from(steps) * u64::from(DEGREES_PER_REVOLUTION) / u64::from(STEPS_PER_REVOLUTION))
        as u32
}
