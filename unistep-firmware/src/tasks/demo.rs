//! Demo move task
//!
//! Queues the configured demo move at a fixed interval, for bench testing
//! a board without a host attached.

use defmt::*;
use embassy_time::Ticker;

use unistep_core::StepperError;

use crate::channels::STEPPER;
use crate::config::{DEMO_COMMAND, DEMO_INTERVAL};

/// Demo task - periodically queues the demo move
#[embassy_executor::task]
pub async fn demo_task() {
    info!("Demo task started");

    let mut ticker = Ticker::every(DEMO_INTERVAL);
    loop {
        ticker.next().await;
        match STEPPER.queue().enqueue_command(&DEMO_COMMAND) {
            Ok(()) => debug!("Demo move queued: {}", DEMO_COMMAND.encode().as_str()),
            Err(StepperError::QueueFull) => warn!("Command queue full, skipping demo move"),
            Err(e) => warn!("Demo move not queued: {:?}", e),
        }
    }
}
