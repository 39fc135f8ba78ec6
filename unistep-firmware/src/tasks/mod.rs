//! Embassy async tasks
//!
//! Each task runs independently and communicates through the shared
//! stepper subsystem.

pub mod command_rx;
pub mod control;
#[cfg(feature = "demo")]
pub mod demo;
pub mod step_clock;

pub use command_rx::command_rx_task;
pub use control::control_task;
#[cfg(feature = "demo")]
pub use demo::demo_task;
pub use step_clock::step_clock_task;
