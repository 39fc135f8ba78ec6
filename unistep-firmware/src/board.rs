//! Board pin map
//!
//! Three 28BYJ-48 motors on ULN2003 driver boards:
//!
//! | Motor | IN1 | IN2 | IN3 | IN4 |
//! |-------|-----|-----|-----|-----|
//! | 0     | GP2 | GP3 | GP4 | GP5 |
//! | 1     | GP6 | GP7 | GP8 | GP9 |
//! | 2     | GP10| GP11| GP12| GP13|
//!
//! Commands arrive on UART0 (TX GP0, RX GP1, 115200 baud).

use embassy_rp::gpio::{Level, Output, Pin};
use embassy_rp::Peri;

use unistep_drivers::winding::Uln2003;

/// Winding driver of one motor
pub type MotorDriver =
    Uln2003<Output<'static>, Output<'static>, Output<'static>, Output<'static>>;

/// Build a motor driver from its four input pins, all low
pub fn motor(
    in1: Peri<'static, impl Pin>,
    in2: Peri<'static, impl Pin>,
    in3: Peri<'static, impl Pin>,
    in4: Peri<'static, impl Pin>,
) -> MotorDriver {
    Uln2003::new(
        Output::new(in1, Level::Low),
        Output::new(in2, Level::Low),
        Output::new(in3, Level::Low),
        Output::new(in4, Level::Low),
    )
}
