//! Unistep - stepper sequencer firmware
//!
//! Drives three unipolar steppers through ULN2003 boards from an RP2040.
//! Motion commands (`STP<id>,<dir>,<angle>`) arrive as text lines on
//! UART0, are queued, and are applied by the control task; one step clock
//! task per motor emits the half-step sequence.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

mod board;
mod channels;
mod config;
mod subsystem;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Unistep firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let motors = [
        board::motor(p.PIN_2, p.PIN_3, p.PIN_4, p.PIN_5),
        board::motor(p.PIN_6, p.PIN_7, p.PIN_8, p.PIN_9),
        board::motor(p.PIN_10, p.PIN_11, p.PIN_12, p.PIN_13),
    ];

    info!(
        "Step clock: {} ms period, {} steps/s, policy {:?}",
        config::STEP_TIMING.period_ms(),
        config::STEP_TIMING.steps_per_second(),
        config::OVERWRITE_POLICY
    );

    let stepper = match subsystem::init_stepper_subsystem(spawner, motors) {
        Ok(stepper) => stepper,
        Err(e) => {
            error!("Stepper subsystem failed to start: {:?}", e);
            return;
        }
    };

    // Setup UART for host commands
    let uart_config = UartConfig::default(); // 115200 baud default

    let tx_buf = TX_BUF.init([0u8; 64]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (_tx, rx) = uart.split();

    info!("UART initialized for host commands");

    spawner.spawn(tasks::command_rx_task(rx)).unwrap();
    #[cfg(feature = "demo")]
    spawner.spawn(tasks::demo_task()).unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat: {} commands waiting", stepper.queue().len());
    }
}
