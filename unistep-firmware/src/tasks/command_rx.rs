//! Command UART receive task
//!
//! Assembles newline-terminated command lines from UART0 and queues them
//! for the control task.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use unistep_core::StepperError;
use unistep_protocol::LineAssembler;

use crate::subsystem::send_motion_command;

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Command RX task - receives command lines from the host
#[embassy_executor::task]
pub async fn command_rx_task(mut rx: BufferedUartRx) {
    info!("Command RX task started");

    let mut assembler: LineAssembler = LineAssembler::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("RX: {} bytes", n);

                for &byte in &buf[..n] {
                    match assembler.feed(byte) {
                        Ok(Some(line)) => queue_line(&line),
                        Ok(None) => {
                            // Need more bytes
                        }
                        Err(e) => {
                            warn!("Line error: {:?}", e);
                        }
                    }
                }
            }
            Ok(_) => {
                // No bytes read, continue
            }
            Err(e) => {
                warn!("UART read error: {:?}", e);
            }
        }
    }
}

/// Queue one received line, dropping it if the queue is full
fn queue_line(line: &str) {
    match send_motion_command(line) {
        Ok(()) => trace!("Queued '{}'", line),
        Err(StepperError::QueueFull) => warn!("Command queue full, dropping '{}'", line),
        Err(e) => warn!("Cannot queue '{}': {:?}", line, e),
    }
}
