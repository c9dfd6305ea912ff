//! Panel UART receive task
//!
//! Receives frames from the front panel and dispatches events.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use crema_protocol::{FrameDecoder, PanelMessage};

use crate::channels::{HEARTBEAT_RECEIVED, PANEL_EVENTS};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Panel RX task - receives and parses frames from the panel
#[embassy_executor::task]
pub async fn panel_rx_task(mut rx: BufferedUartRx) {
    info!("Panel RX task started");

    let mut decoder = FrameDecoder::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("RX: {} bytes", n);

                for &byte in &buf[..n] {
                    match decoder.push(byte) {
                        Ok(Some(frame)) => match PanelMessage::from_frame(&frame) {
                            Ok(message) => handle_message(message),
                            Err(e) => warn!("Unknown panel message: {:?}", e),
                        },
                        Ok(None) => {
                            // Need more bytes
                        }
                        Err(e) => {
                            warn!("Frame decode error: {:?}", e);
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

fn handle_message(message: PanelMessage) {
    match message {
        PanelMessage::Ping => {
            trace!("PING received");
            HEARTBEAT_RECEIVED.signal(());
        }
        PanelMessage::Event(event) => {
            debug!("Panel event: {:?}", event);
            // Send to the machine, dropping if full
            if PANEL_EVENTS.try_send(event).is_err() {
                warn!("Panel event channel full, dropping event");
            }
        }
    }
}
