//! Panel UART transmit task
//!
//! Sends indicator/readout updates and heartbeat responses to the panel.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use crema_protocol::{PanelUpdate, MAX_FRAME_SIZE};

use crate::channels::{HEARTBEAT_RECEIVED, PANEL_UPDATES};

/// Panel TX task - sends frames to the panel
#[embassy_executor::task]
pub async fn panel_tx_task(mut tx: BufferedUartTx<'static, UART0>) {
    info!("Panel TX task started");

    loop {
        let update = match select(HEARTBEAT_RECEIVED.wait(), PANEL_UPDATES.receive()).await {
            Either::First(()) => PanelUpdate::Pong,
            Either::Second(update) => update,
        };
        send_update(&mut tx, update).await;
    }
}

async fn send_update(tx: &mut BufferedUartTx<'static, UART0>, update: PanelUpdate) {
    let frame = match update.to_frame() {
        Ok(frame) => frame,
        Err(e) => {
            warn!("Failed to encode {:?}: {:?}", update, e);
            return;
        }
    };

    let mut buf = [0u8; MAX_FRAME_SIZE];
    if let Ok(len) = frame.encode(&mut buf) {
        if let Err(e) = tx.write_all(&buf[..len]).await {
            warn!("Failed to send panel update: {:?}", e);
        } else {
            trace!("Sent {:?}", update);
        }
    }
}
