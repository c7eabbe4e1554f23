//! Transfer task
//!
//! Pumps the paged transfer every millisecond, one page per tick, and feeds
//! elapsed time to the stall monitor. Stall transitions are logged.

use defmt::*;
use embassy_time::{Duration, Instant, Ticker};

use pageflip_core::{TransferHealth, TransferStatus};

use crate::SharedDisplay;

/// Transfer tick in milliseconds
pub const TRANSFER_TICK_MS: u64 = 1;

/// Transfer task - drains published frames to the panel
#[embassy_executor::task]
pub async fn transfer_task(display: &'static SharedDisplay) {
    info!("Transfer task started");

    let mut ticker = Ticker::every(Duration::from_millis(TRANSFER_TICK_MS));
    let mut last_update = Instant::now();
    let mut stalled = false;

    loop {
        {
            let mut display = display.lock().await;

            if display.pump_transfer() == TransferStatus::Drained {
                trace!("Frame drained, {} queued", display.readable_count());
            }

            let now = Instant::now();
            display.update_time((now - last_update).as_millis() as u32);
            last_update = now;

            match display.health() {
                TransferHealth::Stalled { elapsed_ms } if !stalled => {
                    stalled = true;
                    let stats = display.stats();
                    warn!(
                        "Transfer stalled for {} ms ({} rejections, last error {:?})",
                        elapsed_ms, stats.consecutive_rejections, stats.last_error
                    );
                }
                TransferHealth::Ok if stalled => {
                    stalled = false;
                    info!(
                        "Transfer recovered, {} frames drained",
                        display.stats().frames_drained
                    );
                }
                _ => {}
            }
        }

        ticker.next().await;
    }
}
