//! Redraw tick timer.
//!
//! Waits for the armed delay unless a newer command arrives first. Arming
//! again or cancelling both land on [`TICK_CONTROL`], so there is never more
//! than one outstanding tick.

use defmt::trace;
use embassy_time::with_timeout;
use watchface_common::HostEvent;

use crate::host::{EVENTS, TICK_CONTROL};

#[embassy_executor::task]
pub async fn tick_timer_task() {
    let mut armed = None;

    loop {
        armed = match armed {
            None => TICK_CONTROL.wait().await.armed(),
            Some((delay, generation)) => match with_timeout(delay, TICK_CONTROL.wait()).await {
                Ok(control) => control.armed(),
                Err(_) => {
                    trace!("tick {} fired", generation);
                    EVENTS.send(HostEvent::TickFired { generation }).await;
                    None
                }
            },
        };
    }
}
