//! Minute time-tick, aligned to the wall clock.

use embassy_time::{Duration, Ticker, Timer};
use watchface_common::{Host, HostEvent};

use crate::config::TIME_TICK_PERIOD;
use crate::host::{BoardHost, EVENTS};

#[embassy_executor::task]
pub async fn heartbeat_task(host: BoardHost) {
    let period_ms = TIME_TICK_PERIOD.as_millis();
    let into_minute = host.now_ms().rem_euclid(period_ms as i64) as u64;
    Timer::after(Duration::from_millis(period_ms - into_minute)).await;

    let mut ticker = Ticker::every(TIME_TICK_PERIOD);
    loop {
        EVENTS.send(HostEvent::TimeTick).await;
        ticker.next().await;
    }
}
