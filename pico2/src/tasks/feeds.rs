//! External data reads.
//!
//! Each request is bounded by [`EXTERNAL_DATA_TIMEOUT`]. A read that times out
//! or fails publishes nothing, so the face keeps the last value (or blank).
//!
//! The battery comes from the VSYS divider on ADC3. Steps and the companion
//! values are synthesized: the board has neither a pedometer nor a radio.

use defmt::{debug, warn};
use embassy_rp::adc::{self, Adc, Async};
use embassy_time::{Duration, Instant, Timer, with_timeout};
use watchface_common::DataFeeds;
use watchface_common::config::EXTERNAL_DATA_TIMEOUT;

use crate::config::{BATTERY_EMPTY_MV, BATTERY_FULL_MV, COMPANION_LATENCY};
use crate::host::{FEED_REQUESTS, FeedRequest};

/// ADC full scale in millivolts; VSYS is divided by three before the pin.
const ADC_REFERENCE_MV: u32 = 3_300;
const ADC_MAX: u32 = 4_095;
const VSYS_DIVIDER: u32 = 3;

/// Owned inputs for the battery read.
pub struct BatterySense {
    pub adc: Adc<'static, Async>,
    pub vsys: adc::Channel<'static>,
}

#[embassy_executor::task]
pub async fn feeds_task(
    battery: BatterySense,
    feeds: &'static DataFeeds,
) {
    let mut battery = battery;
    let timeout = Duration::from_millis(EXTERNAL_DATA_TIMEOUT.as_millis() as u64);

    loop {
        let request = FEED_REQUESTS.receive().await;
        match request {
            FeedRequest::Battery => match with_timeout(timeout, read_battery_percent(&mut battery)).await {
                Ok(Some(percent)) => {
                    feeds.publish_battery(percent);
                    feeds.publish_steps(demo_steps());
                    debug!("battery {}%", percent);
                }
                Ok(None) => warn!("battery read failed"),
                Err(_) => warn!("battery read timed out"),
            },
            FeedRequest::Companion => match with_timeout(timeout, read_companion()).await {
                Ok((percent, celsius)) => {
                    feeds.publish_companion_battery(percent);
                    feeds.publish_temperature(celsius);
                }
                Err(_) => warn!("companion request timed out"),
            },
        }
    }
}

async fn read_battery_percent(battery: &mut BatterySense) -> Option<u8> {
    let raw = battery.adc.read(&mut battery.vsys).await.ok()?;
    Some(percent_from_mv(vsys_mv(raw)))
}

/// Convert an ADC3 sample into VSYS millivolts.
const fn vsys_mv(raw: u16) -> u32 {
    let raw = if raw as u32 > ADC_MAX { ADC_MAX } else { raw as u32 };
    raw * ADC_REFERENCE_MV * VSYS_DIVIDER / ADC_MAX
}

/// Linear LiPo estimate between the empty and full voltages.
const fn percent_from_mv(mv: u32) -> u8 {
    if mv <= BATTERY_EMPTY_MV {
        return 0;
    }
    if mv >= BATTERY_FULL_MV {
        return 100;
    }
    ((mv - BATTERY_EMPTY_MV) * 100 / (BATTERY_FULL_MV - BATTERY_EMPTY_MV)) as u8
}

/// Roughly 90 steps a minute since boot.
fn demo_steps() -> u32 {
    (Instant::now().as_secs() * 3 / 2) as u32
}

/// Pretend phone round-trip: battery drains slowly, temperature drifts.
async fn read_companion() -> (u8, f32) {
    Timer::after(COMPANION_LATENCY).await;
    let minutes = Instant::now().as_secs() as f32 / 60.0;
    let percent = (90.0 - minutes * 0.02).clamp(5.0, 100.0) as u8;
    let celsius = 21.5 + 1.5 * libm::sinf(minutes * 0.1);
    (percent, celsius)
}
