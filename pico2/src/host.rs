//! Board implementation of the watch face [`Host`].
//!
//! Everything the face asks for is turned into a signal or channel message
//! for one of the embassy tasks. Nothing here blocks.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant};
use watchface_common::{Host, HostEvent};

use crate::config::UTC_OFFSET_SECS;

/// Host notifications for the render loop, fed by every task.
pub static EVENTS: Channel<CriticalSectionRawMutex, HostEvent, 8> = Channel::new();

/// Latest arm/cancel command for the tick timer task. Newer replaces older.
pub static TICK_CONTROL: Signal<CriticalSectionRawMutex, TickControl> = Signal::new();

/// Pending data requests for the feed task.
pub static FEED_REQUESTS: Channel<CriticalSectionRawMutex, FeedRequest, 4> = Channel::new();

#[derive(Clone, Copy, Debug)]
pub enum TickControl {
    Arm { delay: Duration, generation: u32 },
    Cancel,
}

impl TickControl {
    /// The `(delay, generation)` to wait for, if armed.
    pub const fn armed(self) -> Option<(Duration, u32)> {
        match self {
            Self::Arm { delay, generation } => Some((delay, generation)),
            Self::Cancel => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum FeedRequest {
    Battery,
    Companion,
}

pub struct BoardHost {
    boot_epoch_ms: i64,
    time_zone_subscribed: bool,
}

impl BoardHost {
    pub const fn new(boot_epoch_ms: i64) -> Self {
        Self {
            boot_epoch_ms,
            time_zone_subscribed: false,
        }
    }

    /// Queue a data request. A full queue already has one pending.
    fn request(
        &self,
        request: FeedRequest,
    ) {
        if FEED_REQUESTS.try_send(request).is_err() {
            defmt::debug!("feed request {} dropped, queue full", request);
        }
    }
}

impl Host for BoardHost {
    fn now_ms(&self) -> i64 { self.boot_epoch_ms + Instant::now().as_millis() as i64 }

    fn utc_offset_secs(&self) -> i32 { UTC_OFFSET_SECS }

    fn schedule_tick(
        &mut self,
        delay: core::time::Duration,
        generation: u32,
    ) {
        let delay = Duration::from_micros(delay.as_micros() as u64);
        TICK_CONTROL.signal(TickControl::Arm { delay, generation });
    }

    fn cancel_tick(&mut self) {
        TICK_CONTROL.signal(TickControl::Cancel);
    }

    fn request_battery(&mut self) {
        self.request(FeedRequest::Battery);
    }

    fn request_companion(&mut self) {
        self.request(FeedRequest::Companion);
    }

    fn set_time_zone_subscription(
        &mut self,
        subscribed: bool,
    ) {
        // No time-zone source on the board; the offset is fixed at build time.
        if subscribed != self.time_zone_subscribed {
            self.time_zone_subscribed = subscribed;
            defmt::debug!("time zone subscription: {}", subscribed);
        }
    }
}
