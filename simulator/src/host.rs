//! Virtual host: a manual clock, one tick slot and synchronous data feeds.
//!
//! Nothing here sleeps. The driver advances the clock to the next due event
//! and dispatches it, so a two-minute ambient run takes milliseconds.

use std::time::Duration;

use watchface_common::{DataFeeds, Host};

/// Scripted platform the simulator drives the face through.
pub struct VirtualHost<'f> {
    now_ms: i64,
    utc_offset_secs: i32,
    /// Deadline and generation of the armed tick.
    pending: Option<(i64, u32)>,
    subscribed: bool,
    feeds: &'f DataFeeds,
    start_ms: i64,
    schedules: u32,
    cancels: u32,
}

impl<'f> VirtualHost<'f> {
    pub fn new(
        start_ms: i64,
        utc_offset_secs: i32,
        feeds: &'f DataFeeds,
    ) -> Self {
        Self {
            now_ms: start_ms,
            utc_offset_secs,
            pending: None,
            subscribed: false,
            feeds,
            start_ms,
            schedules: 0,
            cancels: 0,
        }
    }

    #[inline]
    pub const fn pending_tick(&self) -> Option<(i64, u32)> { self.pending }

    #[inline]
    pub const fn is_subscribed(&self) -> bool { self.subscribed }

    #[inline]
    pub const fn schedules(&self) -> u32 { self.schedules }

    #[inline]
    pub const fn cancels(&self) -> u32 { self.cancels }

    /// Move the clock forward. Never moves backwards.
    pub fn set_now(
        &mut self,
        now_ms: i64,
    ) {
        self.now_ms = self.now_ms.max(now_ms);
    }

    pub fn set_utc_offset(
        &mut self,
        utc_offset_secs: i32,
    ) {
        self.utc_offset_secs = utc_offset_secs;
    }

    /// Minutes since the run started, for the demo values.
    fn elapsed_minutes(&self) -> f32 {
        (self.now_ms - self.start_ms) as f32 / 60_000.0
    }
}

impl Host for VirtualHost<'_> {
    fn now_ms(&self) -> i64 { self.now_ms }

    fn utc_offset_secs(&self) -> i32 { self.utc_offset_secs }

    fn schedule_tick(
        &mut self,
        delay: Duration,
        generation: u32,
    ) {
        let delay_ms = i64::try_from(delay.as_millis()).unwrap_or(i64::MAX);
        self.pending = Some((self.now_ms.saturating_add(delay_ms), generation));
        self.schedules += 1;
    }

    fn cancel_tick(&mut self) {
        self.pending = None;
        self.cancels += 1;
    }

    fn request_battery(&mut self) {
        // Slow drain plus a walk of roughly 90 steps a minute.
        let minutes = self.elapsed_minutes();
        let battery = (82.0 - minutes * 0.05).clamp(0.0, 100.0);
        self.feeds.publish_battery(battery as u8);
        self.feeds.publish_steps(4_210 + (minutes * 90.0) as u32);
    }

    fn request_companion(&mut self) {
        let minutes = self.elapsed_minutes();
        self.feeds.publish_companion_battery(64);
        self.feeds.publish_temperature(21.5 + 1.5 * (minutes * 0.1).sin());
    }

    fn set_time_zone_subscription(
        &mut self,
        subscribed: bool,
    ) {
        self.subscribed = subscribed;
    }
}
