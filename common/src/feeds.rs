//! External data feeds: battery, steps, companion battery and temperature.
//!
//! Each value arrives asynchronously from whatever task or callback owns the
//! data source and is stored in its own atomic. The render path takes a
//! [`FeedSnapshot`] without ever waiting; a value that never arrived (or
//! timed out) reads as `None` and renders blank.
//!
//! `DataFeeds::new` is `const`, so the firmware keeps one in a `static`.

use core::sync::atomic::{AtomicI32, AtomicU8, AtomicU32, Ordering};

/// "No value yet" marker for percentages (valid range is 0..=100).
const ABSENT_PERCENT: u8 = u8::MAX;

/// "No value yet" marker for the step counter.
const ABSENT_STEPS: u32 = u32::MAX;

/// "No value yet" marker for the temperature.
const ABSENT_TEMPERATURE: i32 = i32::MIN;

/// Latest externally supplied values.
pub struct DataFeeds {
    battery_percent: AtomicU8,
    companion_battery_percent: AtomicU8,
    steps: AtomicU32,
    /// Tenths of a degree Celsius.
    temperature_decis: AtomicI32,
}

impl DataFeeds {
    pub const fn new() -> Self {
        Self {
            battery_percent: AtomicU8::new(ABSENT_PERCENT),
            companion_battery_percent: AtomicU8::new(ABSENT_PERCENT),
            steps: AtomicU32::new(ABSENT_STEPS),
            temperature_decis: AtomicI32::new(ABSENT_TEMPERATURE),
        }
    }

    /// Publish the watch battery level. Values above 100 are clamped.
    pub fn publish_battery(
        &self,
        percent: u8,
    ) {
        self.battery_percent.store(percent.min(100), Ordering::Relaxed);
    }

    /// Publish the paired phone's battery level. Values above 100 are clamped.
    pub fn publish_companion_battery(
        &self,
        percent: u8,
    ) {
        self.companion_battery_percent.store(percent.min(100), Ordering::Relaxed);
    }

    pub fn publish_steps(
        &self,
        steps: u32,
    ) {
        self.steps.store(steps.min(ABSENT_STEPS - 1), Ordering::Relaxed);
    }

    /// Publish the outdoor temperature in degrees Celsius.
    pub fn publish_temperature(
        &self,
        celsius: f32,
    ) {
        if !celsius.is_finite() {
            return;
        }
        let decis = libm::roundf(celsius * 10.0) as i32;
        self.temperature_decis.store(decis.max(ABSENT_TEMPERATURE + 1), Ordering::Relaxed);
    }

    /// Forget every value, e.g. after the companion disconnects.
    pub fn clear(&self) {
        self.battery_percent.store(ABSENT_PERCENT, Ordering::Relaxed);
        self.companion_battery_percent.store(ABSENT_PERCENT, Ordering::Relaxed);
        self.steps.store(ABSENT_STEPS, Ordering::Relaxed);
        self.temperature_decis.store(ABSENT_TEMPERATURE, Ordering::Relaxed);
    }

    /// Read all values without blocking.
    pub fn snapshot(&self) -> FeedSnapshot {
        let percent = |v: u8| (v != ABSENT_PERCENT).then_some(v);
        let steps = self.steps.load(Ordering::Relaxed);
        let temp = self.temperature_decis.load(Ordering::Relaxed);

        FeedSnapshot {
            battery_percent: percent(self.battery_percent.load(Ordering::Relaxed)),
            companion_battery_percent: percent(self.companion_battery_percent.load(Ordering::Relaxed)),
            steps: (steps != ABSENT_STEPS).then_some(steps),
            temperature_decis: (temp != ABSENT_TEMPERATURE).then_some(temp),
        }
    }
}

impl Default for DataFeeds {
    fn default() -> Self { Self::new() }
}

/// Point-in-time copy of the feeds for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FeedSnapshot {
    pub battery_percent: Option<u8>,
    pub companion_battery_percent: Option<u8>,
    pub steps: Option<u32>,
    pub temperature_decis: Option<i32>,
}

impl FeedSnapshot {
    /// Whole degrees, rounded half away from zero.
    pub fn temperature_celsius(&self) -> Option<i32> {
        self.temperature_decis.map(|d| if d >= 0 { (d + 5) / 10 } else { (d - 5) / 10 })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_feeds_are_absent() {
        let feeds = DataFeeds::new();
        assert_eq!(feeds.snapshot(), FeedSnapshot::default());
    }

    #[test]
    fn test_publish_and_snapshot() {
        let feeds = DataFeeds::new();
        feeds.publish_battery(87);
        feeds.publish_companion_battery(64);
        feeds.publish_steps(4711);
        feeds.publish_temperature(21.4);

        let snap = feeds.snapshot();
        assert_eq!(snap.battery_percent, Some(87));
        assert_eq!(snap.companion_battery_percent, Some(64));
        assert_eq!(snap.steps, Some(4711));
        assert_eq!(snap.temperature_decis, Some(214));
        assert_eq!(snap.temperature_celsius(), Some(21));
    }

    #[test]
    fn test_out_of_range_values_clamp() {
        let feeds = DataFeeds::new();
        feeds.publish_battery(250);
        feeds.publish_steps(u32::MAX);
        assert_eq!(feeds.snapshot().battery_percent, Some(100));
        assert_eq!(feeds.snapshot().steps, Some(u32::MAX - 1), "Sentinel is never stored");
    }

    #[test]
    fn test_non_finite_temperature_ignored() {
        let feeds = DataFeeds::new();
        feeds.publish_temperature(-3.6);
        feeds.publish_temperature(f32::NAN);
        assert_eq!(feeds.snapshot().temperature_decis, Some(-36));
        assert_eq!(feeds.snapshot().temperature_celsius(), Some(-4));
    }

    #[test]
    fn test_clear() {
        let feeds = DataFeeds::new();
        feeds.publish_battery(50);
        feeds.publish_steps(10);
        feeds.clear();
        assert_eq!(feeds.snapshot(), FeedSnapshot::default());
    }
}
