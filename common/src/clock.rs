//! Clock source: wall-clock time, local fields and the seconds progress.
//!
//! Time comes in as Unix epoch milliseconds from the host. The clock holds
//! only the current UTC offset, which is re-synchronised whenever the face
//! becomes visible or the host reports a time-zone change.

use core::fmt::Write;
use core::time::Duration;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDateTime, Offset, Timelike, Utc, Weekday};
use heapless::String;

use crate::config::UPDATE_RATE_MS;

/// Capacity of the formatted time string ("hh:mm").
pub const TIME_TEXT_LEN: usize = 8;

/// Capacity of the formatted date string ("EEE - MMM dd").
pub const DATE_TEXT_LEN: usize = 16;

const MINUTE_MS: i64 = 60_000;

// =============================================================================
// Clock Source
// =============================================================================

/// Local time fields for one redraw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClockReading {
    pub local: NaiveDateTime,
    /// Whole seconds elapsed in the current minute, over 60. In `[0, 1)`.
    pub progress: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockSource {
    offset: FixedOffset,
}

impl ClockSource {
    /// Out-of-range offsets fall back to UTC.
    pub fn new(utc_offset_secs: i32) -> Self {
        Self { offset: offset_or_utc(utc_offset_secs) }
    }

    #[inline]
    pub fn utc_offset_secs(&self) -> i32 {
        self.offset.local_minus_utc()
    }

    /// Update the zone offset. Returns `true` if it changed.
    pub fn set_utc_offset(
        &mut self,
        utc_offset_secs: i32,
    ) -> bool {
        let offset = offset_or_utc(utc_offset_secs);
        let changed = offset != self.offset;
        self.offset = offset;
        changed
    }

    pub fn read(
        &self,
        epoch_ms: i64,
    ) -> ClockReading {
        let utc = DateTime::<Utc>::from_timestamp_millis(epoch_ms).unwrap_or_default();
        ClockReading {
            local: utc.with_timezone(&self.offset).naive_local(),
            progress: progress_fraction(epoch_ms),
        }
    }
}

impl Default for ClockSource {
    fn default() -> Self {
        Self::new(0)
    }
}

fn offset_or_utc(secs: i32) -> FixedOffset {
    FixedOffset::east_opt(secs).unwrap_or_else(|| Utc.fix())
}

// =============================================================================
// Derived Values
// =============================================================================

/// Seconds within the minute over 60. Pre-epoch times wrap correctly.
pub fn progress_fraction(epoch_ms: i64) -> f32 {
    let seconds = epoch_ms.rem_euclid(MINUTE_MS) / 1_000;
    seconds as f32 / 60.0
}

/// Delay until the next whole update boundary. Always in `(0, UPDATE_RATE]`.
pub fn delay_to_next_update(now_ms: u64) -> Duration {
    Duration::from_millis(UPDATE_RATE_MS - now_ms % UPDATE_RATE_MS)
}

// =============================================================================
// Formatting
// =============================================================================

/// 12-hour "hh:mm".
pub fn format_time(local: &NaiveDateTime) -> String<TIME_TEXT_LEN> {
    let (_, hour) = local.hour12();
    let mut text = String::new();
    let _ = write!(text, "{:02}:{:02}", hour, local.minute());
    text
}

/// "EEE - MMM dd", e.g. "Mon - Mar 04".
pub fn format_date(local: &NaiveDateTime) -> String<DATE_TEXT_LEN> {
    let mut text = String::new();
    let _ = write!(
        text,
        "{} - {} {:02}",
        weekday_abbrev(local.weekday()),
        month_abbrev(local.month0()),
        local.day()
    );
    text
}

const fn weekday_abbrev(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

const fn month_abbrev(month0: u32) -> &'static str {
    match month0 {
        0 => "Jan",
        1 => "Feb",
        2 => "Mar",
        3 => "Apr",
        4 => "May",
        5 => "Jun",
        6 => "Jul",
        7 => "Aug",
        8 => "Sep",
        9 => "Oct",
        10 => "Nov",
        11 => "Dec",
        _ => "",
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    // 2024-03-04 13:07:42.250 UTC, a Monday
    const SAMPLE_MS: i64 = 1_709_557_662_250;

    #[test]
    fn test_progress_fraction() {
        assert_eq!(progress_fraction(0), 0.0);
        assert_eq!(progress_fraction(30_000), 0.5);
        assert_eq!(progress_fraction(30_999), 0.5, "Whole seconds only");
        assert_eq!(progress_fraction(SAMPLE_MS), 42.0 / 60.0);
        assert!(progress_fraction(59_999) < 1.0);
        assert_eq!(progress_fraction(-1_000), 59.0 / 60.0);
    }

    #[test]
    fn test_delay_is_phase_locked() {
        assert_eq!(delay_to_next_update(0), Duration::from_millis(1_000));
        assert_eq!(delay_to_next_update(1_250), Duration::from_millis(750));
        assert_eq!(delay_to_next_update(1_999), Duration::from_millis(1));
        for now in [3, 500, 999, 1_000, 123_456_789] {
            let d = delay_to_next_update(now);
            assert!(d > Duration::ZERO && d <= Duration::from_secs(1));
            assert_eq!((now + d.as_millis() as u64) % 1_000, 0);
        }
    }

    #[test]
    fn test_read_applies_offset() {
        let clock = ClockSource::new(2 * 3600);
        let reading = clock.read(SAMPLE_MS);
        let expected = NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_milli_opt(15, 7, 42, 250)
            .unwrap();
        assert_eq!(reading.local, expected);
        assert_eq!(reading.progress, 42.0 / 60.0);
    }

    #[test]
    fn test_set_utc_offset() {
        let mut clock = ClockSource::default();
        assert!(!clock.set_utc_offset(0));
        assert!(clock.set_utc_offset(-5 * 3600));
        assert_eq!(clock.utc_offset_secs(), -5 * 3600);
        assert!(clock.set_utc_offset(i32::MAX), "Invalid offset resets to UTC");
        assert_eq!(clock.utc_offset_secs(), 0);
    }

    #[test]
    fn test_format_time_is_twelve_hour() {
        let clock = ClockSource::default();
        let local = clock.read(SAMPLE_MS).local;
        assert_eq!(format_time(&local).as_str(), "01:07");

        let midnight = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 5, 0).unwrap();
        assert_eq!(format_time(&midnight).as_str(), "12:05");
    }

    #[test]
    fn test_format_date() {
        let clock = ClockSource::default();
        let local = clock.read(SAMPLE_MS).local;
        assert_eq!(format_date(&local).as_str(), "Mon - Mar 04");

        let local = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap().and_hms_opt(9, 0, 0).unwrap();
        assert_eq!(format_date(&local).as_str(), "Sun - Dec 31");
    }
}
