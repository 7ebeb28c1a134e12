//! Board configuration.
//!
//! Pin mapping (Pimoroni Pico Display Pack style wiring, 240x240 ST7789):
//! - DC: GPIO16
//! - CS: GPIO17
//! - CLK: GPIO18 (SPI0 CLK)
//! - MOSI: GPIO19 (SPI0 TX)
//! - Backlight: GPIO20
//! - Buttons A/B/X/Y: GPIO12..15, active-low
//! - VSYS sense: GPIO29 (ADC3, VSYS / 3)

use embassy_time::Duration;

/// The panel is square, so the ring follows the rectangle.
pub const SHAPE: watchface_common::DisplayShape = watchface_common::DisplayShape::Rectangular;

/// Heap for the asset pipeline. Holds the source artwork plus one prepared set.
pub const HEAP_SIZE: usize = 200 * 1024;

/// Wall-clock time at boot. There is no RTC, so the board starts here.
/// 2024-03-04 13:07:42 UTC.
pub const BOOT_EPOCH_MS: i64 = 1_709_557_662_000;

/// Local offset reported to the face (CET).
pub const UTC_OFFSET_SECS: i32 = 3_600;

/// Host time-tick heartbeat period.
pub const TIME_TICK_PERIOD: Duration = Duration::from_secs(60);

/// Button poll interval.
pub const BUTTON_POLL: Duration = Duration::from_millis(10);

/// Simulated round-trip to the paired phone.
pub const COMPANION_LATENCY: Duration = Duration::from_millis(250);

/// LiPo voltage range mapped onto 0..=100 %.
pub const BATTERY_EMPTY_MV: u32 = 3_300;
pub const BATTERY_FULL_MV: u32 = 4_200;
