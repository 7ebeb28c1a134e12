//! Virtual clock settings for the snapshot run.
//!
//! These use `std::time::Duration`, so they live here rather than in the
//! common crate.

use std::time::Duration;

/// 2024-03-04 13:07:42.250 UTC, a Monday.
pub const START_EPOCH_MS: i64 = 1_709_557_662_250;

/// Local offset reported by the virtual host (CET).
pub const UTC_OFFSET_SECS: i32 = 3_600;

/// Host time-tick heartbeat, delivered while visible in any mode.
pub const TIME_TICK_PERIOD: Duration = Duration::from_secs(60);

/// How long each scenario step runs before its snapshot is taken.
pub const INTERACTIVE_RUN: Duration = Duration::from_secs(7);
pub const AMBIENT_RUN: Duration = Duration::from_secs(150);
