//! Watch face configuration constants.
//!
//! - `layout`: Text and icon anchors pre-computed per surface size
//!
//! Everything here is a compile-time constant. Values that depend on the
//! surface size live in [`layout::FaceLayout`], which is computed once per
//! surface change instead of every frame.

use core::time::Duration;

pub mod layout;

pub use layout::FaceLayout;

// =============================================================================
// Timing Configuration
// =============================================================================

/// Interactive redraw cadence. Ticks are phase-locked to multiples of this.
pub const UPDATE_RATE: Duration = Duration::from_secs(1);

/// [`UPDATE_RATE`] in milliseconds, for wall-clock modulo arithmetic.
pub const UPDATE_RATE_MS: u64 = 1_000;

/// Upper bound on any external data request (battery, steps, companion).
/// Past this the request is abandoned and the last known value stays.
pub const EXTERNAL_DATA_TIMEOUT: Duration = Duration::from_secs(3);

/// Minimum spacing between companion (phone) update requests.
pub const COMPANION_REQUEST_INTERVAL_MS: i64 = 10 * 60 * 1_000;

// =============================================================================
// Progress Ring Configuration
// =============================================================================

/// Ring stroke width in pixels.
pub const RING_STROKE_WIDTH: u32 = 6;

/// Stroked circle radius as a fraction of the outer (screen) radius.
pub const RING_INNER_RATIO: f32 = 0.95;

/// Rectangular ring inset from the screen edge, as a fraction of the short side.
pub const RING_MARGIN_RATIO: f32 = 0.05;

/// Smallest progress fraction the geometry engine accepts. Zero is bumped up
/// to this so the elapsed path is never a zero-length arc.
pub const MIN_PROGRESS_FRACTION: f32 = 0.001;

/// Largest progress fraction the geometry engine accepts.
pub const MAX_PROGRESS_FRACTION: f32 = 0.9999;

/// Extra width of the dimmed halo stroke drawn under anti-aliased rings.
pub const RING_HALO_EXTRA_WIDTH: u32 = 2;

// =============================================================================
// Asset Configuration
// =============================================================================

/// Icon size relative to the background scale factor.
pub const ICON_SCALE: f32 = 0.3;

/// Saturation of the ambient icon variants (0.0 = grayscale).
pub const AMBIENT_SATURATION: f32 = 0.0;

// =============================================================================
// Style Configuration
// =============================================================================

/// Alpha applied to primary elements (time, ring track, battery) when muted.
pub const MUTED_ALPHA_PRIMARY: u8 = 100;

/// Alpha applied to secondary elements (date, steps, elapsed ring) when muted.
pub const MUTED_ALPHA_SECONDARY: u8 = 80;

/// Battery level at or below which the gauge fill turns red.
pub const LOW_BATTERY_PERCENT: u8 = 15;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_rate_matches_millis() {
        assert_eq!(UPDATE_RATE.as_millis() as u64, UPDATE_RATE_MS);
    }

    #[test]
    fn test_progress_bounds_ordered() {
        assert!(MIN_PROGRESS_FRACTION > 0.0);
        assert!(MIN_PROGRESS_FRACTION < MAX_PROGRESS_FRACTION);
        assert!(MAX_PROGRESS_FRACTION < 1.0);
    }

    #[test]
    fn test_external_timeout_is_a_few_seconds() {
        assert!(EXTERNAL_DATA_TIMEOUT >= Duration::from_secs(1));
        assert!(EXTERNAL_DATA_TIMEOUT <= Duration::from_secs(10));
    }
}
