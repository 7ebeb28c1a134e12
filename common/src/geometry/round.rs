//! Circular ring, with an optional gap around a bottom inset.
//!
//! Without an inset the elapsed ring is one arc from 12 o'clock and the
//! remaining ring is its complement. With an inset the circle is cut at the
//! bottom, symmetric around 90°, by `half_gap` degrees on each side. The cut
//! is crossed by a straight leftward bridge, so a full lap reads:
//!
//! ```text
//!   near arc  -90° .. 90° - h      sweep 180 - h
//!   bridge    (leftward line)
//!   far arc   90° + h .. 270°      sweep 180 - h
//! ```

use super::{InsetGeometry, PointF, RingFrame, RingPath, RingPaths};

/// Ring start, 12 o'clock.
const START_DEG: f32 = -90.0;

/// Where the sweep sits relative to the inset gap.
///
/// Intervals are half-open: a sweep exactly on a boundary belongs to the
/// region being entered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GapRegion {
    /// `[0, 180 - h)`
    BeforeGap,
    /// `[180 - h, 180 + h)`
    InGap,
    /// `[180 + h, 360)`
    PastGap,
}

impl GapRegion {
    pub fn classify(
        sweep_deg: f32,
        half_gap_deg: f32,
    ) -> Self {
        if sweep_deg < 180.0 - half_gap_deg {
            Self::BeforeGap
        } else if sweep_deg < 180.0 + half_gap_deg {
            Self::InGap
        } else {
            Self::PastGap
        }
    }
}

/// Half of the gap cut by a bottom inset, in degrees.
///
/// `acos((R - inset) / R) * 90 / π`, with the inset clamped to `[0, R]`.
pub fn half_gap_angle(
    outer_radius: f32,
    inset: InsetGeometry,
) -> f32 {
    if outer_radius <= 0.0 || inset.is_empty() {
        return 0.0;
    }
    let inset = inset.bottom_inset().min(outer_radius);
    let ratio = ((outer_radius - inset) / outer_radius).clamp(-1.0, 1.0);
    libm::acosf(ratio) * (90.0 / core::f32::consts::PI)
}

/// Full bridge length across the gap. Never negative.
///
/// `sin(h) * inner_radius - 2 * stroke_width`, with `h` fed to `sin` as the
/// plain degree value.
fn bridge_length(
    half_gap_deg: f32,
    frame: &RingFrame,
) -> f32 {
    let len = libm::sinf(half_gap_deg) * frame.inner_radius
        - 2.0 * frame.stroke_width as f32;
    len.max(0.0)
}

pub(super) fn round_paths(
    sweep: f32,
    inset: InsetGeometry,
    frame: &RingFrame,
) -> RingPaths {
    let h = half_gap_angle(frame.outer_radius, inset);
    if h <= 0.0 {
        return full_circle(sweep, frame);
    }

    let center = frame.center;
    let r = frame.inner_radius;

    let near_sweep = 180.0 - h;
    let far_start = 90.0 + h;
    let bridge_start = center.on_circle(r, 90.0 - h);
    let bridge_end = PointF::new(bridge_start.x - bridge_length(h, frame), bridge_start.y);

    let mut elapsed = RingPath::new();
    let mut remaining = RingPath::new();

    match GapRegion::classify(sweep, h) {
        GapRegion::BeforeGap => {
            elapsed.arc(center, r, START_DEG, sweep);

            remaining.arc(center, r, START_DEG + sweep, near_sweep - sweep);
            remaining.line(bridge_start, bridge_end);
            remaining.arc(center, r, far_start, near_sweep);
        }
        GapRegion::InGap => {
            let t = (sweep - near_sweep) / (2.0 * h);
            let split = bridge_start.lerp(bridge_end, t);

            elapsed.arc(center, r, START_DEG, near_sweep);
            elapsed.line(bridge_start, split);

            remaining.line(split, bridge_end);
            remaining.arc(center, r, far_start, near_sweep);
        }
        GapRegion::PastGap => {
            let far_sweep = sweep - (180.0 + h);

            elapsed.arc(center, r, START_DEG, near_sweep);
            elapsed.line(bridge_start, bridge_end);
            elapsed.arc(center, r, far_start, far_sweep);

            remaining.arc(center, r, far_start + far_sweep, 360.0 - sweep);
        }
    }

    RingPaths { elapsed, remaining }
}

fn full_circle(
    sweep: f32,
    frame: &RingFrame,
) -> RingPaths {
    let mut elapsed = RingPath::new();
    let mut remaining = RingPath::new();
    elapsed.arc(frame.center, frame.inner_radius, START_DEG, sweep);
    remaining.arc(frame.center, frame.inner_radius, START_DEG + sweep, 360.0 - sweep);
    RingPaths { elapsed, remaining }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::super::{DisplayShape, PathSegment, compute_ring_paths};
    use super::*;

    fn frame_with_radius(outer_radius: f32) -> RingFrame {
        RingFrame {
            center: PointF::new(outer_radius, outer_radius),
            outer_radius,
            inner_radius: outer_radius * 0.95,
            margin: 0.0,
            stroke_width: 6,
        }
    }

    fn fractions() -> impl Iterator<Item = f32> {
        (1..1000).map(|i| i as f32 / 1000.0)
    }

    // -------------------------------------------------------------------------
    // No inset
    // -------------------------------------------------------------------------

    #[test]
    fn test_sweeps_sum_to_full_circle() {
        let frame = frame_with_radius(120.0);
        for f in fractions() {
            let paths = compute_ring_paths(f, DisplayShape::Round, InsetGeometry::NONE, &frame);
            let elapsed = paths.elapsed.arc_sweep();
            let total = elapsed + paths.remaining.arc_sweep();
            assert!((total - 360.0).abs() < 1e-3, "f={f}: total sweep {total}");
            assert!((elapsed - f * 360.0).abs() < 1e-3, "f={f}: elapsed sweep {elapsed}");
        }
    }

    #[test]
    fn test_elapsed_starts_at_twelve() {
        let frame = frame_with_radius(120.0);
        let paths = compute_ring_paths(0.25, DisplayShape::Round, InsetGeometry::NONE, &frame);
        match paths.elapsed.segments() {
            [PathSegment::Arc { start_deg, sweep_deg, .. }] => {
                assert_eq!(*start_deg, -90.0);
                assert!((sweep_deg - 90.0).abs() < 1e-4);
            }
            other => panic!("Expected a single arc, got {other:?}"),
        }
        let start = paths.elapsed.start_point().unwrap();
        assert!((start.x - 120.0).abs() < 1e-3);
        assert!((start.y - (120.0 - 114.0)).abs() < 1e-3);
    }

    #[test]
    fn test_remaining_begins_where_elapsed_ends() {
        let frame = frame_with_radius(120.0);
        let paths = compute_ring_paths(0.6, DisplayShape::Round, InsetGeometry::NONE, &frame);
        let a = paths.elapsed.end_point().unwrap();
        let b = paths.remaining.start_point().unwrap();
        assert!(a.distance(b) < 1e-2);
    }

    // -------------------------------------------------------------------------
    // Inset
    // -------------------------------------------------------------------------

    #[test]
    fn test_half_gap_angle() {
        let h = half_gap_angle(200.0, InsetGeometry::new(24.0));
        let expected = libm::acosf(176.0 / 200.0) * 90.0 / core::f32::consts::PI;
        assert!((h - expected).abs() < 1e-4);
        assert!(h > 14.0 && h < 14.4, "h = {h}");

        assert_eq!(half_gap_angle(200.0, InsetGeometry::NONE), 0.0);
        assert!((half_gap_angle(200.0, InsetGeometry::new(1_000.0)) - 45.0).abs() < 1e-3);
    }

    #[test]
    fn test_classify_half_open() {
        let h = 20.0;
        assert_eq!(GapRegion::classify(0.0, h), GapRegion::BeforeGap);
        assert_eq!(GapRegion::classify(159.9, h), GapRegion::BeforeGap);
        assert_eq!(GapRegion::classify(160.0, h), GapRegion::InGap);
        assert_eq!(GapRegion::classify(199.9, h), GapRegion::InGap);
        assert_eq!(GapRegion::classify(200.0, h), GapRegion::PastGap);
        assert_eq!(GapRegion::classify(359.9, h), GapRegion::PastGap);
    }

    #[test]
    fn test_arc_coverage_constant_with_inset() {
        let frame = frame_with_radius(200.0);
        let inset = InsetGeometry::new(24.0);
        let h = half_gap_angle(200.0, inset);
        for f in fractions() {
            let paths = compute_ring_paths(f, DisplayShape::Round, inset, &frame);
            let total = paths.elapsed.arc_sweep() + paths.remaining.arc_sweep();
            assert!(
                (total - (360.0 - 2.0 * h)).abs() < 1e-2,
                "f={f}: coverage {total}, expected {}",
                360.0 - 2.0 * h
            );
        }
    }

    #[test]
    fn test_bridge_split_is_complementary() {
        let frame = frame_with_radius(200.0);
        let inset = InsetGeometry::new(24.0);
        let h = half_gap_angle(200.0, inset);
        let full = bridge_length(h, &frame);
        assert!(full > 0.0);

        for f in fractions() {
            let paths = compute_ring_paths(f, DisplayShape::Round, inset, &frame);
            let total = paths.elapsed.line_length() + paths.remaining.line_length();
            assert!((total - full).abs() < 1e-2, "f={f}: bridge {total}, expected {full}");
        }
    }

    #[test]
    fn test_scenario_before_gap() {
        // R = 200, inset 24, fraction 0.4: 144° sits before the gap.
        let frame = frame_with_radius(200.0);
        let inset = InsetGeometry::new(24.0);
        let paths = compute_ring_paths(0.4, DisplayShape::Round, inset, &frame);

        match paths.elapsed.segments() {
            [PathSegment::Arc { start_deg, sweep_deg, .. }] => {
                assert_eq!(*start_deg, -90.0);
                assert!((sweep_deg - 144.0).abs() < 1e-3);
            }
            other => panic!("Expected a single arc, got {other:?}"),
        }
        assert_eq!(paths.remaining.segments().len(), 3, "Near arc, bridge, far arc");
    }

    #[test]
    fn test_bridge_length_fixed_value() {
        // R = 200, inset 24: h ~= 14.1788, sin(h) * 190 - 12 ~= 177.835.
        let frame = frame_with_radius(200.0);
        let h = half_gap_angle(200.0, InsetGeometry::new(24.0));
        let full = bridge_length(h, &frame);
        let expected = libm::sinf(h) * 190.0 - 12.0;
        assert!((full - expected).abs() < 1e-3, "bridge {full}, expected {expected}");
        assert!((full - 177.835).abs() < 0.05, "bridge {full}");
    }

    #[test]
    fn test_elapsed_length_continuous_at_gap_edges() {
        let frame = frame_with_radius(200.0);
        let inset = InsetGeometry::new(24.0);
        let h = half_gap_angle(200.0, inset);

        for edge in [180.0 - h, 180.0 + h] {
            let below = round_paths(edge - 1e-3, inset, &frame);
            let at = round_paths(edge, inset, &frame);
            let before = below.elapsed.length();
            let after = at.elapsed.length();
            assert!(
                (before - after).abs() < 0.05,
                "edge {edge}: elapsed {before} below, {after} at boundary"
            );
            let lap_below = before + below.remaining.length();
            let lap_at = after + at.remaining.length();
            assert!((lap_below - lap_at).abs() < 0.05, "edge {edge}: lap {lap_below} vs {lap_at}");
        }
    }

    #[test]
    fn test_in_gap_bridge_progress() {
        let frame = frame_with_radius(200.0);
        let inset = InsetGeometry::new(24.0);
        let h = half_gap_angle(200.0, inset);
        let full = bridge_length(h, &frame);

        // Exactly halfway through the gap.
        let paths = compute_ring_paths(0.5, DisplayShape::Round, inset, &frame);
        assert!((paths.elapsed.arc_sweep() - (180.0 - h)).abs() < 1e-3);
        assert!((paths.elapsed.line_length() - full / 2.0).abs() < 1e-2);

        match paths.elapsed.segments() {
            [PathSegment::Arc { .. }, PathSegment::Line { from, to }] => {
                assert!(to.x < from.x, "Bridge runs leftward");
                assert_eq!(to.y, from.y);
            }
            other => panic!("Expected arc then bridge, got {other:?}"),
        }
    }

    #[test]
    fn test_past_gap_resumes_at_far_side() {
        let frame = frame_with_radius(200.0);
        let inset = InsetGeometry::new(24.0);
        let h = half_gap_angle(200.0, inset);

        let paths = compute_ring_paths(0.75, DisplayShape::Round, inset, &frame);
        let segments = paths.elapsed.segments();
        assert_eq!(segments.len(), 3);
        match segments[2] {
            PathSegment::Arc { start_deg, sweep_deg, .. } => {
                assert!((start_deg - (90.0 + h)).abs() < 1e-4);
                assert!((sweep_deg - (270.0 - 180.0 - h)).abs() < 1e-3);
            }
            other => panic!("Expected far arc, got {other:?}"),
        }
        match paths.remaining.segments() {
            [PathSegment::Arc { sweep_deg, .. }] => assert!((sweep_deg - 90.0).abs() < 1e-3),
            other => panic!("Expected a single closing arc, got {other:?}"),
        }
    }

    #[test]
    fn test_tiny_inset_drops_empty_bridge() {
        // h ~= 4.05, so sin(h) is negative: bridge clamps to zero and is omitted.
        let frame = frame_with_radius(120.0);
        let inset = InsetGeometry::new(1.2);
        let paths = compute_ring_paths(0.3, DisplayShape::Round, inset, &frame);
        assert_eq!(paths.remaining.line_length(), 0.0);
        assert!(
            paths
                .remaining
                .segments()
                .iter()
                .all(|s| matches!(s, PathSegment::Arc { .. }))
        );
    }
}
