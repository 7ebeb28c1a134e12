//! Square ring traced through eight octant waypoints.
//!
//! ```text
//!   7 ──── 0/8 ──── 1
//!   │               │
//!   6               2
//!   │               │
//!   5 ───── 4 ───── 3
//! ```
//!
//! Each octant is 1/8 of fraction space and half a side of the square.

use super::{PointF, RingFrame, RingPath, RingPaths};

const OCTANTS: usize = 8;

fn waypoints(frame: &RingFrame) -> [PointF; OCTANTS + 1] {
    let half = frame.square_side() / 2.0;
    let c = frame.center;
    let (left, right) = (c.x - half, c.x + half);
    let (top, bottom) = (c.y - half, c.y + half);

    [
        PointF::new(c.x, top),
        PointF::new(right, top),
        PointF::new(right, c.y),
        PointF::new(right, bottom),
        PointF::new(c.x, bottom),
        PointF::new(left, bottom),
        PointF::new(left, c.y),
        PointF::new(left, top),
        PointF::new(c.x, top),
    ]
}

pub(super) fn rect_paths(
    fraction: f32,
    frame: &RingFrame,
) -> RingPaths {
    let points = waypoints(frame);

    let scaled = fraction * OCTANTS as f32;
    let octant = (libm::floorf(scaled) as usize).min(OCTANTS - 1);
    let t = scaled - octant as f32;
    let split = points[octant].lerp(points[octant + 1], t);

    let mut elapsed = RingPath::new();
    for pair in points[..=octant].windows(2) {
        elapsed.line(pair[0], pair[1]);
    }
    elapsed.line(points[octant], split);

    let mut remaining = RingPath::new();
    remaining.line(split, points[octant + 1]);
    for pair in points[octant + 1..].windows(2) {
        remaining.line(pair[0], pair[1]);
    }

    RingPaths { elapsed, remaining }
}

// =============================================================================
// Tests
// =============================================================================
