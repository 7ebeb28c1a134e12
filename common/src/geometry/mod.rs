//! Progress ring geometry engine.
//!
//! Turns a progress fraction into the two boundary paths of the seconds ring:
//! the *elapsed* path (drawn in the accent color) and the *remaining* path
//! (drawn as the dim track). Together they always cover the ring exactly
//! once.
//!
//! - `round`: Circular ring, optionally split around a bottom inset
//! - `rect`: Square ring traced through eight octant waypoints
//!
//! Angles follow embedded-graphics: 0° is 3 o'clock and positive angles sweep
//! clockwise, so the ring starts at -90° (12 o'clock) and the bottom of the
//! screen is at +90°.
//!
//! Everything here is a pure function of its inputs. Paths are rebuilt every
//! frame into fixed-capacity vectors and never cached.

use embedded_graphics::geometry::{Point, Size};
use heapless::Vec;

use crate::config::{
    MAX_PROGRESS_FRACTION, MIN_PROGRESS_FRACTION, RING_INNER_RATIO, RING_MARGIN_RATIO,
    RING_STROKE_WIDTH,
};

mod rect;
mod round;

pub use round::{GapRegion, half_gap_angle};

/// Most segments a single ring path can hold (a full rectangular lap).
pub const MAX_SEGMENTS: usize = 8;

// =============================================================================
// Basic Types
// =============================================================================

/// Sub-pixel point used while building paths.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointF {
    pub x: f32,
    pub y: f32,
}

impl PointF {
    #[inline]
    pub const fn new(
        x: f32,
        y: f32,
    ) -> Self {
        Self { x, y }
    }

    /// Round to the nearest pixel.
    #[inline]
    pub fn to_point(self) -> Point {
        Point::new(libm::roundf(self.x) as i32, libm::roundf(self.y) as i32)
    }

    #[inline]
    pub fn distance(
        self,
        other: Self,
    ) -> f32 {
        libm::hypotf(other.x - self.x, other.y - self.y)
    }

    /// Linear interpolation, `t = 0` is `self`, `t = 1` is `other`.
    #[inline]
    pub fn lerp(
        self,
        other: Self,
        t: f32,
    ) -> Self {
        Self::new(self.x + (other.x - self.x) * t, self.y + (other.y - self.y) * t)
    }

    /// Point on a circle around `self` at a screen angle in degrees.
    #[inline]
    pub fn on_circle(
        self,
        radius: f32,
        angle_deg: f32,
    ) -> Self {
        let rad = angle_deg.to_radians();
        Self::new(self.x + radius * libm::cosf(rad), self.y + radius * libm::sinf(rad))
    }
}

/// Physical outline of the display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayShape {
    Round,
    Rectangular,
}

/// Cutout at the bottom edge of a round display (e.g. an ambient light sensor
/// "flat tire").
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InsetGeometry {
    bottom_inset: f32,
}

impl InsetGeometry {
    /// No cutout.
    pub const NONE: Self = Self { bottom_inset: 0.0 };

    /// Create an inset. Negative or non-finite heights are clamped to zero.
    pub fn new(bottom_inset: f32) -> Self {
        let bottom_inset = if bottom_inset.is_finite() { bottom_inset.max(0.0) } else { 0.0 };
        Self { bottom_inset }
    }

    #[inline]
    pub const fn bottom_inset(&self) -> f32 {
        self.bottom_inset
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bottom_inset <= 0.0
    }
}

/// Ring dimensions derived from the surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RingFrame {
    pub center: PointF,
    /// Half the short side of the surface. The inset gap is measured against this.
    pub outer_radius: f32,
    /// Radius of the stroked circle.
    pub inner_radius: f32,
    /// Rectangular ring distance from the surface edge.
    pub margin: f32,
    pub stroke_width: u32,
}

impl RingFrame {
    pub fn for_surface(
        size: Size,
        shape: DisplayShape,
    ) -> Self {
        let w = size.width as f32;
        let h = size.height as f32;
        let short = w.min(h);
        let outer_radius = short / 2.0;

        let margin = match shape {
            DisplayShape::Round => 0.0,
            DisplayShape::Rectangular => short * RING_MARGIN_RATIO,
        };

        Self {
            center: PointF::new(w / 2.0, h / 2.0),
            outer_radius,
            inner_radius: outer_radius * RING_INNER_RATIO,
            margin,
            stroke_width: RING_STROKE_WIDTH,
        }
    }

    /// Side length of the rectangular ring square.
    #[inline]
    pub fn square_side(&self) -> f32 {
        (self.outer_radius * 2.0 - self.margin * 2.0).max(0.0)
    }
}

// =============================================================================
// Path Types
// =============================================================================

/// One drawable piece of a ring path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathSegment {
    /// Circular arc in screen degrees.
    Arc {
        center: PointF,
        radius: f32,
        start_deg: f32,
        sweep_deg: f32,
    },
    Line { from: PointF, to: PointF },
}

impl PathSegment {
    pub fn length(&self) -> f32 {
        match *self {
            Self::Arc { radius, sweep_deg, .. } => radius * sweep_deg.to_radians(),
            Self::Line { from, to } => from.distance(to),
        }
    }

    pub fn start_point(&self) -> PointF {
        match *self {
            Self::Arc { center, radius, start_deg, .. } => center.on_circle(radius, start_deg),
            Self::Line { from, .. } => from,
        }
    }

    pub fn end_point(&self) -> PointF {
        match *self {
            Self::Arc { center, radius, start_deg, sweep_deg } => {
                center.on_circle(radius, start_deg + sweep_deg)
            }
            Self::Line { to, .. } => to,
        }
    }
}

/// Ordered sequence of segments forming one ring piece.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RingPath {
    segments: Vec<PathSegment, MAX_SEGMENTS>,
}

impl RingPath {
    pub const fn new() -> Self {
        Self { segments: Vec::new() }
    }

    /// Append an arc. Zero or negative sweeps are dropped.
    pub(crate) fn arc(
        &mut self,
        center: PointF,
        radius: f32,
        start_deg: f32,
        sweep_deg: f32,
    ) {
        if sweep_deg > f32::EPSILON {
            self.push(PathSegment::Arc { center, radius, start_deg, sweep_deg });
        }
    }

    /// Append a line. Zero-length lines are dropped.
    pub(crate) fn line(
        &mut self,
        from: PointF,
        to: PointF,
    ) {
        if from.distance(to) > f32::EPSILON {
            self.push(PathSegment::Line { from, to });
        }
    }

    fn push(
        &mut self,
        segment: PathSegment,
    ) {
        // Builders never exceed a full lap; a dropped segment would only
        // shorten the path.
        let _ = self.segments.push(segment);
    }

    #[inline]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Total arc sweep in degrees.
    pub fn arc_sweep(&self) -> f32 {
        self.segments
            .iter()
            .map(|s| match s {
                PathSegment::Arc { sweep_deg, .. } => *sweep_deg,
                PathSegment::Line { .. } => 0.0,
            })
            .sum()
    }

    /// Total straight-line length in pixels.
    pub fn line_length(&self) -> f32 {
        self.segments
            .iter()
            .filter(|s| matches!(s, PathSegment::Line { .. }))
            .map(PathSegment::length)
            .sum()
    }

    /// Total path length in pixels.
    pub fn length(&self) -> f32 {
        self.segments.iter().map(PathSegment::length).sum()
    }

    pub fn start_point(&self) -> Option<PointF> {
        self.segments.first().map(PathSegment::start_point)
    }

    pub fn end_point(&self) -> Option<PointF> {
        self.segments.last().map(PathSegment::end_point)
    }
}

/// Elapsed and remaining pieces of the ring for one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RingPaths {
    pub elapsed: RingPath,
    pub remaining: RingPath,
}

// =============================================================================
// Entry Point
// =============================================================================

/// Clamp a raw progress value into the range the engine draws.
///
/// Zero, negative and non-finite values become [`MIN_PROGRESS_FRACTION`] so
/// the elapsed path never degenerates; values at or above one become
/// [`MAX_PROGRESS_FRACTION`].
pub fn normalize_fraction(fraction: f32) -> f32 {
    if !fraction.is_finite() || fraction <= 0.0 {
        return MIN_PROGRESS_FRACTION;
    }
    fraction.clamp(MIN_PROGRESS_FRACTION, MAX_PROGRESS_FRACTION)
}

/// Build the elapsed and remaining ring paths for a progress fraction.
pub fn compute_ring_paths(
    fraction: f32,
    shape: DisplayShape,
    inset: InsetGeometry,
    frame: &RingFrame,
) -> RingPaths {
    let fraction = normalize_fraction(fraction);
    match shape {
        DisplayShape::Round => round::round_paths(fraction * 360.0, inset, frame),
        DisplayShape::Rectangular => rect::rect_paths(fraction, frame),
    }
}

// =============================================================================
// Tests
// =============================================================================
