//! Frame renderer.
//!
//! Draws one complete frame from already-prepared inputs: clock reading, ring
//! paths, paints, layout, assets and a feed snapshot. Layers, back to front:
//!
//! 1. Background bitmap (black in ambient)
//! 2. Progress ring: remaining track, then elapsed arc (interactive only)
//! 3. Calendar and steps icons
//! 4. Date and step count
//! 5. Battery gauge and percentage
//! 6. Companion battery and temperature
//! 7. Time
//!
//! The renderer never decides *when* to draw; that is the scheduler's job.
//! It also never blocks on data: absent feed values draw nothing.

use core::fmt::{self, Write};

use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Arc, Line, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyle, TextStyleBuilder};
use heapless::String;
use profont::{PROFONT_12_POINT, PROFONT_24_POINT};

use crate::assets::{AssetName, AssetPipeline};
use crate::clock::{ClockReading, format_date, format_time};
use crate::colors::{BLACK, RED, SHADOW};
use crate::config::{FaceLayout, LOW_BATTERY_PERCENT, RING_HALO_EXTRA_WIDTH};
use crate::feeds::FeedSnapshot;
use crate::geometry::{PathSegment, RingPath, RingPaths};
use crate::style::{Element, Paint, StyleState};

// =============================================================================
// Text Styles
// =============================================================================

/// Font for the time.
pub const TIME_FONT: &MonoFont = &PROFONT_24_POINT;

/// Font for every secondary line.
pub const DETAIL_FONT: &MonoFont = &PROFONT_12_POINT;

const CENTERED: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Center)
    .baseline(Baseline::Alphabetic)
    .build();

const LEFT_ALIGNED: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Left)
    .baseline(Baseline::Alphabetic)
    .build();

const RIGHT_ALIGNED: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Right)
    .baseline(Baseline::Alphabetic)
    .build();

/// Horizontal gap between the companion battery and temperature columns.
const COMPANION_GAP: i32 = 8;

/// Drop shadow offset for text, ring strokes and the battery gauge.
const SHADOW_OFFSET: Point = Point::new(1, 1);

// =============================================================================
// Errors
// =============================================================================

/// A frame could not be drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameError<E> {
    /// No surface has been reported yet, so there is no layout.
    NoSurface,
    /// The draw target rejected a primitive.
    Draw(E),
}

impl<E: fmt::Debug> fmt::Display for FrameError<E> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::NoSurface => f.write_str("no surface to draw on"),
            Self::Draw(e) => write!(f, "draw target error: {e:?}"),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for FrameError<E> {}

// =============================================================================
// Frame Input
// =============================================================================

/// Everything one frame needs, borrowed from the session.
pub struct FrameInput<'a> {
    pub reading: &'a ClockReading,
    pub paths: &'a RingPaths,
    pub style: &'a StyleState,
    pub layout: &'a FaceLayout,
    pub assets: &'a AssetPipeline,
    pub feeds: FeedSnapshot,
}

/// Draw one full frame.
pub fn draw_frame<D>(
    target: &mut D,
    input: &FrameInput<'_>,
) -> Result<(), FrameError<D::Error>>
where
    D: DrawTarget<Color = Rgb565>,
{
    draw_layers(target, input).map_err(FrameError::Draw)
}

fn draw_layers<D>(
    target: &mut D,
    input: &FrameInput<'_>,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let ambient = input.style.mode().ambient;
    let layout = input.layout;
    let style = input.style;

    // 1. Background
    match input.assets.bitmap_for(AssetName::Background, ambient) {
        Some(background) => {
            target.clear(BLACK)?;
            let y = (layout.size.height as i32 - background.height() as i32) / 2;
            background.draw(target, Point::new(0, y))?;
        }
        None => target.clear(BLACK)?,
    }

    // 2. Ring
    if !ambient {
        draw_ring(target, &input.paths.remaining, style.paint(Element::RemainingRing))?;
        draw_ring(target, &input.paths.elapsed, style.paint(Element::ElapsedRing))?;
    }

    // 3. Icons
    if let Some(icon) = input.assets.bitmap_for(AssetName::Calendar, ambient) {
        icon.draw(target, layout.calendar_icon)?;
    }
    if let Some(icon) = input.assets.bitmap_for(AssetName::Steps, ambient) {
        icon.draw(target, layout.steps_icon)?;
    }

    // 4. Date and steps
    let date = format_date(&input.reading.local);
    draw_text(target, &date, layout.date_text, DETAIL_FONT, LEFT_ALIGNED, style.paint(Element::Date))?;

    if let Some(steps) = input.feeds.steps {
        let mut text: String<12> = String::new();
        let _ = write!(text, "{steps}");
        draw_text(target, &text, layout.steps_text, DETAIL_FONT, LEFT_ALIGNED, style.paint(Element::Steps))?;
    }

    // 5. Battery
    draw_battery(target, input)?;

    // 6. Companion row
    let row = layout.companion_text;
    if let Some(percent) = input.feeds.companion_battery_percent {
        let mut text: String<8> = String::new();
        let _ = write!(text, "{percent}%");
        let at = Point::new(row.x - COMPANION_GAP, row.y);
        draw_text(target, &text, at, DETAIL_FONT, RIGHT_ALIGNED, style.paint(Element::CompanionBattery))?;
    }
    if let Some(celsius) = input.feeds.temperature_celsius() {
        let mut text: String<8> = String::new();
        let _ = write!(text, "{celsius}C");
        let at = Point::new(row.x + COMPANION_GAP, row.y);
        draw_text(target, &text, at, DETAIL_FONT, LEFT_ALIGNED, style.paint(Element::Temperature))?;
    }

    // 7. Time
    let time = format_time(&input.reading.local);
    draw_text(target, &time, layout.time, TIME_FONT, CENTERED, style.paint(Element::Time))
}

// =============================================================================
// Layer Helpers
// =============================================================================

/// Stroke every segment of a ring path. Anti-aliased paints get a wider,
/// half-alpha halo underneath; shadowed paints get an offset copy below that.
pub fn draw_ring<D>(
    target: &mut D,
    path: &RingPath,
    paint: Paint,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let outer_width = if paint.anti_alias {
        paint.stroke_width + RING_HALO_EXTRA_WIDTH
    } else {
        paint.stroke_width
    };

    if paint.shadow {
        let shadow = Paint { color: SHADOW, ..paint };
        let style = PrimitiveStyle::with_stroke(shadow.resolved_color(), outer_width);
        stroke_path(target, path, SHADOW_OFFSET, style)?;
    }
    if paint.anti_alias {
        let halo = Paint {
            alpha: paint.alpha / 2,
            ..paint
        };
        let style = PrimitiveStyle::with_stroke(halo.resolved_color(), outer_width);
        stroke_path(target, path, Point::zero(), style)?;
    }
    let style = PrimitiveStyle::with_stroke(paint.resolved_color(), paint.stroke_width);
    stroke_path(target, path, Point::zero(), style)
}

fn stroke_path<D>(
    target: &mut D,
    path: &RingPath,
    offset: Point,
    style: PrimitiveStyle<Rgb565>,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    for segment in path.segments() {
        match *segment {
            PathSegment::Arc {
                center,
                radius,
                start_deg,
                sweep_deg,
            } => {
                let diameter = libm::roundf(radius * 2.0) as u32;
                Arc::with_center(
                    center.to_point() + offset,
                    diameter,
                    Angle::from_degrees(start_deg),
                    Angle::from_degrees(sweep_deg),
                )
                .into_styled(style)
                .draw(target)?;
            }
            PathSegment::Line { from, to } => {
                Line::new(from.to_point() + offset, to.to_point() + offset)
                    .into_styled(style)
                    .draw(target)?;
            }
        }
    }
    Ok(())
}

/// Draw text, with a one-pixel drop shadow if the paint asks for one.
fn draw_text<D>(
    target: &mut D,
    text: &str,
    position: Point,
    font: &MonoFont<'_>,
    alignment: TextStyle,
    paint: Paint,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    if text.is_empty() {
        return Ok(());
    }
    if paint.shadow {
        let shadow = Paint { color: SHADOW, ..paint };
        let style = MonoTextStyle::new(font, shadow.resolved_color());
        Text::with_text_style(text, position + SHADOW_OFFSET, style, alignment).draw(target)?;
    }
    let style = MonoTextStyle::new(font, paint.resolved_color());
    Text::with_text_style(text, position, style, alignment).draw(target)?;
    Ok(())
}

/// Vertical gauge filled from the bottom, with the percentage beside it.
fn draw_battery<D>(
    target: &mut D,
    input: &FrameInput<'_>,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let layout = input.layout;
    let style = input.style;
    let outline = style.paint(Element::BatteryOutline);

    let gauge = Rectangle::new(layout.battery_icon, layout.battery_icon_size);
    if outline.shadow {
        let shadow = Paint { color: SHADOW, ..outline };
        gauge
            .translate(SHADOW_OFFSET)
            .into_styled(PrimitiveStyle::with_stroke(shadow.resolved_color(), outline.stroke_width))
            .draw(target)?;
    }
    gauge
        .into_styled(PrimitiveStyle::with_stroke(outline.resolved_color(), outline.stroke_width))
        .draw(target)?;

    let Some(percent) = input.feeds.battery_percent else {
        return Ok(());
    };

    // The fill sits inside the outline, so only the outline casts a shadow.
    let inner = gauge.offset(-(outline.stroke_width as i32));
    let fill_h = inner.size.height * u32::from(percent) / 100;
    if fill_h > 0 && inner.size.width > 0 {
        let top = inner.top_left.y + (inner.size.height - fill_h) as i32;
        let fill = Rectangle::new(Point::new(inner.top_left.x, top), Size::new(inner.size.width, fill_h));

        let paint = style.paint(Element::BatteryFill);
        let color = if percent <= LOW_BATTERY_PERCENT && !style.mode().ambient {
            Paint { color: RED, ..paint }.resolved_color()
        } else {
            paint.resolved_color()
        };
        fill.into_styled(PrimitiveStyle::with_fill(color)).draw(target)?;
    }

    let mut text: String<8> = String::new();
    let _ = write!(text, "{percent}%");
    draw_text(target, &text, layout.battery_text, DETAIL_FONT, CENTERED, style.paint(Element::BatteryText))
}

// =============================================================================
// Tests
// =============================================================================
