//! Surface-dependent layout anchors.
//!
//! The face is laid out in fractions of the surface size, so one layout
//! serves the 240x240 round panel, the 320x320 square panel and anything the
//! simulator throws at it. [`FaceLayout::for_surface`] is called once per
//! surface change; the renderer only reads the cached points.
//!
//! ```text
//!            ┌──────────────────────┐
//!            │      [▮] 87%         │  h / 6   battery
//!            │       10:42          │  h / 3   time
//!            │                      │
//!            │   [cal] Mon - Mar 04 │  0.65 h  date row
//!            │   [stp] 4711         │  0.75 h  steps row
//!            │     ☎ 64%   21°      │  0.85 h  companion row
//!            └──────────────────────┘
//! ```

use embedded_graphics::geometry::{Point, Size};

use crate::geometry::DisplayShape;

/// Battery gauge height in pixels.
pub const BATTERY_ICON_HEIGHT: u32 = 12;

/// Battery gauge width as a fraction of its height.
const BATTERY_ICON_ASPECT: f32 = 0.55;

/// Gap between the battery gauge and the centered percentage text.
const BATTERY_ICON_GAP: i32 = 18;

/// Pre-computed anchors for every face element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceLayout {
    /// Surface size the layout was computed for.
    pub size: Size,
    /// Baseline center of the `hh:mm` text.
    pub time: Point,
    /// Baseline center of the watch battery percentage.
    pub battery_text: Point,
    /// Top-left of the battery gauge outline.
    pub battery_icon: Point,
    /// Size of the battery gauge outline.
    pub battery_icon_size: Size,
    /// Top-left of the calendar icon.
    pub calendar_icon: Point,
    /// Baseline start of the date text.
    pub date_text: Point,
    /// Top-left of the steps icon.
    pub steps_icon: Point,
    /// Baseline start of the step count text.
    pub steps_text: Point,
    /// Baseline center of the companion battery / temperature row.
    pub companion_text: Point,
}

impl FaceLayout {
    /// Compute the layout for a surface.
    ///
    /// Round faces indent the icon column further (a quarter of the width)
    /// so the rows clear the curved edge; rectangular faces use a sixth.
    pub fn for_surface(
        size: Size,
        shape: DisplayShape,
    ) -> Self {
        let w = size.width as f32;
        let h = size.height as f32;
        let center_x = (size.width / 2) as i32;

        let column_x = match shape {
            DisplayShape::Round => w / 4.0,
            DisplayShape::Rectangular => w / 6.0,
        };
        let text_x = column_x + w * 0.1;

        let battery_y = (h / 6.0) as i32;
        let icon_w = (BATTERY_ICON_HEIGHT as f32 * BATTERY_ICON_ASPECT) as u32;

        let date_row = h * 0.65;
        let steps_row = h * 0.75;

        Self {
            size,
            time: Point::new(center_x, (h / 3.0) as i32),
            battery_text: Point::new(center_x, battery_y),
            battery_icon: Point::new(
                center_x - BATTERY_ICON_GAP - icon_w as i32,
                battery_y - BATTERY_ICON_HEIGHT as i32,
            ),
            battery_icon_size: Size::new(icon_w, BATTERY_ICON_HEIGHT),
            calendar_icon: Point::new(column_x as i32, date_row as i32),
            date_text: Point::new(text_x as i32, (date_row + h * 0.05) as i32),
            steps_icon: Point::new(column_x as i32, steps_row as i32),
            steps_text: Point::new(text_x as i32, (steps_row + h * 0.05) as i32),
            companion_text: Point::new(center_x, (h * 0.85) as i32),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
