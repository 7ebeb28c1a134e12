//! Source artwork for the simulator, drawn with primitives.
//!
//! Each bitmap is rendered into an off-screen `SimulatorDisplay` and read
//! back pixel by pixel, so the asset pipeline sees ordinary full-color input.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, Ellipse, Line, PrimitiveStyle, Rectangle};
use embedded_graphics_simulator::SimulatorDisplay;
use watchface_common::assets::{AssetError, AssetName, Bitmap, SourceAssets};
use watchface_common::colors::{AMBER, BLACK, CYAN, WHITE};

/// Background artwork width; a 240 px wide surface draws it 1:1.
const BACKGROUND_SIZE: u32 = 240;

/// Icon artwork size before scaling.
const ICON_SIZE: u32 = 80;

/// Number of bands in the background glow.
const GLOW_BANDS: u32 = 12;

/// Build the full source set.
pub fn source_assets() -> Result<SourceAssets, AssetError> {
    Ok(SourceAssets::new()
        .with(AssetName::Background, background()?)
        .with(AssetName::Calendar, calendar_icon()?)
        .with(AssetName::Steps, steps_icon()?))
}

/// Dark radial glow, brightest in the middle.
fn background() -> Result<Bitmap, AssetError> {
    let mut canvas = SimulatorDisplay::<Rgb565>::new(Size::new(BACKGROUND_SIZE, BACKGROUND_SIZE));
    canvas.clear(BLACK).ok();

    let center = Point::new(BACKGROUND_SIZE as i32 / 2, BACKGROUND_SIZE as i32 / 2);
    for band in 0..GLOW_BANDS {
        let diameter = BACKGROUND_SIZE - band * (BACKGROUND_SIZE / GLOW_BANDS);
        let level = band as u8;
        let color = Rgb565::new(level / 3, level / 2, level / 2 + 2);
        Circle::with_center(center, diameter)
            .into_styled(PrimitiveStyle::with_fill(color))
            .draw(&mut canvas)
            .ok();
    }
    capture(&canvas)
}

/// Page with a colored header band and a grid of days.
fn calendar_icon() -> Result<Bitmap, AssetError> {
    let mut canvas = icon_canvas();
    let s = ICON_SIZE as i32;

    Rectangle::new(Point::new(8, 12), Size::new(ICON_SIZE - 16, ICON_SIZE - 20))
        .into_styled(PrimitiveStyle::with_stroke(WHITE, 6))
        .draw(&mut canvas)
        .ok();
    Rectangle::new(Point::new(8, 12), Size::new(ICON_SIZE - 16, 18))
        .into_styled(PrimitiveStyle::with_fill(AMBER))
        .draw(&mut canvas)
        .ok();
    for x in [24, s / 2, s - 24] {
        for y in [42, 58] {
            Rectangle::with_center(Point::new(x, y), Size::new(8, 8))
                .into_styled(PrimitiveStyle::with_fill(WHITE))
                .draw(&mut canvas)
                .ok();
        }
    }
    capture(&canvas)
}

/// Two footprints, one a step ahead of the other.
fn steps_icon() -> Result<Bitmap, AssetError> {
    let mut canvas = icon_canvas();

    let prints = [(Point::new(14, 30), CYAN), (Point::new(42, 10), AMBER)];
    for (origin, color) in prints {
        let fill = PrimitiveStyle::with_fill(color);
        Ellipse::new(origin, Size::new(22, 36)).into_styled(fill).draw(&mut canvas).ok();
        Ellipse::new(origin + Point::new(3, 40), Size::new(16, 14))
            .into_styled(fill)
            .draw(&mut canvas)
            .ok();
    }
    Line::new(Point::new(6, 74), Point::new(74, 74))
        .into_styled(PrimitiveStyle::with_stroke(WHITE, 3))
        .draw(&mut canvas)
        .ok();
    capture(&canvas)
}

fn icon_canvas() -> SimulatorDisplay<Rgb565> {
    let mut canvas = SimulatorDisplay::new(Size::new(ICON_SIZE, ICON_SIZE));
    canvas.clear(BLACK).ok();
    canvas
}

/// Read a canvas back into a row-major bitmap.
fn capture(canvas: &SimulatorDisplay<Rgb565>) -> Result<Bitmap, AssetError> {
    let size = canvas.size();
    let pixels = canvas.bounding_box().points().map(|p| canvas.get_pixel(p)).collect();
    Bitmap::new(size.width, size.height, pixels)
}
