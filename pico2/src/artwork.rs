//! Built-in artwork, generated at boot.
//!
//! There is no filesystem, so the sources are computed pixel by pixel. They
//! are drawn at half size and left to the asset pipeline to scale, which
//! keeps the originals small on the heap.

use alloc::vec::Vec;

use embedded_graphics::pixelcolor::Rgb565;
use watchface_common::assets::{AssetError, AssetName, Bitmap, SourceAssets};
use watchface_common::colors::{AMBER, BLACK, CYAN, WHITE};

/// Background source side; the 240 px panel shows it at 2x.
const BACKGROUND_SIZE: u32 = 120;

/// Icon source side.
const ICON_SIZE: u32 = 40;

pub fn source_assets() -> Result<SourceAssets, AssetError> {
    Ok(SourceAssets::new()
        .with(AssetName::Background, render(BACKGROUND_SIZE, glow)?)
        .with(AssetName::Calendar, render(ICON_SIZE, calendar)?)
        .with(AssetName::Steps, render(ICON_SIZE, footprints)?))
}

/// Evaluate `shade(x, y)` over a square.
fn render(
    size: u32,
    shade: fn(i32, i32) -> Rgb565,
) -> Result<Bitmap, AssetError> {
    let mut pixels = Vec::with_capacity((size * size) as usize);
    for y in 0..size as i32 {
        for x in 0..size as i32 {
            pixels.push(shade(x, y));
        }
    }
    Bitmap::new(size, size, pixels)
}

/// Dark blue glow, brightest in the middle.
fn glow(
    x: i32,
    y: i32,
) -> Rgb565 {
    let half = BACKGROUND_SIZE as i32 / 2;
    let (dx, dy) = (x - half, y - half);
    let r = libm::sqrtf((dx * dx + dy * dy) as f32) / half as f32;
    let level = ((1.0 - r.min(1.0)) * 12.0) as u8;
    Rgb565::new(level / 3, level / 2, level / 2 + 2)
}

fn calendar(
    x: i32,
    y: i32,
) -> Rgb565 {
    let inside = (4..36).contains(&x) && (6..36).contains(&y);
    let border = inside && !((7..33).contains(&x) && (9..33).contains(&y));
    let header = inside && y < 14;
    let day = (18..32).contains(&y) && [(10, 14), (18, 22), (26, 30)].iter().any(|r| (r.0..r.1).contains(&x));
    if header {
        AMBER
    } else if border || day {
        WHITE
    } else {
        BLACK
    }
}

fn footprints(
    x: i32,
    y: i32,
) -> Rgb565 {
    // (center x, center y, radius x, radius y)
    let in_ellipse = |cx: i32, cy: i32, rx: i32, ry: i32| {
        let (dx, dy) = (x - cx, y - cy);
        dx * dx * ry * ry + dy * dy * rx * rx <= rx * rx * ry * ry
    };
    if in_ellipse(12, 24, 5, 8) || in_ellipse(12, 35, 4, 3) {
        CYAN
    } else if in_ellipse(27, 12, 5, 8) || in_ellipse(27, 23, 4, 3) {
        AMBER
    } else {
        BLACK
    }
}
