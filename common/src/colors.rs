//! Color constants for the watch face.
//!
//! All colors are RGB565 (5 bits red, 6 bits green, 5 bits blue), the native
//! format of the round GC9A01 and square ST7789 panels. Standard colors come
//! from the `RgbColor` trait constants; the palette colors are hand-converted
//! from their 8-bit design values (`r >> 3`, `g >> 2`, `b >> 3`).

use embedded_graphics::pixelcolor::{Rgb565, RgbColor};

// =============================================================================
// Standard Colors (from RgbColor trait)
// =============================================================================

/// Pure black. Background in every mode.
pub const BLACK: Rgb565 = Rgb565::BLACK;

/// Pure white. Time, date and step text in interactive mode.
pub const WHITE: Rgb565 = Rgb565::WHITE;

/// Pure red. Low battery fill.
pub const RED: Rgb565 = Rgb565::RED;

// =============================================================================
// Palette Colors
// =============================================================================

/// Amber progress ring and battery gauge, design value (255, 194, 46).
pub const AMBER: Rgb565 = Rgb565::new(31, 48, 5);

/// Unfilled ring track: 50% light gray over black, design value (112, 112, 112).
pub const TRACK: Rgb565 = Rgb565::new(14, 28, 14);

/// Ambient gray, design value (136, 136, 136). Every element uses it in ambient mode.
pub const GRAY: Rgb565 = Rgb565::new(17, 34, 17);

/// Soft cyan for companion (phone) data, design value (120, 200, 255).
pub const CYAN: Rgb565 = Rgb565::new(15, 50, 31);

/// Drop shadow under text, ring strokes and the battery outline, design value (32, 32, 32).
pub const SHADOW: Rgb565 = Rgb565::new(4, 8, 4);
