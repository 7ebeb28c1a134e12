//! Display mode flags and the paint parameters derived from them.
//!
//! Two fixed tables cover the visual modes: [`INTERACTIVE_PALETTE`] (full
//! color, anti-aliased, shadowed) and [`AMBIENT_PALETTE`] (gray, aliased,
//! flat). Muting is an alpha overlay applied on top of either table, so the
//! four combinations are derived rather than stored.
//!
//! Re-deriving is cheap and pure: [`StyleState::from_mode`] always produces the
//! same paints for the same flags.

use embedded_graphics::pixelcolor::{IntoStorage, Rgb565};

use crate::colors::{AMBER, BLACK, CYAN, GRAY, TRACK, WHITE};
use crate::config::{MUTED_ALPHA_PRIMARY, MUTED_ALPHA_SECONDARY, RING_STROKE_WIDTH};

// =============================================================================
// Display Mode
// =============================================================================

/// Mode flags pushed by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayMode {
    pub ambient: bool,
    /// Interruption filter active (do-not-disturb).
    pub muted: bool,
    /// Panel drops to 1-bit color in ambient.
    pub low_bit_ambient: bool,
    /// Panel needs burn-in protection in ambient.
    pub burn_in_protection: bool,
}

impl DisplayMode {
    pub const fn new() -> Self {
        Self {
            ambient: false,
            muted: false,
            low_bit_ambient: false,
            burn_in_protection: false,
        }
    }

    /// Whether ambient needs grayscale bitmap variants.
    #[inline]
    pub const fn needs_desaturated_assets(&self) -> bool {
        self.low_bit_ambient || self.burn_in_protection
    }
}

// =============================================================================
// Elements
// =============================================================================

/// Every painted element of the face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Element {
    ElapsedRing,
    RemainingRing,
    Time,
    Date,
    Steps,
    BatteryText,
    BatteryOutline,
    BatteryFill,
    CompanionBattery,
    Temperature,
}

impl Element {
    pub const COUNT: usize = 10;

    pub const ALL: [Self; Self::COUNT] = [
        Self::ElapsedRing,
        Self::RemainingRing,
        Self::Time,
        Self::Date,
        Self::Steps,
        Self::BatteryText,
        Self::BatteryOutline,
        Self::BatteryFill,
        Self::CompanionBattery,
        Self::Temperature,
    ];

    #[inline]
    const fn index(self) -> usize {
        self as usize
    }

    /// Secondary elements are dimmed harder when muted.
    pub const fn is_secondary(self) -> bool {
        matches!(self, Self::ElapsedRing | Self::Date | Self::Steps)
    }
}

// =============================================================================
// Paint
// =============================================================================

/// Resolved paint parameters for one element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Paint {
    pub color: Rgb565,
    pub anti_alias: bool,
    /// Draw a one-pixel offset copy in [`crate::colors::SHADOW`] first.
    pub shadow: bool,
    /// 255 = opaque.
    pub alpha: u8,
    pub stroke_width: u32,
}

impl Paint {
    const fn solid(
        color: Rgb565,
        stroke_width: u32,
    ) -> Self {
        Self {
            color,
            anti_alias: true,
            shadow: true,
            alpha: u8::MAX,
            stroke_width,
        }
    }

    const fn flat(stroke_width: u32) -> Self {
        Self {
            color: GRAY,
            anti_alias: false,
            shadow: false,
            alpha: u8::MAX,
            stroke_width,
        }
    }

    /// Color after alpha, composited over the black background.
    pub fn resolved_color(&self) -> Rgb565 {
        if self.alpha == u8::MAX {
            self.color
        } else {
            blend_over_black(self.color, self.alpha)
        }
    }
}

/// Scale every channel by `alpha / 255` in fixed point.
fn blend_over_black(
    color: Rgb565,
    alpha: u8,
) -> Rgb565 {
    if alpha == 0 {
        return BLACK;
    }
    let raw = color.into_storage();
    let a = u32::from(alpha);

    let r = (u32::from((raw >> 11) & 0x1F) * a + 127) / 255;
    let g = (u32::from((raw >> 5) & 0x3F) * a + 127) / 255;
    let b = (u32::from(raw & 0x1F) * a + 127) / 255;

    Rgb565::new(r as u8, g as u8, b as u8)
}

// =============================================================================
// Palettes
// =============================================================================

const OUTLINE_STROKE_WIDTH: u32 = 1;

/// Interactive paints, indexed by [`Element`].
pub const INTERACTIVE_PALETTE: [Paint; Element::COUNT] = [
    Paint::solid(AMBER, RING_STROKE_WIDTH),    // ElapsedRing
    Paint::solid(TRACK, RING_STROKE_WIDTH),    // RemainingRing
    Paint::solid(WHITE, 0),                    // Time
    Paint::solid(WHITE, 0),                    // Date
    Paint::solid(WHITE, 0),                    // Steps
    Paint::solid(WHITE, 0),                    // BatteryText
    Paint::solid(WHITE, OUTLINE_STROKE_WIDTH), // BatteryOutline
    Paint::solid(AMBER, 0),                    // BatteryFill
    Paint::solid(CYAN, 0),                     // CompanionBattery
    Paint::solid(CYAN, 0),                     // Temperature
];

/// Ambient paints: gray, aliased, no shadow.
pub const AMBIENT_PALETTE: [Paint; Element::COUNT] = [
    Paint::flat(RING_STROKE_WIDTH),
    Paint::flat(RING_STROKE_WIDTH),
    Paint::flat(0),
    Paint::flat(0),
    Paint::flat(0),
    Paint::flat(0),
    Paint::flat(OUTLINE_STROKE_WIDTH),
    Paint::flat(0),
    Paint::flat(0),
    Paint::flat(0),
];

// =============================================================================
// Style State
// =============================================================================

/// Current mode and the paints derived from it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyleState {
    mode: DisplayMode,
    paints: [Paint; Element::COUNT],
}

impl StyleState {
    pub fn from_mode(mode: DisplayMode) -> Self {
        let mut paints = if mode.ambient { AMBIENT_PALETTE } else { INTERACTIVE_PALETTE };

        if mode.muted {
            for element in Element::ALL {
                paints[element.index()].alpha = if element.is_secondary() {
                    MUTED_ALPHA_SECONDARY
                } else {
                    MUTED_ALPHA_PRIMARY
                };
            }
        }

        Self { mode, paints }
    }

    #[inline]
    pub const fn mode(&self) -> DisplayMode {
        self.mode
    }

    #[inline]
    pub const fn paint(
        &self,
        element: Element,
    ) -> Paint {
        self.paints[element.index()]
    }

    /// Re-derive for a new mode. Returns `false` if nothing changed.
    pub fn set_mode(
        &mut self,
        mode: DisplayMode,
    ) -> bool {
        if mode == self.mode {
            return false;
        }
        *self = Self::from_mode(mode);
        true
    }
}

impl Default for StyleState {
    fn default() -> Self {
        Self::from_mode(DisplayMode::new())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambient_is_gray_aliased_flat() {
        let style = StyleState::from_mode(DisplayMode { ambient: true, ..DisplayMode::new() });
        for element in Element::ALL {
            let paint = style.paint(element);
            assert_eq!(paint.color, GRAY, "{element:?} should be gray");
            assert!(!paint.anti_alias, "{element:?} should be aliased");
            assert!(!paint.shadow, "{element:?} should have no shadow");
            assert_eq!(paint.resolved_color(), GRAY);
        }
    }

    #[test]
    fn test_interactive_is_colored_and_shadowed() {
        let style = StyleState::default();
        assert_eq!(style.paint(Element::ElapsedRing).color, AMBER);
        assert_eq!(style.paint(Element::RemainingRing).color, TRACK);
        for element in Element::ALL {
            let paint = style.paint(element);
            assert!(paint.anti_alias);
            assert!(paint.shadow, "{element:?} should be shadowed");
            assert_eq!(paint.alpha, u8::MAX);
        }
    }

    #[test]
    fn test_palette_order_matches_elements() {
        assert_eq!(Element::ALL.len(), Element::COUNT);
        for (i, element) in Element::ALL.iter().enumerate() {
            assert_eq!(element.index(), i);
        }
        assert_eq!(INTERACTIVE_PALETTE[Element::BatteryOutline.index()].stroke_width, 1);
        assert_eq!(INTERACTIVE_PALETTE[Element::ElapsedRing.index()].stroke_width, RING_STROKE_WIDTH);
    }

    #[test]
    fn test_mute_applies_alpha_in_both_modes() {
        for ambient in [false, true] {
            let style = StyleState::from_mode(DisplayMode {
                ambient,
                muted: true,
                ..DisplayMode::new()
            });
            assert_eq!(style.paint(Element::Time).alpha, MUTED_ALPHA_PRIMARY);
            assert_eq!(style.paint(Element::Date).alpha, MUTED_ALPHA_SECONDARY);
            assert_eq!(style.paint(Element::ElapsedRing).alpha, MUTED_ALPHA_SECONDARY);
            assert_eq!(style.paint(Element::BatteryFill).alpha, MUTED_ALPHA_PRIMARY);
        }
    }

    #[test]
    fn test_resolved_color_dims_toward_black() {
        let paint = Paint { alpha: 128, ..Paint::solid(WHITE, 0) };
        let dimmed = paint.resolved_color();
        assert_eq!(dimmed, Rgb565::new(16, 32, 16));

        let gone = Paint { alpha: 0, ..Paint::solid(WHITE, 0) };
        assert_eq!(gone.resolved_color(), BLACK);

        let opaque = Paint::solid(AMBER, 0);
        assert_eq!(opaque.resolved_color(), AMBER);
    }

    #[test]
    fn test_set_mode_reports_change() {
        let mut style = StyleState::default();
        assert!(!style.set_mode(DisplayMode::new()));
        assert!(style.set_mode(DisplayMode { muted: true, ..DisplayMode::new() }));
        assert_eq!(style.paint(Element::Time).alpha, MUTED_ALPHA_PRIMARY);
    }

    #[test]
    fn test_needs_desaturated_assets() {
        assert!(!DisplayMode::new().needs_desaturated_assets());
        assert!(DisplayMode { low_bit_ambient: true, ..DisplayMode::new() }.needs_desaturated_assets());
        assert!(DisplayMode { burn_in_protection: true, ..DisplayMode::new() }.needs_desaturated_assets());
    }
}
