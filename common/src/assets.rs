//! Asset adaptation pipeline.
//!
//! Source bitmaps arrive already decoded as raw big-endian RGB565. The
//! pipeline scales them to the surface once per size change and, when the
//! panel needs it in ambient (low-bit or burn-in protection), produces
//! zero-saturation variants of the icons that stay visible there.
//!
//! Nothing here runs per frame. The renderer only picks a prepared variant
//! with [`AssetPipeline::bitmap_for`].

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::pixelcolor::{Rgb565, Rgb888, RgbColor};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::config::{AMBIENT_SATURATION, ICON_SCALE};

// =============================================================================
// Errors
// =============================================================================

/// Why an asset set could not be prepared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AssetError {
    /// Raw pixel data does not match the declared dimensions.
    Decode { expected: usize, actual: usize },
    /// Scaling would produce an empty bitmap.
    EmptyTarget,
    /// The source set has no bitmap for this name.
    MissingSource(AssetName),
}

impl fmt::Display for AssetError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Decode { expected, actual } => {
                write!(f, "bitmap data is {actual} bytes, expected {expected}")
            }
            Self::EmptyTarget => f.write_str("scaled bitmap would be empty"),
            Self::MissingSource(name) => write!(f, "no source bitmap for {name:?}"),
        }
    }
}

impl core::error::Error for AssetError {}

// =============================================================================
// Asset Names
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AssetName {
    Background,
    Calendar,
    Steps,
}

impl AssetName {
    pub const COUNT: usize = 3;

    pub const ALL: [Self; Self::COUNT] = [Self::Background, Self::Calendar, Self::Steps];

    #[inline]
    const fn index(self) -> usize {
        self as usize
    }

    /// Icons stay on screen in ambient; the background is replaced by black.
    pub const fn visible_in_ambient(self) -> bool {
        !matches!(self, Self::Background)
    }
}

// =============================================================================
// Bitmap
// =============================================================================

/// Owned RGB565 pixel buffer, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<Rgb565>,
}

impl Bitmap {
    /// Wrap a pixel buffer. Fails if the buffer length does not match.
    pub fn new(
        width: u32,
        height: u32,
        pixels: Vec<Rgb565>,
    ) -> Result<Self, AssetError> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(AssetError::Decode { expected, actual: pixels.len() });
        }
        Ok(Self { width, height, pixels })
    }

    /// Decode raw big-endian RGB565 bytes.
    pub fn from_be_bytes(
        width: u32,
        height: u32,
        bytes: &[u8],
    ) -> Result<Self, AssetError> {
        let expected = width as usize * height as usize * 2;
        if bytes.len() != expected {
            return Err(AssetError::Decode { expected, actual: bytes.len() });
        }
        let pixels = bytes
            .chunks_exact(2)
            .map(|px| Rgb565::from(RawU16::new(u16::from_be_bytes([px[0], px[1]]))))
            .collect();
        Ok(Self { width, height, pixels })
    }

    /// Single-color bitmap.
    pub fn filled(
        width: u32,
        height: u32,
        color: Rgb565,
    ) -> Self {
        let mut pixels = Vec::new();
        pixels.resize(width as usize * height as usize, color);
        Self { width, height, pixels }
    }

    #[inline]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    #[inline]
    pub fn pixels(&self) -> &[Rgb565] {
        &self.pixels
    }

    pub fn pixel(
        &self,
        x: u32,
        y: u32,
    ) -> Option<Rgb565> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }

    /// Nearest-neighbour resample to `width` x `height`.
    pub fn scaled(
        &self,
        width: u32,
        height: u32,
    ) -> Result<Self, AssetError> {
        if width == 0 || height == 0 || self.pixels.is_empty() {
            return Err(AssetError::EmptyTarget);
        }

        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            let src_y = (u64::from(y) * u64::from(self.height) / u64::from(height)) as u32;
            let row = (src_y * self.width) as usize;
            for x in 0..width {
                let src_x = (u64::from(x) * u64::from(self.width) / u64::from(width)) as usize;
                pixels.push(self.pixels[row + src_x]);
            }
        }
        Ok(Self { width, height, pixels })
    }

    /// Resample by a uniform factor, rounding the target size.
    pub fn scaled_by(
        &self,
        factor: f32,
    ) -> Result<Self, AssetError> {
        let w = libm::roundf(self.width as f32 * factor);
        let h = libm::roundf(self.height as f32 * factor);
        if !(w >= 1.0 && h >= 1.0) {
            return Err(AssetError::EmptyTarget);
        }
        self.scaled(w as u32, h as u32)
    }

    /// Apply a saturation color matrix. `0.0` gives luminance grayscale,
    /// `1.0` leaves colors unchanged.
    pub fn desaturated(
        &self,
        saturation: f32,
    ) -> Self {
        let pixels = self.pixels.iter().map(|&px| saturate(px, saturation)).collect();
        Self { width: self.width, height: self.height, pixels }
    }

    /// Blit at `top_left`.
    pub fn draw<D>(
        &self,
        target: &mut D,
        top_left: Point,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let area = Rectangle::new(top_left, self.size());
        target.fill_contiguous(&area, self.pixels.iter().copied())
    }
}

/// Luminance weights of the standard saturation matrix.
const LUMA_R: f32 = 0.213;
const LUMA_G: f32 = 0.715;
const LUMA_B: f32 = 0.072;

fn saturate(
    color: Rgb565,
    saturation: f32,
) -> Rgb565 {
    let c = Rgb888::from(color);
    let (r, g, b) = (f32::from(c.r()), f32::from(c.g()), f32::from(c.b()));

    let inv = 1.0 - saturation;
    let luma = (LUMA_R * r + LUMA_G * g + LUMA_B * b) * inv;

    let channel = |v: f32| libm::roundf((luma + v * saturation).clamp(0.0, 255.0)) as u8;
    Rgb565::from(Rgb888::new(channel(r), channel(g), channel(b)))
}

// =============================================================================
// Asset Sets
// =============================================================================

/// All prepared forms of one logical asset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetVariants {
    pub original: Rc<Bitmap>,
    pub scaled: Bitmap,
    /// Present when the panel needs grayscale assets in ambient.
    pub desaturated: Option<Bitmap>,
}

/// Decoded source bitmaps, keyed by [`AssetName`].
#[derive(Clone, Debug, Default)]
pub struct SourceAssets {
    bitmaps: [Option<Rc<Bitmap>>; AssetName::COUNT],
}

impl SourceAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(
        mut self,
        name: AssetName,
        bitmap: Bitmap,
    ) -> Self {
        self.bitmaps[name.index()] = Some(Rc::new(bitmap));
        self
    }

    pub fn get(
        &self,
        name: AssetName,
    ) -> Result<&Rc<Bitmap>, AssetError> {
        self.bitmaps[name.index()].as_ref().ok_or(AssetError::MissingSource(name))
    }
}

/// One complete, consistent generation of prepared assets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetSet {
    target: Size,
    variants: [AssetVariants; AssetName::COUNT],
}

impl AssetSet {
    #[inline]
    pub const fn target(&self) -> Size {
        self.target
    }

    #[inline]
    pub fn get(
        &self,
        name: AssetName,
    ) -> &AssetVariants {
        &self.variants[name.index()]
    }

    /// Whether every ambient-visible asset has a grayscale variant.
    pub fn has_desaturated(&self) -> bool {
        AssetName::ALL
            .iter()
            .filter(|n| n.visible_in_ambient())
            .all(|&n| self.get(n).desaturated.is_some())
    }

    fn fill_desaturated(&mut self) {
        for name in AssetName::ALL {
            let variants = &mut self.variants[name.index()];
            if name.visible_in_ambient() && variants.desaturated.is_none() {
                variants.desaturated = Some(variants.scaled.desaturated(AMBIENT_SATURATION));
            }
        }
    }
}

/// Scale every source asset to `target` and, if asked, desaturate the
/// ambient-visible ones.
///
/// The background is fit to the surface width; icons use [`ICON_SCALE`] of
/// that factor.
pub fn prepare_assets(
    source: &SourceAssets,
    target: Size,
    needs_desaturated: bool,
) -> Result<AssetSet, AssetError> {
    let background = source.get(AssetName::Background)?;
    if background.width() == 0 {
        return Err(AssetError::EmptyTarget);
    }
    let scale = target.width as f32 / background.width() as f32;

    let prepare = |name: AssetName| -> Result<AssetVariants, AssetError> {
        let original = Rc::clone(source.get(name)?);
        let factor = match name {
            AssetName::Background => scale,
            AssetName::Calendar | AssetName::Steps => scale * ICON_SCALE,
        };
        let scaled = original.scaled_by(factor)?;
        let desaturated = (needs_desaturated && name.visible_in_ambient())
            .then(|| scaled.desaturated(AMBIENT_SATURATION));
        Ok(AssetVariants { original, scaled, desaturated })
    };

    Ok(AssetSet {
        target,
        variants: [
            prepare(AssetName::Background)?,
            prepare(AssetName::Calendar)?,
            prepare(AssetName::Steps)?,
        ],
    })
}

// =============================================================================
// Pipeline
// =============================================================================

/// Owns the sources and the last successfully prepared set.
#[derive(Debug)]
pub struct AssetPipeline {
    source: SourceAssets,
    current: Option<AssetSet>,
}

impl AssetPipeline {
    pub fn new(source: SourceAssets) -> Self {
        Self { source, current: None }
    }

    /// Regenerate for a new surface size or capability set.
    ///
    /// On failure the previous set stays active and the error is returned.
    pub fn rebuild(
        &mut self,
        target: Size,
        needs_desaturated: bool,
    ) -> Result<(), AssetError> {
        let set = prepare_assets(&self.source, target, needs_desaturated)?;
        self.current = Some(set);
        Ok(())
    }

    /// Make sure grayscale icon variants exist before drawing ambient frames.
    /// Returns `true` if any were generated.
    pub fn ensure_desaturated(&mut self) -> bool {
        match self.current.as_mut() {
            Some(set) if !set.has_desaturated() => {
                set.fill_desaturated();
                true
            }
            _ => false,
        }
    }

    #[inline]
    pub fn current(&self) -> Option<&AssetSet> {
        self.current.as_ref()
    }

    /// Variant to draw for `name` in the given mode, if any.
    pub fn bitmap_for(
        &self,
        name: AssetName,
        ambient: bool,
    ) -> Option<&Bitmap> {
        let variants = self.current.as_ref()?.get(name);
        if !ambient {
            return Some(&variants.scaled);
        }
        if !name.visible_in_ambient() {
            return None;
        }
        Some(variants.desaturated.as_ref().unwrap_or(&variants.scaled))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::{AMBER, BLACK, CYAN, WHITE};

    fn sources() -> SourceAssets {
        SourceAssets::new()
            .with(AssetName::Background, Bitmap::filled(100, 100, CYAN))
            .with(AssetName::Calendar, Bitmap::filled(40, 40, AMBER))
            .with(AssetName::Steps, Bitmap::filled(40, 20, AMBER))
    }

    fn is_gray(color: Rgb565) -> bool {
        let c = Rgb888::from(color);
        c.r().abs_diff(c.g()) <= 8 && c.g().abs_diff(c.b()) <= 8
    }

    // -------------------------------------------------------------------------
    // Bitmap
    // -------------------------------------------------------------------------

    #[test]
    fn test_from_be_bytes() {
        let bytes = [0xF8, 0x00, 0x07, 0xE0];
        let bmp = Bitmap::from_be_bytes(2, 1, &bytes).unwrap();
        assert_eq!(bmp.pixel(0, 0), Some(Rgb565::RED));
        assert_eq!(bmp.pixel(1, 0), Some(Rgb565::GREEN));
        assert_eq!(bmp.pixel(2, 0), None);
    }

    #[test]
    fn test_from_be_bytes_length_mismatch() {
        let err = Bitmap::from_be_bytes(2, 2, &[0; 6]).unwrap_err();
        assert_eq!(err, AssetError::Decode { expected: 8, actual: 6 });
    }

    #[test]
    fn test_scaled_nearest_neighbour() {
        let bmp = Bitmap::new(2, 2, alloc::vec![BLACK, WHITE, WHITE, BLACK]).unwrap();
        let big = bmp.scaled(4, 4).unwrap();
        assert_eq!(big.size(), Size::new(4, 4));
        assert_eq!(big.pixel(0, 0), Some(BLACK));
        assert_eq!(big.pixel(1, 1), Some(BLACK));
        assert_eq!(big.pixel(2, 0), Some(WHITE));
        assert_eq!(big.pixel(3, 3), Some(BLACK));

        assert_eq!(bmp.scaled(0, 4), Err(AssetError::EmptyTarget));
        assert_eq!(bmp.scaled_by(0.1), Err(AssetError::EmptyTarget));
    }

    #[test]
    fn test_desaturated_is_gray() {
        let bmp = Bitmap::filled(3, 3, AMBER);
        let gray = bmp.desaturated(0.0);
        assert!(gray.pixels().iter().all(|&p| is_gray(p)));
        assert_ne!(gray.pixel(0, 0), Some(BLACK), "Luminance is kept");

        let same = bmp.desaturated(1.0);
        assert_eq!(same, bmp);
    }

    // -------------------------------------------------------------------------
    // Preparation
    // -------------------------------------------------------------------------

    #[test]
    fn test_prepare_scales_to_surface() {
        let set = prepare_assets(&sources(), Size::new(240, 240), false).unwrap();
        assert_eq!(set.get(AssetName::Background).scaled.size(), Size::new(240, 240));
        // 40 * 2.4 * 0.3 = 28.8
        assert_eq!(set.get(AssetName::Calendar).scaled.size(), Size::new(29, 29));
        assert_eq!(set.get(AssetName::Steps).scaled.size(), Size::new(29, 14));
        assert!(!set.has_desaturated());
    }

    #[test]
    fn test_prepare_desaturates_only_ambient_assets() {
        let set = prepare_assets(&sources(), Size::new(240, 240), true).unwrap();
        assert!(set.has_desaturated());
        assert!(set.get(AssetName::Background).desaturated.is_none());
        let icon = set.get(AssetName::Calendar).desaturated.as_ref().unwrap();
        assert!(icon.pixels().iter().all(|&p| is_gray(p)));
    }

    #[test]
    fn test_prepare_missing_source() {
        let source = SourceAssets::new().with(AssetName::Background, Bitmap::filled(10, 10, BLACK));
        let err = prepare_assets(&source, Size::new(240, 240), false).unwrap_err();
        assert_eq!(err, AssetError::MissingSource(AssetName::Calendar));
    }

    // -------------------------------------------------------------------------
    // Pipeline
    // -------------------------------------------------------------------------

    #[test]
    fn test_failed_rebuild_keeps_last_good_set() {
        let mut pipeline = AssetPipeline::new(sources());
        pipeline.rebuild(Size::new(240, 240), false).unwrap();
        let before = pipeline.current().cloned();

        assert_eq!(pipeline.rebuild(Size::new(0, 0), false), Err(AssetError::EmptyTarget));
        assert_eq!(pipeline.current().cloned(), before);
        assert_eq!(pipeline.current().unwrap().target(), Size::new(240, 240));
    }

    #[test]
    fn test_ensure_desaturated_once() {
        let mut pipeline = AssetPipeline::new(sources());
        assert!(!pipeline.ensure_desaturated(), "Nothing to do without a set");

        pipeline.rebuild(Size::new(120, 120), false).unwrap();
        assert!(pipeline.ensure_desaturated());
        assert!(!pipeline.ensure_desaturated());
        assert!(pipeline.current().unwrap().has_desaturated());
    }

    #[test]
    fn test_bitmap_for_mode() {
        let mut pipeline = AssetPipeline::new(sources());
        assert!(pipeline.bitmap_for(AssetName::Calendar, false).is_none());

        pipeline.rebuild(Size::new(240, 240), true).unwrap();
        let interactive = pipeline.bitmap_for(AssetName::Calendar, false).unwrap();
        assert_eq!(interactive.pixel(0, 0), Some(AMBER));

        let ambient = pipeline.bitmap_for(AssetName::Calendar, true).unwrap();
        assert!(is_gray(ambient.pixel(0, 0).unwrap()));

        assert!(pipeline.bitmap_for(AssetName::Background, true).is_none());
        assert!(pipeline.bitmap_for(AssetName::Background, false).is_some());
    }

    #[test]
    fn test_error_display() {
        let msg = alloc::format!("{}", AssetError::Decode { expected: 8, actual: 6 });
        assert_eq!(msg, "bitmap data is 6 bytes, expected 8");
        let msg = alloc::format!("{}", AssetError::MissingSource(AssetName::Steps));
        assert_eq!(msg, "no source bitmap for Steps");
    }
}
