//! Async ST7789 driver for a 240x240 panel on embassy-rp.
//!
//! Split in two like the bus and the canvas are:
//! - [`St7789Flusher`]: owns SPI and the control pins, pushes a whole frame via DMA
//! - [`St7789Renderer`]: `DrawTarget` over a RGB565 big-endian framebuffer
//!
//! The watch face redraws at most once a second, so a single framebuffer is
//! enough: render, then flush, then wait for the next event.

use embassy_rp::gpio::Output;
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{Async, Spi};
use embassy_time::Timer;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

/// Panel dimensions, native orientation.
pub const WIDTH: usize = 240;
pub const HEIGHT: usize = 240;

/// Framebuffer size in bytes (115,200).
pub const BUFFER_SIZE: usize = WIDTH * HEIGHT * 2;

// ST7789 Commands
const SWRESET: u8 = 0x01;
const SLPOUT: u8 = 0x11;
const NORON: u8 = 0x13;
const INVON: u8 = 0x21;
const DISPON: u8 = 0x29;
const CASET: u8 = 0x2A;
const RASET: u8 = 0x2B;
const RAMWR: u8 = 0x2C;
const MADCTL: u8 = 0x36;
const COLMOD: u8 = 0x3A;

/// Top-left, row-major, RGB order.
const MADCTL_DEFAULT: u8 = 0x00;

/// 16 bits per pixel for both the RGB and control interfaces.
const COLMOD_RGB565: u8 = 0x55;

/// Owns the SPI bus and pushes finished frames to the panel.
pub struct St7789Flusher<'d> {
    spi: Spi<'d, SPI0, Async>,
    dc: Output<'d>,
    cs: Output<'d>,
}

impl<'d> St7789Flusher<'d> {
    pub fn new(
        spi: Spi<'d, SPI0, Async>,
        dc: Output<'d>,
        cs: Output<'d>,
    ) -> Self {
        Self { spi, dc, cs }
    }

    /// Reset and configure the panel, then leave the window at full screen.
    pub async fn init(&mut self) {
        self.write_command(SWRESET).await;
        Timer::after_millis(150).await;

        self.write_command(SLPOUT).await;
        Timer::after_millis(10).await;

        self.write_command(COLMOD).await;
        self.write_data(&[COLMOD_RGB565]).await;

        self.write_command(MADCTL).await;
        self.write_data(&[MADCTL_DEFAULT]).await;

        // IPS panels need inversion on
        self.write_command(INVON).await;
        Timer::after_millis(10).await;

        self.write_command(NORON).await;
        Timer::after_millis(10).await;

        self.write_command(DISPON).await;
        Timer::after_millis(10).await;

        self.set_window(0, 0, WIDTH as u16, HEIGHT as u16).await;
    }

    async fn write_command(
        &mut self,
        cmd: u8,
    ) {
        self.cs.set_low();
        self.dc.set_low();
        self.spi.write(&[cmd]).await.ok();
        self.cs.set_high();
    }

    async fn write_data(
        &mut self,
        data: &[u8],
    ) {
        self.cs.set_low();
        self.dc.set_high();
        self.spi.write(data).await.ok();
        self.cs.set_high();
    }

    async fn set_window(
        &mut self,
        x: u16,
        y: u16,
        w: u16,
        h: u16,
    ) {
        let x1 = x + w - 1;
        let y1 = y + h - 1;

        self.write_command(CASET).await;
        self.write_data(&[(x >> 8) as u8, x as u8, (x1 >> 8) as u8, x1 as u8])
            .await;

        self.write_command(RASET).await;
        self.write_data(&[(y >> 8) as u8, y as u8, (y1 >> 8) as u8, y1 as u8])
            .await;
    }

    /// Send a full frame. The window was fixed during [`Self::init`].
    pub async fn flush_buffer(
        &mut self,
        buffer: &[u8],
    ) {
        self.cs.set_low();
        self.dc.set_low();
        self.spi.blocking_write(&[RAMWR]).ok();
        self.dc.set_high();
        self.spi.write(buffer).await.ok();
        self.cs.set_high();
    }
}

/// Draw target over the framebuffer. Touches no hardware.
pub struct St7789Renderer<'a> {
    framebuffer: &'a mut [u8],
}

impl<'a> St7789Renderer<'a> {
    pub fn new(framebuffer: &'a mut [u8]) -> Self { Self { framebuffer } }

    /// Finished frame, ready for [`St7789Flusher::flush_buffer`].
    #[inline]
    pub fn buffer(&self) -> &[u8] { self.framebuffer }

    #[inline]
    fn write_pixel(
        &mut self,
        idx: usize,
        color: Rgb565,
    ) {
        let bytes = RawU16::from(color).into_inner().to_be_bytes();
        self.framebuffer[idx] = bytes[0];
        self.framebuffer[idx + 1] = bytes[1];
    }

    #[inline]
    const fn offset(
        x: i32,
        y: i32,
    ) -> usize {
        (y as usize * WIDTH + x as usize) * 2
    }
}

impl OriginDimensions for St7789Renderer<'_> {
    fn size(&self) -> Size { Size::new(WIDTH as u32, HEIGHT as u32) }
}

impl DrawTarget for St7789Renderer<'_> {
    type Color = Rgb565;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(
        &mut self,
        pixels: I,
    ) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if (0..WIDTH as i32).contains(&point.x) && (0..HEIGHT as i32).contains(&point.y) {
                self.write_pixel(Self::offset(point.x, point.y), color);
            }
        }
        Ok(())
    }

    fn fill_contiguous<I>(
        &mut self,
        area: &Rectangle,
        colors: I,
    ) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        // Colors arrive for the whole area, clipped or not.
        let bounds = self.bounding_box();
        for (point, color) in area.points().zip(colors) {
            if bounds.contains(point) {
                self.write_pixel(Self::offset(point.x, point.y), color);
            }
        }
        Ok(())
    }

    fn fill_solid(
        &mut self,
        area: &Rectangle,
        color: Self::Color,
    ) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        if area.size == Size::zero() {
            return Ok(());
        }

        let bytes = RawU16::from(color).into_inner().to_be_bytes();
        let width = area.size.width as usize;
        for y in area.rows() {
            let start = Self::offset(area.top_left.x, y);
            for px in self.framebuffer[start..start + width * 2].chunks_exact_mut(2) {
                px.copy_from_slice(&bytes);
            }
        }
        Ok(())
    }

    fn clear(
        &mut self,
        color: Self::Color,
    ) -> Result<(), Self::Error> {
        let bytes = RawU16::from(color).into_inner().to_be_bytes();
        for px in self.framebuffer.chunks_exact_mut(2) {
            px.copy_from_slice(&bytes);
        }
        Ok(())
    }
}
