//! SPI setup for the 240x240 ST7789 panel.

use embassy_rp::spi::Config as SpiConfig;

/// Panel SPI clock. The ST7789 is rated for 62.5 MHz.
pub const SPI_FREQUENCY_HZ: u32 = 62_500_000;

/// SPI configuration for the ST7789 display.
pub fn display_spi_config() -> SpiConfig {
    let mut config = SpiConfig::default();
    config.frequency = SPI_FREQUENCY_HZ;
    config
}
