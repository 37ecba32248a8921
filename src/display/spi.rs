//! SPI communication wrapper for the OLED.
//!
//! Provides the SPI interface for sending commands and frame data.
//! Uses SPI0 with CE0 (Chip Enable 0) in mode 0.

use super::gpio::GpioController;
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
use thiserror::Error;

/// SPI configuration
pub mod config {
    /// Default SPI clock speed in Hz (8 MHz)
    pub const CLOCK_SPEED: u32 = 8_000_000;

    /// Largest single transfer
    pub const CHUNK_SIZE: usize = 4096;
}

/// SPI-related errors
#[derive(Error, Debug)]
pub enum SpiError {
    #[error("SPI initialization failed: {0}")]
    InitError(#[from] rppal::spi::Error),

    #[error("SPI write failed: {0}")]
    WriteError(String),
}

/// SPI display interface
pub struct SpiDisplay {
    spi: Spi,
}

impl SpiDisplay {
    /// Initialize SPI for display communication
    ///
    /// Uses SPI0, CE0, Mode 0 (CPOL=0, CPHA=0) at the given clock
    pub fn new(clock_hz: u32) -> Result<Self, SpiError> {
        let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, clock_hz, Mode::Mode0)?;

        tracing::debug!(
            "SPI initialized: Bus=SPI0, SS=CE0, Speed={}Hz, Mode=0",
            clock_hz
        );

        Ok(Self { spi })
    }

    /// Send command bytes to the display
    ///
    /// Sets DC pin LOW before sending (command mode). Command arguments are
    /// sent in command mode as well.
    pub fn write_commands(&mut self, gpio: &mut GpioController, cmds: &[u8]) -> Result<(), SpiError> {
        gpio.dc_low();
        self.write(cmds)
    }

    /// Send multiple data bytes to the display
    ///
    /// Sets DC pin HIGH before sending (data mode)
    pub fn write_data_bulk(
        &mut self,
        gpio: &mut GpioController,
        data: &[u8],
    ) -> Result<(), SpiError> {
        gpio.dc_high();

        for chunk in data.chunks(config::CHUNK_SIZE) {
            self.write(chunk)?;
        }

        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), SpiError> {
        self.spi
            .write(bytes)
            .map_err(|e| SpiError::WriteError(e.to_string()))?;
        Ok(())
    }
}
