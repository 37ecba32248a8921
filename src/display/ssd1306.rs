//! SSD1306 / SH1106 monochrome OLED driver over 4-wire SPI.
//!
//! Both controllers use the same page layout: 8 pages of 8 rows, one byte per
//! column per page, LSB at the top. The SSD1306 takes the whole frame in one
//! write using horizontal addressing. The SH1106 only supports page
//! addressing and has a 132 column RAM with the visible area shifted by 2.

use super::gpio::{GpioController, GpioError};
use super::spi::{SpiDisplay, SpiError};
use super::FrameSink;
use crate::config::{Controller, DisplayConfig};
use crate::render::buffer_size;
use thiserror::Error;

/// Controller commands
#[allow(dead_code)]
mod cmd {
    pub const SET_CONTRAST: u8 = 0x81;
    pub const DISPLAY_ALL_ON_RESUME: u8 = 0xA4;
    pub const NORMAL_DISPLAY: u8 = 0xA6;
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    pub const SET_DISPLAY_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_MULTIPLEX: u8 = 0xA8;
    pub const SET_LOW_COLUMN: u8 = 0x00;
    pub const SET_HIGH_COLUMN: u8 = 0x10;
    pub const SET_START_LINE: u8 = 0x40;
    pub const MEMORY_MODE: u8 = 0x20;
    pub const COLUMN_ADDR: u8 = 0x21;
    pub const PAGE_ADDR: u8 = 0x22;
    pub const SET_PAGE: u8 = 0xB0;
    pub const COM_SCAN_DEC: u8 = 0xC8;
    pub const SEG_REMAP: u8 = 0xA1;
    pub const CHARGE_PUMP: u8 = 0x8D;
    pub const DCDC_CONTROL: u8 = 0xAD;
    pub const DEACTIVATE_SCROLL: u8 = 0x2E;
}

/// SH1106 visible columns start at RAM column 2
const SH1106_COLUMN_OFFSET: u8 = 2;

/// Display driver errors
#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("GPIO error: {0}")]
    Gpio(#[from] GpioError),

    #[error("SPI error: {0}")]
    Spi(#[from] SpiError),

    #[error("Display not initialized")]
    NotInitialized,

    #[error("Invalid buffer size: expected {expected}, got {actual}")]
    InvalidBufferSize { expected: usize, actual: usize },
}

/// Power-up command sequence for a panel
pub fn init_sequence(controller: Controller, width: u32, height: u32, contrast: u8) -> Vec<u8> {
    let multiplex = (height.clamp(8, 64) - 1) as u8;
    let com_pins = if height > 32 || width < 128 { 0x12 } else { 0x02 };

    let mut seq = vec![
        cmd::DISPLAY_OFF,
        cmd::SET_DISPLAY_CLOCK_DIV,
        0x80,
        cmd::SET_MULTIPLEX,
        multiplex,
        cmd::SET_DISPLAY_OFFSET,
        0x00,
        cmd::SET_START_LINE,
    ];

    match controller {
        Controller::Ssd1306 => seq.extend_from_slice(&[
            cmd::CHARGE_PUMP,
            0x14,
            cmd::MEMORY_MODE,
            0x00, // horizontal addressing
        ]),
        Controller::Sh1106 => seq.extend_from_slice(&[cmd::DCDC_CONTROL, 0x8B]),
    }

    seq.extend_from_slice(&[
        cmd::SEG_REMAP,
        cmd::COM_SCAN_DEC,
        cmd::SET_COM_PINS,
        com_pins,
        cmd::SET_CONTRAST,
        contrast,
        cmd::SET_PRECHARGE,
        0xF1,
        cmd::SET_VCOM_DETECT,
        0x40,
        cmd::DISPLAY_ALL_ON_RESUME,
        cmd::NORMAL_DISPLAY,
    ]);

    if controller == Controller::Ssd1306 {
        seq.push(cmd::DEACTIVATE_SCROLL);
    }

    seq.push(cmd::DISPLAY_ON);
    seq
}

/// Address window covering the whole SSD1306 panel
pub fn frame_window(width: u32, height: u32) -> [u8; 6] {
    let last_column = (width.clamp(1, 128) - 1) as u8;
    let last_page = (height.div_ceil(8).clamp(1, 8) - 1) as u8;
    [cmd::COLUMN_ADDR, 0, last_column, cmd::PAGE_ADDR, 0, last_page]
}

/// Page and column address of one SH1106 page
pub fn page_window(page: u8) -> [u8; 3] {
    let column = SH1106_COLUMN_OFFSET;
    [
        cmd::SET_PAGE | (page & 0x07),
        cmd::SET_LOW_COLUMN | (column & 0x0F),
        cmd::SET_HIGH_COLUMN | (column >> 4),
    ]
}

/// Checkerboard of 8x8 blocks in page layout
pub fn test_pattern(width: u32, height: u32) -> Vec<u8> {
    let pages = height.div_ceil(8);
    let mut buffer = vec![0u8; buffer_size(width, height)];
    for page in 0..pages {
        for x in 0..width {
            if (x / 8 + page) % 2 == 0 {
                buffer[(page * width + x) as usize] = 0xFF;
            }
        }
    }
    buffer
}

/// SSD1306/SH1106 display driver
pub struct Oled {
    gpio: GpioController,
    spi: SpiDisplay,
    controller: Controller,
    width: u32,
    height: u32,
    contrast: u8,
    initialized: bool,
}

impl Oled {
    /// Open the panel described by the configuration (does not initialize)
    pub fn new(config: &DisplayConfig) -> Result<Self, DisplayError> {
        let gpio = GpioController::new(config.dc_pin, config.rst_pin)?;
        let spi = SpiDisplay::new(config.spi_clock_hz)?;

        Ok(Self {
            gpio,
            spi,
            controller: config.controller,
            width: config.width,
            height: config.height,
            contrast: config.contrast,
            initialized: false,
        })
    }

    pub fn buffer_size(&self) -> usize {
        buffer_size(self.width, self.height)
    }

    /// Reset the controller and send the power-up sequence
    pub fn init(&mut self) -> Result<(), DisplayError> {
        tracing::info!(
            "Initializing {:?} display ({}x{})",
            self.controller,
            self.width,
            self.height
        );

        self.gpio.reset();
        let seq = init_sequence(self.controller, self.width, self.height, self.contrast);
        self.spi.write_commands(&mut self.gpio, &seq)?;

        self.initialized = true;
        tracing::info!("Display initialized successfully");

        Ok(())
    }

    /// Send a packed frame
    pub fn display(&mut self, buffer: &[u8]) -> Result<(), DisplayError> {
        if !self.initialized {
            return Err(DisplayError::NotInitialized);
        }

        let expected = self.buffer_size();
        if buffer.len() != expected {
            return Err(DisplayError::InvalidBufferSize {
                expected,
                actual: buffer.len(),
            });
        }

        match self.controller {
            Controller::Ssd1306 => {
                let window = frame_window(self.width, self.height);
                self.spi.write_commands(&mut self.gpio, &window)?;
                self.spi.write_data_bulk(&mut self.gpio, buffer)?;
            }
            Controller::Sh1106 => {
                for (page, row) in buffer.chunks(self.width as usize).enumerate() {
                    self.spi
                        .write_commands(&mut self.gpio, &page_window(page as u8))?;
                    self.spi.write_data_bulk(&mut self.gpio, row)?;
                }
            }
        }

        Ok(())
    }

    /// Blank the panel
    pub fn clear(&mut self) -> Result<(), DisplayError> {
        if !self.initialized {
            self.init()?;
        }

        tracing::debug!("Clearing display");
        let buffer = vec![0u8; self.buffer_size()];
        self.display(&buffer)
    }

    pub fn set_contrast(&mut self, contrast: u8) -> Result<(), DisplayError> {
        self.contrast = contrast;
        if self.initialized {
            self.spi
                .write_commands(&mut self.gpio, &[cmd::SET_CONTRAST, contrast])?;
        }
        Ok(())
    }

    /// Display a checkerboard covering the whole panel
    pub fn test_pattern(&mut self) -> Result<(), DisplayError> {
        if !self.initialized {
            self.init()?;
        }

        tracing::info!("Displaying test pattern");
        let buffer = test_pattern(self.width, self.height);
        self.display(&buffer)
    }

    /// Turn the panel off; RAM is kept
    pub fn sleep(&mut self) -> Result<(), DisplayError> {
        tracing::info!("Putting display to sleep");

        self.spi.write_commands(&mut self.gpio, &[cmd::DISPLAY_OFF])?;
        self.initialized = false;

        Ok(())
    }
}

impl FrameSink for Oled {
    fn present(&mut self, buffer: &[u8]) -> Result<(), DisplayError> {
        if !self.initialized {
            self.init()?;
        }
        self.display(buffer)
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        Oled::clear(self)
    }

    fn shutdown(&mut self) -> Result<(), DisplayError> {
        if self.initialized {
            self.sleep()?;
        }
        Ok(())
    }
}

impl Drop for Oled {
    fn drop(&mut self) {
        if self.initialized {
            let _ = self.sleep();
        }
    }
}
