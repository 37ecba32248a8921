//! GPIO controller for the OLED module.
//!
//! Manages the two control lines of a 4-wire SPI OLED:
//! - DC (Data/Command): GPIO 23 by default
//! - RST (Reset): GPIO 24 by default

use rppal::gpio::{Gpio, OutputPin};
use std::thread;
use std::time::Duration;
use thiserror::Error;

/// Default pin assignments (BCM numbering)
pub mod pins {
    pub const DC: u8 = 23; // Data/Command pin
    pub const RST: u8 = 24; // Reset pin
}

/// GPIO-related errors
#[derive(Error, Debug)]
pub enum GpioError {
    #[error("GPIO initialization failed: {0}")]
    InitError(#[from] rppal::gpio::Error),
}

/// GPIO controller for the OLED control lines
pub struct GpioController {
    dc: OutputPin,
    rst: OutputPin,
}

impl GpioController {
    /// Claim the DC and RST pins
    pub fn new(dc_pin: u8, rst_pin: u8) -> Result<Self, GpioError> {
        let gpio = Gpio::new()?;

        let mut dc = gpio.get(dc_pin)?.into_output();
        let mut rst = gpio.get(rst_pin)?.into_output();

        // Initialize pins to known state
        dc.set_low();
        rst.set_high();

        tracing::debug!("GPIO initialized: DC={}, RST={}", dc_pin, rst_pin);

        Ok(Self { dc, rst })
    }

    /// Perform hardware reset sequence
    ///
    /// The controller needs RST low for at least 3 us; the delays are generous.
    pub fn reset(&mut self) {
        tracing::debug!("Performing hardware reset");

        self.rst.set_high();
        thread::sleep(Duration::from_millis(1));

        self.rst.set_low();
        thread::sleep(Duration::from_millis(10));

        self.rst.set_high();
        thread::sleep(Duration::from_millis(10));
    }

    /// Set DC pin low (command mode)
    #[inline]
    pub fn dc_low(&mut self) {
        self.dc.set_low();
    }

    /// Set DC pin high (data mode)
    #[inline]
    pub fn dc_high(&mut self) {
        self.dc.set_high();
    }
}
