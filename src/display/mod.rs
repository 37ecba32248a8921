//! Display module for OLED panel control.
//!
//! This module provides the interface to SSD1306 / SH1106 monochrome OLEDs
//! connected via SPI, plus a headless sink for machines without a panel.

pub mod gpio;
pub mod spi;
pub mod ssd1306;

// Re-export main types
pub use ssd1306::{DisplayError, Oled};

use crate::config::DisplayConfig;
use crate::render::buffer_size;

/// Anything that can show a packed frame
pub trait FrameSink: Send {
    /// Show one packed frame
    fn present(&mut self, buffer: &[u8]) -> Result<(), DisplayError>;

    /// Blank the panel
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Release the panel; called once when the frame loop stops
    fn shutdown(&mut self) -> Result<(), DisplayError>;
}

impl<S: FrameSink + ?Sized> FrameSink for Box<S> {
    fn present(&mut self, buffer: &[u8]) -> Result<(), DisplayError> {
        (**self).present(buffer)
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        (**self).clear()
    }

    fn shutdown(&mut self) -> Result<(), DisplayError> {
        (**self).shutdown()
    }
}

/// Frame sink without hardware; keeps the last frame for inspection
#[derive(Debug, Default)]
pub struct HeadlessSink {
    expected_len: Option<usize>,
    last_frame: Vec<u8>,
    frames: u64,
    clears: u64,
    shut_down: bool,
}

impl HeadlessSink {
    /// Reject frames that would not fit a panel of this size
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            expected_len: Some(buffer_size(width, height)),
            ..Self::default()
        }
    }
}

#[cfg(test)]
impl HeadlessSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_frame(&self) -> &[u8] {
        &self.last_frame
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn clears(&self) -> u64 {
        self.clears
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }
}

impl FrameSink for HeadlessSink {
    fn present(&mut self, buffer: &[u8]) -> Result<(), DisplayError> {
        if self.shut_down {
            return Err(DisplayError::NotInitialized);
        }
        if let Some(expected) = self.expected_len {
            if buffer.len() != expected {
                return Err(DisplayError::InvalidBufferSize {
                    expected,
                    actual: buffer.len(),
                });
            }
        }

        self.last_frame.clear();
        self.last_frame.extend_from_slice(buffer);
        self.frames += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.last_frame.iter_mut().for_each(|b| *b = 0);
        self.clears += 1;
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), DisplayError> {
        tracing::debug!(
            "Headless sink closed after {} frames, {} clears",
            self.frames,
            self.clears
        );
        self.shut_down = true;
        Ok(())
    }
}

/// Open the configured panel, or a headless sink
pub fn open_sink(config: &DisplayConfig, headless: bool) -> Result<Box<dyn FrameSink>, DisplayError> {
    if headless {
        tracing::info!("Running headless ({}x{})", config.width, config.height);
        return Ok(Box::new(HeadlessSink::with_size(config.width, config.height)));
    }

    let mut oled = Oled::new(config)?;
    oled.init()?;
    Ok(Box::new(oled))
}
