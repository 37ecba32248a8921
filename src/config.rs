//! Configuration management for the robot eyes service.
//!
//! Handles loading, saving, and validating configuration from JSON files.

use crate::display::{gpio::pins, spi};
use crate::eyes::{Mood, Position};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "/opt/robo-eyes/config.json";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// OLED controller chip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Controller {
    #[default]
    Ssd1306,
    Sh1106,
}

/// Panel wiring and mounting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Controller chip on the module
    #[serde(default)]
    pub controller: Controller,

    /// Display width in pixels
    #[serde(default = "default_display_width")]
    pub width: u32,

    /// Display height in pixels
    #[serde(default = "default_display_height")]
    pub height: u32,

    /// SPI clock in Hz
    #[serde(default = "default_spi_clock")]
    pub spi_clock_hz: u32,

    /// Data/command GPIO (BCM numbering)
    #[serde(default = "default_dc_pin")]
    pub dc_pin: u8,

    /// Reset GPIO (BCM numbering)
    #[serde(default = "default_rst_pin")]
    pub rst_pin: u8,

    /// Panel rotation in degrees (0 or 180)
    #[serde(default)]
    pub rotation: u16,

    /// Horizontal mirror
    #[serde(default)]
    pub mirror_h: bool,

    /// Vertical mirror
    #[serde(default)]
    pub mirror_v: bool,

    /// Contrast (0-255)
    #[serde(default = "default_contrast")]
    pub contrast: u8,
}

fn default_display_width() -> u32 {
    128
}

fn default_display_height() -> u32 {
    64
}

fn default_spi_clock() -> u32 {
    spi::config::CLOCK_SPEED
}

fn default_dc_pin() -> u8 {
    pins::DC
}

fn default_rst_pin() -> u8 {
    pins::RST
}

fn default_contrast() -> u8 {
    0xCF
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            controller: Controller::default(),
            width: default_display_width(),
            height: default_display_height(),
            spi_clock_hz: default_spi_clock(),
            dc_pin: default_dc_pin(),
            rst_pin: default_rst_pin(),
            rotation: 0,
            mirror_h: false,
            mirror_v: false,
            contrast: default_contrast(),
        }
    }
}

impl DisplayConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.width > 128 {
            return Err(ConfigError::ValidationError(
                "display width must be between 1 and 128".to_string(),
            ));
        }

        if self.height == 0 || self.height > 64 || self.height % 8 != 0 {
            return Err(ConfigError::ValidationError(
                "display height must be a multiple of 8 between 8 and 64".to_string(),
            ));
        }

        if !matches!(self.rotation, 0 | 180) {
            return Err(ConfigError::ValidationError(
                "rotation must be 0 or 180".to_string(),
            ));
        }

        if self.spi_clock_hz < 100_000 || self.spi_clock_hz > 32_000_000 {
            return Err(ConfigError::ValidationError(
                "spi_clock_hz must be between 100 kHz and 32 MHz".to_string(),
            ));
        }

        if self.dc_pin == self.rst_pin {
            return Err(ConfigError::ValidationError(
                "dc_pin and rst_pin must be different GPIOs".to_string(),
            ));
        }

        Ok(())
    }
}

/// A repeating animation with a randomised interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    #[serde(default)]
    pub enabled: bool,

    /// Base interval in whole seconds
    #[serde(default = "default_interval")]
    pub interval_s: u32,

    /// Up to this many extra seconds are added at random
    #[serde(default)]
    pub variation_s: u32,
}

fn default_interval() -> u32 {
    1
}

impl Recurrence {
    pub fn new(enabled: bool, interval_s: u32, variation_s: u32) -> Self {
        Self {
            enabled,
            interval_s,
            variation_s,
        }
    }

    pub fn validate(&self, name: &str) -> Result<(), ConfigError> {
        if self.interval_s > 3600 || self.variation_s > 3600 {
            return Err(ConfigError::ValidationError(format!(
                "{} interval and variation must be at most 3600 seconds",
                name
            )));
        }
        Ok(())
    }
}

/// Eye geometry and standing behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EyesConfig {
    #[serde(default = "default_eye_size")]
    pub width: i32,

    #[serde(default = "default_eye_size")]
    pub height: i32,

    #[serde(default = "default_border_radius")]
    pub border_radius: i32,

    /// Gap between the eyes, negative values overlap them
    #[serde(default = "default_space_between")]
    pub space_between: i32,

    /// Maximum frames per second
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,

    #[serde(default)]
    pub mood: Mood,

    #[serde(default)]
    pub position: Position,

    /// Enlarge the outer eye when looking to the side
    #[serde(default = "default_true")]
    pub curious: bool,

    /// Draw a single eye
    #[serde(default)]
    pub cyclops: bool,

    #[serde(default = "default_autoblink")]
    pub autoblink: Recurrence,

    #[serde(default = "default_idle")]
    pub idle: Recurrence,
}

fn default_eye_size() -> i32 {
    36
}

fn default_border_radius() -> i32 {
    8
}

fn default_space_between() -> i32 {
    10
}

fn default_frame_rate() -> u32 {
    50
}

fn default_true() -> bool {
    true
}

fn default_autoblink() -> Recurrence {
    Recurrence::new(true, 1, 4)
}

fn default_idle() -> Recurrence {
    Recurrence::new(true, 2, 3)
}

impl Default for EyesConfig {
    fn default() -> Self {
        Self {
            width: default_eye_size(),
            height: default_eye_size(),
            border_radius: default_border_radius(),
            space_between: default_space_between(),
            frame_rate: default_frame_rate(),
            mood: Mood::default(),
            position: Position::default(),
            curious: true,
            cyclops: false,
            autoblink: default_autoblink(),
            idle: default_idle(),
        }
    }
}

impl EyesConfig {
    /// Validate against the panel the eyes will be drawn on
    pub fn validate(&self, display: &DisplayConfig) -> Result<(), ConfigError> {
        if self.width < 1 || self.width as u32 > display.width {
            return Err(ConfigError::ValidationError(format!(
                "eye width must be between 1 and {}",
                display.width
            )));
        }

        if self.height < 2 || self.height as u32 > display.height {
            return Err(ConfigError::ValidationError(format!(
                "eye height must be between 2 and {}",
                display.height
            )));
        }

        if self.border_radius < 0 || self.border_radius > self.width.min(self.height) / 2 {
            return Err(ConfigError::ValidationError(
                "border_radius must be between 0 and half the shorter eye side".to_string(),
            ));
        }

        if self.space_between < -self.width || self.space_between > display.width as i32 {
            return Err(ConfigError::ValidationError(format!(
                "space_between must be between {} and {}",
                -self.width, display.width
            )));
        }

        if self.frame_rate < 1 || self.frame_rate > 100 {
            return Err(ConfigError::ValidationError(
                "frame_rate must be between 1 and 100".to_string(),
            ));
        }

        self.autoblink.validate("autoblink")?;
        self.idle.validate("idle")?;

        Ok(())
    }
}

/// Demo choreography layered on top of the standing behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviourConfig {
    /// Seconds between mood changes, 0 disables the cycle
    #[serde(default = "default_mood_cycle")]
    pub mood_cycle_secs: u32,

    /// Moods visited by the cycle, in order
    #[serde(default = "default_moods")]
    pub moods: Vec<Mood>,

    /// Per-frame probability of a confused shake
    #[serde(default = "default_chance")]
    pub confused_chance: f64,

    /// Per-frame probability of a laugh
    #[serde(default = "default_chance")]
    pub laugh_chance: f64,
}

fn default_mood_cycle() -> u32 {
    5
}

fn default_moods() -> Vec<Mood> {
    Mood::all().to_vec()
}

fn default_chance() -> f64 {
    0.01
}

impl Default for BehaviourConfig {
    fn default() -> Self {
        Self {
            mood_cycle_secs: default_mood_cycle(),
            moods: default_moods(),
            confused_chance: default_chance(),
            laugh_chance: default_chance(),
        }
    }
}

impl BehaviourConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.mood_cycle_secs > 0 && self.moods.is_empty() {
            return Err(ConfigError::ValidationError(
                "mood cycle needs at least one mood".to_string(),
            ));
        }

        for (name, chance) in [
            ("confused_chance", self.confused_chance),
            ("laugh_chance", self.laugh_chance),
        ] {
            if !(0.0..=1.0).contains(&chance) {
                return Err(ConfigError::ValidationError(format!(
                    "{} must be between 0 and 1",
                    name
                )));
            }
        }

        Ok(())
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub eyes: EyesConfig,

    #[serde(default)]
    pub behaviour: BehaviourConfig,

    /// Serve the control page
    #[serde(default = "default_true")]
    pub web_enabled: bool,

    /// Web server port
    #[serde(default = "default_web_port")]
    pub web_port: u16,

    /// Enable verbose logging
    #[serde(default)]
    pub verbose: bool,
}

fn default_web_port() -> u16 {
    8888
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file atomically
    ///
    /// Uses a write-to-temp-then-rename pattern so a power cut mid-write
    /// never leaves a truncated config behind.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;

        // Write to temporary file first
        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &content)?;

        // Atomic rename - either fully succeeds or fails, never partial
        std::fs::rename(&tmp_path, path).map_err(|e| {
            // Clean up temp file on rename failure
            let _ = std::fs::remove_file(&tmp_path);
            ConfigError::ReadError(e)
        })?;

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.display.validate()?;
        self.eyes.validate(&self.display)?;
        self.behaviour.validate()?;

        if self.web_port == 0 {
            return Err(ConfigError::ValidationError(
                "web_port must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
