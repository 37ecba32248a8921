//! Robot eye animation.
//!
//! The [`EyeAnimator`] owns all per-eye geometry as tweened current/target
//! pairs, layers moods and timed animations on top, and turns each frame into
//! a list of [`DrawCommand`]s for the rasteriser.

pub mod animator;
pub mod command;
pub mod random;
pub mod shapes;
pub mod tween;

// Re-export main types
pub use animator::EyeAnimator;
pub use command::{EyeCommand, EyeSnapshot};
pub use random::RandomSource;
pub use shapes::{Color, DrawCommand, Point};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Animator errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EyesError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Eyelid expression; exactly one is active at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    #[default]
    #[serde(rename = "none", alias = "default", alias = "neutral")]
    Neutral,
    Tired,
    Angry,
    Happy,
}

impl Mood {
    /// All moods in demo cycle order
    pub fn all() -> &'static [Mood] {
        &[Mood::Neutral, Mood::Happy, Mood::Angry, Mood::Tired]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Mood::Neutral => "none",
            Mood::Tired => "tired",
            Mood::Angry => "angry",
            Mood::Happy => "happy",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mood {
    type Err = EyesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "default" | "neutral" => Ok(Mood::Neutral),
            "tired" => Ok(Mood::Tired),
            "angry" => Ok(Mood::Angry),
            "happy" => Ok(Mood::Happy),
            other => Err(EyesError::InvalidConfiguration(format!(
                "unknown mood '{}'",
                other
            ))),
        }
    }
}

/// Numeric mood codes: 0 default, 1 tired, 2 angry, 3 happy
impl TryFrom<u8> for Mood {
    type Error = EyesError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Mood::Neutral),
            1 => Ok(Mood::Tired),
            2 => Ok(Mood::Angry),
            3 => Ok(Mood::Happy),
            _ => Err(EyesError::InvalidConfiguration(format!(
                "mood code {} out of range 0-3",
                code
            ))),
        }
    }
}

/// Predefined gaze positions on a 3x3 grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    #[default]
    #[serde(alias = "default")]
    Center,
    #[serde(rename = "n")]
    North,
    #[serde(rename = "ne")]
    NorthEast,
    #[serde(rename = "e")]
    East,
    #[serde(rename = "se")]
    SouthEast,
    #[serde(rename = "s")]
    South,
    #[serde(rename = "sw")]
    SouthWest,
    #[serde(rename = "w")]
    West,
    #[serde(rename = "nw")]
    NorthWest,
}

impl Position {
    pub fn all() -> &'static [Position] {
        &[
            Position::NorthWest,
            Position::North,
            Position::NorthEast,
            Position::West,
            Position::Center,
            Position::East,
            Position::SouthWest,
            Position::South,
            Position::SouthEast,
        ]
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            Position::Center => "center",
            Position::North => "n",
            Position::NorthEast => "ne",
            Position::East => "e",
            Position::SouthEast => "se",
            Position::South => "s",
            Position::SouthWest => "sw",
            Position::West => "w",
            Position::NorthWest => "nw",
        }
    }

    /// Anchor on the travel range as (x, y) fractions in halves: 0, 1 or 2
    pub fn anchor(&self) -> (i32, i32) {
        match self {
            Position::Center => (1, 1),
            Position::North => (1, 0),
            Position::NorthEast => (2, 0),
            Position::East => (2, 1),
            Position::SouthEast => (2, 2),
            Position::South => (1, 2),
            Position::SouthWest => (0, 2),
            Position::West => (0, 1),
            Position::NorthWest => (0, 0),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for Position {
    type Err = EyesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect();

        match normalized.as_str() {
            "center" | "centre" | "default" | "c" => Ok(Position::Center),
            "n" | "north" => Ok(Position::North),
            "ne" | "northeast" => Ok(Position::NorthEast),
            "e" | "east" => Ok(Position::East),
            "se" | "southeast" => Ok(Position::SouthEast),
            "s" | "south" => Ok(Position::South),
            "sw" | "southwest" => Ok(Position::SouthWest),
            "w" | "west" => Ok(Position::West),
            "nw" | "northwest" => Ok(Position::NorthWest),
            _ => Err(EyesError::InvalidConfiguration(format!(
                "unknown position '{}'",
                s.trim()
            ))),
        }
    }
}

/// Numeric position codes: 0 center, 1 N clockwise to 8 NW
impl TryFrom<u8> for Position {
    type Error = EyesError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Position::Center),
            1 => Ok(Position::North),
            2 => Ok(Position::NorthEast),
            3 => Ok(Position::East),
            4 => Ok(Position::SouthEast),
            5 => Ok(Position::South),
            6 => Ok(Position::SouthWest),
            7 => Ok(Position::West),
            8 => Ok(Position::NorthWest),
            _ => Err(EyesError::InvalidConfiguration(format!(
                "position code {} out of range 0-8",
                code
            ))),
        }
    }
}
