//! Draw primitives emitted by the animator for the rasteriser.

use serde::Serialize;

/// Two-value palette of a monochrome panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Background,
    Foreground,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// One shape of a frame; later commands paint over earlier ones
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawCommand {
    /// Rectangle covering `x..x + width` by `y..y + height`
    FilledRoundedRect {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        radius: i32,
        color: Color,
    },
    FilledPolygon { points: Vec<Point>, color: Color },
}

impl DrawCommand {
    #[cfg(test)]
    pub fn color(&self) -> Color {
        match self {
            DrawCommand::FilledRoundedRect { color, .. } => *color,
            DrawCommand::FilledPolygon { color, .. } => *color,
        }
    }

    /// Background triangle used by the eyelid overlays
    pub(crate) fn eyelid(a: Point, b: Point, c: Point) -> Self {
        DrawCommand::FilledPolygon {
            points: vec![a, b, c],
            color: Color::Background,
        }
    }
}
