//! Software rasteriser for eye draw commands.
//!
//! Shapes are painted in command order onto a grayscale canvas and clipped to
//! its bounds. Polygons are filled by scanline, sampling at pixel centres.

use super::{Orientation, RenderError, BACKGROUND, FOREGROUND};
use crate::eyes::{Color, DrawCommand, Point};
use image::{GrayImage, Luma};
use std::path::Path;

/// Owns the canvas frames are drawn into
pub struct Rasterizer {
    canvas: GrayImage,
}

impl Rasterizer {
    /// Create a rasteriser with a blank canvas
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: GrayImage::new(width, height),
        }
    }

    /// Clear the canvas and paint all commands in order
    pub fn draw(&mut self, commands: &[DrawCommand]) -> &GrayImage {
        self.clear();
        for command in commands {
            match command {
                DrawCommand::FilledRoundedRect {
                    x,
                    y,
                    width,
                    height,
                    radius,
                    color,
                } => self.fill_rounded_rect(*x, *y, *width, *height, *radius, *color),
                DrawCommand::FilledPolygon { points, color } => self.fill_polygon(points, *color),
            }
        }
        &self.canvas
    }

    /// Apply the panel mounting transform to the current frame
    pub fn orient(&mut self, orientation: Orientation) {
        orientation.apply(&mut self.canvas);
    }

    pub fn canvas(&self) -> &GrayImage {
        &self.canvas
    }

    pub fn clear(&mut self) {
        for pixel in self.canvas.pixels_mut() {
            *pixel = Luma([BACKGROUND]);
        }
    }

    /// Write the current frame as PNG
    pub fn save_snapshot<P: AsRef<Path>>(&self, path: P) -> Result<(), RenderError> {
        self.canvas.save(path.as_ref())?;
        tracing::debug!("Snapshot written to {}", path.as_ref().display());
        Ok(())
    }

    /// Number of lit pixels in the current frame
    #[cfg(test)]
    pub fn lit_pixels(&self) -> usize {
        self.canvas.pixels().filter(|p| p.0[0] >= 128).count()
    }

    fn put(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        if x < self.canvas.width() && y < self.canvas.height() {
            self.canvas.put_pixel(x, y, Luma([luma(color)]));
        }
    }

    /// Fill a rectangle with quarter-circle corners
    ///
    /// The radius is clamped to half the shorter side.
    fn fill_rounded_rect(&mut self, x: i32, y: i32, width: i32, height: i32, radius: i32, color: Color) {
        if width <= 0 || height <= 0 {
            return;
        }

        let r = radius.clamp(0, width.min(height) / 2);
        let (cw, ch) = (self.canvas.width() as i32, self.canvas.height() as i32);

        // Corner circle centres
        let left = x + r;
        let right = x + width - 1 - r;
        let top = y + r;
        let bottom = y + height - 1 - r;

        for py in y.max(0)..(y + height).min(ch) {
            let dy = (top - py).max(py - bottom).max(0);
            for px in x.max(0)..(x + width).min(cw) {
                let dx = (left - px).max(px - right).max(0);
                if dx * dx + dy * dy <= r * r {
                    self.put(px, py, color);
                }
            }
        }
    }

    fn fill_polygon(&mut self, points: &[Point], color: Color) {
        if points.len() < 3 {
            return;
        }

        let ch = self.canvas.height() as i32;
        let min_y = points.iter().map(|p| p.y).min().unwrap_or(0).max(0);
        let max_y = points.iter().map(|p| p.y).max().unwrap_or(0).min(ch);

        let mut crossings: Vec<f32> = Vec::with_capacity(points.len());
        for py in min_y..max_y {
            let yc = py as f32 + 0.5;
            crossings.clear();

            for (i, a) in points.iter().enumerate() {
                let b = points[(i + 1) % points.len()];
                let (y0, y1) = (a.y as f32, b.y as f32);
                if (y0 <= yc && yc < y1) || (y1 <= yc && yc < y0) {
                    let t = (yc - y0) / (y1 - y0);
                    crossings.push(a.x as f32 + t * (b.x - a.x) as f32);
                }
            }

            crossings.sort_by(|a, b| a.total_cmp(b));
            for span in crossings.chunks_exact(2) {
                // Pixels whose centre lies inside the span
                let start = (span[0] - 0.5).ceil() as i32;
                let end = (span[1] - 0.5).floor() as i32;
                for px in start..=end {
                    self.put(px, py, color);
                }
            }
        }
    }
}

fn luma(color: Color) -> u8 {
    match color {
        Color::Foreground => FOREGROUND,
        Color::Background => BACKGROUND,
    }
}
