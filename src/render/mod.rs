//! Frame rendering.
//!
//! Turns the animator's draw commands into a monochrome frame, applies the
//! panel mounting transform and packs it for the OLED controller.

pub mod pack;
pub mod raster;
pub mod transform;

pub use pack::{buffer_size, pack_pages};
pub use raster::Rasterizer;
pub use transform::Orientation;

use thiserror::Error;

/// Rendering errors
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to write snapshot: {0}")]
    Snapshot(#[from] image::ImageError),
}

/// Luma of lit pixels
pub const FOREGROUND: u8 = 255;
/// Luma of dark pixels
pub const BACKGROUND: u8 = 0;
