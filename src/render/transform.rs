//! Panel mounting transform.
//!
//! OLED modules are often mounted upside down or behind a mirror; the frame
//! is transformed after drawing so the animator always works in screen space.

use crate::config::DisplayConfig;
use image::{imageops, GrayImage};

/// Rotation and mirroring applied to each frame before packing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Orientation {
    pub rotate_180: bool,
    /// Mirror horizontally
    pub mirror_h: bool,
    /// Mirror vertically
    pub mirror_v: bool,
}

impl Orientation {
    pub fn is_identity(&self) -> bool {
        !self.rotate_180 && !self.mirror_h && !self.mirror_v
    }

    /// Rotate first, then mirror
    pub fn apply(&self, img: &mut GrayImage) {
        if self.rotate_180 {
            imageops::rotate180_in_place(img);
        }
        if self.mirror_h {
            imageops::flip_horizontal_in_place(img);
        }
        if self.mirror_v {
            imageops::flip_vertical_in_place(img);
        }
    }
}

impl From<&DisplayConfig> for Orientation {
    fn from(config: &DisplayConfig) -> Self {
        Self {
            rotate_180: config.rotation == 180,
            mirror_h: config.mirror_h,
            mirror_v: config.mirror_v,
        }
    }
}
