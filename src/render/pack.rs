//! Packing of frames into the OLED page layout.
//!
//! SSD1306-family controllers store the panel as pages of 8 rows. Each byte
//! holds one column of a page with the least significant bit at the top.

use image::GrayImage;

/// Luma at or above this lights the pixel
const THRESHOLD: u8 = 128;

/// Buffer size for given dimensions (1 bit per pixel, rows rounded up to pages)
pub fn buffer_size(width: u32, height: u32) -> usize {
    width as usize * height.div_ceil(8) as usize
}

/// Pack a frame as `page * width + x` bytes, bit `y % 8`
pub fn pack_pages(img: &GrayImage) -> Vec<u8> {
    let (width, height) = img.dimensions();
    let mut buffer = vec![0u8; buffer_size(width, height)];

    for (x, y, pixel) in img.enumerate_pixels() {
        if pixel.0[0] >= THRESHOLD {
            let index = (y / 8) as usize * width as usize + x as usize;
            buffer[index] |= 1 << (y % 8);
        }
    }

    buffer
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_buffer_size() {
        assert_eq!(buffer_size(128, 64), 1024);
        assert_eq!(buffer_size(128, 32), 512);
        assert_eq!(buffer_size(10, 9), 20);
    }

    #[test]
    fn test_bit_order() {
        let mut img = GrayImage::new(128, 64);
        img.put_pixel(0, 0, Luma([255]));
        img.put_pixel(3, 10, Luma([255]));
        img.put_pixel(127, 63, Luma([200]));
        img.put_pixel(5, 5, Luma([100]));

        let buffer = pack_pages(&img);
        assert_eq!(buffer.len(), 1024);
        assert_eq!(buffer[0], 0b0000_0001);
        assert_eq!(buffer[128 + 3], 0b0000_0100);
        assert_eq!(buffer[7 * 128 + 127], 0b1000_0000);
        assert_eq!(buffer[5], 0);
        assert_eq!(buffer.iter().map(|b| b.count_ones()).sum::<u32>(), 3);
    }

    #[test]
    fn test_full_column() {
        let mut img = GrayImage::new(4, 16);
        for y in 0..16 {
            img.put_pixel(2, y, Luma([255]));
        }
        assert_eq!(pack_pages(&img), vec![0, 0, 0xFF, 0, 0, 0, 0xFF, 0]);
    }
}
