//! Video frame types and processing

use image::{imageops, GrayImage, RgbImage};

/// Decoded RGB video frame
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// RGB pixel data (width * height * 3)
    pub data: Vec<u8>,
    /// Frame width
    pub width: u32,
    /// Frame height
    pub height: u32,
    /// Capture timestamp (nanoseconds since the source was opened)
    pub timestamp_ns: u64,
    /// Frame sequence number
    pub sequence: u32,
}

impl VideoFrame {
    /// Create a new video frame from raw RGB data
    pub fn new(data: Vec<u8>, width: u32, height: u32, timestamp_ns: u64, sequence: u32) -> Self {
        Self {
            data,
            width,
            height,
            timestamp_ns,
            sequence,
        }
    }

    /// Create a frame from a decoded RGB image
    pub fn from_rgb_image(img: RgbImage, timestamp_ns: u64, sequence: u32) -> Self {
        let (width, height) = img.dimensions();
        Self::new(img.into_raw(), width, height, timestamp_ns, sequence)
    }

    /// Solid-color frame, mostly useful for tests and warmup
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let data = rgb
            .iter()
            .copied()
            .cycle()
            .take((width * height * 3) as usize)
            .collect();
        Self::new(data, width, height, 0, 0)
    }

    /// Whether the buffer length matches the declared dimensions
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0 && self.data.len() == (self.width * self.height * 3) as usize
    }

    /// Get pixel at (x, y)
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 3) as usize;
        self.data
            .get(idx..idx + 3)
            .map(|p| [p[0], p[1], p[2]])
    }

    /// Grayscale image for the landmark detector
    pub fn to_gray_image(&self) -> Option<GrayImage> {
        self.to_rgb_image().map(|rgb| imageops::grayscale(&rgb))
    }

    /// RGB image view of the frame (copies the buffer)
    pub fn to_rgb_image(&self) -> Option<RgbImage> {
        if !self.is_valid() {
            return None;
        }
        RgbImage::from_raw(self.width, self.height, self.data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    #[test]
    fn test_grayscale_luminance() {
        let white = VideoFrame::filled(2, 2, [255, 255, 255]).to_gray_image().unwrap();
        assert_eq!(white.dimensions(), (2, 2));
        assert!(white.pixels().all(|p| p.0[0] == 255));

        // green dominates luminance
        let green = VideoFrame::filled(1, 1, [0, 255, 0]).to_gray_image().unwrap();
        let blue = VideoFrame::filled(1, 1, [0, 0, 255]).to_gray_image().unwrap();
        assert!(green.get_pixel(0, 0).0[0] > blue.get_pixel(0, 0).0[0]);
    }

    #[test]
    fn test_invalid_buffer_has_no_images() {
        let frame = VideoFrame::new(vec![0; 5], 2, 2, 0, 0);
        assert!(!frame.is_valid());
        assert!(frame.to_gray_image().is_none());
        assert!(frame.to_rgb_image().is_none());
        assert!(frame.get_pixel(1, 1).is_none());
    }

    #[test]
    fn test_oversized_buffer_is_invalid() {
        let frame = VideoFrame::new(vec![0; 13], 2, 2, 0, 0);
        assert!(frame.to_rgb_image().is_none());
    }

    #[test]
    fn test_get_pixel_out_of_bounds() {
        let frame = VideoFrame::filled(3, 3, [1, 2, 3]);
        assert_eq!(frame.get_pixel(2, 2), Some([1, 2, 3]));
        assert_eq!(frame.get_pixel(3, 0), None);
    }

    proptest! {
        #[test]
        fn prop_filled_frame_yields_matching_images(
            width in 1u32..64,
            height in 1u32..64,
            rgb in any::<[u8; 3]>(),
        ) {
            let frame = VideoFrame::filled(width, height, rgb);
            prop_assert!(frame.is_valid());

            let gray = frame.to_gray_image().unwrap();
            prop_assert_eq!(gray.dimensions(), (width, height));
            let luma = gray.get_pixel(0, 0).0[0];
            prop_assert!(gray.pixels().all(|p| p.0[0] == luma));

            let rgb_img = frame.to_rgb_image().unwrap();
            prop_assert_eq!(rgb_img.get_pixel(width - 1, height - 1).0, rgb);
        }
    }
}
