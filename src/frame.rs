use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::SystemTime;

/// Pixel layout of a raw camera frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameFormat {
    /// 8-bit RGB, 3 bytes per pixel
    Rgb24,
    /// 8-bit RGBA, 4 bytes per pixel
    Rgba32,
}

impl FrameFormat {
    /// Get bytes per pixel for the format
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            FrameFormat::Rgb24 => 3,
            FrameFormat::Rgba32 => 4,
        }
    }
}

/// Frame data structure containing raw frame data and metadata
#[derive(Debug, Clone)]
pub struct FrameData {
    /// Frame identifier, increasing per stream
    pub id: u64,
    /// Timestamp when frame was produced
    pub timestamp: SystemTime,
    /// Raw pixel data (shared ownership)
    pub data: Arc<Vec<u8>>,
    /// Natural frame width in pixels
    pub width: u32,
    /// Natural frame height in pixels
    pub height: u32,
    /// Pixel layout
    pub format: FrameFormat,
}

impl FrameData {
    /// Create a new frame data instance
    pub fn new(
        id: u64,
        timestamp: SystemTime,
        data: Vec<u8>,
        width: u32,
        height: u32,
        format: FrameFormat,
    ) -> Self {
        Self {
            id,
            timestamp,
            data: Arc::new(data),
            width,
            height,
            format,
        }
    }

    /// Get the expected frame size in bytes
    pub fn expected_size(&self) -> usize {
        self.width as usize * self.height as usize * self.format.bytes_per_pixel()
    }

    /// Validate frame data size against expected size
    pub fn validate_size(&self) -> bool {
        self.data.len() == self.expected_size()
    }

    /// A frame can be rendered once the source reports real dimensions
    pub fn is_decodable(&self) -> bool {
        self.width > 0 && self.height > 0 && self.validate_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_size_validation() {
        let frame = FrameData::new(
            0,
            SystemTime::now(),
            vec![0u8; 4 * 3 * 2],
            4,
            2,
            FrameFormat::Rgb24,
        );
        assert_eq!(frame.expected_size(), 24);
        assert!(frame.validate_size());
        assert!(frame.is_decodable());

        let short = FrameData::new(1, SystemTime::now(), vec![0u8; 10], 4, 2, FrameFormat::Rgba32);
        assert!(!short.validate_size());
        assert!(!short.is_decodable());
    }

    #[test]
    fn test_zero_sized_frame_is_not_decodable() {
        let frame = FrameData::new(0, SystemTime::now(), Vec::new(), 0, 0, FrameFormat::Rgb24);
        assert!(frame.validate_size());
        assert!(!frame.is_decodable());
    }
}
