use std::time::SystemTime;

/// One captured sample of the recorded region.
///
/// Frames are moved from the capturer through the channel into the processor
/// and are never shared, so the type is deliberately not `Clone`.
#[derive(Debug)]
pub struct Frame {
    pub captured_at: SystemTime,
    pub width: u32,
    pub height: u32,
    pub pixel_format: PixelFormat,
    pub pixels: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Rgba8888,
    Bgra8888,
}

impl PixelFormat {
    pub const BYTES_PER_PIXEL: usize = 4;
}

impl Frame {
    pub fn new(width: u32, height: u32, pixel_format: PixelFormat, pixels: Vec<u8>) -> Self {
        Self {
            captured_at: SystemTime::now(),
            width,
            height,
            pixel_format,
            pixels,
        }
    }

    /// Byte length a buffer of these dimensions must have.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * PixelFormat::BYTES_PER_PIXEL
    }

    /// Swap the red and blue channels in place if the frame is BGRA.
    pub fn normalize_to_rgba(&mut self) {
        if let PixelFormat::Bgra8888 = self.pixel_format {
            for chunk in self.pixels.chunks_mut(PixelFormat::BYTES_PER_PIXEL) {
                chunk.swap(0, 2);
            }
            self.pixel_format = PixelFormat::Rgba8888;
        }
    }
}
