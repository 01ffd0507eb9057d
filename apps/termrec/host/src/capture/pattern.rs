use super::{CaptureError, Frame, FrameSource, PixelFormat, Region};

/// Synthetic source producing a diagonal gradient that shifts every frame.
///
/// Used when no screen backend is compiled in and by the pipeline tests.
#[derive(Debug, Default)]
pub struct TestPatternSource {
    tick: u32,
}

impl TestPatternSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameSource for TestPatternSource {
    fn capture(&mut self, region: &Region) -> Result<Frame, CaptureError> {
        if region.is_empty() {
            return Err(CaptureError::Failed {
                region: *region,
                reason: "empty region".into(),
            });
        }

        let offset = self.tick.wrapping_mul(7);
        let len = region.width as usize * region.height as usize * PixelFormat::BYTES_PER_PIXEL;
        let mut pixels = Vec::with_capacity(len);
        for y in 0..region.height {
            for x in 0..region.width {
                let r = (x.wrapping_add(offset) % 256) as u8;
                let g = (y.wrapping_add(offset) % 256) as u8;
                let b = ((x + y) / 2 % 256) as u8;
                pixels.extend_from_slice(&[r, g, b, 0xFF]);
            }
        }
        self.tick = self.tick.wrapping_add(1);

        Ok(Frame::new(
            region.width,
            region.height,
            PixelFormat::Rgba8888,
            pixels,
        ))
    }
}
