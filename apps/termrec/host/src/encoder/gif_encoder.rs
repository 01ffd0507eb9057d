use super::{EncodeError, VideoEncoder};
use gif::{Encoder, Frame as GifFrame, Repeat};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// GIF stores delays in hundredths of a second.
pub fn delay_hundredths(delay_ms: u32) -> u16 {
    let hundredths = (delay_ms + 5) / 10;
    hundredths.clamp(1, u32::from(u16::MAX)) as u16
}

pub struct GifVideoEncoder {
    encoder: Encoder<BufWriter<File>>,
    path: PathBuf,
    width: u16,
    height: u16,
    delay_hundredths: u16,
    speed: i32,
}

impl GifVideoEncoder {
    pub fn new<P: AsRef<Path>>(
        path: P,
        width: u32,
        height: u32,
        delay_ms: u32,
        speed: i32,
    ) -> Result<Self, EncodeError> {
        let path = path.as_ref().to_path_buf();
        let (Ok(gif_width), Ok(gif_height)) = (u16::try_from(width), u16::try_from(height)) else {
            return Err(EncodeError::UnsupportedSize { width, height });
        };
        if gif_width == 0 || gif_height == 0 {
            return Err(EncodeError::UnsupportedSize { width, height });
        }

        let file = File::create(&path).map_err(|source| EncodeError::Create {
            path: path.clone(),
            source,
        })?;
        let mut encoder = Encoder::new(BufWriter::new(file), gif_width, gif_height, &[])?;
        encoder.set_repeat(Repeat::Infinite)?;
        Ok(Self {
            encoder,
            path,
            width: gif_width,
            height: gif_height,
            delay_hundredths: delay_hundredths(delay_ms),
            speed: speed.clamp(1, 30),
        })
    }
}

impl VideoEncoder for GifVideoEncoder {
    fn write_frame(&mut self, rgba: &mut [u8]) -> Result<(), EncodeError> {
        let expected = usize::from(self.width) * usize::from(self.height) * 4;
        if rgba.len() != expected {
            return Err(EncodeError::FrameSize {
                expected,
                actual: rgba.len(),
            });
        }
        let mut gif_frame = GifFrame::from_rgba_speed(self.width, self.height, rgba, self.speed);
        gif_frame.delay = self.delay_hundredths;
        self.encoder.write_frame(&gif_frame)?;
        Ok(())
    }

    fn finish(self) -> Result<(), EncodeError> {
        let path = self.path;
        let writer = self
            .encoder
            .into_inner()
            .map_err(|err| EncodeError::Finalize {
                path: path.clone(),
                source: std::io::Error::other(err),
            })?;
        let file = writer.into_inner().map_err(|err| EncodeError::Finalize {
            path: path.clone(),
            source: err.into_error(),
        })?;
        file.sync_all()
            .map_err(|source| EncodeError::Finalize { path, source })
    }
}
