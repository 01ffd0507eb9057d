//! Frame processing and the final bulk encode.
//!
//! The processor drains the frame channel, scales every frame and keeps the
//! whole recording in memory. Only after `EndOfStream` does it write the GIF,
//! in a single pass. Memory use therefore grows with the recording length.

use crate::capture::Frame;
use crate::channel::{ChannelClosed, FrameMessage, FrameReceiver};
use crate::encoder::{self, EncodeError, EncodeSummary};
use crate::session::Session;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("frame {index} has {actual} bytes, expected {expected}")]
    MalformedFrame {
        index: usize,
        expected: usize,
        actual: usize,
    },
    #[error("frame channel closed after {frames} frame(s) without end-of-stream")]
    ChannelClosed { frames: usize },
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    Encoded(EncodeSummary),
    /// Recording ended before any frame arrived; nothing was written.
    EmptySequence,
}

/// `floor(dimension * (100 - reduce_percent) / 100)`.
pub fn reduce_dimension(dimension: u32, reduce_percent: u8) -> u32 {
    let keep = 100u64.saturating_sub(u64::from(reduce_percent));
    (u64::from(dimension) * keep / 100) as u32
}

pub fn reduced_size(width: u32, height: u32, reduce_percent: u8) -> (u32, u32) {
    (
        reduce_dimension(width, reduce_percent),
        reduce_dimension(height, reduce_percent),
    )
}

/// Ordered, already-scaled RGBA frames of one recording.
#[derive(Debug)]
pub struct FrameSequence {
    width: u32,
    height: u32,
    frames: Vec<Vec<u8>>,
}

impl FrameSequence {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frames: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn push(&mut self, rgba: Vec<u8>) {
        self.frames.push(rgba);
    }

    /// Hand out frames in arrival order, leaving the sequence empty.
    pub fn drain(&mut self) -> impl Iterator<Item = Vec<u8>> + '_ {
        self.frames.drain(..)
    }
}

/// Scale a frame to `target` with Lanczos3. A frame already at the target size
/// is passed through untouched.
pub fn scale_frame(
    mut frame: Frame,
    target: (u32, u32),
    index: usize,
) -> Result<Vec<u8>, ProcessError> {
    let expected = frame.expected_len();
    if frame.pixels.len() != expected {
        return Err(ProcessError::MalformedFrame {
            index,
            expected,
            actual: frame.pixels.len(),
        });
    }
    frame.normalize_to_rgba();

    if (frame.width, frame.height) == target {
        return Ok(frame.pixels);
    }

    let Some(buffer) = RgbaImage::from_raw(frame.width, frame.height, frame.pixels) else {
        return Err(ProcessError::MalformedFrame {
            index,
            expected,
            actual: 0,
        });
    };
    let resized = imageops::resize(&buffer, target.0, target.1, FilterType::Lanczos3);
    Ok(resized.into_raw())
}

pub struct Processor {
    output: PathBuf,
    target: (u32, u32),
    delay_ms: u32,
    encode_speed: i32,
}

impl Processor {
    pub fn new(session: &Session) -> Self {
        Self {
            output: session.output_path.clone(),
            target: session.output_size(),
            delay_ms: session.frame_delay_ms(),
            encode_speed: session.encode_speed,
        }
    }

    /// Consume the channel until `EndOfStream`, then encode once.
    pub fn run(self, frames: FrameReceiver) -> Result<ProcessOutcome, ProcessError> {
        let mut sequence = FrameSequence::new(self.target.0, self.target.1);

        loop {
            match frames.pop() {
                Ok(FrameMessage::Frame(frame)) => {
                    let index = sequence.len();
                    let scaled = scale_frame(frame, self.target, index)?;
                    sequence.push(scaled);
                    if sequence.len() % 100 == 0 {
                        debug!(
                            process.frames = sequence.len(),
                            process.backlog = frames.backlog(),
                            "frames processed"
                        );
                    }
                }
                Ok(FrameMessage::EndOfStream) => break,
                Err(ChannelClosed) => {
                    return Err(ProcessError::ChannelClosed {
                        frames: sequence.len(),
                    });
                }
            }
        }

        if sequence.is_empty() {
            info!(session.output = %self.output.display(), "no frames captured; skipping encode");
            return Ok(ProcessOutcome::EmptySequence);
        }

        info!(
            session.output = %self.output.display(),
            encode.frames = sequence.len(),
            encode.width = sequence.width(),
            encode.height = sequence.height(),
            "writing animation"
        );
        let summary = encoder::encode_sequence(
            &self.output,
            &mut sequence,
            self.delay_ms,
            self.encode_speed,
        )?;
        Ok(ProcessOutcome::Encoded(summary))
    }
}
