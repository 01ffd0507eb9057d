use crate::processor::FrameSequence;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

pub use gif_encoder::GifVideoEncoder;

mod gif_encoder;

pub trait VideoEncoder {
    fn write_frame(&mut self, rgba: &mut [u8]) -> Result<(), EncodeError>;
    fn finish(self) -> Result<(), EncodeError>;
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("{width}x{height} frames exceed the GIF limit of 65535 pixels per side")]
    UnsupportedSize { width: u32, height: u32 },
    #[error("frame has {actual} bytes, expected {expected}")]
    FrameSize { expected: usize, actual: usize },
    #[error("failed to create {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("gif encoding failed: {0}")]
    Gif(#[from] gif::EncodingError),
    #[error("failed to finalize {}: {source}", path.display())]
    Finalize {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeSummary {
    pub path: PathBuf,
    pub frames: usize,
    pub width: u32,
    pub height: u32,
    pub delay_ms: u32,
    pub bytes: u64,
}

/// Sibling file the encoder writes into before it is renamed over `path`.
pub fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "termrec.gif".to_string());
    path.with_file_name(format!(".{name}.partial"))
}

/// Write the whole sequence as one looping GIF.
///
/// The destination only ever appears once every frame has been written and
/// flushed; any failure removes the staging file, so a failed encode leaves
/// either no file or whatever was at `path` before.
pub fn encode_sequence(
    path: &Path,
    sequence: &mut FrameSequence,
    delay_ms: u32,
    speed: i32,
) -> Result<EncodeSummary, EncodeError> {
    let staging = staging_path(path);
    let frames = sequence.len();
    let (width, height) = (sequence.width(), sequence.height());

    let result = write_staged(&staging, sequence, delay_ms, speed).and_then(|()| {
        fs::rename(&staging, path).map_err(|source| EncodeError::Finalize {
            path: path.to_path_buf(),
            source,
        })
    });

    if let Err(err) = result {
        if staging.exists() {
            if let Err(cleanup) = fs::remove_file(&staging) {
                warn!(
                    encode.staging = %staging.display(),
                    error = %cleanup,
                    "failed to remove partial output"
                );
            }
        }
        return Err(err);
    }

    let bytes = fs::metadata(path).map(|meta| meta.len()).unwrap_or(0);
    debug!(
        encode.path = %path.display(),
        encode.frames = frames,
        encode.bytes = bytes,
        "animation written"
    );
    Ok(EncodeSummary {
        path: path.to_path_buf(),
        frames,
        width,
        height,
        delay_ms,
        bytes,
    })
}

fn write_staged(
    staging: &Path,
    sequence: &mut FrameSequence,
    delay_ms: u32,
    speed: i32,
) -> Result<(), EncodeError> {
    let mut encoder =
        GifVideoEncoder::new(staging, sequence.width(), sequence.height(), delay_ms, speed)?;
    for mut rgba in sequence.drain() {
        encoder.write_frame(&mut rgba)?;
    }
    encoder.finish()
}
