use crate::capture::CaptureError;
use crate::encoder::EncodeError;
use crate::platform::ResolutionError;
use crate::processor::ProcessError;
use crate::settings::ConfigError;
use std::io;
use thiserror::Error;

/// Every way a recording session can end in `Aborted`.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error("frame {index} is malformed: {actual} bytes, expected {expected}")]
    MalformedFrame {
        index: usize,
        expected: usize,
        actual: usize,
    },
    #[error("frame channel closed after {frames} frame(s)")]
    ChannelClosed { frames: usize },
    #[error("failed to spawn {0} thread: {1}")]
    Spawn(&'static str, #[source] io::Error),
    #[error("{0} thread panicked")]
    WorkerPanicked(&'static str),
}

impl From<ProcessError> for RecordError {
    fn from(value: ProcessError) -> Self {
        match value {
            ProcessError::Encode(err) => RecordError::Encode(err),
            ProcessError::ChannelClosed { frames } => RecordError::ChannelClosed { frames },
            ProcessError::MalformedFrame {
                index,
                expected,
                actual,
            } => RecordError::MalformedFrame {
                index,
                expected,
                actual,
            },
        }
    }
}
