//! Capture abstractions for termrec.
//!
//! A [`FrameSource`] grabs pixels for a fixed [`Region`]; the [`Capturer`]
//! drives a source at the session frame rate on its own thread and forwards
//! every frame into the frame channel.

pub use capturer::{CaptureReport, Capturer};
pub use frame::{Frame, PixelFormat};
pub use pattern::TestPatternSource;
pub use region::Region;

mod capturer;
mod frame;
mod pattern;
mod region;

use crate::channel::ChannelClosed;
use thiserror::Error;

/// Screen-capture provider for a single region.
pub trait FrameSource: Send {
    fn capture(&mut self, region: &Region) -> Result<Frame, CaptureError>;
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn capture(&mut self, region: &Region) -> Result<Frame, CaptureError> {
        (**self).capture(region)
    }
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to capture region {region}: {reason}")]
    Failed { region: Region, reason: String },
    #[error("region {region} is not fully visible on any monitor")]
    OutOfBounds { region: Region },
    #[error("source returned a {width}x{height} frame for region {region}")]
    RegionMismatch {
        region: Region,
        width: u32,
        height: u32,
    },
    #[error("processor stopped receiving frames")]
    ChannelClosed(#[from] ChannelClosed),
}
