//! Frame channel between the capturer and the processor.
//!
//! The channel is unbounded: a push never blocks, so capture pacing is never
//! held up by a slow consumer. The cost is that memory grows without limit
//! while the processor lags behind; there is no backpressure and frames are
//! never dropped. The backlog is exposed through [`BacklogProbe`] so the status
//! display can surface the lag.

use crate::capture::Frame;
use crossbeam_channel::{unbounded, Receiver, Sender};
use thiserror::Error;

/// Item carried by the frame channel.
#[derive(Debug)]
pub enum FrameMessage {
    Frame(Frame),
    EndOfStream,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("frame channel closed")]
pub struct ChannelClosed;

/// Producer half. Not `Clone`: there is exactly one producer per session and
/// [`FrameSender::finish`] consumes it, so `EndOfStream` can be sent only once.
#[derive(Debug)]
pub struct FrameSender {
    tx: Sender<FrameMessage>,
}

/// Consumer half, owned by the processor.
#[derive(Debug)]
pub struct FrameReceiver {
    rx: Receiver<FrameMessage>,
}

/// Read-only view of the queue length for observers.
#[derive(Debug, Clone)]
pub struct BacklogProbe {
    rx: Receiver<FrameMessage>,
}

pub fn frame_channel() -> (FrameSender, FrameReceiver) {
    let (tx, rx) = unbounded();
    (FrameSender { tx }, FrameReceiver { rx })
}

impl FrameSender {
    pub fn push(&self, frame: Frame) -> Result<(), ChannelClosed> {
        self.tx
            .send(FrameMessage::Frame(frame))
            .map_err(|_| ChannelClosed)
    }

    /// Send the end-of-stream marker and close the producer side.
    pub fn finish(self) -> Result<(), ChannelClosed> {
        self.tx
            .send(FrameMessage::EndOfStream)
            .map_err(|_| ChannelClosed)
    }
}

impl FrameReceiver {
    /// Block until the next item arrives.
    ///
    /// Returns [`ChannelClosed`] when the producer went away without sending
    /// `EndOfStream` (the capturer failed).
    pub fn pop(&self) -> Result<FrameMessage, ChannelClosed> {
        self.rx.recv().map_err(|_| ChannelClosed)
    }

    pub fn backlog(&self) -> usize {
        self.rx.len()
    }

    pub fn backlog_probe(&self) -> BacklogProbe {
        BacklogProbe {
            rx: self.rx.clone(),
        }
    }
}

impl BacklogProbe {
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
