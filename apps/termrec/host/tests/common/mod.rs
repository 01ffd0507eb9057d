#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use termrec_host::capture::{CaptureError, Frame, FrameSource, Region, TestPatternSource};
use termrec_host::lifecycle::{ProgressSnapshot, SessionObserver, SessionState};
use termrec_host::signal::StopSignal;

pub fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("termrec-{tag}-{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

/// Facts read back from a written GIF.
#[derive(Debug)]
pub struct DecodedGif {
    pub width: u16,
    pub height: u16,
    pub frame_sizes: Vec<(u16, u16)>,
    pub delays: Vec<u16>,
    pub loops_forever: bool,
}

pub fn decode_gif(path: &Path) -> DecodedGif {
    let bytes = fs::read(path).expect("read gif");
    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::RGBA);
    let mut decoder = options.read_info(bytes.as_slice()).expect("gif header");
    let (width, height) = (decoder.width(), decoder.height());

    let mut frame_sizes = Vec::new();
    let mut delays = Vec::new();
    while let Some(frame) = decoder.read_next_frame().expect("gif frame") {
        frame_sizes.push((frame.width, frame.height));
        delays.push(frame.delay);
    }

    DecodedGif {
        width,
        height,
        frame_sizes,
        delays,
        loops_forever: has_infinite_loop(&bytes),
    }
}

/// NETSCAPE2.0 application extension with a loop count of zero.
fn has_infinite_loop(bytes: &[u8]) -> bool {
    const APP: &[u8] = b"NETSCAPE2.0";
    bytes
        .windows(APP.len())
        .position(|window| window == APP)
        .and_then(|at| bytes.get(at + APP.len()..at + APP.len() + 4))
        .is_some_and(|block| block == [0x03, 0x01, 0x00, 0x00])
}

/// Test pattern that raises the stop signal once it produced `limit` frames.
pub struct StopAfter {
    inner: TestPatternSource,
    limit: u64,
    taken: Arc<AtomicU64>,
    stop: StopSignal,
}

impl StopAfter {
    pub fn new(limit: u64, stop: StopSignal) -> Self {
        Self {
            inner: TestPatternSource::new(),
            limit,
            taken: Arc::new(AtomicU64::new(0)),
            stop,
        }
    }

    pub fn taken(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.taken)
    }
}

impl FrameSource for StopAfter {
    fn capture(&mut self, region: &Region) -> Result<Frame, CaptureError> {
        let frame = self.inner.capture(region)?;
        let taken = self.taken.fetch_add(1, Ordering::SeqCst) + 1;
        if taken >= self.limit {
            self.stop.trigger();
        }
        Ok(frame)
    }
}

/// Source that fails on the `fail_on`-th capture.
pub struct FailingSource {
    inner: TestPatternSource,
    fail_on: u64,
    taken: u64,
}

impl FailingSource {
    pub fn new(fail_on: u64) -> Self {
        Self {
            inner: TestPatternSource::new(),
            fail_on,
            taken: 0,
        }
    }
}

impl FrameSource for FailingSource {
    fn capture(&mut self, region: &Region) -> Result<Frame, CaptureError> {
        self.taken += 1;
        if self.taken == self.fail_on {
            return Err(CaptureError::Failed {
                region: *region,
                reason: "window closed".into(),
            });
        }
        self.inner.capture(region)
    }
}

#[derive(Debug, Default)]
pub struct RecordingObserver {
    pub states: Vec<SessionState>,
    pub countdown_ticks: usize,
    pub progress: Vec<ProgressSnapshot>,
}

impl SessionObserver for RecordingObserver {
    fn on_state(&mut self, state: SessionState) {
        self.states.push(state);
    }

    fn on_countdown(&mut self, _remaining: std::time::Duration) {
        self.countdown_ticks += 1;
    }

    fn on_progress(&mut self, snapshot: &ProgressSnapshot) {
        self.progress.push(*snapshot);
    }
}
