use super::{CaptureError, FrameSource, Region};
use crate::channel::FrameSender;
use crate::settings::frame_interval;
use crate::signal::StopSignal;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

/// Fixed-cadence capture loop.
///
/// Pacing is best effort: when a capture takes longer than the frame interval
/// the next one starts immediately. Nothing is dropped and there is no
/// catch-up, so the effective frame rate degrades silently under load.
pub struct Capturer<S> {
    source: S,
    region: Region,
    interval: Duration,
    stop: StopSignal,
    captured: Arc<AtomicU64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureReport {
    pub frames: u64,
    pub elapsed: Duration,
    /// Iterations whose capture plus enqueue overran the interval.
    pub overruns: u64,
}

impl CaptureReport {
    pub fn effective_fps(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.frames as f64 / secs
        } else {
            0.0
        }
    }
}

impl<S: FrameSource> Capturer<S> {
    pub fn new(source: S, region: Region, fps: u32, stop: StopSignal) -> Self {
        Self {
            source,
            region,
            interval: frame_interval(fps),
            stop,
            captured: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Counter of frames pushed so far, for read-only progress reporting.
    pub fn frame_counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.captured)
    }

    /// Capture until the stop signal fires, then emit `EndOfStream`.
    ///
    /// On error the sender is dropped without the marker; the processor sees a
    /// closed channel and does not encode.
    pub fn run(mut self, frames: FrameSender) -> Result<CaptureReport, CaptureError> {
        let started = Instant::now();
        let mut count = 0u64;
        let mut overruns = 0u64;

        info!(
            capture.region = %self.region,
            capture.interval_ms = self.interval.as_millis() as u64,
            "capture loop started"
        );

        while !self.stop.is_triggered() {
            let tick = Instant::now();
            let frame = self.source.capture(&self.region)?;
            if frame.width != self.region.width || frame.height != self.region.height {
                return Err(CaptureError::RegionMismatch {
                    region: self.region,
                    width: frame.width,
                    height: frame.height,
                });
            }
            frames.push(frame)?;
            count += 1;
            self.captured.store(count, Ordering::Relaxed);

            let elapsed = tick.elapsed();
            match self.interval.checked_sub(elapsed) {
                Some(remaining) if !remaining.is_zero() => thread::sleep(remaining),
                _ => {
                    overruns += 1;
                    trace!(
                        capture.frame = count,
                        capture.elapsed_ms = elapsed.as_millis() as u64,
                        "capture overran frame interval"
                    );
                }
            }
        }

        frames.finish()?;
        let report = CaptureReport {
            frames: count,
            elapsed: started.elapsed(),
            overruns,
        };
        debug!(
            capture.frames = report.frames,
            capture.overruns = report.overruns,
            capture.effective_fps = report.effective_fps(),
            "capture loop finished"
        );
        Ok(report)
    }
}
