mod common;

use common::{decode_gif, scratch_dir, FailingSource, RecordingObserver, StopAfter};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use termrec_host::capture::{
    CaptureError, Frame, FrameSource, PixelFormat, Region, TestPatternSource,
};
use termrec_host::encoder::{staging_path, EncodeError};
use termrec_host::lifecycle::{Recorder, SessionState};
use termrec_host::platform::{CaptureTarget, FixedRegion, ResolutionError, WindowLocator};
use termrec_host::processor::ProcessOutcome;
use termrec_host::settings::{ConfigError, RecordSettings};
use termrec_host::signal::StopSignal;
use termrec_host::RecordError;
use test_timeout::timeout;

use SessionState::*;

fn settings(output: PathBuf, fps: u32, reduce_percent: u8) -> RecordSettings {
    RecordSettings {
        output_file: output,
        fps,
        reduce_percent,
        countdown_seconds: 0,
        refresh_ms: 10,
        ..Default::default()
    }
}

fn locator() -> FixedRegion {
    FixedRegion::new(Region::new(0, 0, 50, 40), "synthetic")
}

struct MissingWindow;

impl WindowLocator for MissingWindow {
    fn resolve(&self) -> Result<CaptureTarget, ResolutionError> {
        Err(ResolutionError::NotFound("Terminal".into()))
    }
}

/// Source that records whether it was ever asked for a frame.
struct Untouched(Arc<AtomicBool>);

impl FrameSource for Untouched {
    fn capture(&mut self, region: &Region) -> Result<Frame, CaptureError> {
        self.0.store(true, Ordering::SeqCst);
        TestPatternSource::new().capture(region)
    }
}

/// Reports the region's size but hands over a single pixel of data.
struct Truncated;

impl FrameSource for Truncated {
    fn capture(&mut self, region: &Region) -> Result<Frame, CaptureError> {
        Ok(Frame::new(region.width, region.height, PixelFormat::Rgba8888, vec![0; 4]))
    }
}

struct Exploding;

impl FrameSource for Exploding {
    fn capture(&mut self, _region: &Region) -> Result<Frame, CaptureError> {
        panic!("capture backend crashed");
    }
}

#[timeout(60)]
fn recording_runs_to_done_and_writes_every_frame() {
    let dir = scratch_dir("session");
    let stop = StopSignal::new();
    let source = StopAfter::new(24, stop.clone());
    let recorder = Recorder::new(settings(dir.join("session"), 50, 20), locator(), source)
        .with_stop_signal(stop);
    let mut observer = RecordingObserver::default();

    let report = recorder.run(&mut observer).expect("session");

    assert_eq!(observer.states, vec![Idle, CountingDown, Recording, Flushing, Done]);
    assert_eq!(report.capture.frames, 24);
    let summary = match report.outcome {
        ProcessOutcome::Encoded(summary) => summary,
        other => panic!("expected gif, got {other:?}"),
    };
    assert_eq!(summary.frames, 24);
    assert_eq!(summary.path, dir.join("session.gif"));
    assert_eq!(report.session.output_size(), (40, 32));

    let gif = decode_gif(&summary.path);
    assert_eq!(gif.frame_sizes.len(), 24);
    assert_eq!(gif.delays, vec![2; 24]);
    assert!(gif.loops_forever);

    let last = observer.progress.last().expect("progress reported");
    assert_eq!(last.frames_captured, 24);
    assert_eq!(last.frames_queued, 0);
    assert!(!last.processor_alive);
}

#[timeout(20)]
fn cancelling_before_capture_yields_empty_sequence() {
    let dir = scratch_dir("cancelled");
    let output = dir.join("cancelled.gif");
    let stop = StopSignal::new();
    stop.trigger();
    let touched = Arc::new(AtomicBool::new(false));
    let mut config = settings(output.clone(), 12, 20);
    // Cancellation must also cut the countdown short.
    config.countdown_seconds = 30;
    let recorder = Recorder::new(config, locator(), Untouched(Arc::clone(&touched)))
        .with_stop_signal(stop);
    let mut observer = RecordingObserver::default();

    let report = recorder.run(&mut observer).expect("session");

    assert_eq!(report.outcome, ProcessOutcome::EmptySequence);
    assert_eq!(report.capture.frames, 0);
    assert!(!touched.load(Ordering::SeqCst));
    assert_eq!(observer.states.last(), Some(&Done));
    assert!(!output.exists());
    assert!(!staging_path(&output).exists());
}

#[timeout(30)]
fn unwritable_output_aborts_after_flushing() {
    let dir = scratch_dir("abort");
    let output = dir.join("no-such-dir").join("out.gif");
    let stop = StopSignal::new();
    let source = StopAfter::new(5, stop.clone());
    let recorder = Recorder::new(settings(output.clone(), 50, 20), locator(), source)
        .with_stop_signal(stop);
    let mut observer = RecordingObserver::default();

    let result = recorder.run(&mut observer);

    assert!(matches!(result, Err(RecordError::Encode(EncodeError::Create { .. }))));
    assert_eq!(observer.states, vec![Idle, CountingDown, Recording, Flushing, Aborted]);
    assert!(!output.exists());
    assert!(!staging_path(&output).exists());
}

#[timeout(10)]
fn missing_window_aborts_before_recording() {
    let touched = Arc::new(AtomicBool::new(false));
    let recorder = Recorder::new(
        settings(scratch_dir("missing").join("out.gif"), 12, 20),
        MissingWindow,
        Untouched(Arc::clone(&touched)),
    );
    let mut observer = RecordingObserver::default();

    let result = recorder.run(&mut observer);

    assert!(matches!(result, Err(RecordError::Resolution(ResolutionError::NotFound(_)))));
    assert_eq!(observer.states, vec![Idle, Aborted]);
    assert!(!touched.load(Ordering::SeqCst));
}

#[timeout(30)]
fn capture_failure_mid_session_aborts_without_output() {
    let dir = scratch_dir("capture-fail");
    let output = dir.join("out.gif");
    let recorder =
        Recorder::new(settings(output.clone(), 50, 20), locator(), FailingSource::new(3));
    let mut observer = RecordingObserver::default();

    let result = recorder.run(&mut observer);

    assert!(matches!(result, Err(RecordError::Capture(CaptureError::Failed { .. }))));
    assert_eq!(observer.states.last(), Some(&Aborted));
    assert!(observer.states.contains(&Flushing));
    assert!(!output.exists());
}

#[timeout(10)]
fn reduction_to_zero_pixels_is_rejected_up_front() {
    let recorder = Recorder::new(
        settings(scratch_dir("zero").join("out.gif"), 12, 99),
        locator(),
        TestPatternSource::new(),
    );
    let mut observer = RecordingObserver::default();

    let result = recorder.run(&mut observer);

    assert!(matches!(result, Err(RecordError::Config(ConfigError::Invalid { .. }))));
    assert_eq!(observer.states, vec![Idle, Aborted]);
}

#[timeout(20)]
fn countdown_is_reported_before_recording() {
    let dir = scratch_dir("countdown");
    let stop = StopSignal::new();
    let source = StopAfter::new(2, stop.clone());
    let mut config = settings(dir.join("countdown.gif"), 50, 20);
    config.countdown_seconds = 1;
    let recorder = Recorder::new(config, locator(), source).with_stop_signal(stop);
    let mut observer = RecordingObserver::default();

    let started = std::time::Instant::now();
    recorder.run(&mut observer).expect("session");

    assert!(started.elapsed() >= std::time::Duration::from_secs(1));
    assert!(observer.countdown_ticks > 1);
}

#[timeout(30)]
fn malformed_frame_aborts_with_processor_error() {
    let dir = scratch_dir("malformed");
    let output = dir.join("out.gif");
    let recorder = Recorder::new(settings(output.clone(), 50, 20), locator(), Truncated);
    let mut observer = RecordingObserver::default();

    let result = recorder.run(&mut observer);

    assert!(
        matches!(
            result,
            Err(RecordError::MalformedFrame { index: 0, expected: 8000, actual: 4 })
        ),
        "unexpected result {result:?}"
    );
    assert_eq!(observer.states, vec![Idle, CountingDown, Recording, Flushing, Aborted]);
    assert!(!output.exists());
    assert!(!staging_path(&output).exists());
}

#[timeout(30)]
fn panicking_capture_thread_aborts_the_session() {
    let dir = scratch_dir("panic");
    let output = dir.join("out.gif");
    let recorder = Recorder::new(settings(output.clone(), 50, 20), locator(), Exploding);
    let mut observer = RecordingObserver::default();

    let result = recorder.run(&mut observer);

    assert!(matches!(result, Err(RecordError::WorkerPanicked("capture"))));
    assert_eq!(observer.states, vec![Idle, CountingDown, Recording, Flushing, Aborted]);
    assert!(!output.exists());
}

#[timeout(10)]
fn oversized_countdown_is_rejected_up_front() {
    let stop = StopSignal::new();
    stop.trigger();
    let mut config = settings(scratch_dir("countdown-limit").join("out.gif"), 12, 20);
    config.countdown_seconds = u64::MAX;
    let recorder =
        Recorder::new(config, locator(), TestPatternSource::new()).with_stop_signal(stop);
    let mut observer = RecordingObserver::default();

    let result = recorder.run(&mut observer);

    assert!(matches!(
        result,
        Err(RecordError::Config(ConfigError::Invalid { field: "countdown_seconds", .. }))
    ));
    assert_eq!(observer.states, vec![Idle, Aborted]);
}
