//! Session lifecycle: countdown, start of the capture and processing threads,
//! cancellation and the final flush.
//!
//! ```text
//! Idle -> CountingDown -> Recording -> Flushing -> Done
//!   \__________\______________\___________\-----> Aborted
//! ```
//!
//! The controller runs on the calling thread. It is the only component that
//! looks at the stop signal's meaning for the session as a whole and the only
//! one that decides how a session ends.

use crate::capture::{CaptureError, CaptureReport, Capturer, FrameSource};
use crate::channel::{frame_channel, BacklogProbe};
use crate::error::RecordError;
use crate::platform::WindowLocator;
use crate::processor::{ProcessError, ProcessOutcome, Processor};
use crate::session::{plan_output_size, Session};
use crate::settings::RecordSettings;
use crate::signal::StopSignal;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    CountingDown,
    Recording,
    Flushing,
    Done,
    Aborted,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Done | SessionState::Aborted)
    }

    fn can_advance_to(self, next: SessionState) -> bool {
        use SessionState::*;
        match (self, next) {
            (Idle, CountingDown)
            | (CountingDown, Recording)
            | (Recording, Flushing)
            | (Flushing, Done) => true,
            (from, Aborted) => !from.is_terminal(),
            _ => false,
        }
    }
}

/// Read-only progress view handed to observers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    pub state: SessionState,
    pub frames_captured: u64,
    pub frames_queued: usize,
    pub elapsed_seconds: f64,
    pub processor_alive: bool,
}

impl ProgressSnapshot {
    pub fn effective_fps(&self) -> Option<f64> {
        (self.frames_captured > 0 && self.elapsed_seconds > 0.0)
            .then(|| self.frames_captured as f64 / self.elapsed_seconds)
    }
}

/// Status display hooks. Observers only read; they cannot steer the pipeline.
pub trait SessionObserver {
    fn on_state(&mut self, _state: SessionState) {}
    fn on_countdown(&mut self, _remaining: Duration) {}
    fn on_session(&mut self, _session: &Session) {}
    fn on_progress(&mut self, _snapshot: &ProgressSnapshot) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default)]
pub struct NullObserver;

impl SessionObserver for NullObserver {}

/// Observer that reports through `tracing`, throttled to one progress line per
/// interval.
#[derive(Debug)]
pub struct LogObserver {
    every: Duration,
    last: Option<Instant>,
}

impl LogObserver {
    pub fn new(every: Duration) -> Self {
        Self { every, last: None }
    }
}

impl Default for LogObserver {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl SessionObserver for LogObserver {
    fn on_state(&mut self, state: SessionState) {
        info!(session.state = ?state, "session state changed");
    }

    fn on_countdown(&mut self, remaining: Duration) {
        let due = self.last.is_none_or(|last| last.elapsed() >= self.every);
        if due {
            info!(countdown.remaining_secs = remaining.as_secs_f64(), "recording starts soon");
            self.last = Some(Instant::now());
        }
    }

    fn on_session(&mut self, session: &Session) {
        self.last = None;
        info!(
            session.window = %session.label,
            session.region = %session.region,
            session.fps = session.target_fps,
            session.output = %session.output_path.display(),
            "recording"
        );
    }

    fn on_progress(&mut self, snapshot: &ProgressSnapshot) {
        let due = self.last.is_none_or(|last| last.elapsed() >= self.every);
        if due {
            info!(
                progress.state = ?snapshot.state,
                progress.frames = snapshot.frames_captured,
                progress.queued = snapshot.frames_queued,
                progress.elapsed_secs = snapshot.elapsed_seconds,
                progress.processor_alive = snapshot.processor_alive,
                "progress"
            );
            self.last = Some(Instant::now());
        }
    }
}

/// Result of a session that reached `Done`.
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub session: Session,
    pub capture: CaptureReport,
    pub outcome: ProcessOutcome,
}

/// Lifecycle controller for one recording.
pub struct Recorder<L, S> {
    settings: RecordSettings,
    locator: L,
    source: S,
    stop: StopSignal,
}

struct Lifecycle<'a> {
    state: SessionState,
    observer: &'a mut dyn SessionObserver,
}

impl Lifecycle<'_> {
    fn advance(&mut self, next: SessionState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal transition {:?} -> {:?}",
            self.state,
            next
        );
        debug!(from = ?self.state, to = ?next, "session transition");
        self.state = next;
        self.observer.on_state(next);
    }
}

/// Live handles of the running pipeline, used to build snapshots.
struct Pipeline {
    started: Instant,
    captured: Arc<AtomicU64>,
    backlog: BacklogProbe,
    capture: JoinHandle<Result<CaptureReport, CaptureError>>,
    process: JoinHandle<Result<ProcessOutcome, ProcessError>>,
}

impl Pipeline {
    fn snapshot(&self, state: SessionState) -> ProgressSnapshot {
        ProgressSnapshot {
            state,
            frames_captured: self.captured.load(Ordering::Relaxed),
            frames_queued: self.backlog.len(),
            elapsed_seconds: self.started.elapsed().as_secs_f64(),
            processor_alive: !self.process.is_finished(),
        }
    }
}

impl<L, S> Recorder<L, S>
where
    L: WindowLocator,
    S: FrameSource + 'static,
{
    pub fn new(settings: RecordSettings, locator: L, source: S) -> Self {
        Self {
            settings,
            locator,
            source,
            stop: StopSignal::new(),
        }
    }

    /// Use an externally owned stop signal (for example one wired to SIGINT).
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    /// Run the whole session on the calling thread.
    ///
    /// `Ok` means the session reached `Done` (including an empty recording);
    /// `Err` means it ended in `Aborted`.
    pub fn run(self, observer: &mut dyn SessionObserver) -> Result<SessionReport, RecordError> {
        let mut lifecycle = Lifecycle {
            state: SessionState::Idle,
            observer,
        };
        lifecycle.observer.on_state(SessionState::Idle);

        match self.drive(&mut lifecycle) {
            Ok(report) => {
                lifecycle.advance(SessionState::Done);
                Ok(report)
            }
            Err(err) => {
                error!(error = %err, state = ?lifecycle.state, "recording aborted");
                lifecycle.advance(SessionState::Aborted);
                Err(err)
            }
        }
    }

    fn drive(self, lifecycle: &mut Lifecycle<'_>) -> Result<SessionReport, RecordError> {
        let Recorder {
            settings,
            locator,
            source,
            stop,
        } = self;

        settings.validate()?;
        let target = locator.resolve()?;
        plan_output_size(&target.region, &settings)?;

        lifecycle.advance(SessionState::CountingDown);
        count_down(&settings, &stop, lifecycle);

        let session = Session::begin(&target, &settings)?;
        lifecycle.observer.on_session(&session);

        let pipeline = start_pipeline(&session, source, &stop)?;
        lifecycle.advance(SessionState::Recording);
        info!(
            session.region = %session.region,
            session.fps = session.target_fps,
            session.output = %session.output_path.display(),
            "recording started"
        );

        let refresh = settings.refresh_interval();
        loop {
            lifecycle.observer.on_progress(&pipeline.snapshot(SessionState::Recording));
            if stop.is_triggered() {
                info!("stop requested");
                break;
            }
            if pipeline.capture.is_finished() {
                warn!("capture thread ended before stop was requested");
                break;
            }
            if pipeline.process.is_finished() {
                warn!("processor thread ended before stop was requested");
                break;
            }
            thread::sleep(refresh);
        }

        lifecycle.advance(SessionState::Flushing);
        // The capturer checks this between frames and answers with EndOfStream.
        stop.trigger();

        while !pipeline.process.is_finished() {
            lifecycle.observer.on_progress(&pipeline.snapshot(SessionState::Flushing));
            thread::sleep(refresh);
        }
        let last = pipeline.snapshot(SessionState::Flushing);
        lifecycle.observer.on_progress(&last);

        let Pipeline {
            capture, process, ..
        } = pipeline;
        let captured = join_worker(capture, "capture")?;
        let processed = join_worker(process, "processor")?;
        let (capture, outcome) = settle(captured, processed)?;

        match &outcome {
            ProcessOutcome::Encoded(summary) => info!(
                session.output = %summary.path.display(),
                encode.frames = summary.frames,
                encode.bytes = summary.bytes,
                capture.effective_fps = capture.effective_fps(),
                "recording saved"
            ),
            ProcessOutcome::EmptySequence => info!("recording ended without frames"),
        }

        Ok(SessionReport {
            session,
            capture,
            outcome,
        })
    }
}

fn count_down(settings: &RecordSettings, stop: &StopSignal, lifecycle: &mut Lifecycle<'_>) {
    let deadline = Instant::now() + settings.countdown();
    let refresh = settings.refresh_interval();
    loop {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        if stop.is_triggered() {
            info!("stop requested during countdown");
            break;
        }
        let remaining = deadline - now;
        lifecycle.observer.on_countdown(remaining);
        thread::sleep(remaining.min(refresh));
    }
    lifecycle.observer.on_countdown(Duration::ZERO);
}

fn start_pipeline<S>(
    session: &Session,
    source: S,
    stop: &StopSignal,
) -> Result<Pipeline, RecordError>
where
    S: FrameSource + 'static,
{
    let (tx, rx) = frame_channel();
    let backlog = rx.backlog_probe();

    let processor = Processor::new(session);
    let process = thread::Builder::new()
        .name("termrec-process".into())
        .spawn(move || processor.run(rx))
        .map_err(|err| RecordError::Spawn("processor", err))?;

    let capturer = Capturer::new(source, session.region, session.target_fps, stop.clone());
    let captured = capturer.frame_counter();
    let spawned = thread::Builder::new()
        .name("termrec-capture".into())
        .spawn(move || capturer.run(tx));
    let capture = match spawned {
        Ok(handle) => handle,
        Err(err) => {
            // The sender died with the closure, so the processor unblocks on its own.
            let _ = process.join();
            return Err(RecordError::Spawn("capture", err));
        }
    };

    Ok(Pipeline {
        started: Instant::now(),
        captured,
        backlog,
        capture,
        process,
    })
}

/// Pick the error that explains how the pipeline ended.
///
/// A capture failure closes the channel under the processor, so it wins. A
/// capturer that only saw the channel close outlived a failed processor,
/// whose error is the cause.
fn settle(
    captured: Result<CaptureReport, CaptureError>,
    processed: Result<ProcessOutcome, ProcessError>,
) -> Result<(CaptureReport, ProcessOutcome), RecordError> {
    match (captured, processed) {
        (Ok(capture), Ok(outcome)) => Ok((capture, outcome)),
        (Err(CaptureError::ChannelClosed(_)), Err(err)) => Err(err.into()),
        (Err(err), _) => Err(err.into()),
        (Ok(_), Err(err)) => Err(err.into()),
    }
}

fn join_worker<T>(handle: JoinHandle<T>, name: &'static str) -> Result<T, RecordError> {
    handle.join().map_err(|_| RecordError::WorkerPanicked(name))
}
