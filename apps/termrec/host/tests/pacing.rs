use std::thread;
use std::time::Duration;
use termrec_host::capture::{CaptureError, Capturer, Frame, FrameSource, Region, TestPatternSource};
use termrec_host::channel::{frame_channel, FrameMessage};
use termrec_host::signal::StopSignal;
use test_timeout::timeout;

#[timeout(20)]
fn frame_count_tracks_duration_times_fps() {
    let fps = 20;
    let stop = StopSignal::new();
    let region = Region::new(0, 0, 16, 16);
    let capturer = Capturer::new(TestPatternSource::new(), region, fps, stop.clone());
    let (tx, rx) = frame_channel();

    let handle = thread::spawn(move || capturer.run(tx));
    thread::sleep(Duration::from_millis(500));
    stop.trigger();
    let report = handle.join().expect("capture thread").expect("capture");

    let expected = (report.elapsed.as_secs_f64() * f64::from(fps)).floor() as i64;
    let actual = report.frames as i64;
    assert!(
        (actual - expected).abs() <= 1,
        "captured {actual} frames in {:?}, expected about {expected}",
        report.elapsed
    );

    let mut frames = 0;
    while let Ok(FrameMessage::Frame(_)) = rx.pop() {
        frames += 1;
    }
    assert_eq!(frames, report.frames);
}

/// Capture slower than the frame interval.
struct Sluggish {
    inner: TestPatternSource,
    delay: Duration,
}

impl FrameSource for Sluggish {
    fn capture(&mut self, region: &Region) -> Result<Frame, CaptureError> {
        thread::sleep(self.delay);
        self.inner.capture(region)
    }
}

#[timeout(20)]
fn slow_capture_degrades_rate_without_dropping_frames() {
    let stop = StopSignal::new();
    let source = Sluggish {
        inner: TestPatternSource::new(),
        delay: Duration::from_millis(30),
    };
    // 100 fps asks for a frame every 10 ms; each capture takes 30 ms.
    let capturer = Capturer::new(source, Region::new(0, 0, 8, 8), 100, stop.clone());
    let (tx, rx) = frame_channel();

    let handle = thread::spawn(move || capturer.run(tx));
    thread::sleep(Duration::from_millis(300));
    stop.trigger();
    let report = handle.join().expect("capture thread").expect("capture");

    assert!(report.frames > 0);
    assert_eq!(report.overruns, report.frames);
    assert!(report.effective_fps() < 50.0);

    let mut delivered = 0;
    let mut markers = 0;
    while let Ok(message) = rx.pop() {
        match message {
            FrameMessage::Frame(_) => delivered += 1,
            FrameMessage::EndOfStream => markers += 1,
        }
    }
    assert_eq!(delivered, report.frames);
    assert_eq!(markers, 1);
}
