mod cli;
mod countdown;
mod status;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use crossterm::tty::IsTty;
use std::io;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

use termrec_host as host;

use host::capture::{FrameSource, Region, TestPatternSource};
use host::lifecycle::{LogObserver, Recorder, SessionReport};
use host::platform::{FixedRegion, WindowLocator};
use host::processor::ProcessOutcome;
use host::settings::RecordSettings;
use host::signal::StopSignal;

fn main() -> Result<()> {
    init_tracing()?;
    let cli = cli::Cli::parse();
    run(cli)
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // stdout belongs to the status table and the final summary.
    match fmt().with_env_filter(filter).with_writer(io::stderr).try_init() {
        Ok(()) => Ok(()),
        Err(err)
            if err
                .to_string()
                .contains("attempted to set a global default subscriber more than once") =>
        {
            Ok(())
        }
        Err(err) => Err(anyhow!(err)),
    }
}

fn run(cli: cli::Cli) -> Result<()> {
    match cli.command {
        cli::Commands::ListWindows { json } => {
            let windows = host::platform::enumerate_windows()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&windows)?);
            } else if windows.is_empty() {
                println!("No windows detected.");
            } else {
                for win in windows {
                    println!(
                        "[{}] {} ({}) {}",
                        win.identifier, win.title, win.application, win.region
                    );
                }
            }
        }
        cli::Commands::Record(args) => {
            let settings = args.settings().context("invalid recording settings")?;
            let stop = StopSignal::new();
            stop.install_interrupt_handler().context("failed to install Ctrl+C handler")?;

            match args.source {
                cli::SourceKind::TestPattern => {
                    let region = Region::new(0, 0, args.width, args.height);
                    let locator = FixedRegion::new(region, "test pattern");
                    start(settings, locator, TestPatternSource::new(), stop, args.plain)?;
                }
                cli::SourceKind::Screen => screen_session(settings, args.window, stop, args.plain)?,
            }
        }
    }
    Ok(())
}

#[cfg(feature = "xcap")]
fn screen_session(
    settings: RecordSettings,
    window: Option<String>,
    stop: StopSignal,
    plain: bool,
) -> Result<()> {
    use host::platform::{ScreenSource, WindowTitleLocator};

    start(
        settings,
        WindowTitleLocator::new(window),
        ScreenSource::new(),
        stop,
        plain,
    )
}

#[cfg(not(feature = "xcap"))]
fn screen_session(
    settings: RecordSettings,
    window: Option<String>,
    stop: StopSignal,
    plain: bool,
) -> Result<()> {
    let _ = (settings, window, stop, plain);
    anyhow::bail!(
        "screen capture is not built in; rebuild with `--features xcap` \
         or pass `--source test-pattern`"
    )
}

fn start<L, S>(
    settings: RecordSettings,
    locator: L,
    source: S,
    stop: StopSignal,
    plain: bool,
) -> Result<()>
where
    L: WindowLocator,
    S: FrameSource + 'static,
{
    let refresh = settings.refresh_interval();
    let recorder = Recorder::new(settings, locator, source).with_stop_signal(stop);

    let result = if plain || !io::stdout().is_tty() {
        recorder.run(&mut LogObserver::new(Duration::from_secs(1).max(refresh)))
    } else {
        let mut live = status::LiveStatus::new().context("failed to open status display")?;
        let result = recorder.run(&mut live);
        if let Err(err) = live.finish() {
            warn!(error = %err, "failed to restore cursor");
        }
        result
    };

    let report = result.context("recording failed")?;
    print_summary(&report);
    Ok(())
}

fn print_summary(report: &SessionReport) {
    match &report.outcome {
        ProcessOutcome::Encoded(summary) => {
            println!("GIF saved to {}", summary.path.display());
            println!(
                "{} frames, {}x{}, {} ms per frame, {} bytes, captured at {:.1} fps",
                summary.frames,
                summary.width,
                summary.height,
                summary.delay_ms,
                summary.bytes,
                report.capture.effective_fps()
            );
            println!("Done.");
        }
        ProcessOutcome::EmptySequence => {
            println!("No frames captured; nothing was written.");
        }
    }
}
