use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use termrec_host::settings::{ConfigError, RecordSettings, MAX_COUNTDOWN_SECONDS};

#[derive(Debug, Parser)]
#[command(
    name = "termrec",
    about = "Record a window into an animated GIF",
    author,
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Record the target window until Ctrl+C, then write the GIF.
    Record(RecordArgs),
    /// Enumerate windows termrec can record.
    ListWindows {
        /// Print the list as JSON (for scripting).
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Capture the screen under the selected window (needs the `xcap` feature).
    Screen,
    /// Synthetic moving gradient; needs no display.
    TestPattern,
}

impl SourceKind {
    /// `screen` when the capture backend is compiled in, `test-pattern` otherwise.
    pub fn build_default() -> Self {
        if cfg!(feature = "xcap") {
            SourceKind::Screen
        } else {
            SourceKind::TestPattern
        }
    }
}

#[derive(Debug, Args)]
pub struct RecordArgs {
    /// Output file; `.gif` is appended when missing.
    #[arg(short = 'o', long, env = "TERMREC_OUTPUT")]
    pub output_file: Option<PathBuf>,
    /// Frames per second to capture and play back.
    #[arg(
        short = 'f',
        long,
        env = "TERMREC_FPS",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub fps: Option<u32>,
    /// Shrink width and height by this percentage.
    #[arg(
        short = 'r',
        long,
        env = "TERMREC_REDUCE_PERCENT",
        value_parser = clap::value_parser!(u8).range(0..100)
    )]
    pub reduce_percent: Option<u8>,
    /// Seconds to wait before the first frame (at most one day).
    #[arg(
        short = 'c',
        long,
        env = "TERMREC_COUNTDOWN",
        value_parser = clap::value_parser!(u64).range(..=MAX_COUNTDOWN_SECONDS)
    )]
    pub countdown_seconds: Option<u64>,
    /// GIF quantizer speed, 1 (best) to 30 (fastest).
    #[arg(
        long,
        env = "TERMREC_ENCODE_SPEED",
        value_parser = clap::value_parser!(i32).range(1..=30)
    )]
    pub encode_speed: Option<i32>,
    /// Status refresh interval in milliseconds.
    #[arg(long, env = "TERMREC_REFRESH_MS")]
    pub refresh_ms: Option<u64>,
    /// TOML file providing defaults for the options above.
    #[arg(long, env = "TERMREC_CONFIG")]
    pub config: Option<PathBuf>,
    /// Record the first window whose title contains this text.
    #[arg(short = 'w', long)]
    pub window: Option<String>,
    /// Frame source; defaults to `screen` only in builds with the `xcap` feature.
    #[arg(long, value_enum, default_value_t = SourceKind::build_default())]
    pub source: SourceKind,
    /// Test pattern width in pixels.
    #[arg(long, default_value_t = 640)]
    pub width: u32,
    /// Test pattern height in pixels.
    #[arg(long, default_value_t = 400)]
    pub height: u32,
    /// Log progress lines instead of drawing the live status table.
    #[arg(long)]
    pub plain: bool,
}

impl RecordArgs {
    /// Defaults, then the config file, then flags and environment.
    pub fn settings(&self) -> Result<RecordSettings, ConfigError> {
        let mut settings = match &self.config {
            Some(path) => RecordSettings::from_toml_file(path)?,
            None => RecordSettings::default(),
        };
        if let Some(output) = &self.output_file {
            settings.output_file = output.clone();
        }
        if let Some(fps) = self.fps {
            settings.fps = fps;
        }
        if let Some(percent) = self.reduce_percent {
            settings.reduce_percent = percent;
        }
        if let Some(countdown) = self.countdown_seconds {
            settings.countdown_seconds = countdown;
        }
        if let Some(speed) = self.encode_speed {
            settings.encode_speed = speed;
        }
        if let Some(refresh) = self.refresh_ms {
            settings.refresh_ms = refresh;
        }
        settings.validate()?;
        Ok(settings)
    }
}
