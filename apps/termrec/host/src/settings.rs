//! Recording options.
//!
//! Settings come from built-in defaults, an optional TOML file and finally the
//! command line / environment (applied by the CLI on top of what is loaded
//! here).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_OUTPUT: &str = "output.gif";
pub const DEFAULT_FPS: u32 = 12;
pub const DEFAULT_REDUCE_PERCENT: u8 = 20;
pub const DEFAULT_COUNTDOWN_SECONDS: u64 = 5;
pub const DEFAULT_ENCODE_SPEED: i32 = 10;
pub const DEFAULT_REFRESH_MS: u64 = 100;
/// One day. Longer waits are almost certainly a typo.
pub const MAX_COUNTDOWN_SECONDS: u64 = 86_400;

const GIF_EXTENSION: &str = "gif";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecordSettings {
    pub output_file: PathBuf,
    pub fps: u32,
    pub reduce_percent: u8,
    pub countdown_seconds: u64,
    /// NeuQuant sampling speed handed to the GIF quantizer (1 best, 30 fastest).
    pub encode_speed: i32,
    pub refresh_ms: u64,
}

impl Default for RecordSettings {
    fn default() -> Self {
        Self {
            output_file: PathBuf::from(DEFAULT_OUTPUT),
            fps: DEFAULT_FPS,
            reduce_percent: DEFAULT_REDUCE_PERCENT,
            countdown_seconds: DEFAULT_COUNTDOWN_SECONDS,
            encode_speed: DEFAULT_ENCODE_SPEED,
            refresh_ms: DEFAULT_REFRESH_MS,
        }
    }
}

impl RecordSettings {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fps == 0 {
            return Err(ConfigError::Invalid {
                field: "fps",
                reason: "must be at least 1".into(),
            });
        }
        if self.reduce_percent >= 100 {
            return Err(ConfigError::Invalid {
                field: "reduce_percent",
                reason: format!("{} is outside 0..=99", self.reduce_percent),
            });
        }
        if !(1..=30).contains(&self.encode_speed) {
            return Err(ConfigError::Invalid {
                field: "encode_speed",
                reason: format!("{} is outside 1..=30", self.encode_speed),
            });
        }
        if self.countdown_seconds > MAX_COUNTDOWN_SECONDS {
            return Err(ConfigError::Invalid {
                field: "countdown_seconds",
                reason: format!(
                    "{} exceeds the limit of {MAX_COUNTDOWN_SECONDS}",
                    self.countdown_seconds
                ),
            });
        }
        if self.refresh_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "refresh_ms",
                reason: "must be at least 1".into(),
            });
        }
        if self.output_file.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                field: "output_file",
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Output path with the `.gif` extension appended when missing.
    pub fn output_path(&self) -> PathBuf {
        with_gif_extension(&self.output_file)
    }

    pub fn countdown(&self) -> Duration {
        Duration::from_secs(self.countdown_seconds)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_ms.max(1))
    }
}

/// Time between the starts of two captures.
pub fn frame_interval(fps: u32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(fps.max(1)))
}

/// Per-frame display time: `round(1000 / fps)` milliseconds.
pub fn frame_delay_ms(fps: u32) -> u32 {
    let fps = fps.max(1);
    (1000 + fps / 2) / fps
}

pub fn with_gif_extension(path: &Path) -> PathBuf {
    let has_gif = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(GIF_EXTENSION));
    if has_gif {
        path.to_path_buf()
    } else {
        let mut raw = path.as_os_str().to_os_string();
        raw.push(".");
        raw.push(GIF_EXTENSION);
        PathBuf::from(raw)
    }
}
