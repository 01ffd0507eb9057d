use crate::capture::Region;
use crate::platform::CaptureTarget;
use crate::processor::reduced_size;
use crate::settings::{ConfigError, RecordSettings};
use std::path::PathBuf;
use std::time::SystemTime;

/// Immutable description of one recording, fixed when capture starts.
#[derive(Debug, Clone)]
pub struct Session {
    pub region: Region,
    pub label: String,
    pub target_fps: u32,
    pub reduce_percent: u8,
    pub output_path: PathBuf,
    pub encode_speed: i32,
    pub start_time: SystemTime,
}

/// Scaled output size for `region`, rejecting sizes a GIF cannot hold.
pub fn plan_output_size(
    region: &Region,
    settings: &RecordSettings,
) -> Result<(u32, u32), ConfigError> {
    if region.is_empty() {
        return Err(ConfigError::Invalid {
            field: "region",
            reason: format!("{region} has no area"),
        });
    }
    let (width, height) = reduced_size(region.width, region.height, settings.reduce_percent);
    if width == 0 || height == 0 {
        return Err(ConfigError::Invalid {
            field: "reduce_percent",
            reason: format!(
                "{}% shrinks {}x{} to nothing",
                settings.reduce_percent, region.width, region.height
            ),
        });
    }
    if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
        return Err(ConfigError::Invalid {
            field: "reduce_percent",
            reason: format!("{width}x{height} output exceeds the GIF size limit"),
        });
    }
    Ok((width, height))
}

impl Session {
    pub fn begin(target: &CaptureTarget, settings: &RecordSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        plan_output_size(&target.region, settings)?;
        Ok(Self {
            region: target.region,
            label: target.label.clone(),
            target_fps: settings.fps,
            reduce_percent: settings.reduce_percent,
            output_path: settings.output_path(),
            encode_speed: settings.encode_speed,
            start_time: SystemTime::now(),
        })
    }

    pub fn output_size(&self) -> (u32, u32) {
        reduced_size(self.region.width, self.region.height, self.reduce_percent)
    }

    pub fn frame_delay_ms(&self) -> u32 {
        crate::settings::frame_delay_ms(self.target_fps)
    }
}
