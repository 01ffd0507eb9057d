use crate::capture::Region;
use serde::Serialize;
use thiserror::Error;

#[cfg(feature = "xcap")]
mod xcap_backend;

#[cfg(feature = "xcap")]
pub use xcap_backend::{ScreenSource, WindowTitleLocator};

#[derive(Debug, Clone, Serialize)]
pub struct WindowInfo {
    pub identifier: String,
    pub title: String,
    pub application: String,
    pub region: Region,
}

/// Region to record plus a human label for status output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureTarget {
    pub region: Region,
    pub label: String,
}

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("window enumeration failed: {0}")]
    EnumerationFailed(String),
    #[error("no window matches {0:?}")]
    NotFound(String),
    #[error("no visible window to record")]
    NoWindows,
    #[error("screen capture backend not available in this build (enable the `xcap` feature)")]
    BackendUnavailable,
}

/// Finds the region to record. Called once, before the countdown.
pub trait WindowLocator {
    fn resolve(&self) -> Result<CaptureTarget, ResolutionError>;
}

/// Locator for a caller-supplied rectangle.
#[derive(Debug, Clone)]
pub struct FixedRegion {
    target: CaptureTarget,
}

impl FixedRegion {
    pub fn new(region: Region, label: impl Into<String>) -> Self {
        Self {
            target: CaptureTarget {
                region,
                label: label.into(),
            },
        }
    }
}

impl WindowLocator for FixedRegion {
    fn resolve(&self) -> Result<CaptureTarget, ResolutionError> {
        Ok(self.target.clone())
    }
}

/// Whether a title looks like a shell window worth recording by default.
pub fn is_terminal_title(title: &str) -> bool {
    title == "Administrator: Windows PowerShell"
        || title.starts_with("Windows PowerShell")
        || title.starts_with("Terminal")
}

/// Pick a window by case-insensitive title substring. Without a filter, prefer
/// a terminal window, then the first (frontmost) one.
pub fn select_window<'a>(
    windows: &'a [WindowInfo],
    title: Option<&str>,
) -> Result<&'a WindowInfo, ResolutionError> {
    match title {
        Some(needle) => {
            let needle_lower = needle.to_lowercase();
            windows
                .iter()
                .find(|win| win.title.to_lowercase().contains(&needle_lower))
                .ok_or_else(|| ResolutionError::NotFound(needle.to_string()))
        }
        None => windows
            .iter()
            .find(|win| is_terminal_title(&win.title))
            .or_else(|| windows.first())
            .ok_or(ResolutionError::NoWindows),
    }
}

pub fn enumerate_windows() -> Result<Vec<WindowInfo>, ResolutionError> {
    #[cfg(feature = "xcap")]
    {
        xcap_backend::enumerate_windows()
    }

    #[cfg(not(feature = "xcap"))]
    {
        tracing::warn!("window enumeration requires the `xcap` feature");
        Err(ResolutionError::BackendUnavailable)
    }
}
