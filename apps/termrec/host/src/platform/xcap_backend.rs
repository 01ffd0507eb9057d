use super::{select_window, CaptureTarget, ResolutionError, WindowInfo, WindowLocator};
use crate::capture::{CaptureError, Frame, FrameSource, PixelFormat, Region};
use tracing::debug;
use xcap::{Monitor, Window};

pub fn enumerate_windows() -> Result<Vec<WindowInfo>, ResolutionError> {
    let windows =
        Window::all().map_err(|err| ResolutionError::EnumerationFailed(err.to_string()))?;
    Ok(windows
        .iter()
        .filter(|win| !win.is_minimized() && win.width() > 0 && win.height() > 0)
        .map(|win| WindowInfo {
            identifier: win.id().to_string(),
            title: win.title().to_string(),
            application: win.app_name().to_string(),
            region: Region::new(win.x(), win.y(), win.width(), win.height()),
        })
        .collect())
}

/// Resolves the window geometry once: by title, else a terminal, else the
/// frontmost visible window.
#[derive(Debug, Clone, Default)]
pub struct WindowTitleLocator {
    title: Option<String>,
}

impl WindowTitleLocator {
    pub fn new(title: Option<String>) -> Self {
        Self { title }
    }
}

impl WindowLocator for WindowTitleLocator {
    fn resolve(&self) -> Result<CaptureTarget, ResolutionError> {
        let windows = enumerate_windows()?;
        let window = select_window(&windows, self.title.as_deref())?;
        debug!(
            window.id = %window.identifier,
            window.title = %window.title,
            window.region = %window.region,
            "resolved capture window"
        );
        Ok(CaptureTarget {
            region: window.region,
            label: window.title.clone(),
        })
    }
}

/// Grabs the monitor under the region and crops it out.
#[derive(Debug, Default)]
pub struct ScreenSource;

impl ScreenSource {
    pub fn new() -> Self {
        Self
    }
}

impl FrameSource for ScreenSource {
    fn capture(&mut self, region: &Region) -> Result<Frame, CaptureError> {
        let failed = |reason: String| CaptureError::Failed {
            region: *region,
            reason,
        };
        let monitor = Monitor::from_point(region.left, region.top)
            .map_err(|err| failed(err.to_string()))?;
        let image = monitor.capture_image().map_err(|err| failed(err.to_string()))?;

        let (Ok(x), Ok(y)) = (
            u32::try_from(region.left - monitor.x()),
            u32::try_from(region.top - monitor.y()),
        ) else {
            return Err(CaptureError::OutOfBounds { region: *region });
        };
        if x + region.width > image.width() || y + region.height > image.height() {
            return Err(CaptureError::OutOfBounds { region: *region });
        }

        let stride = image.width() as usize * PixelFormat::BYTES_PER_PIXEL;
        let row_len = region.width as usize * PixelFormat::BYTES_PER_PIXEL;
        let raw = image.as_raw();
        let mut pixels = Vec::with_capacity(row_len * region.height as usize);
        for row in y..y + region.height {
            let start = row as usize * stride + x as usize * PixelFormat::BYTES_PER_PIXEL;
            pixels.extend_from_slice(&raw[start..start + row_len]);
        }

        Ok(Frame::new(
            region.width,
            region.height,
            PixelFormat::Rgba8888,
            pixels,
        ))
    }
}
