use signal_hook::consts::{SIGINT, SIGTERM};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cancellation flag shared by the controller and the capturer.
///
/// The only way a recording ends normally is this flag flipping, either from
/// an interrupt signal or from [`StopSignal::trigger`].
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    flag: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Route Ctrl+C and SIGTERM into this flag instead of killing the process.
    pub fn install_interrupt_handler(&self) -> io::Result<()> {
        signal_hook::flag::register(SIGINT, Arc::clone(&self.flag))?;
        signal_hook::flag::register(SIGTERM, Arc::clone(&self.flag))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let stop = StopSignal::new();
        let observer = stop.clone();
        assert!(!observer.is_triggered());
        stop.trigger();
        assert!(observer.is_triggered());
    }
}
