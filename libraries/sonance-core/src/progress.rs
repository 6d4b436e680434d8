//! Progress, cancellation and status reporting
//!
//! Long-running effects call back into the host between block operations.
//! The host answers each progress report with `Continue` or `Cancel`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Host's answer to a progress report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressControl {
    /// Keep going
    Continue,
    /// Stop at the next opportunity
    Cancel,
}

impl ProgressControl {
    /// Check if cancellation was requested
    pub fn is_cancel(self) -> bool {
        self == Self::Cancel
    }
}

/// Receiver of progress updates and status messages
pub trait ProgressReporter {
    /// Report completion as a fraction in `0.0..=1.0`
    fn report(&mut self, fraction: f64) -> ProgressControl;

    /// One-line, human-readable status (advisory only)
    fn status(&mut self, message: &str) {
        let _ = message;
    }
}

impl<F> ProgressReporter for F
where
    F: FnMut(f64) -> ProgressControl,
{
    fn report(&mut self, fraction: f64) -> ProgressControl {
        self(fraction)
    }
}

/// Reporter that ignores everything and never cancels
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgress;

impl ProgressReporter for NullProgress {
    fn report(&mut self, _fraction: f64) -> ProgressControl {
        ProgressControl::Continue
    }
}

/// Reporter backed by a shared cancellation flag
///
/// Progress is logged through `tracing` in steps of `log_step`; status
/// messages are logged at info level. Any holder of the flag (a signal
/// handler, another thread, a UI button) can request cancellation.
#[derive(Debug, Clone)]
pub struct CancellableProgress {
    cancel: Arc<AtomicBool>,
    log_step: f64,
    last_logged: f64,
    last_status: Option<String>,
}

impl CancellableProgress {
    /// Create a reporter with a fresh cancellation flag
    pub fn new() -> Self {
        Self::with_flag(Arc::new(AtomicBool::new(false)))
    }

    /// Create a reporter watching an existing flag
    pub fn with_flag(cancel: Arc<AtomicBool>) -> Self {
        Self {
            cancel,
            log_step: 0.1,
            last_logged: 0.0,
            last_status: None,
        }
    }

    /// Set how often progress is logged (fraction between log lines)
    #[must_use]
    pub fn with_log_step(mut self, log_step: f64) -> Self {
        self.log_step = log_step.clamp(0.001, 1.0);
        self
    }

    /// Handle for requesting cancellation
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Last status message received
    pub fn last_status(&self) -> Option<&str> {
        self.last_status.as_deref()
    }
}

impl Default for CancellableProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for CancellableProgress {
    fn report(&mut self, fraction: f64) -> ProgressControl {
        if fraction - self.last_logged >= self.log_step || (fraction >= 1.0 && self.last_logged < 1.0)
        {
            tracing::debug!("Progress: {:.0}%", fraction * 100.0);
            self.last_logged = fraction;
        }

        if self.is_cancelled() {
            ProgressControl::Cancel
        } else {
            ProgressControl::Continue
        }
    }

    fn status(&mut self, message: &str) {
        tracing::info!("{}", message);
        self.last_status = Some(message.to_string());
    }
}
