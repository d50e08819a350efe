//! Progress reporting and cancellation for export runs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Receives the status line shown while an export runs.
///
/// `Some(message)` while working, `None` once the run is over.
pub trait ProgressSink {
    fn set_status(&mut self, status: Option<&str>);
}

impl<F> ProgressSink for F
where
    F: FnMut(Option<&str>),
{
    fn set_status(&mut self, status: Option<&str>) {
        self(status)
    }
}

/// A sink that just remembers the latest status.
#[derive(Debug, Clone, Default)]
pub struct StatusLine {
    current: Option<String>,
    updates: usize,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Number of `set_status` calls received.
    pub fn updates(&self) -> usize {
        self.updates
    }
}

impl ProgressSink for StatusLine {
    fn set_status(&mut self, status: Option<&str>) {
        self.current = status.map(str::to_string);
        self.updates += 1;
    }
}

/// Clears the status when dropped, whichever way the run ends.
pub(crate) struct ProgressGuard<'a> {
    sink: &'a mut dyn ProgressSink,
}

impl<'a> ProgressGuard<'a> {
    pub(crate) fn new(sink: &'a mut dyn ProgressSink) -> Self {
        Self { sink }
    }

    pub(crate) fn report(&mut self, message: &str) {
        self.sink.set_status(Some(message));
    }
}

impl Drop for ProgressGuard<'_> {
    fn drop(&mut self) {
        self.sink.set_status(None);
    }
}

/// Shared flag asking a run to stop at the next checkpoint.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// `Processing {name} ({index + 1}/{total})…`
pub(crate) fn processing_message(name: &str, index: usize, total: usize) -> String {
    format!("Processing {} ({}/{})…", name, index + 1, total)
}
