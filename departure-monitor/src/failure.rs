//! Failure reporting.
//!
//! Background work (debounced searches, departure polling) has no caller to
//! return an error to. It hands failures to a [`FailureSink`] instead, which
//! must not block.

use std::error::Error;
use std::sync::{Arc, Mutex};

use tracing::warn;

/// Receives failures from background work.
pub trait FailureSink: Send + Sync {
    /// Report a failure. `context` names the operation that failed.
    fn notify_failure(&self, context: &str, error: &(dyn Error + 'static));
}

/// Default sink: a `warn!` event per failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingFailureSink;

impl FailureSink for TracingFailureSink {
    fn notify_failure(&self, context: &str, error: &(dyn Error + 'static)) {
        warn!(context, error = %error, "operation failed");
    }
}

impl<T: FailureSink + ?Sized> FailureSink for Arc<T> {
    fn notify_failure(&self, context: &str, error: &(dyn Error + 'static)) {
        (**self).notify_failure(context, error);
    }
}

/// Sink that keeps `(context, message)` pairs; for tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingFailureSink {
    failures: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingFailureSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything reported so far.
    pub fn failures(&self) -> Vec<(String, String)> {
        self.failures
            .lock()
            .map(|f| f.clone())
            .unwrap_or_default()
    }
}

impl FailureSink for RecordingFailureSink {
    fn notify_failure(&self, context: &str, error: &(dyn Error + 'static)) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.push((context.to_string(), error.to_string()));
        }
    }
}
