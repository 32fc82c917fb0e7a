//! Failure sinks for teardown errors.
//!
//! Teardown never returns an error to its caller. Failures are handed to an
//! [`ErrorReporter`] injected at construction instead.

use crate::error::ConnectionError;
use tracing::warn;

/// Receives non-fatal failures raised while tearing connections down.
pub trait ErrorReporter: Send + Sync {
    /// Report one failure. `label` identifies the registry that hit it.
    fn report(&self, label: &str, error: &ConnectionError);
}

/// Default reporter: logs each failure through `tracing` at warn level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, label: &str, error: &ConnectionError) {
        match error.subscription() {
            Some(id) => warn!(registry = label, subscription = %id, "{}; continuing", error),
            None => warn!(registry = label, "{}", error),
        }
    }
}

/// Discards every failure.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullReporter;

impl ErrorReporter for NullReporter {
    fn report(&self, _label: &str, _error: &ConnectionError) {}
}
