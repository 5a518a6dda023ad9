//! Lifecycle notification sinks for request pools.

use std::fmt;
use std::sync::Arc;

/// Receives request lifecycle events. All methods default to no-ops.
pub trait RequestObserver<Req, Res, Err>: Send + Sync {
    /// A new request was registered under `key`.
    fn on_request_added(&self, _key: &str, _data: &Req) {}
    /// The request under `key` finished successfully.
    fn on_request_success(&self, _key: &str, _result: &Res) {}
    /// The request under `key` failed permanently.
    fn on_request_failure(&self, _key: &str, _error: &Err) {}
    /// The request under `key` will be attempted again.
    fn on_request_retried(&self, _key: &str, _reason: &str) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl<Req, Res, Err> RequestObserver<Req, Res, Err> for NoopObserver {}

/// Logs every event with `tracing`, then forwards it to an inner observer.
pub struct LoggingObserver<Req, Res, Err> {
    inner: Arc<dyn RequestObserver<Req, Res, Err>>,
}

impl<Req, Res, Err> LoggingObserver<Req, Res, Err> {
    /// Wrap `inner`.
    pub fn new(inner: Arc<dyn RequestObserver<Req, Res, Err>>) -> Self {
        Self { inner }
    }
}

impl<Req, Res, Err> RequestObserver<Req, Res, Err> for LoggingObserver<Req, Res, Err>
where
    Err: fmt::Display,
{
    fn on_request_added(&self, key: &str, data: &Req) {
        tracing::info!("start request {} queued", key);
        self.inner.on_request_added(key, data);
    }

    fn on_request_success(&self, key: &str, result: &Res) {
        tracing::info!("start request {} succeeded", key);
        self.inner.on_request_success(key, result);
    }

    fn on_request_failure(&self, key: &str, error: &Err) {
        tracing::warn!("start request {} failed: {}", key, error);
        self.inner.on_request_failure(key, error);
    }

    fn on_request_retried(&self, key: &str, reason: &str) {
        tracing::info!("start request {} will be retried: {}", key, reason);
        self.inner.on_request_retried(key, reason);
    }
}
