//! A single keyed unit of work awaiting processing.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{ProcessOutcome, RequestHandle, SettlablePromise};
use crate::util::contain_panic;

/// Lifecycle status of a scheduled request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Waiting for a processing pass.
    Pending,
    /// A processor is currently working on it.
    InProgress,
    /// Resolved or rejected; waiting only for removal.
    Settled,
}

/// Turns request data into a processing outcome.
///
/// Implementors perform the actual side effect (e.g. starting a remote job)
/// and decide whether a failure is terminal or should be retried.
#[async_trait]
pub trait RequestProcessor<Req, Res, Err>: Send + Sync {
    /// Process one request's data.
    async fn process(&self, data: &Req) -> ProcessOutcome<Res, Err>;
}

/// Hooks invoked by [`ScheduledRequest::process`] before the promise settles.
pub struct RequestCallbacks<Res, Err> {
    /// Called with the value of a successful pass.
    pub on_success: Box<dyn Fn(&Res) + Send + Sync>,
    /// Called with the error of a failed pass.
    pub on_failure: Box<dyn Fn(&Err) + Send + Sync>,
    /// Called with the reason when a pass asks to be retried.
    pub on_retry: Box<dyn Fn(&str) + Send + Sync>,
}

impl<Res, Err> RequestCallbacks<Res, Err> {
    /// Callbacks that do nothing.
    pub fn noop() -> Self {
        Self {
            on_success: Box::new(|_| {}),
            on_failure: Box::new(|_| {}),
            on_retry: Box::new(|_| {}),
        }
    }
}

/// Request data, status and the promise its waiters observe.
pub struct ScheduledRequest<Req, Res, Err> {
    key: String,
    data: Req,
    status: Mutex<RequestStatus>,
    promise: Arc<SettlablePromise<Res, Err>>,
    callbacks: RequestCallbacks<Res, Err>,
}

impl<Req, Res, Err> ScheduledRequest<Req, Res, Err> {
    /// Create a pending request.
    pub fn new(key: impl Into<String>, data: Req, callbacks: RequestCallbacks<Res, Err>) -> Self {
        Self {
            key: key.into(),
            data,
            status: Mutex::new(RequestStatus::Pending),
            promise: Arc::new(SettlablePromise::new()),
            callbacks,
        }
    }

    /// Key this request is registered under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Request payload.
    pub const fn data(&self) -> &Req {
        &self.data
    }

    /// Current status.
    pub fn status(&self) -> RequestStatus {
        *self.status.lock()
    }

    /// Whether the request is waiting for a processing pass.
    pub fn is_pending(&self) -> bool {
        self.status() == RequestStatus::Pending
    }

    /// Accessor for the eventual result.
    pub fn handle(&self) -> RequestHandle<Res, Err> {
        RequestHandle::new(Arc::clone(&self.promise))
    }

    /// Reject without running any callbacks. Used when the owning pool closes.
    pub fn reject(&self, error: Err) -> bool {
        *self.status.lock() = RequestStatus::Settled;
        self.promise.reject(error)
    }

    /// Run the request through `processor`.
    ///
    /// Returns true when the request reached a terminal state; false when the
    /// processor asked for a retry and the request is pending again. A
    /// panicking callback is logged and never prevents settlement.
    pub async fn process<P>(&self, processor: &P) -> bool
    where
        P: RequestProcessor<Req, Res, Err> + ?Sized,
    {
        *self.status.lock() = RequestStatus::InProgress;

        let outcome = processor.process(&self.data).await;
        let terminal = outcome.is_terminal();
        tracing::debug!("request {} pass finished: {}", self.key, outcome.label());

        match outcome {
            ProcessOutcome::Success(value) => {
                contain_panic("success callback", || (self.callbacks.on_success)(&value));
                *self.status.lock() = RequestStatus::Settled;
                self.promise.resolve(value);
            }
            ProcessOutcome::Failure(error) => {
                contain_panic("failure callback", || (self.callbacks.on_failure)(&error));
                *self.status.lock() = RequestStatus::Settled;
                self.promise.reject(error);
            }
            ProcessOutcome::Retry(reason) => {
                contain_panic("retry callback", || (self.callbacks.on_retry)(&reason));
                let mut status = self.status.lock();
                if *status == RequestStatus::InProgress {
                    *status = RequestStatus::Pending;
                }
            }
        }
        terminal
    }
}

impl<Req, Res: Clone, Err: Clone> ScheduledRequest<Req, Res, Err> {
    /// Wait for the request to settle.
    pub async fn wait(&self) -> Result<Res, Err> {
        self.promise.wait().await
    }
}

impl<Req: fmt::Debug, Res, Err> fmt::Debug for ScheduledRequest<Req, Res, Err> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledRequest")
            .field("key", &self.key)
            .field("data", &self.data)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}
