//! Multi-waiter, settle-once promise.
//!
//! Backed by a `tokio::sync::watch` channel: the sender holds the terminal
//! value and every waiter subscribes, so observers registered before or after
//! settlement all see the same result.

use std::sync::Arc;

use tokio::sync::watch;

/// A value that is resolved or rejected at most once.
///
/// The first call to [`resolve`](Self::resolve) or [`reject`](Self::reject)
/// wins; later calls are ignored.
#[derive(Debug)]
pub struct SettlablePromise<T, E> {
    slot: watch::Sender<Option<Result<T, E>>>,
}

impl<T, E> SettlablePromise<T, E> {
    /// Create an unsettled promise.
    pub fn new() -> Self {
        let (slot, _) = watch::channel(None);
        Self { slot }
    }

    /// Create a promise that is already rejected.
    pub fn rejected(error: E) -> Self {
        let (slot, _) = watch::channel(Some(Err(error)));
        Self { slot }
    }

    /// Settle with a value. Returns false if the promise was already settled.
    pub fn resolve(&self, value: T) -> bool {
        self.settle(Ok(value))
    }

    /// Settle with an error. Returns false if the promise was already settled.
    pub fn reject(&self, error: E) -> bool {
        self.settle(Err(error))
    }

    /// Whether a terminal value has been stored.
    pub fn is_settled(&self) -> bool {
        self.slot.borrow().is_some()
    }

    fn settle(&self, result: Result<T, E>) -> bool {
        self.slot.send_if_modified(move |slot| {
            if slot.is_some() {
                return false;
            }
            *slot = Some(result);
            true
        })
    }
}

impl<T: Clone, E: Clone> SettlablePromise<T, E> {
    /// Wait for settlement and return a clone of the terminal value.
    pub async fn wait(&self) -> Result<T, E> {
        let mut rx = self.slot.subscribe();
        loop {
            if let Some(result) = rx.borrow_and_update().as_ref() {
                return result.clone();
            }
            // The sender lives in `self`, so `changed` only returns on a send.
            let _ = rx.changed().await;
        }
    }
}

impl<T, E> Default for SettlablePromise<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable accessor for the eventual result of a scheduled request.
///
/// Holding a handle keeps the result available even after the request has
/// been removed from its pool.
#[derive(Debug)]
pub struct RequestHandle<T, E> {
    promise: Arc<SettlablePromise<T, E>>,
}

impl<T, E> RequestHandle<T, E> {
    pub(crate) const fn new(promise: Arc<SettlablePromise<T, E>>) -> Self {
        Self { promise }
    }

    /// Whether the underlying request has settled.
    pub fn is_settled(&self) -> bool {
        self.promise.is_settled()
    }

    /// Whether two handles observe the same underlying request.
    pub fn same_request(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.promise, &other.promise)
    }
}

impl<T: Clone, E: Clone> RequestHandle<T, E> {
    /// Wait for the request to settle.
    pub async fn wait(&self) -> Result<T, E> {
        self.promise.wait().await
    }
}

impl<T, E> Clone for RequestHandle<T, E> {
    fn clone(&self) -> Self {
        Self {
            promise: Arc::clone(&self.promise),
        }
    }
}
