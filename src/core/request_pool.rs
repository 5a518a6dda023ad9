//! Keyed registry of scheduled requests with single-flight semantics.
//!
//! At most one live request exists per key. A second registration for the
//! same key returns a handle to the existing request instead of creating new
//! work. A key becomes free again as soon as its request settles.
//!
//! Draining walks the registry in registration order and processes one
//! pending request at a time behind a guard chain, until nothing is pending
//! or a guard refuses.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::util::contain_panic;

use super::guard::{synchronized_attempt, Guard};
use super::{
    NoopObserver, RequestCallbacks, RequestHandle, RequestObserver, RequestProcessor,
    ScheduledRequest, SettlablePromise, SyncOutcome,
};

type SharedRequest<Req, Res, Err> = Arc<ScheduledRequest<Req, Res, Err>>;

/// Map state guarded by a single mutex so check-then-insert is indivisible.
struct RequestTable<Req, Res, Err> {
    next_seq: u64,
    /// Registration order; drives pending selection.
    order: BTreeMap<u64, SharedRequest<Req, Res, Err>>,
    /// Key to registration sequence.
    index: HashMap<String, u64>,
    /// Set once the pool is closed; new registrations are rejected with it.
    closed: Option<Err>,
}

impl<Req, Res, Err> RequestTable<Req, Res, Err> {
    fn new() -> Self {
        Self {
            next_seq: 0,
            order: BTreeMap::new(),
            index: HashMap::new(),
            closed: None,
        }
    }

    fn get(&self, key: &str) -> Option<&SharedRequest<Req, Res, Err>> {
        self.index.get(key).and_then(|seq| self.order.get(seq))
    }

    fn insert(&mut self, request: SharedRequest<Req, Res, Err>) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.index.insert(request.key().to_owned(), seq);
        self.order.insert(seq, request);
        seq
    }

    /// Remove `key` only if it still maps to registration `seq`.
    fn remove(&mut self, key: &str, seq: u64) {
        if self.index.get(key) == Some(&seq) {
            self.index.remove(key);
            self.order.remove(&seq);
        }
    }
}

/// Registry of scheduled requests keyed by job name.
pub struct RequestPool<Req, Res, Err> {
    table: Arc<Mutex<RequestTable<Req, Res, Err>>>,
    observer: Arc<dyn RequestObserver<Req, Res, Err>>,
}

impl<Req, Res, Err> RequestPool<Req, Res, Err>
where
    Req: Send + Sync + 'static,
    Res: Clone + Send + Sync + 'static,
    Err: Clone + Send + Sync + 'static,
{
    /// Create an empty pool reporting to `observer`.
    pub fn new(observer: Arc<dyn RequestObserver<Req, Res, Err>>) -> Self {
        Self {
            table: Arc::new(Mutex::new(RequestTable::new())),
            observer,
        }
    }

    /// Create an empty pool with no observer.
    pub fn without_observer() -> Self {
        Self::new(Arc::new(NoopObserver))
    }

    /// Handle to the live request under `key`, if any.
    pub fn find_request(&self, key: &str) -> Option<RequestHandle<Res, Err>> {
        self.table.lock().get(key).map(|request| request.handle())
    }

    /// Handle to the live request under `key`, registering `data` if none exists.
    ///
    /// The observer hears about a new request while the registry is locked,
    /// so it must not call back into this pool. After [`close`](Self::close)
    /// this returns an already-rejected handle.
    pub fn find_or_add_request(&self, key: impl Into<String>, data: Req) -> RequestHandle<Res, Err> {
        let key = key.into();
        let mut table = self.table.lock();
        if let Some(error) = &table.closed {
            return RequestHandle::new(Arc::new(SettlablePromise::rejected(error.clone())));
        }
        if let Some(existing) = table.get(&key) {
            tracing::debug!("start request {} already registered", key);
            return existing.handle();
        }

        // Announced before insertion: no drain can report an outcome first.
        contain_panic("added callback", || self.observer.on_request_added(&key, &data));

        let seq = table.next_seq;
        let request = Arc::new(ScheduledRequest::new(
            key.clone(),
            data,
            self.callbacks_for(&key, seq),
        ));
        let handle = request.handle();
        table.insert(request);
        handle
    }

    /// Callbacks that free the key and notify the observer.
    fn callbacks_for(&self, key: &str, seq: u64) -> RequestCallbacks<Res, Err> {
        let table = Arc::downgrade(&self.table);
        let observer = Arc::clone(&self.observer);
        let key = key.to_owned();

        let on_success = {
            let (table, observer, key) = (table.clone(), Arc::clone(&observer), key.clone());
            Box::new(move |result: &Res| {
                remove_entry(&table, &key, seq);
                observer.on_request_success(&key, result);
            })
        };
        let on_failure = {
            let (table, observer, key) = (table, Arc::clone(&observer), key.clone());
            Box::new(move |error: &Err| {
                remove_entry(&table, &key, seq);
                observer.on_request_failure(&key, error);
            })
        };
        let on_retry = Box::new(move |reason: &str| {
            observer.on_request_retried(&key, reason);
        });

        RequestCallbacks {
            on_success,
            on_failure,
            on_retry,
        }
    }

    /// First pending request in registration order, skipping `skip`.
    fn next_pending(&self, skip: &HashSet<String>) -> Option<SharedRequest<Req, Res, Err>> {
        self.table
            .lock()
            .order
            .values()
            .find(|request| request.is_pending() && !skip.contains(request.key()))
            .cloned()
    }

    /// Drain pending requests through `processor`, one at a time, behind `guards`.
    ///
    /// Stops when no request is pending or a guard refuses. A request that asks
    /// for a retry is not attempted again within the same drain. Returns the
    /// number of requests processed.
    pub async fn attempt_processing_all_requests<P>(
        &self,
        processor: &P,
        guards: &[&dyn Guard],
    ) -> usize
    where
        P: RequestProcessor<Req, Res, Err> + ?Sized,
    {
        let mut processed = 0;
        let mut retried = HashSet::new();

        loop {
            let outcome = synchronized_attempt(
                || async {
                    let request = self.next_pending(&retried)?;
                    let settled = request.process(processor).await;
                    Some((request.key().to_owned(), settled))
                },
                guards,
            )
            .await;

            match outcome {
                SyncOutcome::Executed(Some((key, settled))) => {
                    processed += 1;
                    if !settled {
                        retried.insert(key);
                    }
                }
                SyncOutcome::Executed(None) => {
                    tracing::debug!("no pending start requests");
                    break;
                }
                SyncOutcome::Blocked(reason) => {
                    tracing::debug!("drain blocked: {}", reason);
                    break;
                }
            }
        }

        processed
    }

    /// Close the pool: reject every live request with `error` and refuse new ones.
    ///
    /// Returns the number of requests rejected. Closing twice keeps the first error.
    pub fn close(&self, error: Err) -> usize {
        let drained: Vec<_> = {
            let mut table = self.table.lock();
            if table.closed.is_none() {
                table.closed = Some(error.clone());
            }
            table.index.clear();
            std::mem::take(&mut table.order).into_values().collect()
        };

        for request in &drained {
            request.reject(error.clone());
        }
        drained.len()
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.table.lock().closed.is_some()
    }

    /// Keys of pending requests in drain order.
    pub fn pending_keys(&self) -> Vec<String> {
        self.table
            .lock()
            .order
            .values()
            .filter(|request| request.is_pending())
            .map(|request| request.key().to_owned())
            .collect()
    }

    /// Number of live requests.
    pub fn len(&self) -> usize {
        self.table.lock().order.len()
    }

    /// Whether no request is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn remove_entry<Req, Res, Err>(table: &Weak<Mutex<RequestTable<Req, Res, Err>>>, key: &str, seq: u64) {
    if let Some(table) = table.upgrade() {
        table.lock().remove(key, seq);
    }
}
