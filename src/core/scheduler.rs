//! Job-start scheduler: the composition root.
//!
//! Wires a [`RequestPool`] to an [`Interval`] that drains it on every tick
//! behind three guards, in this order:
//!
//! 1. the shutdown gate, closed for good when the host asks to stop;
//! 2. an exclusive lock, so only one drain runs at a time;
//! 3. a retry cooldown, activated whenever a start attempt fails for a
//!    transient resource reason.
//!
//! Because the cooldown is shared, one transient failure pauses every pending
//! job until the window elapses.

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use futures::FutureExt;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::SchedulerConfig;
use crate::runtime::ShutdownSignal;
use crate::util::panic_message;

use super::guard::Guard;
use super::{
    ErrorClassifier, Interval, JobStarter, LoggingObserver, ProcessOutcome,
    RequestHandle, RequestObserver, RequestPool, RequestProcessor, Spawn, StartError,
    StartRequest, TryCooldown, TryGate, TryLock,
};

/// Observer type accepted by [`Scheduler::new`].
pub type StartObserver<I, T, F> = Arc<dyn RequestObserver<StartRequest<I>, T, StartError<F>>>;

/// Handle returned for a start request.
pub type StartHandle<T, F> = RequestHandle<T, StartError<F>>;

/// Lifecycle of a scheduler. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerState {
    /// Admitting new drain passes.
    Running,
    /// Gate closed; a drain that started earlier still holds the lock.
    ShuttingDown,
    /// Gate closed and no drain in flight.
    Stopped,
}

/// Processor that calls the external start function and classifies failures.
struct StartProcessor<I, T, E, F> {
    starter: Arc<dyn JobStarter<I, T, E>>,
    classifier: Arc<dyn ErrorClassifier<E, F>>,
    cooldown: Arc<TryCooldown>,
    retry_enabled: bool,
}

impl<I, T, E, F> StartProcessor<I, T, E, F>
where
    I: Send + Sync + 'static,
    T: Send + 'static,
    E: Send + 'static,
    F: fmt::Display + Send + 'static,
{
    async fn attempt(&self, request: &StartRequest<I>) -> ProcessOutcome<T, StartError<F>> {
        tracing::debug!("starting job {}", request.job_name);
        let error = match self.starter.start(&request.input, &request.options).await {
            Ok(result) => return ProcessOutcome::Success(result),
            Err(error) => error,
        };

        let class = self.classifier.classify(error).await;
        if self.retry_enabled && class.is_transient() {
            self.cooldown.activate();
            tracing::info!(
                "job {} hit a resource limit, pausing starts for {:?}",
                request.job_name,
                self.cooldown.duration()
            );
            return ProcessOutcome::Retry(class.into_inner().to_string());
        }
        ProcessOutcome::Failure(StartError::Failed(class.into_inner()))
    }
}

#[async_trait]
impl<I, T, E, F> RequestProcessor<StartRequest<I>, T, StartError<F>> for StartProcessor<I, T, E, F>
where
    I: Send + Sync + 'static,
    T: Send + 'static,
    E: Send + 'static,
    F: fmt::Display + Send + 'static,
{
    async fn process(&self, request: &StartRequest<I>) -> ProcessOutcome<T, StartError<F>> {
        match AssertUnwindSafe(self.attempt(request)).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(panic) => {
                let message = panic_message(&*panic);
                tracing::error!("start of job {} panicked: {}", request.job_name, message);
                ProcessOutcome::Failure(StartError::Internal(message))
            }
        }
    }
}

struct SchedulerInner<I, T, E, F> {
    config: SchedulerConfig,
    pool: RequestPool<StartRequest<I>, T, StartError<F>>,
    processor: StartProcessor<I, T, E, F>,
    shutdown_gate: TryGate,
    exclusive_lock: TryLock,
    cooldown: Arc<TryCooldown>,
    interval: Mutex<Option<Interval>>,
}

impl<I, T, E, F> SchedulerInner<I, T, E, F>
where
    I: Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
    E: Send + 'static,
    F: Clone + fmt::Display + Send + Sync + 'static,
{
    async fn tick(&self) -> usize {
        let guards: [&dyn Guard; 3] = [
            &self.shutdown_gate,
            &self.exclusive_lock,
            self.cooldown.as_ref(),
        ];
        let processed = self
            .pool
            .attempt_processing_all_requests(&self.processor, &guards)
            .await;
        if processed > 0 {
            tracing::debug!("drain pass processed {} start request(s)", processed);
        }
        processed
    }

    fn shutdown(&self) {
        // Gate first: start() checks it while holding the interval slot.
        let first = self.shutdown_gate.close();
        if let Some(interval) = self.interval.lock().as_ref() {
            interval.stop();
        }
        if !first {
            return;
        }
        tracing::info!("job-start scheduler shutting down");
        let released = self.pool.close(StartError::Stopped);
        if released > 0 {
            tracing::warn!("rejected {} unsettled start request(s) on shutdown", released);
        }
    }

    fn state(&self) -> SchedulerState {
        if self.shutdown_gate.is_open() {
            SchedulerState::Running
        } else if self.exclusive_lock.is_locked() {
            SchedulerState::ShuttingDown
        } else {
            SchedulerState::Stopped
        }
    }
}

/// Single-flight, cooldown-aware job-start scheduler.
///
/// Cloning is cheap; clones share the same pool and guards.
///
/// # Example
///
/// ```rust,ignore
/// let shutdown = CtrlCShutdown::new(TokioSpawner::current()?);
/// let scheduler = Scheduler::new(config, starter, classifier, observer, &shutdown);
/// scheduler.start(&TokioSpawner::current()?);
///
/// let handle = scheduler.request_start(StartRequest::new("crawl-docs", input));
/// let run = handle.wait().await?;
/// ```
pub struct Scheduler<I, T, E, F> {
    inner: Arc<SchedulerInner<I, T, E, F>>,
}

impl<I, T, E, F> Clone for Scheduler<I, T, E, F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<I, T, E, F> Scheduler<I, T, E, F>
where
    I: Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
    E: Send + 'static,
    F: Clone + fmt::Display + Send + Sync + 'static,
{
    /// Create a scheduler and subscribe it to `shutdown`.
    ///
    /// The scheduler does not tick until [`start`](Self::start) is called.
    pub fn new(
        config: SchedulerConfig,
        starter: Arc<dyn JobStarter<I, T, E>>,
        classifier: Arc<dyn ErrorClassifier<E, F>>,
        observer: StartObserver<I, T, F>,
        shutdown: &dyn ShutdownSignal,
    ) -> Self {
        let cooldown = Arc::new(TryCooldown::new(config.cooldown()));
        let processor = StartProcessor {
            starter,
            classifier,
            cooldown: Arc::clone(&cooldown),
            retry_enabled: config.retry_enabled,
        };
        let inner = Arc::new(SchedulerInner {
            pool: RequestPool::new(Arc::new(LoggingObserver::new(observer))),
            processor,
            shutdown_gate: TryGate::new(),
            exclusive_lock: TryLock::new(),
            cooldown,
            interval: Mutex::new(None),
            config,
        });

        let weak = Arc::downgrade(&inner);
        shutdown.subscribe(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.shutdown();
            }
        }));

        Self { inner }
    }

    /// Start the periodic drain on `spawner`.
    ///
    /// Returns false if already started or shut down.
    pub fn start<S>(&self, spawner: &S) -> bool
    where
        S: Spawn + Clone + Send + 'static,
    {
        let mut slot = self.inner.interval.lock();
        if slot.is_some() || !self.inner.shutdown_gate.is_open() {
            return false;
        }

        let weak: Weak<SchedulerInner<I, T, E, F>> = Arc::downgrade(&self.inner);
        let interval = Interval::start(spawner, self.inner.config.poll_interval(), move || {
            let weak = weak.clone();
            async move {
                if let Some(inner) = weak.upgrade() {
                    inner.tick().await;
                }
            }
        });
        tracing::info!("job-start scheduler running every {:?}", interval.period());
        *slot = Some(interval);
        true
    }

    /// Request that a job be started.
    ///
    /// If a request for the same job name is already pending or in flight,
    /// its handle is returned and `request` is dropped.
    pub fn request_start(&self, request: StartRequest<I>) -> StartHandle<T, F> {
        let key = request.job_name.clone();
        self.inner.pool.find_or_add_request(key, request)
    }

    /// Handle to the live start request for `job_name`, if any.
    pub fn find_start_request(&self, job_name: &str) -> Option<StartHandle<T, F>> {
        self.inner.pool.find_request(job_name)
    }

    /// Run one drain pass now, under the same guards as a timer tick.
    ///
    /// Returns the number of requests processed.
    pub async fn tick(&self) -> usize {
        self.inner.tick().await
    }

    /// Run the stop sequence: stop ticking, close the gate, reject waiters.
    ///
    /// Idempotent. A start call already in flight is not cancelled.
    pub fn shutdown(&self) {
        self.inner.shutdown();
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SchedulerState {
        self.inner.state()
    }

    /// Job names waiting for a drain pass, in drain order.
    pub fn pending_jobs(&self) -> Vec<String> {
        self.inner.pool.pending_keys()
    }

    /// Whether a transient failure is currently pausing all starts.
    pub fn is_cooling_down(&self) -> bool {
        self.inner.cooldown.is_cooling()
    }

    /// Active configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.inner.config
    }
}
