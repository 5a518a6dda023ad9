//! Restartable periodic driver.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::{Instant, MissedTickBehavior};

/// Abstraction for spawning task execution on a runtime.
pub trait Spawn {
    /// Spawn an async task that returns a future.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

/// Invokes an async callback every `period` until stopped.
///
/// Each invocation is spawned as its own task, so a slow callback does not
/// delay the next tick. Callers that must not overlap need their own
/// exclusion (the scheduler uses a [`TryLock`](crate::core::TryLock)).
#[derive(Debug)]
pub struct Interval {
    period: Duration,
    stopped: Arc<AtomicBool>,
    wake: Arc<Notify>,
}

impl Interval {
    /// Start ticking. The first invocation happens one `period` from now.
    pub fn start<S, F, Fut>(spawner: &S, period: Duration, callback: F) -> Self
    where
        S: Spawn + Clone + Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let period = period.max(Duration::from_millis(1));
        let stopped = Arc::new(AtomicBool::new(false));
        let wake = Arc::new(Notify::new());

        let loop_stopped = Arc::clone(&stopped);
        let loop_wake = Arc::clone(&wake);
        let tick_spawner = spawner.clone();
        spawner.spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    () = loop_wake.notified() => break,
                }
                if loop_stopped.load(Ordering::Acquire) {
                    break;
                }
                tick_spawner.spawn(callback());
            }
            tracing::debug!("interval loop exited");
        });

        Self {
            period,
            stopped,
            wake,
        }
    }

    /// Stop ticking. Returns true only for the call that stopped it.
    pub fn stop(&self) -> bool {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.wake.notify_one();
        true
    }

    /// Whether [`stop`](Self::stop) has been called.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Tick period.
    pub const fn period(&self) -> Duration {
        self.period
    }
}

impl Drop for Interval {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::TokioSpawner;
    use std::sync::atomic::AtomicUsize;

    fn counting_interval(period: Duration) -> (Interval, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let ticks = Arc::clone(&count);
        let interval = Interval::start(&TokioSpawner::current().unwrap(), period, move || {
            let ticks = Arc::clone(&ticks);
            async move {
                ticks.fetch_add(1, Ordering::SeqCst);
            }
        });
        (interval, count)
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_on_period() {
        let (interval, count) = counting_interval(Duration::from_millis(100));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(!interval.is_stopped());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent_and_final() {
        let (interval, count) = counting_interval(Duration::from_millis(100));
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        assert!(interval.stop());
        assert!(!interval.stop());
        assert!(interval.is_stopped());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
