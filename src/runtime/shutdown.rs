//! Host shutdown notification sources.
//!
//! A scheduler subscribes once at construction; when the source fires, the
//! hook runs the scheduler's stop sequence.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::Spawn;

/// One-shot callback run when the host asks the process to stop.
pub type ShutdownHook = Box<dyn FnOnce() + Send + 'static>;

/// Source of the host's shutdown notification.
pub trait ShutdownSignal: Send + Sync {
    /// Register `hook` to run once when shutdown is requested.
    fn subscribe(&self, hook: ShutdownHook);
}

#[derive(Default)]
struct ManualState {
    fired: bool,
    hooks: Vec<ShutdownHook>,
}

/// Shutdown source fired explicitly by the embedding host.
///
/// Hooks subscribed after [`fire`](Self::fire) run immediately.
#[derive(Clone, Default)]
pub struct ManualShutdown {
    state: Arc<Mutex<ManualState>>,
}

impl ManualShutdown {
    /// Create an unfired source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every subscribed hook. Later calls do nothing.
    pub fn fire(&self) {
        let hooks = {
            let mut state = self.state.lock();
            if state.fired {
                return;
            }
            state.fired = true;
            std::mem::take(&mut state.hooks)
        };
        tracing::info!("shutdown requested, running {} hook(s)", hooks.len());
        for hook in hooks {
            hook();
        }
    }

    /// Whether [`fire`](Self::fire) has been called.
    pub fn is_fired(&self) -> bool {
        self.state.lock().fired
    }
}

impl ShutdownSignal for ManualShutdown {
    fn subscribe(&self, hook: ShutdownHook) {
        let mut state = self.state.lock();
        if state.fired {
            drop(state);
            hook();
            return;
        }
        state.hooks.push(hook);
    }
}

/// Shutdown source that fires on Ctrl-C (SIGINT).
#[derive(Debug, Clone)]
pub struct CtrlCShutdown<S> {
    spawner: S,
}

impl<S> CtrlCShutdown<S> {
    /// Listen for Ctrl-C on tasks spawned by `spawner`.
    pub const fn new(spawner: S) -> Self {
        Self { spawner }
    }
}

impl<S: Spawn + Send + Sync> ShutdownSignal for CtrlCShutdown<S> {
    fn subscribe(&self, hook: ShutdownHook) {
        self.spawner.spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("received Ctrl-C, shutting down");
                    hook();
                }
                Err(e) => tracing::error!("failed to listen for Ctrl-C: {}", e),
            }
        });
    }
}
