//! Admission guards and their composition.
//!
//! A guard either admits a critical section or refuses it with a reason.
//! Admission hands out a [`Permit`]; dropping the permit undoes whatever the
//! guard did on entry, so the section is released even if it panics.
//!
//! - [`TryGate`]: admits while open; closing is permanent.
//! - [`TryLock`]: admits one section at a time.
//! - [`TryCooldown`]: refuses for a fixed window after [`TryCooldown::activate`].
//!
//! [`synchronized_attempt`] chains guards in order. The first guard that
//! refuses short-circuits the chain, so later guards are never consulted.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

use super::SyncOutcome;

/// Admission token returned by [`Guard::try_enter`].
#[must_use = "dropping a permit releases the guard immediately"]
#[derive(Debug)]
pub struct Permit<'a> {
    release: Option<&'a AtomicBool>,
}

impl<'a> Permit<'a> {
    /// A permit with nothing to release on drop.
    pub const fn free() -> Self {
        Self { release: None }
    }

    /// A permit that clears `flag` on drop.
    pub const fn releasing(flag: &'a AtomicBool) -> Self {
        Self {
            release: Some(flag),
        }
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        if let Some(flag) = self.release.take() {
            flag.store(false, Ordering::Release);
        }
    }
}

/// Common contract for admission guards.
pub trait Guard: Send + Sync {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Try to admit a critical section.
    ///
    /// Returns the reason on refusal. A refusal must leave the guard's state
    /// untouched.
    fn try_enter(&self) -> Result<Permit<'_>, String>;
}

/// Run `section` only if every guard admits it, in order.
///
/// Permits are released innermost-first after the section finishes.
pub async fn synchronized_attempt<F, Fut, T>(section: F, guards: &[&dyn Guard]) -> SyncOutcome<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = T>,
{
    let mut permits = Vec::with_capacity(guards.len());
    for guard in guards {
        match guard.try_enter() {
            Ok(permit) => permits.push(permit),
            Err(reason) => {
                tracing::trace!("guard {} blocked attempt: {}", guard.name(), reason);
                release_in_reverse(permits);
                return SyncOutcome::Blocked(reason);
            }
        }
    }

    let value = section().await;
    release_in_reverse(permits);
    SyncOutcome::Executed(value)
}

fn release_in_reverse(mut permits: Vec<Permit<'_>>) {
    while let Some(permit) = permits.pop() {
        drop(permit);
    }
}

/// Gate that admits while open and closes for good.
#[derive(Debug)]
pub struct TryGate {
    open: AtomicBool,
}

impl TryGate {
    /// Create an open gate.
    pub const fn new() -> Self {
        Self {
            open: AtomicBool::new(true),
        }
    }

    /// Close the gate. Returns true only for the call that closed it.
    pub fn close(&self) -> bool {
        self.open.swap(false, Ordering::AcqRel)
    }

    /// Whether the gate still admits sections.
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Run `section` if the gate is open.
    pub async fn attempt<F, Fut, T>(&self, section: F) -> SyncOutcome<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        synchronized_attempt(section, &[self as &dyn Guard]).await
    }
}

impl Default for TryGate {
    fn default() -> Self {
        Self::new()
    }
}

impl Guard for TryGate {
    fn name(&self) -> &'static str {
        "gate"
    }

    fn try_enter(&self) -> Result<Permit<'_>, String> {
        if self.is_open() {
            Ok(Permit::free())
        } else {
            Err("gate is closed".into())
        }
    }
}

/// Non-blocking mutual exclusion: a busy lock refuses instead of waiting.
#[derive(Debug)]
pub struct TryLock {
    locked: AtomicBool,
}

impl TryLock {
    /// Create a free lock.
    pub const fn new() -> Self {
        Self {
            locked: AtomicBool::new(false),
        }
    }

    /// Whether a section currently holds the lock.
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    /// Run `section` if the lock is free.
    pub async fn attempt<F, Fut, T>(&self, section: F) -> SyncOutcome<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        synchronized_attempt(section, &[self as &dyn Guard]).await
    }
}

impl Default for TryLock {
    fn default() -> Self {
        Self::new()
    }
}

impl Guard for TryLock {
    fn name(&self) -> &'static str {
        "lock"
    }

    fn try_enter(&self) -> Result<Permit<'_>, String> {
        self.locked
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Permit::releasing(&self.locked))
            .map_err(|_| "lock is busy".to_string())
    }
}

/// Refuses admission for a fixed window after each activation.
#[derive(Debug)]
pub struct TryCooldown {
    cooldown: Duration,
    until: Mutex<Option<Instant>>,
}

impl TryCooldown {
    /// Create an idle cooldown with the given window length.
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            until: Mutex::new(None),
        }
    }

    /// Start (or restart) the cooldown window from now.
    pub fn activate(&self) {
        *self.until.lock() = Some(Instant::now() + self.cooldown);
    }

    /// Window length.
    pub const fn duration(&self) -> Duration {
        self.cooldown
    }

    /// Time left in the current window, if one is active.
    pub fn remaining(&self) -> Option<Duration> {
        let until = (*self.until.lock())?;
        let now = Instant::now();
        (now < until).then(|| until - now)
    }

    /// Whether a window is currently active.
    pub fn is_cooling(&self) -> bool {
        self.remaining().is_some()
    }

    /// Run `section` if no window is active.
    pub async fn attempt<F, Fut, T>(&self, section: F) -> SyncOutcome<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        synchronized_attempt(section, &[self as &dyn Guard]).await
    }
}

impl Guard for TryCooldown {
    fn name(&self) -> &'static str {
        "cooldown"
    }

    fn try_enter(&self) -> Result<Permit<'_>, String> {
        let mut until = self.until.lock();
        match *until {
            Some(deadline) => {
                let now = Instant::now();
                if now < deadline {
                    return Err(format!(
                        "cooling down for another {}ms",
                        (deadline - now).as_millis()
                    ));
                }
                *until = None;
                Ok(Permit::free())
            }
            None => Ok(Permit::free()),
        }
    }
}
