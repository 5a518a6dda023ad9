//! # Prometheus Start Scheduler
//!
//! A single-flight, cooldown-aware scheduler for starting remote jobs.
//!
//! Callers ask for a job to be started by name. Concurrent requests for the
//! same name share one start attempt and all observe its result. A periodic
//! drain starts pending jobs one at a time, so at most one start call is in
//! flight per scheduler.
//!
//! ## Core Problem Solved
//!
//! Remote job platforms refuse new runs when an account is out of memory or
//! compute. Firing starts blindly turns one capacity shortfall into a burst
//! of failures. This crate:
//!
//! - **Deduplicates** start requests by job name
//! - **Serializes** start calls through an exclusive drain
//! - **Pauses** every pending start for a cooldown window after a transient
//!   resource failure, then retries the same request
//! - **Releases** every waiter when the host shuts down
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use prometheus_start_scheduler::builders::SchedulerBuilder;
//! use prometheus_start_scheduler::config::SchedulerConfig;
//! use prometheus_start_scheduler::core::StartRequest;
//! use prometheus_start_scheduler::runtime::{CtrlCShutdown, TokioSpawner};
//!
//! let spawner = TokioSpawner::current()?;
//! let shutdown = CtrlCShutdown::new(spawner.clone());
//! let scheduler = SchedulerBuilder::new(SchedulerConfig::from_env()?, starter, classifier)
//!     .build(&spawner, &shutdown)?;
//!
//! let run = scheduler
//!     .request_start(StartRequest::new("crawl-docs", input))
//!     .wait()
//!     .await?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling abstractions: guards, promises, the request pool and the scheduler.
pub mod core;
/// Configuration models for scheduler timing and retry policy.
pub mod config;
/// Builders to construct schedulers from configuration.
pub mod builders;
/// Runtime adapters: task spawning and host shutdown signals.
pub mod runtime;
/// Shared utilities.
pub mod util;
