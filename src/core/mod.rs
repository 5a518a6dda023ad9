//! Core scheduling abstractions: outcomes, promises, guards, the request pool
//! and the job-start scheduler that composes them.

pub mod audit;
pub mod error;
pub mod guard;
pub mod interval;
pub mod job;
pub mod observer;
pub mod outcome;
pub mod promise;
pub mod request_pool;
pub mod scheduled_request;
pub mod scheduler;

pub use audit::{build_audit_event, AuditEvent, AuditObserver, AuditSink, InMemoryAuditSink};
pub use error::{AppResult, SchedulerError, StartError};
pub use guard::{synchronized_attempt, Guard, Permit, TryCooldown, TryGate, TryLock};
pub use interval::{Interval, Spawn};
pub use job::{ErrorClass, ErrorClassifier, JobStarter, StartOptions, StartRequest};
pub use observer::{LoggingObserver, NoopObserver, RequestObserver};
pub use outcome::{ProcessOutcome, SyncOutcome};
pub use promise::{RequestHandle, SettlablePromise};
pub use request_pool::RequestPool;
pub use scheduled_request::{RequestCallbacks, RequestProcessor, RequestStatus, ScheduledRequest};
pub use scheduler::{Scheduler, SchedulerState, StartHandle, StartObserver};
