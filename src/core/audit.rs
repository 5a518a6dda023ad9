//! Audit trail for start-request lifecycle events.
//!
//! [`AuditObserver`] plugs into a scheduler as its observer and records one
//! [`AuditEvent`] per lifecycle transition into an [`AuditSink`].

use std::collections::VecDeque;
use std::fmt;

use parking_lot::{Mutex, MutexGuard};

use crate::core::RequestObserver;
use crate::util::clock::now_ms;

/// Audit event structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Event identifier.
    pub event_id: String,
    /// Job name the event belongs to.
    pub job_name: String,
    /// Action taken (added, success, failure, retry).
    pub action: String,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
    /// Additional context, e.g. a failure or retry reason.
    pub payload: Option<String>,
}

/// Audit sink abstraction.
pub trait AuditSink: Send {
    /// Record an audit event.
    fn record(&mut self, event: AuditEvent);
}

/// In-memory audit sink for testing and dev.
#[derive(Debug)]
pub struct InMemoryAuditSink {
    events: VecDeque<AuditEvent>,
    max_events: usize,
}

impl InMemoryAuditSink {
    /// Create a new in-memory sink with a bounded buffer.
    pub fn new(max_events: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_events),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.iter().cloned().collect()
    }

    /// Actions recorded for `job_name`, oldest first.
    pub fn actions_for(&self, job_name: &str) -> Vec<String> {
        self.events
            .iter()
            .filter(|event| event.job_name == job_name)
            .map(|event| event.action.clone())
            .collect()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&mut self, event: AuditEvent) {
        if self.max_events == 0 {
            return;
        }
        if self.events.len() >= self.max_events {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

/// Helper to build an audit event with a fresh id and the current time.
pub fn build_audit_event(
    job_name: impl Into<String>,
    action: impl Into<String>,
    payload: Option<String>,
) -> AuditEvent {
    AuditEvent {
        event_id: uuid::Uuid::new_v4().to_string(),
        job_name: job_name.into(),
        action: action.into(),
        created_at_ms: now_ms(),
        payload,
    }
}

/// Observer that records every lifecycle event into a sink.
#[derive(Debug)]
pub struct AuditObserver<S> {
    sink: Mutex<S>,
}

impl<S: AuditSink> AuditObserver<S> {
    /// Record into `sink`.
    pub fn new(sink: S) -> Self {
        Self {
            sink: Mutex::new(sink),
        }
    }

    /// Lock the sink, e.g. to read recorded events.
    pub fn sink(&self) -> MutexGuard<'_, S> {
        self.sink.lock()
    }

    fn record(&self, job_name: &str, action: &str, payload: Option<String>) {
        self.sink
            .lock()
            .record(build_audit_event(job_name, action, payload));
    }
}

impl<S, Req, Res, Err> RequestObserver<Req, Res, Err> for AuditObserver<S>
where
    S: AuditSink,
    Err: fmt::Display,
{
    fn on_request_added(&self, key: &str, _data: &Req) {
        self.record(key, "added", None);
    }

    fn on_request_success(&self, key: &str, _result: &Res) {
        self.record(key, "success", None);
    }

    fn on_request_failure(&self, key: &str, error: &Err) {
        self.record(key, "failure", Some(error.to_string()));
    }

    fn on_request_retried(&self, key: &str, reason: &str) {
        self.record(key, "retry", Some(reason.to_owned()));
    }
}
