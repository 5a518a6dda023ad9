//! Tests for audit sink

use prometheus_start_scheduler::core::{build_audit_event, AuditSink, InMemoryAuditSink};

#[test]
fn test_in_memory_audit_sink() {
    let mut sink = InMemoryAuditSink::new(10);

    let event = build_audit_event("crawl-docs", "added", Some("payload".to_string()));
    sink.record(event.clone());
    assert_eq!(sink.events().len(), 1);

    let events = sink.events();
    assert_eq!(events[0], event);
    assert_eq!(events[0].job_name, "crawl-docs");
    assert_eq!(events[0].action, "added");
    assert!(events[0].created_at_ms > 0);
}

#[test]
fn test_audit_sink_overflow() {
    let mut sink = InMemoryAuditSink::new(2);
    sink.record(build_audit_event("a", "added", None));
    sink.record(build_audit_event("b", "added", None));
    sink.record(build_audit_event("a", "success", None));

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].job_name, "b");
    assert_eq!(sink.actions_for("a"), vec!["success"]);
}

#[test]
fn test_zero_capacity_sink_drops_events() {
    let mut sink = InMemoryAuditSink::new(0);
    sink.record(build_audit_event("a", "added", None));
    assert!(sink.events().is_empty());
}
