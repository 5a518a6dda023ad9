//! Tests for error types

use prometheus_start_scheduler::core::{SchedulerError, StartError};

#[test]
fn test_invalid_config_error() {
    let err = SchedulerError::InvalidConfig("cooldown_ms must be greater than 0".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid configuration: cooldown_ms must be greater than 0"
    );
}

#[test]
fn test_runtime_error() {
    let err = SchedulerError::Runtime("no reactor running".to_string());
    assert_eq!(format!("{}", err), "runtime unavailable: no reactor running");
}

#[test]
fn test_start_error_messages() {
    let failed: StartError<String> = StartError::Failed("quota exceeded".to_string());
    assert_eq!(format!("{}", failed), "job start failed: quota exceeded");
    assert_eq!(format!("{}", StartError::<String>::Stopped), "scheduler stopped");
    assert_eq!(
        format!("{}", StartError::<String>::Internal("boom".to_string())),
        "internal error: boom"
    );
}

#[test]
fn test_start_error_is_stopped() {
    assert!(StartError::<String>::Stopped.is_stopped());
    assert!(!StartError::Failed("x".to_string()).is_stopped());
}

#[test]
fn test_start_error_converts_to_anyhow() {
    let err: anyhow::Error = StartError::Failed("quota exceeded".to_string()).into();
    assert!(err.to_string().contains("quota exceeded"));
}
