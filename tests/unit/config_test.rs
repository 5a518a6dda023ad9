//! Tests for configuration validation

use prometheus_start_scheduler::config::SchedulerConfig;
use std::time::Duration;

#[test]
fn test_default_config() {
    let config = SchedulerConfig::default();
    assert_eq!(config.poll_interval_ms, 3_000);
    assert_eq!(config.cooldown_ms, 30_000);
    assert!(config.retry_enabled);
    assert!(config.validate().is_ok());
    assert_eq!(config.poll_interval(), Duration::from_secs(3));
    assert_eq!(config.cooldown(), Duration::from_secs(30));
}

#[test]
fn test_invalid_poll_interval() {
    let invalid = SchedulerConfig {
        poll_interval_ms: 0,
        ..SchedulerConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_invalid_cooldown() {
    let invalid = SchedulerConfig {
        cooldown_ms: 0,
        ..SchedulerConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_config_from_json_fills_defaults() {
    let config = SchedulerConfig::from_json_str(r#"{"cooldown_ms": 5000}"#).unwrap();
    assert_eq!(config.cooldown_ms, 5_000);
    assert_eq!(config.poll_interval_ms, 3_000);
    assert!(config.retry_enabled);
}

#[test]
fn test_config_from_json_rejects_invalid() {
    assert!(SchedulerConfig::from_json_str(r#"{"poll_interval_ms": 0}"#).is_err());
    assert!(SchedulerConfig::from_json_str("not json").is_err());
}

#[test]
fn test_config_serde_roundtrip() {
    let config = SchedulerConfig {
        poll_interval_ms: 250,
        cooldown_ms: 1_000,
        retry_enabled: false,
    };
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(SchedulerConfig::from_json_str(&json).unwrap(), config);
}
