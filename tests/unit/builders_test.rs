//! Tests for builder modules

use std::sync::Arc;

use async_trait::async_trait;
use prometheus_start_scheduler::builders::SchedulerBuilder;
use prometheus_start_scheduler::config::SchedulerConfig;
use prometheus_start_scheduler::core::{
    ErrorClass, ErrorClassifier, JobStarter, SchedulerError, SchedulerState, StartOptions,
};
use prometheus_start_scheduler::runtime::{ManualShutdown, TokioSpawner};

type EchoBuilder = SchedulerBuilder<String, String, String, String>;

struct Echo;

#[async_trait]
impl JobStarter<String, String, String> for Echo {
    async fn start(&self, input: &String, _options: &StartOptions) -> Result<String, String> {
        Ok(input.clone())
    }
}

struct Opaque;

#[async_trait]
impl ErrorClassifier<String, String> for Opaque {
    async fn classify(&self, error: String) -> ErrorClass<String> {
        ErrorClass::Other(error)
    }
}

#[test]
fn test_scheduler_builder_keeps_config() {
    let builder = EchoBuilder::new(SchedulerConfig::default(), Arc::new(Echo), Arc::new(Opaque));
    assert_eq!(builder.config(), &SchedulerConfig::default());
}

#[tokio::test]
async fn test_scheduler_builder_invalid_config() {
    let config = SchedulerConfig {
        cooldown_ms: 0,
        ..SchedulerConfig::default()
    };
    let result = EchoBuilder::new(config, Arc::new(Echo), Arc::new(Opaque))
        .build(&TokioSpawner::current().unwrap(), &ManualShutdown::new());
    match result {
        Err(SchedulerError::InvalidConfig(msg)) => assert!(msg.contains("cooldown_ms")),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("invalid config accepted"),
    }
}

#[tokio::test]
async fn test_scheduler_builder_subscribes_to_shutdown() {
    let shutdown = ManualShutdown::new();
    let scheduler = EchoBuilder::new(SchedulerConfig::default(), Arc::new(Echo), Arc::new(Opaque))
        .build(&TokioSpawner::current().unwrap(), &shutdown)
        .unwrap();
    assert_eq!(scheduler.state(), SchedulerState::Running);

    shutdown.fire();
    assert_eq!(scheduler.state(), SchedulerState::Stopped);
}
