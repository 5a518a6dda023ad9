//! Benchmarks for the job-start scheduler.
//!
//! Benchmarks cover:
//! - Request registration and deduplication
//! - Guard chain admission
//! - Draining a pool of pending start requests
//! - End-to-end manual ticks through a scheduler

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::sync::Arc;

use prometheus_start_scheduler::config::SchedulerConfig;
use prometheus_start_scheduler::core::{
    synchronized_attempt, ErrorClass, ErrorClassifier, Guard, JobStarter, NoopObserver,
    ProcessOutcome, RequestPool, RequestProcessor, Scheduler, StartOptions, StartRequest,
    TryCooldown, TryGate, TryLock,
};
use prometheus_start_scheduler::runtime::ManualShutdown;

use async_trait::async_trait;
use std::time::Duration;
use tokio::runtime::Runtime;

// ============================================================================
// Bench Collaborators
// ============================================================================

struct BenchProcessor;

#[async_trait]
impl RequestProcessor<u64, String, String> for BenchProcessor {
    async fn process(&self, data: &u64) -> ProcessOutcome<String, String> {
        ProcessOutcome::Success(format!("run-{data}"))
    }
}

struct BenchStarter;

#[async_trait]
impl JobStarter<u64, String, String> for BenchStarter {
    async fn start(&self, input: &u64, _options: &StartOptions) -> Result<String, String> {
        Ok(format!("run-{input}"))
    }
}

struct BenchClassifier;

#[async_trait]
impl ErrorClassifier<String, String> for BenchClassifier {
    async fn classify(&self, error: String) -> ErrorClass<String> {
        ErrorClass::Other(error)
    }
}

fn filled_pool(size: u64) -> RequestPool<u64, String, String> {
    let pool = RequestPool::without_observer();
    for i in 0..size {
        let _ = pool.find_or_add_request(format!("job-{i}"), i);
    }
    pool
}

// ============================================================================
// Pool Benchmarks
// ============================================================================

fn bench_pool_register(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_register");

    for size in [100, 1_000, 10_000] {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| black_box(filled_pool(size)));
        });
    }
    group.finish();
}

fn bench_pool_dedupe(c: &mut Criterion) {
    let pool = filled_pool(1_000);
    c.bench_function("pool_dedupe_hit", |b| {
        b.iter(|| black_box(pool.find_or_add_request("job-500", 500)));
    });
}

fn bench_pool_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_drain");

    for size in [100, 1_000] {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.to_async(Runtime::new().unwrap()).iter(|| async move {
                let pool = filled_pool(size);
                let gate = TryGate::new();
                let lock = TryLock::new();
                let cooldown = TryCooldown::new(Duration::from_secs(30));
                let guards: [&dyn Guard; 3] = [&gate, &lock, &cooldown];
                let processed = pool
                    .attempt_processing_all_requests(&BenchProcessor, &guards)
                    .await;
                black_box(processed);
            });
        });
    }
    group.finish();
}

// ============================================================================
// Guard Benchmarks
// ============================================================================

fn bench_guard_chain(c: &mut Criterion) {
    let gate = TryGate::new();
    let lock = TryLock::new();
    let cooldown = TryCooldown::new(Duration::from_secs(30));

    c.bench_function("guard_chain_admit", |b| {
        b.to_async(Runtime::new().unwrap()).iter(|| async {
            let guards: [&dyn Guard; 3] = [&gate, &lock, &cooldown];
            black_box(synchronized_attempt(|| async { 1_u8 }, &guards).await);
        });
    });
}

// ============================================================================
// End-to-End Benchmarks
// ============================================================================

fn bench_scheduler_tick(c: &mut Criterion) {
    c.bench_function("scheduler_tick_100_jobs", |b| {
        b.to_async(Runtime::new().unwrap()).iter(|| async {
            let shutdown = ManualShutdown::new();
            let scheduler: Scheduler<u64, String, String, String> = Scheduler::new(
                SchedulerConfig::default(),
                Arc::new(BenchStarter),
                Arc::new(BenchClassifier),
                Arc::new(NoopObserver),
                &shutdown,
            );
            let handles: Vec<_> = (0..100)
                .map(|i| scheduler.request_start(StartRequest::new(format!("job-{i}"), i)))
                .collect();
            black_box(scheduler.tick().await);
            black_box(handles);
        });
    });
}

criterion_group!(pool_benches, bench_pool_register, bench_pool_dedupe, bench_pool_drain);
criterion_group!(guard_benches, bench_guard_chain);
criterion_group!(scheduler_benches, bench_scheduler_tick);
criterion_main!(pool_benches, guard_benches, scheduler_benches);
