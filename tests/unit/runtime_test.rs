//! Tests for runtime adapters

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use prometheus_start_scheduler::core::Spawn;
use prometheus_start_scheduler::runtime::{ManualShutdown, ShutdownSignal, TokioSpawner};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tokio_spawner_spawn() {
    let spawner = TokioSpawner::new(tokio::runtime::Handle::current());

    let (tx, rx) = tokio::sync::oneshot::channel();
    spawner.spawn(async move {
        tx.send(123).unwrap();
    });

    let result = rx.await.expect("oneshot result");
    assert_eq!(result, 123);
}

#[test]
fn test_manual_shutdown_clones_share_state() {
    let shutdown = ManualShutdown::new();
    let observer = shutdown.clone();
    let ran = Arc::new(AtomicBool::new(false));

    let flag = Arc::clone(&ran);
    observer.subscribe(Box::new(move || flag.store(true, Ordering::SeqCst)));
    shutdown.fire();

    assert!(observer.is_fired());
    assert!(ran.load(Ordering::SeqCst));
}
