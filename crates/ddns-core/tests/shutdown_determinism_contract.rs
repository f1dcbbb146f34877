//! Contract Test: Shutdown Determinism
//!
//! This test verifies that shutdown is deterministic and complete.
//!
//! Constraints verified:
//! - Engine terminates on shutdown signal
//! - A cycle in progress finishes before the engine exits
//! - A dropped shutdown sender also stops the engine
//! - The Stopped event is emitted exactly once

mod common;

use common::*;
use ddns_core::traits::{DnsProvider, UpdateResult};
use ddns_core::{DdnsEngine, EngineEvent, ResolvedAddresses};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[tokio::test]
async fn shutdown_signal_terminates_engine() {
    let config = minimal_config("host.example.com", "1h");

    let (engine, mut event_rx) = DdnsEngine::new(
        vec![Box::new(StaticIpSource::new("http", test_ipv4()))],
        Box::new(MockDnsProvider::new("test")),
        &config,
    )
    .expect("engine construction succeeds");

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let engine_handle = tokio::spawn(async move {
        engine.run_with_shutdown(Some(shutdown_rx)).await
    });

    // Wait for startup
    tokio::time::sleep(Duration::from_millis(50)).await;

    let shutdown_result = shutdown_tx.send(());
    assert!(shutdown_result.is_ok(), "shutdown signal send succeeds");

    let result = tokio::time::timeout(Duration::from_secs(5), engine_handle).await;
    assert!(result.is_ok(), "Engine should terminate within 5 seconds");

    let engine_result = result.unwrap().unwrap();
    assert!(
        engine_result.is_ok(),
        "Engine should shut down successfully: {:?}",
        engine_result
    );

    let events = drain_events(&mut event_rx);
    assert!(matches!(events.first(), Some(EngineEvent::Started { .. })));
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, EngineEvent::Stopped { .. }))
            .count(),
        1
    );
}

#[tokio::test]
async fn dropped_sender_terminates_engine() {
    let config = minimal_config("host.example.com", "1h");

    let (engine, _event_rx) = DdnsEngine::new(
        vec![Box::new(StaticIpSource::new("http", test_ipv4()))],
        Box::new(MockDnsProvider::new("test")),
        &config,
    )
    .expect("engine construction succeeds");

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    let engine_handle = tokio::spawn(async move {
        engine.run_with_shutdown(Some(shutdown_rx)).await
    });

    drop(shutdown_tx);

    let result = tokio::time::timeout(Duration::from_secs(5), engine_handle).await;
    assert!(result.is_ok(), "Engine should stop when the sender goes away");
}

#[tokio::test]
async fn run_until_stops_when_future_completes() {
    let provider = MockDnsProvider::new("test");
    let shared_provider = MockDnsProvider::sharing_counters_with(&provider);
    let config = minimal_config("host.example.com", "1h");

    let (engine, _event_rx) = DdnsEngine::new(
        vec![Box::new(StaticIpSource::new("http", test_ipv4()))],
        Box::new(shared_provider),
        &config,
    )
    .expect("engine construction succeeds");

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        engine.run_until(tokio::time::sleep(Duration::from_millis(100))),
    )
    .await;

    assert!(result.is_ok(), "run_until should return once its future completes");
    assert!(result.unwrap().is_ok());
    assert_eq!(provider.update_call_count(), 1);
}

#[tokio::test]
async fn shutdown_during_update_lets_cycle_finish() {
    // A provider that takes a while to answer
    struct SlowProvider {
        started: Arc<AtomicUsize>,
        finished: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl DnsProvider for SlowProvider {
        async fn update_record(
            &self,
            _hostname: &str,
            _addresses: &ResolvedAddresses,
        ) -> ddns_core::Result<UpdateResult> {
            self.started.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(200)).await;
            self.finished.fetch_add(1, Ordering::SeqCst);
            Ok(UpdateResult::new(200, "nochg 203.0.113.7"))
        }

        fn provider_name(&self) -> &'static str {
            "slow"
        }
    }

    let started = Arc::new(AtomicUsize::new(0));
    let finished = Arc::new(AtomicUsize::new(0));

    let provider = Box::new(SlowProvider {
        started: started.clone(),
        finished: finished.clone(),
    });
    let config = minimal_config("host.example.com", "1h");

    let (engine, _event_rx) = DdnsEngine::new(
        vec![Box::new(StaticIpSource::new("http", test_ipv4()))],
        provider,
        &config,
    )
    .expect("engine construction succeeds");

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let engine_handle = tokio::spawn(async move {
        engine.run_with_shutdown(Some(shutdown_rx)).await
    });

    let in_flight = wait_until(Duration::from_secs(2), || started.load(Ordering::SeqCst) == 1).await;
    assert!(in_flight, "first update should be in flight");

    // Shutdown while the update is in progress
    shutdown_tx.send(()).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), engine_handle).await;

    assert!(
        result.is_ok(),
        "Engine should terminate within 5 seconds even during update"
    );
    assert_eq!(
        finished.load(Ordering::SeqCst),
        1,
        "the in-flight cycle completes before the engine exits"
    );
}

#[tokio::test]
async fn multiple_shutdown_calls_are_safe() {
    let config = minimal_config("host.example.com", "1h");

    let (engine, _event_rx) = DdnsEngine::new(
        vec![Box::new(UnavailableIpSource::new("http"))],
        Box::new(MockDnsProvider::new("test")),
        &config,
    )
    .expect("engine construction succeeds");

    let (shutdown_tx1, shutdown_rx1) = tokio::sync::oneshot::channel();
    let (shutdown_tx2, _shutdown_rx2) = tokio::sync::oneshot::channel();

    let engine_handle = tokio::spawn(async move {
        engine.run_with_shutdown(Some(shutdown_rx1)).await
    });

    tokio::time::sleep(Duration::from_millis(50)).await;

    shutdown_tx1.send(()).unwrap();

    // Second signal goes nowhere
    let _ = shutdown_tx2.send(());

    let result = tokio::time::timeout(Duration::from_secs(5), engine_handle).await;

    assert!(result.is_ok(), "Multiple shutdown signals should not cause issues");
}
