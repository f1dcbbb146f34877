//! Test doubles and common utilities for engine contract tests
//!
//! This module provides minimal test doubles that verify scheduling and
//! error-isolation behaviour without touching the network.

#![allow(dead_code)]

use ddns_core::error::{Error, Result};
use ddns_core::traits::{DnsProvider, IpSource, IpVersion, UpdateResult};
use ddns_core::{DdnsConfig, EngineEvent, ResolvedAddresses};
use std::net::IpAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

/// An IP source that always returns the same address
pub struct StaticIpSource {
    ip: IpAddr,
    name: &'static str,
    /// Call counter for current()
    current_call_count: Arc<AtomicUsize>,
}

impl StaticIpSource {
    pub fn new(name: &'static str, ip: IpAddr) -> Self {
        Self {
            ip,
            name,
            current_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the number of times current() was called
    pub fn current_call_count(&self) -> usize {
        self.current_call_count.load(Ordering::SeqCst)
    }

    /// Create a new StaticIpSource that shares counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            ip: other.ip,
            name: other.name,
            current_call_count: Arc::clone(&other.current_call_count),
        }
    }
}

#[async_trait::async_trait]
impl IpSource for StaticIpSource {
    async fn current(&self) -> Result<IpAddr> {
        self.current_call_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.ip)
    }

    fn source_name(&self) -> &'static str {
        self.name
    }

    fn version(&self) -> Option<IpVersion> {
        Some(IpVersion::of(&self.ip))
    }
}

/// An IP source that never resolves anything
pub struct UnavailableIpSource {
    name: &'static str,
}

impl UnavailableIpSource {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

#[async_trait::async_trait]
impl IpSource for UnavailableIpSource {
    async fn current(&self) -> Result<IpAddr> {
        Err(Error::not_found(format!("{} has no address", self.name)))
    }

    fn source_name(&self) -> &'static str {
        self.name
    }
}

/// A mock DnsProvider that tracks calls
pub struct MockDnsProvider {
    /// Call counter for update_record()
    update_call_count: Arc<AtomicUsize>,
    /// Recorded (hostname, myip) pairs from update calls
    updates: Arc<std::sync::Mutex<Vec<(String, String)>>>,
    /// Fail every call instead of replying
    failing: bool,
    /// Provider name
    pub name: &'static str,
}

impl MockDnsProvider {
    pub fn new(name: &'static str) -> Self {
        Self {
            update_call_count: Arc::new(AtomicUsize::new(0)),
            updates: Arc::new(std::sync::Mutex::new(Vec::new())),
            failing: false,
            name,
        }
    }

    /// A provider whose every request fails at the transport level
    pub fn failing(name: &'static str) -> Self {
        Self {
            failing: true,
            ..Self::new(name)
        }
    }

    /// Get the number of times update_record() was called
    pub fn update_call_count(&self) -> usize {
        self.update_call_count.load(Ordering::SeqCst)
    }

    /// Get the recorded (hostname, myip) pairs
    pub fn updates(&self) -> Vec<(String, String)> {
        self.updates.lock().unwrap().clone()
    }

    /// Create a new MockDnsProvider that shares counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            update_call_count: Arc::clone(&other.update_call_count),
            updates: Arc::clone(&other.updates),
            failing: other.failing,
            name: other.name,
        }
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn update_record(
        &self,
        hostname: &str,
        addresses: &ResolvedAddresses,
    ) -> Result<UpdateResult> {
        self.update_call_count.fetch_add(1, Ordering::SeqCst);
        self.updates
            .lock()
            .unwrap()
            .push((hostname.to_string(), addresses.joined()));

        if self.failing {
            return Err(Error::provider(self.name, "connection refused"));
        }

        Ok(UpdateResult::new(200, format!("good {}", addresses.joined())))
    }

    fn provider_name(&self) -> &'static str {
        self.name
    }
}

/// Helper to create a DdnsConfig with a short interval for testing
pub fn minimal_config(hostname: &str, interval: &str) -> DdnsConfig {
    DdnsConfig::new(interval, "u", "p", hostname).expect("test config is valid")
}

/// Public IPv4 used across tests (TEST-NET-3)
pub fn test_ipv4() -> IpAddr {
    IpAddr::from([203, 0, 113, 7])
}

/// Public IPv6 used across tests (documentation prefix)
pub fn test_ipv6() -> IpAddr {
    "2001:db8::1".parse().unwrap()
}

/// Drain every event currently buffered in the channel
pub fn drain_events(rx: &mut mpsc::Receiver<EngineEvent>) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Poll `condition` until it holds or `timeout` elapses
pub async fn wait_until(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
