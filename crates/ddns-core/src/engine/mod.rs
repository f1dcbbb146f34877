//! Core DDNS engine
//!
//! The DdnsEngine is responsible for:
//! - Running one update cycle immediately, then once per interval
//! - Resolving the current external addresses via every IpSource
//! - Sending the resolved set to the DnsProvider
//! - Logging (never propagating) per-cycle failures
//!
//! ## Architecture
//!
//! ```text
//!  ┌──────────────┐
//!  │   interval   │─── tick ───┐
//!  └──────────────┘            │
//!                              ▼
//!                     ┌──────────────┐
//!                     │  DdnsEngine  │
//!                     └──────────────┘
//!                              │
//!         ┌────────────────────┼────────────────────┐
//!         │                    │                    │
//!         ▼                    ▼                    ▼
//!  ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//!  │ IpSource(s) │     │ DnsProvider  │     │   Events    │
//!  │ (resolve)   │     │ (update)     │     │  (notify)   │
//!  └─────────────┘     └──────────────┘     └─────────────┘
//! ```
//!
//! ## Cycle Flow
//!
//! 1. Tick fires (the first one immediately)
//! 2. Ask each IpSource for its address; failures are logged and skipped
//! 3. No address at all: log and wait for the next tick
//! 4. Otherwise call DnsProvider::update_record() with every address
//! 5. Log the provider's raw response, or the failure
//!
//! Every tick sends an update, even when the addresses did not change.

use std::future::Future;
use std::net::IpAddr;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::IntervalStream;
use tracing::{debug, error, info, warn};

use crate::address::ResolvedAddresses;
use crate::config::DdnsConfig;
use crate::error::{Error, Result};
use crate::traits::{DnsProvider, IpSource, IpVersion, UpdateResult};

/// Events emitted by the DdnsEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Engine started
    Started {
        hostname: String,
        interval: Duration,
    },

    /// An IP source produced an address
    AddressResolved {
        source: &'static str,
        ip: IpAddr,
    },

    /// An IP source failed this cycle
    ResolutionFailed {
        source: &'static str,
        error: String,
    },

    /// No address was resolved, the update was not sent
    CycleSkipped,

    /// The provider replied
    UpdateSucceeded {
        hostname: String,
        addresses: Vec<IpAddr>,
        response: String,
    },

    /// The update request could not be built or sent
    UpdateFailed {
        hostname: String,
        error: String,
    },

    /// Engine stopped
    Stopped {
        reason: String,
    },
}

/// What a single update cycle did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Nothing resolved, provider not called
    Skipped,

    /// Provider called and replied
    Updated {
        addresses: ResolvedAddresses,
        result: UpdateResult,
    },

    /// Provider called but the request failed
    Failed {
        addresses: ResolvedAddresses,
        error: String,
    },
}

/// Core DDNS engine
///
/// The engine owns the IP sources, the provider, and the immutable settings
/// taken from [`DdnsConfig`]. It runs strictly sequentially: resolve, update,
/// wait for the next tick.
///
/// ## Lifecycle
///
/// 1. Create with [`DdnsEngine::new()`]
/// 2. Start with [`DdnsEngine::run()`] or [`DdnsEngine::run_until()`]
/// 3. Engine runs until the shutdown signal completes
///
/// Shutdown is checked between cycles; a cycle in progress always finishes.
pub struct DdnsEngine {
    /// Address sources, queried in order every cycle
    ip_sources: Vec<Box<dyn IpSource>>,

    /// DNS provider for sending updates
    provider: Box<dyn DnsProvider>,

    /// Hostname to update
    hostname: String,

    /// Time between cycles
    interval: Duration,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl DdnsEngine {
    /// Create a new DDNS engine
    ///
    /// # Parameters
    ///
    /// - `ip_sources`: IP sources, queried in this order every cycle
    /// - `provider`: DNS provider implementation
    /// - `config`: DDNS configuration
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events
    pub fn new(
        ip_sources: Vec<Box<dyn IpSource>>,
        provider: Box<dyn DnsProvider>,
        config: &DdnsConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        if ip_sources.is_empty() {
            return Err(Error::config("At least one IP source is required"));
        }

        let (tx, rx) = mpsc::channel(config.engine.event_channel_capacity);

        let engine = Self {
            ip_sources,
            provider,
            hostname: config.hostname.clone(),
            interval: config.interval,
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Run the engine until Ctrl-C
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Clean shutdown
    pub async fn run(&self) -> Result<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for Ctrl-C, running until killed");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run the engine until `shutdown` completes
    ///
    /// The first cycle starts immediately and always completes, even when
    /// `shutdown` is already resolved. `shutdown` is only observed while
    /// waiting for the next tick.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        self.emit_event(EngineEvent::Started {
            hostname: self.hostname.clone(),
            interval: self.interval,
        });
        info!(
            hostname = %self.hostname,
            interval = %humantime::format_duration(self.interval),
            sources = self.ip_sources.len(),
            provider = self.provider.provider_name(),
            "DDNS engine started"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticks = IntervalStream::new(ticker);

        // The first tick completes immediately; its cycle runs before
        // shutdown is ever observed.
        ticks.next().await;
        self.run_cycle().await;

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    self.emit_event(EngineEvent::Stopped {
                        reason: "Shutdown signal".to_string(),
                    });
                    break;
                }

                Some(_) = ticks.next() => {
                    self.run_cycle().await;
                }
            }
        }

        info!("DDNS engine stopped");
        Ok(())
    }

    /// Run a single update cycle
    ///
    /// Never fails: every error is logged, reported as an event, and folded
    /// into the returned outcome.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let addresses = self.resolve_addresses().await;

        if addresses.is_empty() {
            error!(hostname = %self.hostname, "No external address resolved, skipping update");
            self.emit_event(EngineEvent::CycleSkipped);
            return CycleOutcome::Skipped;
        }

        debug!(hostname = %self.hostname, myip = %addresses, "Sending DNS update");

        match self.provider.update_record(&self.hostname, &addresses).await {
            Ok(result) => {
                info!(
                    hostname = %self.hostname,
                    myip = %addresses,
                    status = result.status,
                    response = ?result.response,
                    "DNS updated"
                );
                self.emit_event(EngineEvent::UpdateSucceeded {
                    hostname: self.hostname.clone(),
                    addresses: addresses.as_slice().to_vec(),
                    response: result.response.clone(),
                });
                CycleOutcome::Updated { addresses, result }
            }
            Err(e) => {
                error!(
                    hostname = %self.hostname,
                    provider = self.provider.provider_name(),
                    error = %e,
                    "Failed updating DNS"
                );
                self.emit_event(EngineEvent::UpdateFailed {
                    hostname: self.hostname.clone(),
                    error: e.to_string(),
                });
                CycleOutcome::Failed {
                    addresses,
                    error: e.to_string(),
                }
            }
        }
    }

    /// Ask every IP source for its current address
    ///
    /// Sources are independent: one failing does not stop the others.
    pub async fn resolve_addresses(&self) -> ResolvedAddresses {
        let mut addresses = ResolvedAddresses::new();

        for source in &self.ip_sources {
            let name = source.source_name();

            match source.current().await {
                Ok(ip) => {
                    if let Some(expected) = source.version()
                        && expected != IpVersion::of(&ip)
                    {
                        warn!(source = name, ip = %ip, "IP source returned unexpected address family");
                    }

                    debug!(source = name, ip = %ip, "Resolved external address");
                    self.emit_event(EngineEvent::AddressResolved { source: name, ip });
                    addresses.push(ip);
                }
                Err(e) => {
                    error!(source = name, error = %e, "Failed getting external address");
                    self.emit_event(EngineEvent::ResolutionFailed {
                        source: name,
                        error: e.to_string(),
                    });
                }
            }
        }

        addresses
    }

    /// Emit an engine event
    ///
    /// # Parameters
    ///
    /// - `event`: The event to emit
    fn emit_event(&self, event: EngineEvent) {
        if let Err(mpsc::error::TrySendError::Full(_)) = self.event_tx.try_send(event) {
            warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
        }
    }

    /// Run the engine with an optional programmatic shutdown signal
    ///
    /// With `None` this behaves like [`DdnsEngine::run()`]. With a receiver,
    /// the engine stops when the sender fires or is dropped.
    pub async fn run_with_shutdown(&self, shutdown_rx: Option<oneshot::Receiver<()>>) -> Result<()> {
        match shutdown_rx {
            Some(rx) => {
                self.run_until(async move {
                    let _ = rx.await;
                })
                .await
            }
            None => self.run().await,
        }
    }
}
