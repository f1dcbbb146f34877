// # IP Source Trait
//
// Defines the interface for discovering the host's current external address.
//
// ## Implementations
//
// - HTTP lookup service (IPv4): `ddns-ip-http` crate
// - Local interface enumeration (IPv6): `ddns-ip-interface` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::IpSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* IpSource implementation */;
//
//     let current_ip = source.current().await?;
//     println!("{} resolved {}", source.source_name(), current_ip);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::IpAddr;

/// IP version (v4 or v6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpVersion {
    V4,
    V6,
}

impl IpVersion {
    /// The version of a concrete address
    pub fn of(ip: &IpAddr) -> Self {
        match ip {
            IpAddr::V4(_) => IpVersion::V4,
            IpAddr::V6(_) => IpVersion::V6,
        }
    }
}

/// Trait for IP source implementations
///
/// An IP source answers one question per call: what is the current external
/// address? It is queried once per update cycle by the engine.
///
/// # Rules
///
/// - One lookup per call, no retries (the next tick is the retry)
/// - No caching between calls
/// - No background tasks
///
/// Failures are returned, never panicked; the engine logs them and carries on
/// with whatever the other sources produced.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Get the current IP address
    ///
    /// # Returns
    ///
    /// - `Ok(IpAddr)`: The current external IP address
    /// - `Err(Error)`: If unable to determine it this time
    async fn current(&self) -> Result<IpAddr, crate::Error>;

    /// Short name used in logs and engine events (e.g. "http", "interface")
    fn source_name(&self) -> &'static str;

    /// Get the IP version this source targets
    ///
    /// Returns `None` if the source may yield either version.
    fn version(&self) -> Option<IpVersion> {
        None
    }
}
