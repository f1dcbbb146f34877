// # Interface IP Source
//
// This crate provides an IP source that reads the host's own network
// interfaces and picks the first globally routable IPv6 address.
//
// ## Why Interfaces
//
// IPv6 hosts usually hold their public address directly, so no outside
// lookup is needed. Everything that cannot be reached from the internet is
// skipped:
//
// | Range           | Kind                  |
// |-----------------|-----------------------|
// | `::`            | unspecified           |
// | `::1`           | loopback              |
// | `ff00::/8`      | multicast             |
// | `fc00::/7`      | unique local          |
// | `fe80::/10`     | link-local            |
// | `fec0::/10`     | site-local (obsolete) |
// | `::ffff:0:0/96` | IPv4-mapped           |
//
// IPv4 addresses on the interfaces are ignored; the HTTP source covers IPv4.

use async_trait::async_trait;
use ddns_core::traits::{IpSource, IpVersion};
use ddns_core::{Error, Result};

use std::net::{IpAddr, Ipv6Addr};

/// IP source that enumerates local interfaces for a public IPv6
#[derive(Debug, Clone, Default)]
pub struct InterfaceIpSource {
    /// Only consider this interface (e.g. "eth0")
    interface: Option<String>,
}

impl InterfaceIpSource {
    /// Consider every interface
    pub fn new() -> Self {
        Self { interface: None }
    }

    /// Only consider the named interface
    pub fn for_interface(name: impl Into<String>) -> Self {
        Self {
            interface: Some(name.into()),
        }
    }

    /// List (interface name, address) pairs from the OS
    fn interface_addresses(&self) -> Result<Vec<(String, IpAddr)>> {
        let interfaces = if_addrs::get_if_addrs()?;

        Ok(interfaces
            .into_iter()
            .filter(|iface| {
                self.interface
                    .as_deref()
                    .is_none_or(|wanted| iface.name == wanted)
            })
            .map(|iface| {
                let ip = iface.ip();
                (iface.name, ip)
            })
            .collect())
    }
}

/// Whether `ip` is reachable from the public internet
pub fn is_public_ipv6(ip: &Ipv6Addr) -> bool {
    let first = ip.segments()[0];

    !(ip.is_unspecified()
        || ip.is_loopback()
        || ip.is_multicast()
        || (first & 0xfe00) == 0xfc00
        || (first & 0xffc0) == 0xfe80
        || (first & 0xffc0) == 0xfec0
        || ip.to_ipv4_mapped().is_some())
}

/// Pick the first public IPv6 address, in enumeration order
pub fn select_public_ipv6<I>(addresses: I) -> Option<Ipv6Addr>
where
    I: IntoIterator<Item = IpAddr>,
{
    addresses.into_iter().find_map(|ip| match ip {
        IpAddr::V6(v6) if is_public_ipv6(&v6) => Some(v6),
        _ => None,
    })
}

#[async_trait]
impl IpSource for InterfaceIpSource {
    async fn current(&self) -> Result<IpAddr> {
        // Interface enumeration is a blocking syscall
        let this = self.clone();
        let addresses = tokio::task::spawn_blocking(move || this.interface_addresses())
            .await
            .map_err(|e| Error::ip_source(format!("Interface enumeration task failed: {}", e)))??;

        tracing::trace!(count = addresses.len(), "Enumerated interface addresses");

        let selected = select_public_ipv6(addresses.iter().map(|(_, ip)| *ip))
            .ok_or_else(|| Error::not_found("no public IPv6 address on any interface"))?;

        if let Some((name, _)) = addresses.iter().find(|(_, ip)| *ip == IpAddr::V6(selected)) {
            tracing::debug!(interface = %name, ip = %selected, "Selected public IPv6");
        }

        Ok(IpAddr::V6(selected))
    }

    fn source_name(&self) -> &'static str {
        "interface"
    }

    fn version(&self) -> Option<IpVersion> {
        Some(IpVersion::V6)
    }
}
