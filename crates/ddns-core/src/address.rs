//! The set of addresses resolved during one update cycle

use std::fmt;
use std::net::IpAddr;

/// Addresses resolved for a single tick, in resolution order
///
/// Holds zero, one, or two addresses (IPv4 first, then IPv6). A fresh set is
/// built every cycle and dropped once the update has been sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedAddresses {
    addresses: Vec<IpAddr>,
}

impl ResolvedAddresses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an address, ignoring exact duplicates
    pub fn push(&mut self, ip: IpAddr) {
        if !self.addresses.contains(&ip) {
            self.addresses.push(ip);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IpAddr> {
        self.addresses.iter()
    }

    pub fn as_slice(&self) -> &[IpAddr] {
        &self.addresses
    }

    /// Comma-joined canonical string forms, e.g. `203.0.113.7,2001:db8::1`
    pub fn joined(&self) -> String {
        self.addresses
            .iter()
            .map(IpAddr::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl From<Vec<IpAddr>> for ResolvedAddresses {
    fn from(ips: Vec<IpAddr>) -> Self {
        ips.into_iter().collect()
    }
}

impl FromIterator<IpAddr> for ResolvedAddresses {
    fn from_iter<T: IntoIterator<Item = IpAddr>>(iter: T) -> Self {
        let mut set = Self::new();
        for ip in iter {
            set.push(ip);
        }
        set
    }
}

impl fmt::Display for ResolvedAddresses {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}
