//! Core traits for the DDNS client
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`IpSource`]: Discover the current external address
//! - [`DnsProvider`]: Push addresses to a provider's update endpoint

pub mod ip_source;
pub mod dns_provider;

pub use ip_source::{IpSource, IpVersion};
pub use dns_provider::{DnsProvider, UpdateResult};
