//! Configuration types for the DDNS client
//!
//! The configuration is built once at startup and handed to every component
//! that needs it. Nothing here is mutated after construction.

use std::fmt;
use std::time::Duration;

use crate::error::{Error, Result};

/// Default update interval, in the syntax accepted by [`parse_interval`]
pub const DEFAULT_INTERVAL: &str = "1h";

/// Main DDNS configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdnsConfig {
    /// Time between two update cycles
    pub interval: Duration,

    /// Provider account credentials
    pub credentials: Credentials,

    /// Hostname to point at the resolved addresses
    pub hostname: String,

    /// Resolve a public IPv6 from local interfaces
    pub ipv6: bool,

    /// Optional engine settings
    pub engine: EngineConfig,
}

impl DdnsConfig {
    /// Create a configuration from the raw values the daemon receives
    ///
    /// `interval` is a duration string such as `"1h"`, `"90s"` or `"1h 30m"`.
    /// The result is validated before it is returned.
    pub fn new(
        interval: &str,
        username: impl Into<String>,
        password: impl Into<String>,
        hostname: impl Into<String>,
    ) -> Result<Self> {
        let config = Self {
            interval: parse_interval(interval)?,
            credentials: Credentials::new(username, password),
            hostname: hostname.into(),
            ipv6: true,
            engine: EngineConfig::default(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Enable or disable IPv6 resolution
    pub fn with_ipv6(mut self, ipv6: bool) -> Self {
        self.ipv6 = ipv6;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(Error::config("Update interval must be greater than zero"));
        }

        if self.credentials.username.is_empty() {
            return Err(Error::config("Username cannot be empty"));
        }

        if self.credentials.password.is_empty() {
            return Err(Error::config("Password cannot be empty"));
        }

        validate_hostname(&self.hostname)?;

        if self.engine.event_channel_capacity == 0 {
            return Err(Error::config("Event channel capacity must be > 0"));
        }

        Ok(())
    }
}

/// Provider account credentials
///
/// The Debug implementation never exposes the password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .finish()
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Capacity of the internal event channel
    ///
    /// When full, new engine events are dropped (with a warning log).
    ///
    /// Default: 100 events
    pub event_channel_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_event_channel_capacity() -> usize {
    100
}

/// Parse an update interval such as `"1h"`, `"15m"` or `"1h 30m"`
///
/// Zero-length intervals are rejected because they would spin the scheduler.
pub fn parse_interval(value: &str) -> Result<Duration> {
    let interval = humantime::parse_duration(value.trim())
        .map_err(|e| Error::config(format!("Invalid interval '{}': {}", value, e)))?;

    if interval.is_zero() {
        return Err(Error::config(format!(
            "Invalid interval '{}': must be greater than zero",
            value
        )));
    }

    Ok(interval)
}

/// Validate the hostname argument sent to the provider
///
/// Accepts a single name or No-IP's comma-separated list of names. Names may
/// be fully qualified (trailing dot) and may contain underscores. Rejects
/// empty entries, whitespace or control characters, and URL delimiters.
pub fn validate_hostname(hostname: &str) -> Result<()> {
    if hostname.is_empty() {
        return Err(Error::config("Hostname cannot be empty"));
    }

    if let Some(c) = hostname
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || matches!(c, '/' | '?' | '#' | '&' | '='))
    {
        return Err(Error::config(format!(
            "Hostname contains invalid character {:?}: '{}'",
            c, hostname
        )));
    }

    for name in hostname.split(',') {
        if name.trim_end_matches('.').is_empty() {
            return Err(Error::config(format!(
                "Hostname list has an empty entry: '{}'",
                hostname
            )));
        }
    }

    Ok(())
}
