// # No-IP DNS Provider
//
// This crate provides the No-IP provider implementation for the DDNS client.
//
// ## Protocol
//
// One authenticated GET per update:
//
// ```http
// GET /nic/update?hostname=host.example.com&myip=203.0.113.7,2001:db8::1
// Host: dynupdate.no-ip.com
// Authorization: Basic <base64(username:password)>
// User-Agent: Linux-DUC/2.1.9
// ```
//
// The user agent mimics No-IP's own Linux client, which the service expects.
//
// ## Response Handling
//
// No-IP answers with plain text such as `good 203.0.113.7`, `nochg 203.0.113.7`,
// `badauth` or `abuse`. Those codes are NOT interpreted: any HTTP reply is
// returned as-is for the engine to log. Only request construction and
// transport failures are errors.
//
// ## Security Requirements
//
// - The password NEVER appears in logs, errors, or Debug output
// - Credentials travel in the Authorization header, not the request URL

use async_trait::async_trait;
use ddns_core::traits::{DnsProvider, UpdateResult};
use ddns_core::{Credentials, Error, ResolvedAddresses, Result};
use reqwest::Url;
use reqwest::header::USER_AGENT;
use std::time::Duration;

/// No-IP update endpoint
pub const NOIP_UPDATE_URL: &str = "http://dynupdate.no-ip.com/nic/update";

/// Client identifier sent with every update
pub const NOIP_USER_AGENT: &str = "Linux-DUC/2.1.9";

/// Default HTTP timeout for update requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const PROVIDER_NAME: &str = "noip";

/// No-IP DNS provider
///
/// Stateless and single-shot: one request per call, no retries. The
/// scheduler's next tick is the retry.
pub struct NoIpProvider {
    /// Account credentials
    /// ⚠️ NEVER log the password
    credentials: Credentials,

    /// Base update endpoint, without query
    update_url: Url,

    /// HTTP client for update requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the password
impl std::fmt::Debug for NoIpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoIpProvider")
            .field("username", &self.credentials.username)
            .field("password", &"<REDACTED>")
            .field("update_url", &self.update_url.as_str())
            .finish()
    }
}

impl NoIpProvider {
    /// Create a provider that talks to the public No-IP endpoint
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_update_url(credentials, NOIP_UPDATE_URL)
    }

    /// Create a provider that talks to `update_url`
    ///
    /// Useful for No-IP compatible services and for tests. Any query string
    /// on `update_url` is replaced when the update is sent.
    pub fn with_update_url(credentials: Credentials, update_url: &str) -> Result<Self> {
        if credentials.username.is_empty() || credentials.password.is_empty() {
            return Err(Error::config("No-IP username and password are required"));
        }

        let update_url = Url::parse(update_url)
            .map_err(|e| Error::config(format!("Invalid update URL '{}': {}", update_url, e)))?;

        if !matches!(update_url.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "Update URL must use HTTP or HTTPS scheme. Got: {}",
                update_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            credentials,
            update_url,
            client,
        })
    }

    /// Base endpoint this provider sends updates to
    pub fn update_url(&self) -> &Url {
        &self.update_url
    }
}

/// Build the update URL for `hostname` and every address in `addresses`
///
/// Addresses are joined with literal commas, e.g.
/// `?hostname=host.example.com&myip=203.0.113.7,2001:db8::1`. The hostname
/// is form-encoded, so it can never add query parameters of its own.
pub fn build_update_url(
    base: &Url,
    hostname: &str,
    addresses: &ResolvedAddresses,
) -> Result<Url> {
    if addresses.is_empty() {
        return Err(Error::invalid_input("No addresses to send"));
    }

    if hostname.is_empty() {
        return Err(Error::invalid_input("Hostname cannot be empty"));
    }

    // The hostname is form-encoded; myip keeps its literal commas
    let mut url = base.clone();
    url.set_query(None);
    url.query_pairs_mut().append_pair("hostname", hostname);

    let query = format!("{}&myip={}", url.query().unwrap_or_default(), addresses.joined());
    url.set_query(Some(&query));

    Ok(url)
}

#[async_trait]
impl DnsProvider for NoIpProvider {
    /// Send one update request
    ///
    /// This implementation:
    /// - Makes exactly ONE HTTP request
    /// - Treats every HTTP reply as success and returns its body verbatim
    /// - Never logs the password
    async fn update_record(
        &self,
        hostname: &str,
        addresses: &ResolvedAddresses,
    ) -> Result<UpdateResult> {
        let url = build_update_url(&self.update_url, hostname, addresses)?;

        tracing::debug!(url = %url, "Sending No-IP update");

        let response = self
            .client
            .get(url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .header(USER_AGENT, NOIP_USER_AGENT)
            .send()
            .await
            .map_err(|e| Error::provider(PROVIDER_NAME, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::provider(PROVIDER_NAME, format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            tracing::warn!(status = %status, "No-IP replied with a non-success status");
        }

        Ok(UpdateResult::new(status.as_u16(), body))
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}
