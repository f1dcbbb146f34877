// # HTTP IP Source
//
// This crate provides an IP source backed by a public "what is my IP" service.
//
// ## Purpose
//
// A host behind NAT cannot see its external IPv4 on any local interface, so
// the address is asked from the outside. The default service is ip-api.com:
//
// ```text
// GET http://ip-api.com/json/?fields=query
// {"query": "203.0.113.7"}
// ```
//
// ## Failure Modes
//
// Each of these is returned as an error for the engine to log:
// - transport failure or timeout
// - non-success HTTP status
// - body that is not JSON or has no `query` field
// - `query` that is not an IP address

use async_trait::async_trait;
use ddns_core::traits::IpSource;
use ddns_core::{Error, Result};
use serde::Deserialize;

use std::net::IpAddr;
use std::time::Duration;

/// Default lookup service
pub const DEFAULT_LOOKUP_URL: &str = "http://ip-api.com/json/?fields=query";

/// Default HTTP timeout for lookups
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Body returned by the lookup service
#[derive(Debug, Deserialize)]
struct LookupResponse {
    query: String,
}

/// IP source that asks an HTTP lookup service for the external address
#[derive(Debug, Clone)]
pub struct HttpIpSource {
    /// URL to fetch the address from
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a source that queries the default lookup service
    pub fn new() -> Result<Self> {
        Self::with_url(DEFAULT_LOOKUP_URL)
    }

    /// Create a source that queries `url`
    ///
    /// The service must answer with a JSON object holding a `query` field.
    pub fn with_url(url: impl Into<String>) -> Result<Self> {
        let url = url.into();

        let parsed = reqwest::Url::parse(&url)
            .map_err(|e| Error::config(format!("Invalid lookup URL '{}': {}", url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "Lookup URL must use HTTP or HTTPS scheme. Got: {}",
                url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { url, client })
    }

    /// URL this source queries
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch current IP from the lookup service
    async fn fetch_ip(&self) -> Result<IpAddr> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::ip_source(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::ip_source(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::ip_source(format!("Failed to read response: {}", e)))?;

        parse_lookup_body(&body)
    }
}

/// Extract the address from a lookup-service body
pub fn parse_lookup_body(body: &str) -> Result<IpAddr> {
    let parsed: LookupResponse = serde_json::from_str(body)?;
    let query = parsed.query.trim();

    query
        .parse()
        .map_err(|_| Error::ip_source(format!("Invalid IP address: {:?}", query)))
}

#[async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<IpAddr> {
        let ip = self.fetch_ip().await?;
        tracing::debug!(url = %self.url, ip = %ip, "Lookup service answered");
        Ok(ip)
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}
