// # DNS Provider Trait
//
// Defines the interface for pushing resolved addresses to a dynamic-DNS
// provider's update endpoint.
//
// ## Implementations
//
// - No-IP: `ddns-provider-noip` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::{DnsProvider, ResolvedAddresses};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     let addresses: ResolvedAddresses = vec!["203.0.113.7".parse()?].into();
//     let result = provider.update_record("host.example.com", &addresses).await?;
//     println!("provider said: {}", result.response);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::address::ResolvedAddresses;

/// Result of a DNS update request
///
/// The provider's reply is kept verbatim. Response codes such as `good`,
/// `nochg` or `badauth` are not interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateResult {
    /// HTTP status code of the provider's reply
    pub status: u16,
    /// Raw response body
    pub response: String,
}

impl UpdateResult {
    pub fn new(status: u16, response: impl Into<String>) -> Self {
        Self {
            status,
            response: response.into(),
        }
    }
}

/// Trait for DNS provider implementations
///
/// # Rules
///
/// - Exactly one HTTP request per call
/// - No retry logic or backoff (the scheduler's next tick is the retry)
/// - Any HTTP reply counts as success; only request construction and
///   transport failures are errors
/// - Credentials never appear in logs or error messages
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Point `hostname` at every address in `addresses`
    ///
    /// # Parameters
    ///
    /// - `hostname`: The DNS name to update (e.g., "host.example.com")
    /// - `addresses`: One or more resolved addresses
    ///
    /// # Returns
    ///
    /// - `Ok(UpdateResult)`: The provider replied
    /// - `Err(Error)`: The request could not be built or sent
    async fn update_record(
        &self,
        hostname: &str,
        addresses: &ResolvedAddresses,
    ) -> Result<UpdateResult, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
