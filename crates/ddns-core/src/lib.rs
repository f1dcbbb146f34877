// # ddns-core
//
// Core library for the periodic No-IP dynamic DNS client.
//
// ## Architecture Overview
//
// This library provides the pieces every other crate in the workspace builds on:
// - **IpSource**: Trait for discovering the current external address
// - **DnsProvider**: Trait for pushing addresses to a provider's update endpoint
// - **ResolvedAddresses**: The zero-to-two addresses found in one cycle
// - **DdnsEngine**: Scheduler that runs resolve → update on a fixed interval
// - **DdnsConfig**: Immutable configuration, built once at startup
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from implementations
// 2. **Sequential**: One cycle at a time, no shared mutable state
// 3. **Non-fatal cycles**: Per-cycle failures are logged, never propagated
// 4. **Library-First**: All core functionality can be used as a library
// 5. **Explicit configuration**: No globals; config is passed where needed

pub mod address;
pub mod traits;
pub mod engine;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use address::ResolvedAddresses;
pub use traits::{IpSource, DnsProvider};
pub use engine::{CycleOutcome, DdnsEngine, EngineEvent};
pub use config::{Credentials, DdnsConfig};
pub use error::{Error, Result};
