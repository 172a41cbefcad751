// # wandns-core
//
// Core library for keeping DNS address records in sync with the WAN IP.
//
// ## Architecture Overview
//
// - **ZoneProvider**: Trait for listing hosted zones, listing record sets and
//   submitting batched changes to a hosted-zone DNS provider
// - **IpSource**: Trait for discovering the current WAN IP
// - **SyncEngine**: One-shot reconciliation: match names to zones, diff the
//   provider's records against the WAN IP, upsert drifted records per zone
// - **SyncConfig**: The desired record list loaded from JSON
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Reconciliation logic is separate from the
//    provider and IP discovery implementations
// 2. **One-Shot**: A run lists, matches, diffs and updates, then returns
// 3. **Fail-Fast**: Any provider error aborts the run, no retries
// 4. **Idempotency**: A run against an in-sync provider submits nothing

pub mod traits;
pub mod engine;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{IpSource, ZoneProvider};
pub use engine::{SyncEngine, SyncEvent, SyncReport};
pub use config::SyncConfig;
pub use error::{Error, Result};
