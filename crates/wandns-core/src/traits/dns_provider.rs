// # DNS Provider Trait
//
// Defines the narrow capability the sync engine needs from a hosted-zone
// DNS provider: list zones, list the record sets of one zone, and submit a
// batch of changes to one zone.
//
// ## Implementations
//
// - Route 53: `wandns-provider-route53` crate
// - Tests: in-memory fakes under `tests/common`
//
// ## Usage
//
// ```rust,ignore
// use wandns_core::ZoneProvider;
//
// async fn show(provider: &dyn ZoneProvider) -> wandns_core::Result<()> {
//     for zone in provider.list_hosted_zones().await? {
//         let records = provider.list_record_sets(&zone.id).await?;
//         println!("{} has {} record sets", zone.name, records.len());
//     }
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::fmt;

/// TTL applied to every upserted address record, in seconds
pub const DEFAULT_RECORD_TTL: u32 = 60;

/// A hosted zone as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedZone {
    /// Opaque provider id (e.g. "/hostedzone/Z1")
    pub id: String,
    /// Fully-qualified, trailing-dot-terminated zone name (e.g. "example.com.")
    pub name: String,
}

impl HostedZone {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A record set that already exists in a zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingRecordSet {
    /// Record name as returned by the provider, usually dot-terminated
    pub name: String,
    /// Record values in provider order
    pub values: Vec<String>,
}

impl ExistingRecordSet {
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// The first value, the only one the engine inspects
    pub fn first_value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }
}

/// Record types managed by wandns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    /// Address record (IPv4)
    A,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Change actions submitted to a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeAction {
    /// Create the record, or replace it if it exists
    Upsert,
}

/// One entry of a batched change request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordChange {
    pub action: ChangeAction,
    pub record_type: RecordType,
    /// Record name as configured
    pub name: String,
    /// Time-to-live in seconds
    pub ttl: u32,
    /// The single record value
    pub value: String,
}

impl RecordChange {
    /// Upsert an address record pointing `name` at `value` with the default TTL
    pub fn upsert_a(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            action: ChangeAction::Upsert,
            record_type: RecordType::A,
            name: name.into(),
            ttl: DEFAULT_RECORD_TTL,
            value: value.into(),
        }
    }
}

/// Trait for hosted-zone DNS providers
///
/// Implementations translate these three operations into provider API
/// calls. They make no decisions: which zone owns a name, whether a record
/// has drifted and what to change all belong to [`crate::SyncEngine`].
///
/// # Trust Level: Untrusted
///
/// ## Allowed Capabilities
/// - ✅ Perform API calls to the provider's endpoints only
/// - ✅ Parse provider-specific responses into the types above
/// - ✅ Return success or failure
///
/// ## Forbidden Capabilities
/// - ❌ Implement retry logic or backoff (a failed run is simply rerun)
/// - ❌ Decide whether an update is needed
/// - ❌ Cache state beyond a single request
/// - ❌ Follow pagination (a single page is requested per listing)
#[async_trait]
pub trait ZoneProvider: Send + Sync {
    /// List all hosted zones visible to the configured credentials
    ///
    /// Only the first page of results is returned.
    async fn list_hosted_zones(&self) -> Result<Vec<HostedZone>, crate::Error>;

    /// List the record sets of one zone
    ///
    /// # Parameters
    ///
    /// - `zone_id`: Id of a zone previously returned by [`Self::list_hosted_zones`]
    async fn list_record_sets(&self, zone_id: &str) -> Result<Vec<ExistingRecordSet>, crate::Error>;

    /// Submit a batch of changes to one zone in a single request
    ///
    /// # Parameters
    ///
    /// - `zone_id`: The target zone
    /// - `changes`: At least one change; all are applied by the provider as one batch
    async fn change_record_sets(
        &self,
        zone_id: &str,
        changes: &[RecordChange],
    ) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_a_uses_default_ttl() {
        let change = RecordChange::upsert_a("home.example.com", "203.0.113.7");
        assert_eq!(change.action, ChangeAction::Upsert);
        assert_eq!(change.record_type, RecordType::A);
        assert_eq!(change.ttl, 60);
        assert_eq!(change.value, "203.0.113.7");
    }

    #[test]
    fn test_first_value() {
        let set = ExistingRecordSet::new("a.example.com.", ["192.0.2.1", "192.0.2.2"]);
        assert_eq!(set.first_value(), Some("192.0.2.1"));

        let empty = ExistingRecordSet::new("a.example.com.", Vec::<String>::new());
        assert_eq!(empty.first_value(), None);
    }
}
