// # Route 53 DNS Provider
//
// This crate implements `ZoneProvider` on top of the AWS SDK for Route 53.
//
// ## Mapping
//
// - `list_hosted_zones`  → `ListHostedZones` (first page only)
// - `list_record_sets`   → `ListResourceRecordSets` (first page only)
// - `change_record_sets` → `ChangeResourceRecordSets`, one `ChangeBatch` per call
//
// ## Architectural Constraints
//
// - No retry logic beyond the SDK defaults; a failed call fails the run
// - No pagination; truncated listings are logged as warnings
// - No decisions about what to change, the engine owns those
//
// ## Credentials
//
// `Route53Provider::from_env()` loads the standard AWS configuration chain
// (environment, shared config and credential files, instance metadata).

use async_trait::async_trait;
use aws_sdk_route53::error::DisplayErrorContext;
use aws_sdk_route53::types;
use wandns_core::traits::{
    ChangeAction, ExistingRecordSet, HostedZone, RecordChange, RecordType, ZoneProvider,
};
use wandns_core::{Error, Result};

/// Provider name used in logs and errors
const PROVIDER_NAME: &str = "route53";

/// Comment attached to every change batch
const CHANGE_COMMENT: &str = "wandns WAN IP sync";

/// Route 53 DNS provider
#[derive(Debug, Clone)]
pub struct Route53Provider {
    client: aws_sdk_route53::Client,
}

impl Route53Provider {
    /// Create a provider from an existing SDK client
    pub fn new(client: aws_sdk_route53::Client) -> Self {
        Self { client }
    }

    /// Create a provider from the default AWS configuration chain
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(aws_sdk_route53::Client::new(&config))
    }
}

fn sdk_error(operation: &str, err: impl std::error::Error) -> Error {
    Error::provider(
        PROVIDER_NAME,
        format!("{} failed: {}", operation, DisplayErrorContext(&err)),
    )
}

fn build_error(err: impl std::fmt::Display) -> Error {
    Error::provider(PROVIDER_NAME, format!("Invalid change request: {}", err))
}

fn hosted_zone_from_sdk(zone: &types::HostedZone) -> HostedZone {
    HostedZone::new(zone.id(), zone.name())
}

fn record_set_from_sdk(set: &types::ResourceRecordSet) -> ExistingRecordSet {
    ExistingRecordSet::new(set.name(), set.resource_records().iter().map(|r| r.value()))
}

fn rr_type(record_type: RecordType) -> types::RrType {
    match record_type {
        RecordType::A => types::RrType::A,
    }
}

fn change_action(action: ChangeAction) -> types::ChangeAction {
    match action {
        ChangeAction::Upsert => types::ChangeAction::Upsert,
    }
}

/// Build the SDK form of a single record change
fn change_to_sdk(change: &RecordChange) -> Result<types::Change> {
    let record = types::ResourceRecord::builder()
        .value(change.value.as_str())
        .build()
        .map_err(build_error)?;

    let record_set = types::ResourceRecordSet::builder()
        .name(change.name.as_str())
        .r#type(rr_type(change.record_type))
        .ttl(i64::from(change.ttl))
        .resource_records(record)
        .build()
        .map_err(build_error)?;

    types::Change::builder()
        .action(change_action(change.action))
        .resource_record_set(record_set)
        .build()
        .map_err(build_error)
}

/// Build the change batch for one zone
fn change_batch(changes: &[RecordChange]) -> Result<types::ChangeBatch> {
    let changes = changes
        .iter()
        .map(change_to_sdk)
        .collect::<Result<Vec<_>>>()?;

    types::ChangeBatch::builder()
        .comment(CHANGE_COMMENT)
        .set_changes(Some(changes))
        .build()
        .map_err(build_error)
}

#[async_trait]
impl ZoneProvider for Route53Provider {
    async fn list_hosted_zones(&self) -> Result<Vec<HostedZone>> {
        let output = self
            .client
            .list_hosted_zones()
            .send()
            .await
            .map_err(|e| sdk_error("ListHostedZones", e))?;

        if output.is_truncated() {
            tracing::warn!(
                "Hosted zone listing is truncated; only the first {} zones are considered",
                output.hosted_zones().len()
            );
        }

        Ok(output.hosted_zones().iter().map(hosted_zone_from_sdk).collect())
    }

    async fn list_record_sets(&self, zone_id: &str) -> Result<Vec<ExistingRecordSet>> {
        let output = self
            .client
            .list_resource_record_sets()
            .hosted_zone_id(zone_id)
            .send()
            .await
            .map_err(|e| sdk_error("ListResourceRecordSets", e))?;

        if output.is_truncated() {
            tracing::warn!(
                "Record set listing for zone {} is truncated; only the first {} sets are considered",
                zone_id,
                output.resource_record_sets().len()
            );
        }

        Ok(output
            .resource_record_sets()
            .iter()
            .map(record_set_from_sdk)
            .collect())
    }

    async fn change_record_sets(&self, zone_id: &str, changes: &[RecordChange]) -> Result<()> {
        let batch = change_batch(changes)?;

        self.client
            .change_resource_record_sets()
            .hosted_zone_id(zone_id)
            .change_batch(batch)
            .send()
            .await
            .map_err(|e| sdk_error("ChangeResourceRecordSets", e))?;

        tracing::debug!("Submitted {} changes to zone {}", changes.len(), zone_id);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_route53::config::{BehaviorVersion, Region};

    fn offline_provider() -> Route53Provider {
        let config = aws_sdk_route53::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .build();
        Route53Provider::new(aws_sdk_route53::Client::from_conf(config))
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(offline_provider().provider_name(), "route53");
    }

    #[test]
    fn test_hosted_zone_from_sdk() {
        let zone = types::HostedZone::builder()
            .id("/hostedzone/Z1")
            .name("example.com.")
            .caller_reference("ref-1")
            .build()
            .unwrap();

        assert_eq!(
            hosted_zone_from_sdk(&zone),
            HostedZone::new("/hostedzone/Z1", "example.com.")
        );
    }

    #[test]
    fn test_record_set_from_sdk() {
        let set = types::ResourceRecordSet::builder()
            .name("home.example.com.")
            .r#type(types::RrType::A)
            .ttl(60)
            .resource_records(types::ResourceRecord::builder().value("203.0.113.7").build().unwrap())
            .resource_records(types::ResourceRecord::builder().value("203.0.113.8").build().unwrap())
            .build()
            .unwrap();

        let converted = record_set_from_sdk(&set);
        assert_eq!(converted.name, "home.example.com.");
        assert_eq!(converted.values, ["203.0.113.7", "203.0.113.8"]);
    }

    #[test]
    fn test_alias_record_has_no_values() {
        // Alias records carry an alias target instead of resource records
        let set = types::ResourceRecordSet::builder()
            .name("cdn.example.com.")
            .r#type(types::RrType::A)
            .build()
            .unwrap();

        assert!(record_set_from_sdk(&set).values.is_empty());
    }

    #[test]
    fn test_change_to_sdk() {
        let change = change_to_sdk(&RecordChange::upsert_a("home.example.com", "203.0.113.7")).unwrap();
        let debug = format!("{:?}", change);

        assert!(debug.contains("Upsert"));
        assert!(debug.contains("home.example.com"));
        assert!(debug.contains("203.0.113.7"));
        assert!(debug.contains("60"));
    }

    #[test]
    fn test_change_batch_keeps_order() {
        let batch = change_batch(&[
            RecordChange::upsert_a("a.example.com", "203.0.113.7"),
            RecordChange::upsert_a("b.example.com", "203.0.113.7"),
        ])
        .unwrap();
        let debug = format!("{:?}", batch);

        let a = debug.find("a.example.com").unwrap();
        let b = debug.find("b.example.com").unwrap();
        assert!(a < b);
        assert!(debug.contains(CHANGE_COMMENT));
    }
}
