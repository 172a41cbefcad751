//! Core sync engine
//!
//! The SyncEngine is responsible for:
//! - Matching each desired record name to its most specific hosted zone
//! - Checking the provider's record sets for drift against the WAN IP
//! - Submitting one batched upsert per zone that has drifted records
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   zones    ┌──────────────┐  relations  ┌──────────────┐
//! │ ZoneProvider │──────────▶ │ zone matcher │───────────▶ │ record differ│
//! │ (list zones) │            └──────────────┘             └──────────────┘
//! └──────────────┘                                                │
//!                                                                 ▼
//!                         ┌──────────────┐   changes     ┌──────────────┐
//!                         │ ZoneProvider │ ◀──────────── │ batch updater│
//!                         │ (per zone)   │               └──────────────┘
//!                         └──────────────┘                        │
//!                                                                 ▼
//!                                                         ┌──────────────┐
//!                                                         │  SyncEvent   │
//!                                                         └──────────────┘
//! ```
//!
//! ## Run Flow
//!
//! 1. List hosted zones, sort them most specific first
//! 2. Match every configured name to one zone (unmatched names are skipped)
//! 3. Fetch the zone's record sets once per matched name and diff
//! 4. Group drifted records per zone and upsert them (or log, in dry-run mode)
//!
//! Any provider error aborts the run. Zones already updated stay updated.

use crate::config::SyncConfig;
use crate::error::{Error, Result};
use crate::traits::{ExistingRecordSet, HostedZone, RecordChange, RecordType, ZoneProvider};
use std::net::IpAddr;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Events emitted by the SyncEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// Run started
    Started {
        records_count: usize,
        zones_count: usize,
        dry_run: bool,
    },

    /// A configured name was matched to its owning zone
    ZoneMatched {
        record_name: String,
        zone_id: String,
        zone_name: String,
    },

    /// No hosted zone owns a configured name
    NoMatchingZone {
        record_name: String,
    },

    /// Several zones with the same name owned a record; the lowest id won
    ZoneTieBroken {
        record_name: String,
        zone_name: String,
        chosen_zone_id: String,
        discarded_zone_ids: Vec<String>,
    },

    /// The provider already points the record at the WAN IP
    RecordInSync {
        record_name: String,
        zone_id: String,
    },

    /// The record is missing or points elsewhere
    RecordDrifted {
        record_name: String,
        zone_id: String,
    },

    /// A batch of changes was submitted to a zone
    ZoneUpdated {
        zone_id: String,
        zone_name: String,
        changes: usize,
    },

    /// A batch of changes would have been submitted to a zone
    ZoneDryRun {
        zone_id: String,
        zone_name: String,
        changes: usize,
    },

    /// Run finished successfully
    Completed {
        changes: usize,
        dry_run: bool,
    },
}

/// A configured record name paired with the zone that owns it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordZoneRelation {
    pub record_type: RecordType,
    /// The name as configured, not normalized
    pub record_name: String,
    pub zone_id: String,
    /// Set by the differ when the provider disagrees with the WAN IP
    pub should_upsert: bool,
}

impl RecordZoneRelation {
    fn new(record_name: impl Into<String>, zone_id: impl Into<String>) -> Self {
        Self {
            record_type: RecordType::A,
            record_name: record_name.into(),
            zone_id: zone_id.into(),
            should_upsert: false,
        }
    }
}

/// Changes planned for one zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneChanges {
    pub zone_id: String,
    pub zone_name: String,
    pub changes: Vec<RecordChange>,
}

/// Outcome of a successful run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// One relation per matched name, in configuration order
    pub relations: Vec<RecordZoneRelation>,

    /// Names no zone owns, in configuration order
    pub unmatched: Vec<String>,

    /// Per-zone batches, submitted unless `dry_run` is set
    pub zones: Vec<ZoneChanges>,

    pub dry_run: bool,
}

impl SyncReport {
    /// Total number of record changes across all zones
    pub fn change_count(&self) -> usize {
        self.zones.iter().map(|z| z.changes.len()).sum()
    }

    /// Whether the provider was already in sync
    pub fn is_noop(&self) -> bool {
        self.zones.is_empty()
    }
}

/// Strip a single trailing dot from a DNS name
fn trim_dot(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}

/// Whether a zone may hold the given record name
///
/// Both names are compared without their trailing dot. A name is owned when
/// it ends with the zone name, which includes the zone apex itself.
///
/// - "example.com" is owned by "example.com."
/// - "sub.example.com" is owned by "example.com."
/// - "sub.example.com" is owned by "sub.example.com."
pub fn zone_owns(zone_name: &str, record_name: &str) -> bool {
    trim_dot(record_name).ends_with(trim_dot(zone_name))
}

/// Sort zones most specific first
///
/// Longer names come first; zones of equal length are ordered by id so the
/// winner of a tie does not depend on provider listing order.
pub fn sort_zones(zones: &mut [HostedZone]) {
    zones.sort_by(|a, b| {
        trim_dot(&b.name)
            .len()
            .cmp(&trim_dot(&a.name).len())
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Find the owning zone of `record_name` in zones sorted by [`sort_zones`]
///
/// Returns the winning zone and any other zones of the same length that
/// also own the name.
pub fn find_owning_zone<'a>(
    zones: &'a [HostedZone],
    record_name: &str,
) -> Option<(&'a HostedZone, Vec<&'a HostedZone>)> {
    let mut candidates = zones.iter().filter(|z| zone_owns(&z.name, record_name));
    let winner = candidates.next()?;

    let winner_len = trim_dot(&winner.name).len();
    let ties = candidates
        .take_while(|z| trim_dot(&z.name).len() == winner_len)
        .collect();

    Some((winner, ties))
}

/// Whether the record sets already point `record_name` at `ip`
///
/// Names are compared case-sensitively without trailing dots, and only the
/// first value of a record set is inspected.
pub fn is_in_sync(record_name: &str, existing: &[ExistingRecordSet], ip: &str) -> bool {
    let local_name = trim_dot(record_name);
    existing
        .iter()
        .any(|set| trim_dot(&set.name) == local_name && set.first_value() == Some(ip))
}

/// Group drifted relations into one batch per zone
///
/// Zones are visited in the given order; zones without drifted records are
/// left out.
pub fn plan_changes(
    zones: &[HostedZone],
    relations: &[RecordZoneRelation],
    ip: &str,
) -> Vec<ZoneChanges> {
    zones
        .iter()
        .filter_map(|zone| {
            let changes: Vec<RecordChange> = relations
                .iter()
                .filter(|r| r.should_upsert && r.zone_id == zone.id)
                .map(|r| RecordChange::upsert_a(r.record_name.clone(), ip))
                .collect();

            if changes.is_empty() {
                debug!("No changes for zone {}", zone.name);
                return None;
            }

            Some(ZoneChanges {
                zone_id: zone.id.clone(),
                zone_name: zone.name.clone(),
                changes,
            })
        })
        .collect()
}

/// Core sync engine
///
/// The engine performs one reconciliation per call to [`SyncEngine::run`]
/// and keeps no state between runs.
///
/// ## Lifecycle
///
/// 1. Create with [`SyncEngine::new()`]
/// 2. Call [`SyncEngine::run()`] with the discovered WAN IP
/// 3. Drain the event receiver if progress events are wanted
///
/// ## Threading
///
/// A run is strictly sequential: every provider call is awaited before the
/// next one is issued.
pub struct SyncEngine {
    /// Provider for zones, record sets and changes
    provider: Box<dyn ZoneProvider>,

    /// Desired address record names, in configuration order
    records: Vec<String>,

    /// Log planned changes instead of submitting them
    dry_run: bool,

    /// Event sender for external monitoring
    event_tx: mpsc::UnboundedSender<SyncEvent>,
}

impl SyncEngine {
    /// Create a new sync engine
    ///
    /// # Parameters
    ///
    /// - `provider`: DNS provider implementation
    /// - `config`: Desired records and dry-run switch
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields sync events
    pub fn new(
        provider: Box<dyn ZoneProvider>,
        config: SyncConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<SyncEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::unbounded_channel();

        let engine = Self {
            provider,
            records: config.records.a,
            dry_run: config.dry_run,
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Run one reconciliation against the given WAN IP
    ///
    /// # Returns
    ///
    /// - `Ok(SyncReport)`: Every drifted zone was updated (or logged in dry-run mode)
    /// - `Err(Error)`: A provider call failed; later zones were not touched
    pub async fn run(&self, wan_ip: IpAddr) -> Result<SyncReport> {
        if !wan_ip.is_ipv4() {
            return Err(Error::ip_source(format!(
                "Address records need an IPv4 address, got {}",
                wan_ip
            )));
        }
        let ip = wan_ip.to_string();

        // Single page only, see ZoneProvider::list_hosted_zones
        let mut zones = self.provider.list_hosted_zones().await?;
        sort_zones(&mut zones);

        self.emit_event(SyncEvent::Started {
            records_count: self.records.len(),
            zones_count: zones.len(),
            dry_run: self.dry_run,
        });

        let (mut relations, unmatched) = self.match_zones(&zones);
        self.diff_records(&mut relations, &ip).await?;
        let planned = plan_changes(&zones, &relations, &ip);
        self.apply_changes(&planned).await?;

        let report = SyncReport {
            relations,
            unmatched,
            zones: planned,
            dry_run: self.dry_run,
        };

        info!(
            "Successfully synced {} records via {} ({} changes{})",
            report.relations.len(),
            self.provider.provider_name(),
            report.change_count(),
            if self.dry_run { ", dry run" } else { "" }
        );
        self.emit_event(SyncEvent::Completed {
            changes: report.change_count(),
            dry_run: self.dry_run,
        });

        Ok(report)
    }

    /// Pair every configured name with its most specific zone
    fn match_zones(&self, zones: &[HostedZone]) -> (Vec<RecordZoneRelation>, Vec<String>) {
        let mut relations = Vec::with_capacity(self.records.len());
        let mut unmatched = Vec::new();

        for name in &self.records {
            let Some((zone, ties)) = find_owning_zone(zones, name) else {
                info!("No matching zone for {}", name);
                self.emit_event(SyncEvent::NoMatchingZone {
                    record_name: name.clone(),
                });
                unmatched.push(name.clone());
                continue;
            };

            if !ties.is_empty() {
                let discarded: Vec<String> = ties.iter().map(|z| z.id.clone()).collect();
                warn!(
                    "Multiple zones named {} own {}; using {} over {:?}",
                    zone.name, name, zone.id, discarded
                );
                self.emit_event(SyncEvent::ZoneTieBroken {
                    record_name: name.clone(),
                    zone_name: zone.name.clone(),
                    chosen_zone_id: zone.id.clone(),
                    discarded_zone_ids: discarded,
                });
            }

            info!("Matched name {} to zone {}", name, zone.name);
            self.emit_event(SyncEvent::ZoneMatched {
                record_name: name.clone(),
                zone_id: zone.id.clone(),
                zone_name: zone.name.clone(),
            });
            relations.push(RecordZoneRelation::new(name.clone(), zone.id.clone()));
        }

        (relations, unmatched)
    }

    /// Decide `should_upsert` for every relation
    ///
    /// Record sets are fetched once per relation, not once per zone.
    async fn diff_records(&self, relations: &mut [RecordZoneRelation], ip: &str) -> Result<()> {
        for relation in relations.iter_mut() {
            let existing = self.provider.list_record_sets(&relation.zone_id).await?;

            relation.should_upsert = !is_in_sync(&relation.record_name, &existing, ip);

            if relation.should_upsert {
                debug!("Record {} needs an upsert to {}", relation.record_name, ip);
                self.emit_event(SyncEvent::RecordDrifted {
                    record_name: relation.record_name.clone(),
                    zone_id: relation.zone_id.clone(),
                });
            } else {
                debug!("Record {} already points at {}", relation.record_name, ip);
                self.emit_event(SyncEvent::RecordInSync {
                    record_name: relation.record_name.clone(),
                    zone_id: relation.zone_id.clone(),
                });
            }
        }

        Ok(())
    }

    /// Submit one batch per zone, stopping at the first failure
    async fn apply_changes(&self, planned: &[ZoneChanges]) -> Result<()> {
        for batch in planned {
            if self.dry_run {
                info!(
                    "Dry run: would have updated {} with {} records",
                    batch.zone_name,
                    batch.changes.len()
                );
                self.emit_event(SyncEvent::ZoneDryRun {
                    zone_id: batch.zone_id.clone(),
                    zone_name: batch.zone_name.clone(),
                    changes: batch.changes.len(),
                });
                continue;
            }

            info!("Updating {} with {} records", batch.zone_name, batch.changes.len());
            self.provider
                .change_record_sets(&batch.zone_id, &batch.changes)
                .await?;
            self.emit_event(SyncEvent::ZoneUpdated {
                zone_id: batch.zone_id.clone(),
                zone_name: batch.zone_name.clone(),
                changes: batch.changes.len(),
            });
        }

        Ok(())
    }

    /// Emit a sync event
    fn emit_event(&self, event: SyncEvent) {
        // Receiver may have been dropped by callers that only want logs
        if self.event_tx.send(event).is_err() {
            debug!("Sync event receiver dropped, event discarded");
        }
    }
}
