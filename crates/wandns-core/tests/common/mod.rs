//! Test doubles and common utilities for sync contract tests
//!
//! This module provides an in-memory provider that behaves like a hosted-zone
//! DNS service: upserts are applied to its record sets so successive runs see
//! the result of earlier ones.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use wandns_core::error::{Error, Result};
use wandns_core::traits::{ExistingRecordSet, HostedZone, RecordChange, ZoneProvider};
use wandns_core::SyncEvent;

/// An in-memory ZoneProvider that records every call
pub struct FakeZoneProvider {
    /// Zones returned by list_hosted_zones()
    zones: Vec<HostedZone>,
    /// Record sets per zone id
    record_sets: Arc<Mutex<HashMap<String, Vec<ExistingRecordSet>>>>,
    /// Submitted batches in submission order
    submitted: Arc<Mutex<Vec<(String, Vec<RecordChange>)>>>,
    /// Call counter for list_record_sets()
    list_records_call_count: Arc<AtomicUsize>,
    /// Zone listing fails when set
    fail_list_zones: bool,
    /// Record listing fails for this zone id
    fail_list_records_for: Option<String>,
    /// Change submission fails for this zone id
    fail_change_for: Option<String>,
}

impl FakeZoneProvider {
    pub fn new(zones: Vec<HostedZone>) -> Self {
        Self {
            zones,
            record_sets: Arc::new(Mutex::new(HashMap::new())),
            submitted: Arc::new(Mutex::new(Vec::new())),
            list_records_call_count: Arc::new(AtomicUsize::new(0)),
            fail_list_zones: false,
            fail_list_records_for: None,
            fail_change_for: None,
        }
    }

    /// Add an existing record set to a zone
    pub fn with_record(self, zone_id: &str, name: &str, values: &[&str]) -> Self {
        self.record_sets
            .lock()
            .unwrap()
            .entry(zone_id.to_string())
            .or_default()
            .push(ExistingRecordSet::new(name, values.iter().copied()));
        self
    }

    pub fn failing_zone_listing(mut self) -> Self {
        self.fail_list_zones = true;
        self
    }

    pub fn failing_record_listing(mut self, zone_id: &str) -> Self {
        self.fail_list_records_for = Some(zone_id.to_string());
        self
    }

    pub fn failing_changes(mut self, zone_id: &str) -> Self {
        self.fail_change_for = Some(zone_id.to_string());
        self
    }

    /// Create a new FakeZoneProvider that shares state with an existing one
    pub fn sharing_state_with(other: &Self) -> Self {
        Self {
            zones: other.zones.clone(),
            record_sets: Arc::clone(&other.record_sets),
            submitted: Arc::clone(&other.submitted),
            list_records_call_count: Arc::clone(&other.list_records_call_count),
            fail_list_zones: other.fail_list_zones,
            fail_list_records_for: other.fail_list_records_for.clone(),
            fail_change_for: other.fail_change_for.clone(),
        }
    }

    /// Batches submitted so far, as (zone id, changes)
    pub fn submitted(&self) -> Vec<(String, Vec<RecordChange>)> {
        self.submitted.lock().unwrap().clone()
    }

    /// Get the number of times list_record_sets() was called
    pub fn list_records_call_count(&self) -> usize {
        self.list_records_call_count.load(Ordering::SeqCst)
    }

    /// Current record sets of a zone
    pub fn records_in(&self, zone_id: &str) -> Vec<ExistingRecordSet> {
        self.record_sets
            .lock()
            .unwrap()
            .get(zone_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl ZoneProvider for FakeZoneProvider {
    async fn list_hosted_zones(&self) -> Result<Vec<HostedZone>> {
        if self.fail_list_zones {
            return Err(Error::provider("fake", "zone listing unavailable"));
        }
        Ok(self.zones.clone())
    }

    async fn list_record_sets(&self, zone_id: &str) -> Result<Vec<ExistingRecordSet>> {
        self.list_records_call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_list_records_for.as_deref() == Some(zone_id) {
            return Err(Error::provider("fake", format!("cannot list {}", zone_id)));
        }
        Ok(self.records_in(zone_id))
    }

    async fn change_record_sets(&self, zone_id: &str, changes: &[RecordChange]) -> Result<()> {
        if self.fail_change_for.as_deref() == Some(zone_id) {
            return Err(Error::provider("fake", format!("change rejected for {}", zone_id)));
        }

        self.submitted
            .lock()
            .unwrap()
            .push((zone_id.to_string(), changes.to_vec()));

        // Apply like a real provider: names are stored fully qualified
        let mut record_sets = self.record_sets.lock().unwrap();
        let zone = record_sets.entry(zone_id.to_string()).or_default();
        for change in changes {
            let name = format!("{}.", change.name.trim_end_matches('.'));
            zone.retain(|set| set.name != name);
            zone.push(ExistingRecordSet::new(name, [change.value.clone()]));
        }
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

/// Collect every event emitted so far
pub fn drain_events(rx: &mut mpsc::UnboundedReceiver<SyncEvent>) -> Vec<SyncEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// The WAN IP used throughout the contract tests
pub fn wan_ip() -> std::net::IpAddr {
    std::net::IpAddr::from([203, 0, 113, 7])
}

pub fn zone(id: &str, name: &str) -> HostedZone {
    HostedZone::new(id, name)
}
