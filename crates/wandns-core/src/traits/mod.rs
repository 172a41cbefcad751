//! Core traits for wandns
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`ZoneProvider`]: List hosted zones and record sets, submit batched changes
//! - [`IpSource`]: Discover the current WAN IP

pub mod ip_source;
pub mod dns_provider;

pub use ip_source::{IpSource, IpVersion};
pub use dns_provider::{
    ChangeAction, DEFAULT_RECORD_TTL, ExistingRecordSet, HostedZone, RecordChange, RecordType,
    ZoneProvider,
};
