// # IP Source Trait
//
// Defines the interface for discovering the current WAN IP address.
//
// ## Implementations
//
// - HTTP-based: `wandns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use wandns_core::IpSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* IpSource implementation */;
//     let wan_ip = source.current().await?;
//     println!("WAN IP: {}", wan_ip);
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::fmt;
use std::net::IpAddr;

/// IP version (v4 or v6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpVersion {
    V4,
    V6,
}

impl IpVersion {
    /// Whether `ip` belongs to this version
    pub fn matches(&self, ip: &IpAddr) -> bool {
        match self {
            IpVersion::V4 => ip.is_ipv4(),
            IpVersion::V6 => ip.is_ipv6(),
        }
    }
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpVersion::V4 => f.write_str("IPv4"),
            IpVersion::V6 => f.write_str("IPv6"),
        }
    }
}

/// Trait for IP source implementations
///
/// # Trust Level: Semi-Trusted
///
/// ## Allowed Capabilities
/// - ✅ Perform I/O needed to learn the WAN IP (one HTTP request, for example)
///
/// ## Forbidden Capabilities
/// - ❌ Perform DNS updates (use `ZoneProvider`)
/// - ❌ Spawn tasks or polling loops
/// - ❌ Return anything that is not a validated IP address
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Get the current WAN IP address
    ///
    /// # Returns
    ///
    /// - `Ok(IpAddr)`: The validated WAN IP
    /// - `Err(Error)`: If the IP could not be determined
    async fn current(&self) -> Result<IpAddr, crate::Error>;

    /// Get the IP version this source is restricted to
    ///
    /// Returns `None` if the source accepts both versions.
    fn version(&self) -> Option<IpVersion> {
        None
    }
}
