// # HTTP IP Source
//
// This crate discovers the WAN IP with a single HTTP GET against a service
// that answers with the caller's address as plain text (icanhazip.com by
// default).
//
// ## Behavior
//
// - One request per call to `current()`, no caching, no polling
// - Surrounding whitespace in the body is ignored
// - Anything that does not parse as an IP address is an error
// - An optional version filter rejects addresses of the other family

use wandns_core::traits::{IpSource, IpVersion};
use wandns_core::{Error, Result};

use std::net::IpAddr;
use std::time::Duration;

/// Default WAN IP service
pub const DEFAULT_IP_SERVICE: &str = "https://icanhazip.com";

/// HTTP timeout for the IP service
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP-based WAN IP source
#[derive(Debug, Clone)]
pub struct HttpIpSource {
    /// URL to fetch IP from
    url: String,

    /// Only accept this IP version (None = both)
    version: Option<IpVersion>,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `url`: URL to fetch IP from (e.g., "https://icanhazip.com")
    /// - `version`: IP version to accept (None = both)
    pub fn new(url: impl Into<String>, version: Option<IpVersion>) -> Self {
        Self {
            url: url.into(),
            version,
            client: reqwest::Client::builder()
                .timeout(DEFAULT_HTTP_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }

    /// The service URL this source queries
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch current IP from HTTP service
    async fn fetch_ip(&self) -> Result<IpAddr> {
        tracing::debug!("Fetching WAN IP from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::http(format!("Request to {} failed: {}", self.url, e)))?;

        if !response.status().is_success() {
            return Err(Error::http(format!(
                "{} answered with status {}",
                self.url,
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read response: {}", e)))?;

        parse_ip(&body, self.version)
    }
}

impl Default for HttpIpSource {
    fn default() -> Self {
        Self::new(DEFAULT_IP_SERVICE, None)
    }
}

/// Parse a plain-text IP service response
fn parse_ip(body: &str, version: Option<IpVersion>) -> Result<IpAddr> {
    let text = body.trim();

    let ip: IpAddr = text
        .parse()
        .map_err(|_| Error::ip_source(format!("Invalid WAN address returned: {}", text)))?;

    if let Some(version) = version
        && !version.matches(&ip)
    {
        return Err(Error::ip_source(format!(
            "Expected an {} address, got: {}",
            version, ip
        )));
    }

    Ok(ip)
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<IpAddr> {
        let ip = self.fetch_ip().await?;
        tracing::debug!("WAN IP service returned {}", ip);
        Ok(ip)
    }

    fn version(&self) -> Option<IpVersion> {
        self.version
    }
}
