//! Configuration types for wandns
//!
//! The desired records live in a JSON file shaped like:
//!
//! ```json
//! { "route53records": { "A": ["home.example.com", "vpn.example.com"] } }
//! ```
//!
//! The dry-run switch is not part of the file; it is set by the caller.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main wandns configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Records to keep pointed at the WAN IP, grouped by record type
    #[serde(rename = "route53records", default)]
    pub records: RecordSet,

    /// Compute and log changes without submitting them
    #[serde(skip)]
    pub dry_run: bool,
}

impl SyncConfig {
    /// Create a configuration managing the given address records
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            records: RecordSet {
                a: names.into_iter().map(Into::into).collect(),
            },
            dry_run: false,
        }
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Parse and validate a configuration from JSON text
    pub fn from_json(json: &str) -> Result<Self, crate::Error> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| crate::Error::config(format!("Malformed config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, crate::Error> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&contents).map_err(|e| {
            crate::Error::config(format!("Malformed config {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// An empty record list is valid (the run is a no-op); a blank name is not.
    pub fn validate(&self) -> Result<(), crate::Error> {
        for name in &self.records.a {
            if name.trim().trim_end_matches('.').is_empty() {
                return Err(crate::Error::config("Record names cannot be empty"));
            }
        }
        Ok(())
    }

    /// The desired address record names, in configuration order
    pub fn a_records(&self) -> &[String] {
        &self.records.a
    }
}

/// Desired records grouped by type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSet {
    /// Address record names
    #[serde(rename = "A", default)]
    pub a: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_record_list() {
        let config =
            SyncConfig::from_json(r#"{"route53records": {"A": ["home.example.com", "vpn.example.com"]}}"#)
                .unwrap();

        assert_eq!(config.a_records(), ["home.example.com", "vpn.example.com"]);
        assert!(!config.dry_run);
    }

    #[test]
    fn test_empty_list_is_valid() {
        let config = SyncConfig::from_json(r#"{"route53records": {"A": []}}"#).unwrap();
        assert!(config.a_records().is_empty());
    }

    #[test]
    fn test_blank_name_rejected() {
        let err = SyncConfig::from_json(r#"{"route53records": {"A": ["ok.example.com", " "]}}"#)
            .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = SyncConfig::from_json(r#"{"route53records": {"A": "#).unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("Malformed config"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"route53records": {{"A": ["home.example.com"]}}}}"#).unwrap();

        let config = SyncConfig::from_file(file.path()).unwrap();
        assert_eq!(config.a_records(), ["home.example.com"]);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SyncConfig::from_file(dir.path().join("config.json")).unwrap_err();

        assert!(err.is_config());
        assert!(err.to_string().contains("config.json"));
    }

    #[test]
    fn test_dry_run_not_read_from_file() {
        let config =
            SyncConfig::from_json(r#"{"route53records": {"A": []}, "dry_run": true}"#).unwrap();
        assert!(!config.dry_run);
        assert!(config.with_dry_run(true).dry_run);
    }
}
