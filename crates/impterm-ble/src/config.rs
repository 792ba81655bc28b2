//! Link configuration.
//!
//! Timeouts are written in seconds in TOML files:
//!
//! ```toml
//! scan_window = 5
//! discovery_timeout = 60
//! operation_timeout = 2.5
//! name_filter = "IMP"
//! ```

use impterm_core::constants::{
    DEFAULT_DISCOVERY_TIMEOUT, DEFAULT_OPERATION_TIMEOUT, DEFAULT_SCAN_WINDOW,
};
use impterm_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Timing and filtering used by the connection manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkConfig {
    /// How long each discovery scan listens for advertisements.
    #[serde(with = "seconds")]
    pub scan_window: Duration,

    /// Bound on discovery, including the operator's device choice.
    #[serde(with = "seconds")]
    pub discovery_timeout: Duration,

    /// Bound on each connect, service discovery and write.
    #[serde(with = "seconds")]
    pub operation_timeout: Duration,

    /// Also offer peripherals whose advertised name contains this text,
    /// for terminals that omit the service from their advertisement.
    pub name_filter: Option<String>,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            scan_window: DEFAULT_SCAN_WINDOW,
            discovery_timeout: DEFAULT_DISCOVERY_TIMEOUT,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
            name_filter: None,
        }
    }
}

impl LinkConfig {
    /// Parse and validate a TOML document.
    ///
    /// Missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: LinkConfig =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Check that every timeout is usable.
    pub fn validate(&self) -> Result<()> {
        if self.scan_window.is_zero() {
            return Err(Error::Config("scan_window must be positive".to_string()));
        }
        if self.operation_timeout.is_zero() {
            return Err(Error::Config(
                "operation_timeout must be positive".to_string(),
            ));
        }
        if self.discovery_timeout <= self.scan_window {
            return Err(Error::Config(format!(
                "discovery_timeout ({:?}) must exceed scan_window ({:?})",
                self.discovery_timeout, self.scan_window
            )));
        }
        Ok(())
    }
}

/// Durations as (fractional) seconds.
mod seconds {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Seconds {
            Whole(u64),
            Fractional(f64),
        }

        match Seconds::deserialize(deserializer)? {
            Seconds::Whole(secs) => Ok(Duration::from_secs(secs)),
            Seconds::Fractional(secs) => Duration::try_from_secs_f64(secs).map_err(D::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LinkConfig::default();
        assert_eq!(config.scan_window, Duration::from_secs(5));
        assert_eq!(config.discovery_timeout, Duration::from_secs(60));
        assert_eq!(config.operation_timeout, Duration::from_secs(10));
        assert!(config.name_filter.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let config = LinkConfig::from_toml_str(
            r#"
            scan_window = 3
            discovery_timeout = 30
            operation_timeout = 2.5
            name_filter = "IMP"
            "#,
        )
        .unwrap();

        assert_eq!(config.scan_window, Duration::from_secs(3));
        assert_eq!(config.discovery_timeout, Duration::from_secs(30));
        assert_eq!(config.operation_timeout, Duration::from_millis(2500));
        assert_eq!(config.name_filter.as_deref(), Some("IMP"));
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = LinkConfig::from_toml_str("operation_timeout = 4").unwrap();
        assert_eq!(config.operation_timeout, Duration::from_secs(4));
        assert_eq!(config.scan_window, DEFAULT_SCAN_WINDOW);
    }

    #[test]
    fn test_rejects_negative_seconds() {
        let result = LinkConfig::from_toml_str("scan_window = -1.0");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_unknown_keys() {
        let result = LinkConfig::from_toml_str("scan_windw = 5");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_zero_operation_timeout() {
        let result = LinkConfig::from_toml_str("operation_timeout = 0");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_discovery_must_exceed_scan() {
        let config = LinkConfig {
            scan_window: Duration::from_secs(10),
            discovery_timeout: Duration::from_secs(10),
            ..LinkConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
