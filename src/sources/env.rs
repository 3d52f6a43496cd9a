//! Environment variable settings source.

use super::ConfigSource;
use crate::error::{Result, TlsReloadError};
use config::Environment;
use std::collections::HashMap;

/// Reads settings from prefixed environment variables.
///
/// With prefix `TLS`, `TLS_CERT_FILE=/etc/tls/cert.pem` sets `cert_file` and
/// `TLS_POLLING_FILE_INTERVAL_MS=30000` sets `polling_file_interval_ms`.
///
/// # Examples
///
/// ```rust
/// use tls_hotswap::sources::EnvSource;
///
/// let source = EnvSource::new("TLS", "__");
/// ```
pub struct EnvSource {
    prefix: String,
    separator: String,
    priority: i32,
}

impl EnvSource {
    /// Create a source for variables starting with `prefix`.
    ///
    /// `separator` splits nested keys and must differ from the single `_`
    /// used inside key names.
    pub fn new(prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            separator: separator.into(),
            priority: 300,
        }
    }

    /// Override the merge priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl ConfigSource for EnvSource {
    fn load(&self) -> Result<HashMap<String, config::Value>> {
        let environment = Environment::with_prefix(&self.prefix)
            .prefix_separator("_")
            .separator(&self.separator)
            .try_parsing(true);

        let parsed = config::Config::builder()
            .add_source(environment)
            .build()
            .map_err(|e| {
                TlsReloadError::LoadError(format!("Failed to read environment variables: {}", e))
            })?;

        parsed
            .try_deserialize::<HashMap<String, config::Value>>()
            .map_err(|e| {
                TlsReloadError::DeserializationError(format!(
                    "Failed to parse environment variables: {}",
                    e
                ))
            })
    }

    fn name(&self) -> String {
        format!("env:{}*", self.prefix)
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let source = EnvSource::new("TLS", "__");
        assert_eq!(source.priority(), 300);
        assert_eq!(source.name(), "env:TLS*");
    }

    #[test]
    fn test_unset_prefix_loads_empty() {
        let source = EnvSource::new("TLS_HOTSWAP_UNIT_UNSET", "__");
        let map = source.load().unwrap();
        assert!(map.is_empty());
    }
}
