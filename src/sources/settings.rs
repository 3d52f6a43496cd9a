//! TLS server settings and the loader that merges them from sources.

use super::{ConfigSource, EnvSource, FileSource};
use crate::core::SslVerification;
use crate::error::{Result, TlsReloadError};
use crate::watch::{CredentialFiles, PollingMultiFileWatcher};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Process-level TLS settings: which files to load and how to watch them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SslServerSettings {
    /// Accept plaintext connections alongside TLS
    pub allow_plaintext: bool,
    /// Milliseconds between credential file polls; 0 disables hot-reload
    pub polling_file_interval_ms: u64,
    /// Milliseconds before the first scheduled poll
    pub polling_initial_delay_ms: u64,
    /// Certificate chain (PEM)
    pub cert_file: Option<PathBuf>,
    /// Private key (PEM)
    pub key_file: Option<PathBuf>,
    /// Binary session-ticket seed file
    pub ticket_seed_file: Option<PathBuf>,
    /// Client CA bundle (PEM)
    pub client_ca_file: Option<PathBuf>,
    /// Client certificate verification mode
    pub ssl_verification: SslVerification,
}

impl Default for SslServerSettings {
    fn default() -> Self {
        Self {
            allow_plaintext: true,
            polling_file_interval_ms: 0,
            polling_initial_delay_ms: 0,
            cert_file: None,
            key_file: None,
            ticket_seed_file: None,
            client_ca_file: None,
            ssl_verification: SslVerification::default(),
        }
    }
}

impl SslServerSettings {
    /// Start building settings from files and environment variables.
    pub fn loader() -> SettingsLoader {
        SettingsLoader::new()
    }

    /// Time between credential file polls.
    pub fn polling_interval(&self) -> Duration {
        Duration::from_millis(self.polling_file_interval_ms)
    }

    /// Time before the first scheduled poll.
    pub fn polling_initial_delay(&self) -> Duration {
        Duration::from_millis(self.polling_initial_delay_ms)
    }

    /// Whether both a certificate and a key are configured.
    pub fn tls_enabled(&self) -> bool {
        self.cert_file.is_some() && self.key_file.is_some()
    }

    /// Whether credential files should be watched for rotation.
    ///
    /// Requires TLS, a ticket seed file and a non-zero polling interval.
    pub fn hot_reload_enabled(&self) -> bool {
        self.tls_enabled() && self.ticket_seed_file.is_some() && self.polling_file_interval_ms > 0
    }

    /// The files and fixed settings a watcher or one-shot build uses.
    pub fn credential_files(&self) -> CredentialFiles {
        CredentialFiles {
            cert_file: self.cert_file.clone(),
            key_file: self.key_file.clone(),
            ticket_seed_file: self.ticket_seed_file.clone(),
            client_ca_file: self.client_ca_file.clone(),
            allow_plaintext: self.allow_plaintext,
            verification: self.ssl_verification,
        }
    }

    /// A poller with this configuration's cadence.
    pub fn poller(&self) -> PollingMultiFileWatcher {
        PollingMultiFileWatcher::new(self.polling_initial_delay(), self.polling_interval())
    }
}

/// Merges [`SslServerSettings`] from prioritized sources.
///
/// Sources are applied from lowest to highest priority, so later files
/// override earlier ones and environment variables override files.
///
/// # Examples
///
/// ```rust,no_run
/// use tls_hotswap::prelude::*;
///
/// # fn example() -> Result<()> {
/// let settings = SslServerSettings::loader()
///     .with_file("/etc/myserver/tls.yaml")
///     .with_env_overrides("TLS", "__")
///     .load()?;
///
/// println!("hot reload: {}", settings.hot_reload_enabled());
/// # Ok(())
/// # }
/// ```
pub struct SettingsLoader {
    sources: Vec<Box<dyn ConfigSource>>,
    file_count: i32,
}

impl SettingsLoader {
    /// Create a loader with no sources; loading it yields the defaults.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            file_count: 0,
        }
    }

    /// Add a settings file. Each file added overrides the ones before it.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        let priority = 100 + self.file_count * 10;
        self.file_count += 1;
        self.sources
            .push(Box::new(FileSource::new(path).with_priority(priority)));
        self
    }

    /// Add environment variables with `prefix`, overriding all files.
    pub fn with_env_overrides(mut self, prefix: &str, separator: &str) -> Self {
        self.sources.push(Box::new(EnvSource::new(prefix, separator)));
        self
    }

    /// Add a custom source.
    pub fn with_source<S: ConfigSource + 'static>(mut self, source: S) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Names of the sources in the order they are applied.
    pub fn source_names(&self) -> Vec<String> {
        let mut sorted: Vec<_> = self.sources.iter().collect();
        sorted.sort_by_key(|s| s.priority());
        sorted.iter().map(|s| s.name()).collect()
    }

    /// Read every source and merge the result into settings.
    ///
    /// # Errors
    ///
    /// Returns an error if any source fails to load or the merged values do
    /// not deserialize into [`SslServerSettings`].
    pub fn load(&self) -> Result<SslServerSettings> {
        let mut sorted: Vec<_> = self.sources.iter().collect();
        sorted.sort_by_key(|s| s.priority());

        let mut builder = config::Config::builder();
        for source in sorted {
            let values = source.load().map_err(|e| {
                TlsReloadError::LoadError(format!("Failed to load source '{}': {}", source.name(), e))
            })?;
            debug!(source = %source.name(), keys = values.len(), "Merging TLS settings source");

            for (key, value) in values {
                builder = builder.set_override(&key, value).map_err(|e| {
                    TlsReloadError::LoadError(format!(
                        "Failed to merge source '{}': {}",
                        source.name(),
                        e
                    ))
                })?;
            }
        }

        let merged = builder
            .build()
            .map_err(|e| TlsReloadError::LoadError(format!("Failed to build settings: {}", e)))?;

        merged.try_deserialize::<SslServerSettings>().map_err(|e| {
            TlsReloadError::DeserializationError(format!("Failed to deserialize settings: {}", e))
        })
    }
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}
