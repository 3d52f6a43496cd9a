//! Startup wiring: turn [`SslServerSettings`] into a TLS snapshot and, when
//! hot-reload is enabled, a watcher that keeps it current.

use crate::core::{CredentialFile, TlsConfigBuilder, TlsConfigSnapshot};
use crate::error::{Result, TlsReloadError};
use crate::sources::SslServerSettings;
use crate::watch::SslConfigFileWatcher;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// What [`SslServerModule::configure`] produced.
#[derive(Debug, Default)]
pub struct SslServerBindings {
    /// Snapshot to start serving with; `None` when TLS is not configured.
    pub configuration: Option<Arc<TlsConfigSnapshot>>,
    /// Watcher keeping the snapshot current; `None` when hot-reload is off.
    pub watcher: Option<SslConfigFileWatcher>,
}

/// Builds the server's TLS bindings from settings.
///
/// - No certificate or no key: TLS is not bound at all.
/// - Certificate and key: the files are read once and a snapshot is built.
/// - Additionally a ticket seed file and a non-zero polling interval: a
///   [`SslConfigFileWatcher`] is opened and its initial snapshot is used.
///
/// # Examples
///
/// ```rust,no_run
/// use tls_hotswap::prelude::*;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<()> {
/// let settings = SslServerSettings::loader()
///     .with_env_overrides("TLS", "__")
///     .load()?;
///
/// let bindings = SslServerModule::new(settings).configure()?;
/// if let Some(watcher) = bindings.watcher {
///     let _task = WatchTask::spawn(Arc::new(watcher));
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SslServerModule {
    settings: SslServerSettings,
}

impl SslServerModule {
    /// Wrap loaded settings.
    pub fn new(settings: SslServerSettings) -> Self {
        Self { settings }
    }

    /// The settings this module configures from.
    pub fn settings(&self) -> &SslServerSettings {
        &self.settings
    }

    /// Build the TLS bindings.
    ///
    /// # Errors
    ///
    /// Returns an error if TLS is configured but a credential file cannot be
    /// read or the initial snapshot fails to build.
    pub fn configure(&self) -> Result<SslServerBindings> {
        if !self.settings.tls_enabled() {
            info!("No certificate/key configured, TLS disabled");
            return Ok(SslServerBindings::default());
        }

        if self.settings.hot_reload_enabled() {
            let watcher = SslConfigFileWatcher::open(
                self.settings.credential_files(),
                self.settings.poller(),
            )
            .map_err(|e| e.into_parts().0)?;

            info!(
                interval_ms = self.settings.polling_file_interval_ms,
                "TLS credential hot-reload enabled"
            );
            return Ok(SslServerBindings {
                configuration: watcher.current(),
                watcher: Some(watcher),
            });
        }

        let snapshot = self.build_once()?;
        Ok(SslServerBindings {
            configuration: Some(Arc::new(snapshot)),
            watcher: None,
        })
    }

    fn build_once(&self) -> Result<TlsConfigSnapshot> {
        let settings = &self.settings;
        let (Some(cert), Some(key)) = (&settings.cert_file, &settings.key_file) else {
            return Err(TlsReloadError::IncompleteConfiguration(
                "certificate and key files are required".to_string(),
            ));
        };

        let mut builder = TlsConfigBuilder::new()
            .allow_plaintext(settings.allow_plaintext)
            .ssl_verification(settings.ssl_verification)
            .cert(read_credential(cert)?)
            .key(read_credential(key)?);

        if let Some(ca) = &settings.client_ca_file {
            builder = builder.client_ca(Some(read_credential(ca)?));
        }
        if let Some(seed) = &settings.ticket_seed_file {
            match fs::read(seed) {
                Ok(bytes) => builder = builder.ticket_seed(&bytes),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    warn!(path = %seed.display(), "Ticket seed file missing, TLS engine will use ephemeral ticket keys");
                }
                Err(e) => return Err(TlsReloadError::io(seed, e)),
            }
        }

        builder.build()
    }
}

fn read_credential(path: &Path) -> Result<CredentialFile> {
    let contents = fs::read(path).map_err(|e| TlsReloadError::io(path, e))?;
    Ok(CredentialFile::new(path, contents))
}
