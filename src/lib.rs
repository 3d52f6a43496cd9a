//! # tls-hotswap
//!
//! Hot-reload of TLS server credentials and session-ticket keys without
//! restarting the process or disturbing established connections.
//!
//! ## Overview
//!
//! `tls-hotswap` watches a server's certificate, private key, client CA bundle
//! and session-ticket seed file. When any of them changes it:
//! - re-reads and re-validates the changed files
//! - builds one complete, immutable [`TlsConfigSnapshot`](core::TlsConfigSnapshot)
//! - swaps it in atomically using `arc-swap`
//! - notifies registered [`TransportAttachObserver`](watch::TransportAttachObserver)s
//!
//! Handshakes that already started keep the snapshot they loaded. A rotation
//! that fails (half-written file, malformed seed) is logged and the previous
//! snapshot keeps serving.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tls_hotswap::prelude::*;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<()> {
//! let files = CredentialFiles::new("/etc/tls/cert.pem", "/etc/tls/key.pem")
//!     .with_ticket_seed("/etc/tls/ticket.seed");
//! let poller = PollingMultiFileWatcher::new(Duration::ZERO, Duration::from_secs(60));
//!
//! let watcher = Arc::new(SslConfigFileWatcher::open(files, poller).map_err(|e| e.into_parts().0)?);
//! let handle = watcher.handle();
//! let task = WatchTask::spawn(Arc::clone(&watcher));
//!
//! // On every accepted connection:
//! if let Some(tls) = handle.current() {
//!     println!("handshake with generation {}", tls.generation());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `poll-watch` (default): tokio task driving the poller
//! - `settings` (default): server settings from files and environment variables
//! - `yaml`, `toml`, `json`: settings file formats
//! - `metrics`: OpenTelemetry rotation metrics

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod watch;

#[cfg(feature = "settings")]
pub mod sources;

#[cfg(feature = "settings")]
pub mod module;

#[cfg(feature = "metrics")]
pub mod metrics;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::core::{
        CredentialFile, SnapshotHandle, SslVerification, TicketKey, TicketSeedParser,
        TlsConfigBuilder, TlsConfigSnapshot,
    };
    pub use crate::error::{Result, TlsReloadError};
    pub use crate::watch::{
        CredentialFiles, ObserverId, PollingMultiFileWatcher, RotationOutcome,
        SslConfigFileWatcher, StartupError, TransportAttachObserver, WatcherState,
    };

    #[cfg(feature = "poll-watch")]
    pub use crate::watch::WatchTask;

    #[cfg(feature = "settings")]
    pub use crate::module::{SslServerBindings, SslServerModule};
    #[cfg(feature = "settings")]
    pub use crate::sources::{SettingsLoader, SslServerSettings};
}
