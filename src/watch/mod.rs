//! Credential file watching and snapshot publication.
//!
//! [`PollingMultiFileWatcher`] detects changes by comparing metadata
//! fingerprints, [`SslConfigFileWatcher`] turns each batch of changes into a
//! single rebuild and publish, and [`TransportAttachObserver`]s receive the
//! result.

pub mod config_watcher;
pub mod fingerprint;
pub mod observer;
pub mod poller;

#[cfg(feature = "poll-watch")]
pub mod scheduler;

pub use config_watcher::{
    CredentialFiles, RotationOutcome, SslConfigFileWatcher, StartupError, WatcherState,
};
pub use fingerprint::FileFingerprint;
pub use observer::{ObserverId, ObserverRegistry, TransportAttachObserver};
pub use poller::{ChangedPaths, PollingMultiFileWatcher};

#[cfg(feature = "poll-watch")]
pub use scheduler::WatchTask;
