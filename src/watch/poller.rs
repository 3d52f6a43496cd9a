//! Polling change detection over a fixed set of files.

use crate::watch::FileFingerprint;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Paths reported changed by one poll.
pub type ChangedPaths = BTreeSet<PathBuf>;

/// Watches a set of files by comparing metadata fingerprints between polls.
///
/// The watcher is passive: it never sleeps or spawns anything. A scheduler
/// calls [`poll`](Self::poll) after [`initial_delay`](Self::initial_delay) and
/// then every [`interval`](Self::interval).
///
/// Every path starts out with an absent fingerprint, so the first poll reports
/// each watched file that currently exists. That forces the initial load.
///
/// # Examples
///
/// ```rust,no_run
/// use tls_hotswap::watch::PollingMultiFileWatcher;
/// use std::time::Duration;
///
/// let mut watcher = PollingMultiFileWatcher::new(Duration::ZERO, Duration::from_secs(30));
/// watcher.watch("/etc/tls/cert.pem");
/// watcher.watch("/etc/tls/key.pem");
///
/// for path in watcher.poll() {
///     println!("{} changed", path.display());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct PollingMultiFileWatcher {
    initial_delay: Duration,
    interval: Duration,
    watched: BTreeMap<PathBuf, FileFingerprint>,
}

impl PollingMultiFileWatcher {
    /// Create a watcher with no paths.
    ///
    /// # Arguments
    ///
    /// * `initial_delay` - Time before the first scheduled poll
    /// * `interval` - Time between scheduled polls; zero disables periodic polling
    pub fn new(initial_delay: Duration, interval: Duration) -> Self {
        Self {
            initial_delay,
            interval,
            watched: BTreeMap::new(),
        }
    }

    /// Start watching `path`. Watching a path twice has no effect.
    pub fn watch(&mut self, path: impl Into<PathBuf>) {
        self.watched.entry(path.into()).or_default();
    }

    /// Stop watching `path`. Returns whether it was being watched.
    pub fn unwatch(&mut self, path: impl AsRef<Path>) -> bool {
        self.watched.remove(path.as_ref()).is_some()
    }

    /// Fingerprint every watched path and report those that changed.
    ///
    /// A path whose metadata cannot be read for a reason other than "not
    /// found" is skipped: its stored fingerprint is kept and it is retried on
    /// the next poll. No error escapes this method.
    pub fn poll(&mut self) -> ChangedPaths {
        let mut changed = ChangedPaths::new();

        for (path, last) in self.watched.iter_mut() {
            let current = match FileFingerprint::try_snapshot(path) {
                Ok(fp) => fp,
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "Transient metadata error, retrying next poll");
                    continue;
                }
            };

            if current != *last {
                *last = current;
                changed.insert(path.clone());
            }
        }

        changed
    }

    /// Last fingerprint recorded for `path`.
    pub fn fingerprint(&self, path: impl AsRef<Path>) -> Option<FileFingerprint> {
        self.watched.get(path.as_ref()).copied()
    }

    /// Time before the first scheduled poll.
    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    /// Time between scheduled polls.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether periodic polling is enabled.
    pub fn is_periodic(&self) -> bool {
        !self.interval.is_zero()
    }

    /// Currently watched paths.
    pub fn watched_paths(&self) -> Vec<PathBuf> {
        self.watched.keys().cloned().collect()
    }
}
