//! Lock-free holder for the currently published snapshot.

use crate::core::TlsConfigSnapshot;
use arc_swap::ArcSwapOption;
use std::sync::Arc;

/// Shared handle to the current [`TlsConfigSnapshot`].
///
/// Uses `arc-swap` internally so connection-accept paths can read the current
/// snapshot without locks while the watcher swaps in new generations. A reader
/// that loaded a snapshot keeps it for as long as it holds the `Arc`.
///
/// # Examples
///
/// ```rust
/// use tls_hotswap::core::SnapshotHandle;
///
/// let handle = SnapshotHandle::empty();
/// assert!(handle.current().is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SnapshotHandle {
    current: Arc<ArcSwapOption<TlsConfigSnapshot>>,
}

impl SnapshotHandle {
    /// Create a handle with nothing published yet.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a handle that starts out with `snapshot` published.
    pub fn new(snapshot: TlsConfigSnapshot) -> Self {
        Self {
            current: Arc::new(ArcSwapOption::from_pointee(snapshot)),
        }
    }

    /// Get the current snapshot, if any has been published.
    ///
    /// This is a lock-free operation; it never blocks on a concurrent publish.
    pub fn current(&self) -> Option<Arc<TlsConfigSnapshot>> {
        self.current.load_full()
    }

    /// Whether a snapshot has been published.
    pub fn is_published(&self) -> bool {
        self.current.load().is_some()
    }

    /// Atomically replace the published snapshot.
    pub(crate) fn publish(&self, snapshot: Arc<TlsConfigSnapshot>) {
        self.current.store(Some(snapshot));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::builder::fixtures::{CERT_PEM, KEY_PEM};
    use crate::core::{CredentialFile, TlsConfigBuilder};

    fn snapshot(generation: u64) -> TlsConfigSnapshot {
        TlsConfigBuilder::new()
            .cert(CredentialFile::new("/tls/cert.pem", CERT_PEM.as_bytes()))
            .key(CredentialFile::new("/tls/key.pem", KEY_PEM.as_bytes()))
            .generation(generation)
            .build()
            .unwrap()
    }

    #[test]
    fn test_empty_handle() {
        let handle = SnapshotHandle::empty();
        assert!(!handle.is_published());
        assert!(handle.current().is_none());
    }

    #[test]
    fn test_publish_replaces_snapshot() {
        let handle = SnapshotHandle::new(snapshot(1));
        let held = handle.current().unwrap();

        handle.publish(Arc::new(snapshot(2)));

        assert_eq!(handle.current().unwrap().generation(), 2);
        // Readers keep the generation they loaded.
        assert_eq!(held.generation(), 1);
    }

    #[test]
    fn test_clone_shares_state() {
        let handle = SnapshotHandle::empty();
        let clone = handle.clone();

        handle.publish(Arc::new(snapshot(3)));
        assert_eq!(clone.current().unwrap().generation(), 3);
    }
}
