//! Transport-facing notification of new TLS snapshots.

use crate::core::TlsConfigSnapshot;
use parking_lot::RwLock;
use std::sync::Arc;

/// Receives TLS configuration snapshots on behalf of a transport.
///
/// Implemented by the accept loop (or anything sitting in front of the TLS
/// engine). The snapshot passed in is always complete: it was fully built and
/// validated before being published. Handshakes already in flight keep the
/// snapshot they started with; only new ones should pick up this one.
///
/// # Examples
///
/// ```rust
/// use tls_hotswap::core::TlsConfigSnapshot;
/// use tls_hotswap::watch::TransportAttachObserver;
/// use parking_lot::Mutex;
/// use std::sync::Arc;
///
/// struct Acceptor {
///     tls: Mutex<Option<Arc<TlsConfigSnapshot>>>,
/// }
///
/// impl TransportAttachObserver for Acceptor {
///     fn update_tls_configuration(&self, snapshot: Arc<TlsConfigSnapshot>) {
///         *self.tls.lock() = Some(snapshot);
///     }
/// }
/// ```
pub trait TransportAttachObserver: Send + Sync {
    /// Called with each newly published snapshot.
    ///
    /// Runs on the watcher's thread, synchronously and in registration order;
    /// keep it short or hand the work off.
    fn update_tls_configuration(&self, snapshot: Arc<TlsConfigSnapshot>);
}

impl<F> TransportAttachObserver for F
where
    F: Fn(Arc<TlsConfigSnapshot>) + Send + Sync,
{
    fn update_tls_configuration(&self, snapshot: Arc<TlsConfigSnapshot>) {
        self(snapshot)
    }
}

/// Identifies a registered observer for [`ObserverRegistry::unregister`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

struct ObserverRegistryInner {
    observers: Vec<(ObserverId, Arc<dyn TransportAttachObserver>)>,
    next_id: u64,
}

/// Ordered set of registered [`TransportAttachObserver`]s.
///
/// Membership only changes through [`register`](Self::register) and
/// [`unregister`](Self::unregister).
#[derive(Clone)]
pub struct ObserverRegistry {
    inner: Arc<RwLock<ObserverRegistryInner>>,
}

impl ObserverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(ObserverRegistryInner {
                observers: Vec::new(),
                next_id: 0,
            })),
        }
    }

    /// Register an observer; it is notified after those registered before it.
    pub fn register(&self, observer: Arc<dyn TransportAttachObserver>) -> ObserverId {
        let mut inner = self.inner.write();
        let id = ObserverId(inner.next_id);
        inner.next_id += 1;
        inner.observers.push((id, observer));
        id
    }

    /// Remove an observer. Returns whether it was registered.
    pub fn unregister(&self, id: ObserverId) -> bool {
        let mut inner = self.inner.write();
        let before = inner.observers.len();
        inner.observers.retain(|(observer_id, _)| *observer_id != id);
        inner.observers.len() != before
    }

    /// Deliver `snapshot` to every observer in registration order.
    pub fn notify_all(&self, snapshot: &Arc<TlsConfigSnapshot>) {
        // Clone the list so observers may (un)register from inside a callback.
        let observers: Vec<_> = self
            .inner
            .read()
            .observers
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();

        for observer in observers {
            observer.update_tls_configuration(Arc::clone(snapshot));
        }
    }

    /// Number of registered observers.
    pub fn len(&self) -> usize {
        self.inner.read().observers.len()
    }

    /// Whether no observers are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ObserverRegistry {
    fn default() -> Self {
        Self::new()
    }
}
