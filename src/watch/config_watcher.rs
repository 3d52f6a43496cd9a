//! Orchestrates credential file polling, rebuilds and snapshot publication.

use crate::core::{CredentialFile, SnapshotHandle, SslVerification, TicketKey, TlsConfigBuilder, TlsConfigSnapshot};
use crate::error::{Result, TlsReloadError};
use crate::watch::{
    ChangedPaths, FileFingerprint, ObserverId, ObserverRegistry, PollingMultiFileWatcher,
    TransportAttachObserver,
};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

#[cfg(feature = "metrics")]
use crate::metrics::RotationMetrics;

/// The credential files a [`SslConfigFileWatcher`] tracks, plus the fixed
/// settings every snapshot it builds carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialFiles {
    /// Certificate chain (PEM)
    pub cert_file: Option<PathBuf>,
    /// Private key (PEM)
    pub key_file: Option<PathBuf>,
    /// Binary session-ticket seed file
    pub ticket_seed_file: Option<PathBuf>,
    /// Client CA bundle (PEM)
    pub client_ca_file: Option<PathBuf>,
    /// Whether plaintext connections are also accepted
    pub allow_plaintext: bool,
    /// Client certificate verification mode
    pub verification: SslVerification,
}

impl CredentialFiles {
    /// Track a certificate and key with default settings.
    pub fn new(cert_file: impl Into<PathBuf>, key_file: impl Into<PathBuf>) -> Self {
        Self {
            cert_file: Some(cert_file.into()),
            key_file: Some(key_file.into()),
            ..Self::default()
        }
    }

    /// Also track a ticket seed file.
    pub fn with_ticket_seed(mut self, path: impl Into<PathBuf>) -> Self {
        self.ticket_seed_file = Some(path.into());
        self
    }

    /// Also track a client CA bundle.
    pub fn with_client_ca(mut self, path: impl Into<PathBuf>) -> Self {
        self.client_ca_file = Some(path.into());
        self
    }

    /// Set the client verification mode.
    pub fn with_verification(mut self, verification: SslVerification) -> Self {
        self.verification = verification;
        self
    }

    /// Set whether plaintext connections are accepted.
    pub fn with_allow_plaintext(mut self, allow: bool) -> Self {
        self.allow_plaintext = allow;
        self
    }

    fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        [
            &self.ticket_seed_file,
            &self.key_file,
            &self.cert_file,
            &self.client_ca_file,
        ]
        .into_iter()
        .flatten()
    }
}

impl Default for CredentialFiles {
    fn default() -> Self {
        Self {
            cert_file: None,
            key_file: None,
            ticket_seed_file: None,
            client_ca_file: None,
            allow_plaintext: true,
            verification: SslVerification::default(),
        }
    }
}

/// Lifecycle of a [`SslConfigFileWatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    /// No build has been attempted.
    Uninitialized,
    /// The last build succeeded and its snapshot is published.
    Ready,
    /// A rebuild is in progress.
    Rebuilding,
    /// The last build failed; any earlier snapshot is still published.
    FailedBuild,
}

/// Result of one poll tick.
#[derive(Debug)]
pub enum RotationOutcome {
    /// No watched file changed.
    Unchanged,
    /// A new snapshot was built, published and delivered to observers.
    Published(Arc<TlsConfigSnapshot>),
    /// Files changed but the rebuild failed; the previous snapshot stays active.
    Rejected(TlsReloadError),
    /// The watcher has been stopped.
    Stopped,
}

/// Returned by [`SslConfigFileWatcher::open`] when the initial build fails.
///
/// Carries the watcher, which has published nothing but keeps watching, so the
/// caller can either abort or continue without TLS from this source.
#[derive(Debug, thiserror::Error)]
#[error("initial TLS configuration build failed: {error}")]
pub struct StartupError {
    #[source]
    error: TlsReloadError,
    watcher: Box<SslConfigFileWatcher>,
}

impl StartupError {
    /// The error that failed the initial build.
    pub fn error(&self) -> &TlsReloadError {
        &self.error
    }

    /// Take back the watcher to keep it running without a snapshot.
    pub fn into_watcher(self) -> SslConfigFileWatcher {
        *self.watcher
    }

    /// Split into the error and the watcher.
    pub fn into_parts(self) -> (TlsReloadError, SslConfigFileWatcher) {
        (self.error, *self.watcher)
    }
}

/// State only touched while a tick holds the lock.
struct TickState {
    poller: PollingMultiFileWatcher,
    contents: HashMap<PathBuf, Arc<[u8]>>,
    ticket_keys: Arc<[TicketKey]>,
    /// Paths whose last re-read was not committed; re-read on the next rebuild.
    dirty: ChangedPaths,
    generation: u64,
}

/// Watches TLS credential files and publishes a new [`TlsConfigSnapshot`]
/// whenever they change.
///
/// Each tick polls every watched file once. All files that changed in the
/// same tick feed a single rebuild, so observers never see a new certificate
/// paired with an old key. A failed rebuild leaves the published snapshot,
/// the cached file contents and the generation counter untouched.
///
/// Ticks are serialized; [`check_for_changes`](Self::check_for_changes) may be
/// called from any thread. Reads of [`current`](Self::current) never block.
///
/// # Examples
///
/// ```rust,no_run
/// use tls_hotswap::prelude::*;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let files = CredentialFiles::new("/etc/tls/cert.pem", "/etc/tls/key.pem")
///     .with_ticket_seed("/etc/tls/ticket.seed");
/// let poller = PollingMultiFileWatcher::new(Duration::ZERO, Duration::from_secs(60));
///
/// let watcher = match SslConfigFileWatcher::open(files, poller) {
///     Ok(watcher) => watcher,
///     Err(e) => {
///         eprintln!("starting without TLS: {}", e.error());
///         e.into_watcher()
///     }
/// };
///
/// watcher.register(Arc::new(|snapshot: Arc<TlsConfigSnapshot>| {
///     println!("rotated to generation {}", snapshot.generation());
/// }));
/// ```
pub struct SslConfigFileWatcher {
    files: CredentialFiles,
    handle: SnapshotHandle,
    observers: ObserverRegistry,
    tick: Mutex<TickState>,
    state: RwLock<WatcherState>,
    stopped: AtomicBool,
    #[cfg(feature = "metrics")]
    metrics: Option<RotationMetrics>,
}

impl SslConfigFileWatcher {
    /// Start watching `files` and build the initial snapshot.
    ///
    /// The configured paths are registered with `poller`, which is polled once
    /// right away. With no paths configured nothing is built and the watcher
    /// stays [`WatcherState::Uninitialized`].
    ///
    /// # Errors
    ///
    /// Returns a [`StartupError`] if the initial build fails. It holds the
    /// watcher in [`WatcherState::FailedBuild`] with no snapshot published.
    pub fn open(
        files: CredentialFiles,
        mut poller: PollingMultiFileWatcher,
    ) -> std::result::Result<Self, StartupError> {
        for path in files.paths() {
            poller.watch(path.clone());
        }
        let has_paths = files.paths().next().is_some();

        let watcher = Self {
            files,
            handle: SnapshotHandle::empty(),
            observers: ObserverRegistry::new(),
            tick: Mutex::new(TickState {
                poller,
                contents: HashMap::new(),
                ticket_keys: Arc::from(Vec::new()),
                dirty: ChangedPaths::new(),
                generation: 0,
            }),
            state: RwLock::new(WatcherState::Uninitialized),
            stopped: AtomicBool::new(false),
            #[cfg(feature = "metrics")]
            metrics: None,
        };

        if !has_paths {
            return Ok(watcher);
        }

        let result = {
            let mut tick = watcher.tick.lock();
            let changed = tick.poller.poll();
            watcher.rebuild(&mut tick, changed)
        };

        match result {
            Ok(snapshot) => {
                info!(
                    generation = snapshot.generation(),
                    ticket_keys = snapshot.ticket_keys().len(),
                    "Initial TLS configuration loaded"
                );
                Ok(watcher)
            }
            Err(error) => Err(StartupError {
                error,
                watcher: Box::new(watcher),
            }),
        }
    }

    /// Record rotation metrics.
    #[cfg(feature = "metrics")]
    pub fn with_metrics(mut self, metrics: RotationMetrics) -> Self {
        metrics.update_observer_count(self.observers.len() as i64);
        if self.handle.is_published() {
            metrics.record_publish();
        }
        self.metrics = Some(metrics);
        self
    }

    /// Run one poll tick: detect changes, rebuild, publish and notify.
    ///
    /// Failures are logged and returned as [`RotationOutcome::Rejected`]; they
    /// never replace the published snapshot.
    pub fn check_for_changes(&self) -> RotationOutcome {
        let mut tick = self.tick.lock();
        if self.is_stopped() {
            return RotationOutcome::Stopped;
        }

        let changed = tick.poller.poll();
        let outcome = if changed.is_empty() {
            RotationOutcome::Unchanged
        } else {
            self.rotate(&mut tick, changed)
        };

        #[cfg(feature = "metrics")]
        if let Some(metrics) = &self.metrics {
            metrics.update_snapshot_age();
        }

        outcome
    }

    fn rotate(&self, tick: &mut TickState, changed: ChangedPaths) -> RotationOutcome {
        match self.rebuild(tick, changed) {
            Ok(snapshot) => {
                info!(
                    generation = snapshot.generation(),
                    ticket_keys = snapshot.ticket_keys().len(),
                    "TLS configuration rotated"
                );
                RotationOutcome::Published(snapshot)
            }
            Err(error) => {
                warn!(error = %error, "TLS configuration rebuild failed, keeping current configuration");
                RotationOutcome::Rejected(error)
            }
        }
    }

    /// Re-read changed (and previously failed) files and publish a new snapshot.
    ///
    /// Caller holds the tick lock.
    fn rebuild(&self, tick: &mut TickState, changed: ChangedPaths) -> Result<Arc<TlsConfigSnapshot>> {
        self.set_state(WatcherState::Rebuilding);

        #[cfg(feature = "metrics")]
        let timer = self.metrics.as_ref().map(RotationMetrics::start_rotation);

        let mut to_read = std::mem::take(&mut tick.dirty);
        to_read.extend(changed);

        let result = self.assemble(tick, &to_read);

        #[cfg(feature = "metrics")]
        if let (Some(metrics), Some(timer)) = (&self.metrics, timer) {
            match &result {
                Ok(_) => metrics.record_rotation_success(timer),
                Err(e) => {
                    metrics.record_rotation_failure(timer);
                    if e.is_malformed_seed() {
                        metrics.record_malformed_seed();
                    }
                }
            }
        }

        let (snapshot, fresh) = match result {
            Ok(built) => built,
            Err(e) => {
                tick.dirty = to_read;
                self.set_state(WatcherState::FailedBuild);
                return Err(e);
            }
        };

        let snapshot = Arc::new(snapshot);
        tick.contents.extend(fresh);
        tick.ticket_keys = Arc::clone(&snapshot.ticket_keys);
        tick.generation = snapshot.generation();

        self.handle.publish(Arc::clone(&snapshot));
        self.set_state(WatcherState::Ready);
        self.observers.notify_all(&snapshot);

        Ok(snapshot)
    }

    /// Read `to_read` and build a snapshot from it plus the cached contents.
    ///
    /// Returns the snapshot and the freshly read contents to commit.
    fn assemble(
        &self,
        tick: &TickState,
        to_read: &ChangedPaths,
    ) -> Result<(TlsConfigSnapshot, HashMap<PathBuf, Arc<[u8]>>)> {
        let seed_file = self.files.ticket_seed_file.as_ref();
        let mut seed_missing = false;
        let mut fresh = HashMap::with_capacity(to_read.len());
        for path in to_read {
            match fs::read(path) {
                Ok(bytes) => {
                    fresh.insert(path.clone(), Arc::<[u8]>::from(bytes));
                }
                // No seed file means no ticket keys, not a failed build.
                Err(e) if e.kind() == io::ErrorKind::NotFound && seed_file == Some(path) => {
                    seed_missing = true;
                }
                Err(e) => return Err(TlsReloadError::io(path, e)),
            }
        }

        let lookup = |path: &Path| fresh.get(path).or_else(|| tick.contents.get(path)).cloned();
        let credential = |path: &Option<PathBuf>| {
            path.as_ref().and_then(|p| {
                lookup(p.as_path()).map(|bytes| CredentialFile::new(p.clone(), bytes))
            })
        };

        let mut builder = TlsConfigBuilder::new()
            .allow_plaintext(self.files.allow_plaintext)
            .ssl_verification(self.files.verification)
            .generation(tick.generation + 1);

        if let Some(cert) = credential(&self.files.cert_file) {
            builder = builder.cert(cert);
        }
        if let Some(key) = credential(&self.files.key_file) {
            builder = builder.key(key);
        }

        if let Some(ca_path) = &self.files.client_ca_file {
            let ca = credential(&self.files.client_ca_file).ok_or_else(|| {
                TlsReloadError::IncompleteConfiguration(format!(
                    "client CA file {} is missing",
                    ca_path.display()
                ))
            })?;
            builder = builder.client_ca(Some(ca));
        }

        builder = match seed_file {
            Some(seed_path) if fresh.contains_key(seed_path) => builder.ticket_seed(&fresh[seed_path]),
            Some(seed_path)
                if seed_missing
                    || tick.poller.fingerprint(seed_path) == Some(FileFingerprint::Absent) =>
            {
                warn!(path = %seed_path.display(), "Ticket seed file missing, TLS engine will use ephemeral ticket keys");
                builder
            }
            _ => builder.ticket_keys(Arc::clone(&tick.ticket_keys)),
        };

        let snapshot = builder.build()?;
        Ok((snapshot, fresh))
    }

    /// The currently published snapshot, if any.
    pub fn current(&self) -> Option<Arc<TlsConfigSnapshot>> {
        self.handle.current()
    }

    /// A lock-free handle to the published snapshot, for accept paths.
    pub fn handle(&self) -> SnapshotHandle {
        self.handle.clone()
    }

    /// Register an observer for future snapshots.
    pub fn register(&self, observer: Arc<dyn TransportAttachObserver>) -> ObserverId {
        let id = self.observers.register(observer);
        self.observer_count_changed();
        id
    }

    /// Register an observer and immediately hand it the current snapshot.
    ///
    /// Holds the tick lock, so the observer sees no snapshot twice and none out
    /// of order. Do not call this from inside an observer callback.
    pub fn attach_transport(&self, observer: Arc<dyn TransportAttachObserver>) -> ObserverId {
        let _tick = self.tick.lock();
        let id = self.observers.register(Arc::clone(&observer));
        self.observer_count_changed();

        if let Some(snapshot) = self.handle.current() {
            observer.update_tls_configuration(snapshot);
        }
        id
    }

    /// Remove an observer. Returns whether it was registered.
    pub fn unregister(&self, id: ObserverId) -> bool {
        let removed = self.observers.unregister(id);
        self.observer_count_changed();
        removed
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WatcherState {
        *self.state.read()
    }

    /// Files this watcher tracks.
    pub fn files(&self) -> &CredentialFiles {
        &self.files
    }

    /// Stop publishing. Once this returns no further snapshot is published.
    pub fn stop(&self) {
        let _tick = self.tick.lock();
        self.stopped.store(true, Ordering::SeqCst);
    }

    /// Whether [`stop`](Self::stop) has been called.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Configured polling cadence as `(initial_delay, interval)`.
    pub fn schedule(&self) -> (std::time::Duration, std::time::Duration) {
        let tick = self.tick.lock();
        (tick.poller.initial_delay(), tick.poller.interval())
    }

    fn set_state(&self, state: WatcherState) {
        *self.state.write() = state;
    }

    fn observer_count_changed(&self) {
        #[cfg(feature = "metrics")]
        if let Some(metrics) = &self.metrics {
            metrics.update_observer_count(self.observers.len() as i64);
        }
    }
}

impl fmt::Debug for SslConfigFileWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SslConfigFileWatcher")
            .field("files", &self.files)
            .field("state", &self.state())
            .field("generation", &self.current().map(|s| s.generation()))
            .field("observers", &self.observers.len())
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::builder::fixtures::{seed, CERT_PEM, KEY_PEM, OTHER_CERT_PEM, OTHER_KEY_PEM};
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        cert: PathBuf,
        key: PathBuf,
        seed: PathBuf,
    }

    impl Fixture {
        fn new(records: u8) -> Self {
            let dir = TempDir::new().unwrap();
            let cert = dir.path().join("cert.pem");
            let key = dir.path().join("key.pem");
            let seed_path = dir.path().join("ticket.seed");
            fs::write(&cert, CERT_PEM).unwrap();
            fs::write(&key, KEY_PEM).unwrap();
            fs::write(&seed_path, seed(records)).unwrap();
            Self {
                _dir: dir,
                cert,
                key,
                seed: seed_path,
            }
        }

        fn files(&self) -> CredentialFiles {
            CredentialFiles::new(&self.cert, &self.key).with_ticket_seed(&self.seed)
        }

        fn open(&self) -> SslConfigFileWatcher {
            SslConfigFileWatcher::open(self.files(), poller()).unwrap()
        }
    }

    fn poller() -> PollingMultiFileWatcher {
        PollingMultiFileWatcher::new(Duration::ZERO, Duration::from_millis(10))
    }

    #[test]
    fn test_initial_build_publishes() {
        let fixture = Fixture::new(2);
        let watcher = fixture.open();

        assert_eq!(watcher.state(), WatcherState::Ready);
        let snapshot = watcher.current().unwrap();
        assert_eq!(snapshot.ticket_keys().len(), 2);
        assert_eq!(snapshot.generation(), 1);
        assert_eq!(snapshot.cert_path(), fixture.cert.as_path());
    }

    #[test]
    fn test_no_paths_stays_uninitialized() {
        let files = CredentialFiles::default();
        let watcher = SslConfigFileWatcher::open(files, poller()).unwrap();
        assert_eq!(watcher.state(), WatcherState::Uninitialized);
        assert!(watcher.current().is_none());
    }

    #[test]
    fn test_missing_key_fails_startup() {
        let fixture = Fixture::new(1);
        fs::remove_file(&fixture.key).unwrap();

        let err = SslConfigFileWatcher::open(fixture.files(), poller()).unwrap_err();
        assert!(matches!(err.error(), TlsReloadError::IncompleteConfiguration(_)));

        let watcher = err.into_watcher();
        assert_eq!(watcher.state(), WatcherState::FailedBuild);
        assert!(watcher.current().is_none());
    }

    #[test]
    fn test_recovers_after_failed_startup() {
        let fixture = Fixture::new(1);
        fs::remove_file(&fixture.key).unwrap();
        let watcher = SslConfigFileWatcher::open(fixture.files(), poller())
            .unwrap_err()
            .into_watcher();

        fs::write(&fixture.key, KEY_PEM).unwrap();
        let outcome = watcher.check_for_changes();

        assert!(matches!(outcome, RotationOutcome::Published(_)));
        assert_eq!(watcher.state(), WatcherState::Ready);
        assert_eq!(watcher.current().unwrap().ticket_keys().len(), 1);
    }

    #[test]
    fn test_unchanged_files_do_not_publish() {
        let fixture = Fixture::new(1);
        let watcher = fixture.open();

        assert!(matches!(watcher.check_for_changes(), RotationOutcome::Unchanged));
        assert_eq!(watcher.current().unwrap().generation(), 1);
    }

    #[test]
    fn test_seed_rotation_keeps_cert_and_key() {
        let fixture = Fixture::new(2);
        let watcher = fixture.open();
        let before = watcher.current().unwrap();

        fs::write(&fixture.seed, seed(1)).unwrap();
        let RotationOutcome::Published(after) = watcher.check_for_changes() else {
            panic!("expected a new snapshot");
        };

        assert_eq!(after.ticket_keys().len(), 1);
        assert_eq!(after.cert(), before.cert());
        assert_eq!(after.key(), before.key());
        assert_eq!(after.generation(), before.generation() + 1);
    }

    #[test]
    fn test_cert_rotation_keeps_ticket_keys() {
        let fixture = Fixture::new(3);
        let watcher = fixture.open();
        let before = watcher.current().unwrap();

        fs::write(&fixture.cert, OTHER_CERT_PEM).unwrap();
        let RotationOutcome::Published(after) = watcher.check_for_changes() else {
            panic!("expected a new snapshot");
        };

        assert_eq!(after.cert().contents(), OTHER_CERT_PEM.as_bytes());
        assert_eq!(after.ticket_keys(), before.ticket_keys());
    }

    #[test]
    fn test_cert_and_key_change_coalesced() {
        let fixture = Fixture::new(1);
        let watcher = fixture.open();

        let publishes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&publishes);
        watcher.register(Arc::new(move |_: Arc<TlsConfigSnapshot>| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        fs::write(&fixture.cert, OTHER_CERT_PEM).unwrap();
        fs::write(&fixture.key, OTHER_KEY_PEM).unwrap();
        let RotationOutcome::Published(after) = watcher.check_for_changes() else {
            panic!("expected a new snapshot");
        };

        assert_eq!(publishes.load(Ordering::SeqCst), 1);
        assert_eq!(after.cert().contents(), OTHER_CERT_PEM.as_bytes());
        assert_eq!(after.key().contents(), OTHER_KEY_PEM.as_bytes());
    }

    #[test]
    fn test_malformed_seed_keeps_previous_snapshot() {
        let fixture = Fixture::new(2);
        let watcher = fixture.open();
        let before = watcher.current().unwrap();

        let notified = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&notified);
        watcher.register(Arc::new(move |_: Arc<TlsConfigSnapshot>| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        let mut bad = seed(1);
        bad.extend_from_slice(&[1, 2, 3]);
        fs::write(&fixture.seed, bad).unwrap();

        let RotationOutcome::Rejected(err) = watcher.check_for_changes() else {
            panic!("expected the rebuild to fail");
        };
        assert!(err.is_malformed_seed());
        assert_eq!(watcher.state(), WatcherState::FailedBuild);
        assert!(Arc::ptr_eq(&watcher.current().unwrap(), &before));
        assert_eq!(notified.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_failed_seed_is_retried_with_next_change() {
        let fixture = Fixture::new(2);
        let watcher = fixture.open();

        fs::write(&fixture.seed, vec![7u8; 5]).unwrap();
        assert!(matches!(watcher.check_for_changes(), RotationOutcome::Rejected(_)));

        // Only the cert changes now, but the bad seed still blocks the rebuild.
        fs::write(&fixture.cert, OTHER_CERT_PEM).unwrap();
        assert!(matches!(watcher.check_for_changes(), RotationOutcome::Rejected(_)));

        fs::write(&fixture.seed, seed(3)).unwrap();
        let RotationOutcome::Published(after) = watcher.check_for_changes() else {
            panic!("expected recovery");
        };
        assert_eq!(after.ticket_keys().len(), 3);
        assert_eq!(after.cert().contents(), OTHER_CERT_PEM.as_bytes());
        assert_eq!(after.generation(), 2);
    }

    #[test]
    fn test_missing_seed_at_startup_gives_no_ticket_keys() {
        let fixture = Fixture::new(1);
        fs::remove_file(&fixture.seed).unwrap();

        let watcher = fixture.open();
        assert_eq!(watcher.state(), WatcherState::Ready);
        assert!(watcher.current().unwrap().ticket_keys().is_empty());

        fs::write(&fixture.cert, OTHER_CERT_PEM).unwrap();
        let RotationOutcome::Published(after) = watcher.check_for_changes() else {
            panic!("expected a new snapshot");
        };
        assert!(after.ticket_keys().is_empty());
    }

    #[test]
    fn test_deleted_seed_drops_ticket_keys() {
        let fixture = Fixture::new(2);
        let watcher = fixture.open();

        fs::remove_file(&fixture.seed).unwrap();
        let RotationOutcome::Published(after) = watcher.check_for_changes() else {
            panic!("expected a new snapshot");
        };
        assert!(after.ticket_keys().is_empty());
        assert_eq!(watcher.state(), WatcherState::Ready);

        fs::write(&fixture.cert, OTHER_CERT_PEM).unwrap();
        let RotationOutcome::Published(after) = watcher.check_for_changes() else {
            panic!("expected the renewed cert to be published");
        };
        assert_eq!(after.cert().contents(), OTHER_CERT_PEM.as_bytes());
        assert!(after.ticket_keys().is_empty());

        fs::write(&fixture.seed, seed(3)).unwrap();
        let RotationOutcome::Published(after) = watcher.check_for_changes() else {
            panic!("expected the seed to come back");
        };
        assert_eq!(after.ticket_keys().len(), 3);
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn test_metrics_age_starts_at_initial_publish() {
        let fixture = Fixture::new(1);
        let watcher = fixture
            .open()
            .with_metrics(RotationMetrics::new(opentelemetry::global::meter("test")));
        let metrics = watcher.metrics.clone().unwrap();
        let published = metrics.last_publish().unwrap();

        fs::write(&fixture.seed, vec![7u8; 5]).unwrap();
        assert!(matches!(watcher.check_for_changes(), RotationOutcome::Rejected(_)));
        assert_eq!(metrics.last_publish(), Some(published));

        fs::write(&fixture.seed, seed(2)).unwrap();
        assert!(matches!(watcher.check_for_changes(), RotationOutcome::Published(_)));
        assert!(metrics.last_publish().unwrap() >= published);
    }

    #[test]
    fn test_attach_transport_delivers_current() {
        let fixture = Fixture::new(1);
        let watcher = fixture.open();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        watcher.attach_transport(Arc::new(move |s: Arc<TlsConfigSnapshot>| {
            sink.lock().push(s.generation());
        }));
        assert_eq!(*seen.lock(), vec![1]);

        fs::write(&fixture.seed, seed(2)).unwrap();
        watcher.check_for_changes();
        assert_eq!(*seen.lock(), vec![1, 2]);
    }

    #[test]
    fn test_stop_prevents_publish() {
        let fixture = Fixture::new(1);
        let watcher = fixture.open();
        watcher.stop();

        fs::write(&fixture.seed, seed(2)).unwrap();
        assert!(matches!(watcher.check_for_changes(), RotationOutcome::Stopped));
        assert_eq!(watcher.current().unwrap().ticket_keys().len(), 1);
    }

    #[test]
    fn test_client_ca_is_watched() {
        let fixture = Fixture::new(1);
        let ca = fixture.cert.with_file_name("ca.pem");
        fs::write(&ca, CERT_PEM).unwrap();

        let files = fixture.files().with_client_ca(&ca).with_verification(SslVerification::Required);
        let watcher = SslConfigFileWatcher::open(files, poller()).unwrap();
        assert_eq!(watcher.current().unwrap().client_ca_path(), Some(ca.as_path()));

        fs::write(&ca, OTHER_CERT_PEM).unwrap();
        let RotationOutcome::Published(after) = watcher.check_for_changes() else {
            panic!("expected a new snapshot");
        };
        assert_eq!(after.client_ca().unwrap().contents(), OTHER_CERT_PEM.as_bytes());
        assert_eq!(after.verification(), SslVerification::Required);
    }
}
