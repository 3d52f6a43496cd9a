//! Credential rotation metrics using OpenTelemetry.

use opentelemetry::metrics::{Counter, Gauge, Histogram, Meter};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;

/// Metrics collector for TLS credential rotation.
///
/// # Examples
///
/// ```rust,no_run
/// use tls_hotswap::metrics::RotationMetrics;
/// use opentelemetry::global;
///
/// let metrics = RotationMetrics::new(global::meter("tls-hotswap"));
///
/// let timer = metrics.start_rotation();
/// // ... rebuild ...
/// metrics.record_rotation_success(timer);
/// ```
#[derive(Clone)]
pub struct RotationMetrics {
    rotation_attempts: Counter<u64>,
    rotation_success: Counter<u64>,
    rotation_failures: Counter<u64>,
    rotation_duration: Histogram<f64>,
    malformed_seeds: Counter<u64>,
    snapshot_age_seconds: Gauge<i64>,
    active_observers: Gauge<i64>,
    last_publish: Arc<Mutex<Option<Instant>>>,
}

impl RotationMetrics {
    /// Create the instruments on `meter`.
    pub fn new(meter: Meter) -> Self {
        let rotation_attempts = meter
            .u64_counter("tls_hotswap.rotation.attempts")
            .with_description("Rebuilds started after a credential file changed")
            .build();

        let rotation_success = meter
            .u64_counter("tls_hotswap.rotation.success")
            .with_description("Rebuilds that published a new snapshot")
            .build();

        let rotation_failures = meter
            .u64_counter("tls_hotswap.rotation.failures")
            .with_description("Rebuilds rejected while the previous snapshot stayed active")
            .build();

        let rotation_duration = meter
            .f64_histogram("tls_hotswap.rotation.duration")
            .with_description("Time to re-read credential files and build a snapshot")
            .with_unit("s")
            .build();

        let malformed_seeds = meter
            .u64_counter("tls_hotswap.ticket_seed.malformed")
            .with_description("Ticket seed files rejected as malformed")
            .build();

        let snapshot_age_seconds = meter
            .i64_gauge("tls_hotswap.snapshot.age")
            .with_description("Time since the current snapshot was published")
            .with_unit("s")
            .build();

        let active_observers = meter
            .i64_gauge("tls_hotswap.observers.active")
            .with_description("Registered transport observers")
            .build();

        Self {
            rotation_attempts,
            rotation_success,
            rotation_failures,
            rotation_duration,
            malformed_seeds,
            snapshot_age_seconds,
            active_observers,
            last_publish: Arc::new(Mutex::new(None)),
        }
    }

    /// Count a rebuild attempt and start timing it.
    pub fn start_rotation(&self) -> Instant {
        self.rotation_attempts.add(1, &[]);
        Instant::now()
    }

    /// Record a rebuild that published a snapshot.
    pub fn record_rotation_success(&self, start: Instant) {
        self.rotation_success.add(1, &[]);
        self.rotation_duration.record(start.elapsed().as_secs_f64(), &[]);
        self.record_publish();
    }

    /// Restart the snapshot age clock, for a snapshot published without a
    /// timed rebuild.
    pub fn record_publish(&self) {
        *self.last_publish.lock() = Some(Instant::now());
    }

    /// Record a rejected rebuild.
    pub fn record_rotation_failure(&self, start: Instant) {
        self.rotation_failures.add(1, &[]);
        self.rotation_duration.record(start.elapsed().as_secs_f64(), &[]);
    }

    /// Count a ticket seed file rejected as malformed.
    pub fn record_malformed_seed(&self) {
        self.malformed_seeds.add(1, &[]);
    }

    /// Report the number of registered observers.
    pub fn update_observer_count(&self, count: i64) {
        self.active_observers.record(count, &[]);
    }

    /// When the current snapshot was published, if any publish was recorded.
    pub fn last_publish(&self) -> Option<Instant> {
        *self.last_publish.lock()
    }

    /// Report how long the current snapshot has been active.
    ///
    /// Nothing is recorded before the first publish. A growing value means
    /// rotations are failing or files are not being rotated.
    pub fn update_snapshot_age(&self) {
        if let Some(published) = *self.last_publish.lock() {
            self.snapshot_age_seconds
                .record(published.elapsed().as_secs() as i64, &[]);
        }
    }
}
