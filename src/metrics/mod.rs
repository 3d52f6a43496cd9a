//! OpenTelemetry metrics for credential rotation.
//!
//! Tracks:
//! - Rotation attempts/success/failures and duration
//! - Malformed ticket seed files
//! - Age of the published snapshot
//! - Registered observers
//!
//! # Examples
//!
//! ```rust,no_run
//! use tls_hotswap::prelude::*;
//! use tls_hotswap::metrics::RotationMetrics;
//! use opentelemetry::global;
//! use std::time::Duration;
//!
//! # fn example(files: CredentialFiles) {
//! let poller = PollingMultiFileWatcher::new(Duration::ZERO, Duration::from_secs(30));
//! let watcher = SslConfigFileWatcher::open(files, poller)
//!     .unwrap_or_else(|e| e.into_watcher())
//!     .with_metrics(RotationMetrics::new(global::meter("my-server")));
//! # }
//! ```

mod rotation_metrics;

pub use rotation_metrics::RotationMetrics;
