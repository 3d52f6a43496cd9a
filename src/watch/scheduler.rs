//! Recurring timer that drives a [`SslConfigFileWatcher`].

use crate::error::{Result, TlsReloadError};
use crate::watch::{RotationOutcome, SslConfigFileWatcher};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval, sleep};
use tracing::{debug, error};

/// Background task polling a watcher on its configured cadence.
///
/// The first tick fires after the initial delay, then one tick per interval.
/// Each tick runs on the blocking pool and is awaited before the next one is
/// scheduled, so ticks never overlap and a slow disk only delays this task.
/// Dropping the handle without calling [`stop`](Self::stop) also ends the loop.
///
/// # Examples
///
/// ```rust,no_run
/// use tls_hotswap::prelude::*;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # async fn example() -> Result<()> {
/// let files = CredentialFiles::new("/etc/tls/cert.pem", "/etc/tls/key.pem");
/// let poller = PollingMultiFileWatcher::new(Duration::from_secs(1), Duration::from_secs(30));
/// let watcher = Arc::new(SslConfigFileWatcher::open(files, poller).map_err(|e| e.into_parts().0)?);
///
/// if let Some(task) = WatchTask::spawn(Arc::clone(&watcher)) {
///     // ... serve ...
///     task.stop().await?;
/// }
/// # Ok(())
/// # }
/// ```
pub struct WatchTask {
    shutdown: watch::Sender<bool>,
    watcher: Arc<SslConfigFileWatcher>,
    task: JoinHandle<()>,
}

impl WatchTask {
    /// Spawn the polling loop on the current tokio runtime.
    ///
    /// Returns `None` when the watcher's interval is zero: hot-reload is
    /// disabled and only the initial load done by
    /// [`SslConfigFileWatcher::open`] applies.
    pub fn spawn(watcher: Arc<SslConfigFileWatcher>) -> Option<Self> {
        let (initial_delay, period) = watcher.schedule();
        if period.is_zero() {
            debug!("Polling interval is zero, TLS hot-reload disabled");
            return None;
        }

        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let task_watcher = Arc::clone(&watcher);

        let task = tokio::spawn(async move {
            tokio::select! {
                _ = sleep(initial_delay) => {}
                _ = shutdown_rx.changed() => return,
            }

            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = shutdown_rx.changed() => break,
                }

                let watcher = Arc::clone(&task_watcher);
                match tokio::task::spawn_blocking(move || watcher.check_for_changes()).await {
                    Ok(RotationOutcome::Stopped) => break,
                    Ok(_) => {}
                    Err(e) => error!(error = %e, "TLS watcher tick panicked"),
                }
            }
        });

        Some(Self {
            shutdown,
            watcher,
            task,
        })
    }

    /// Whether the polling loop has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop polling and wait for the loop to exit.
    ///
    /// A tick already in progress finishes first; after this returns no
    /// snapshot is published.
    ///
    /// # Errors
    ///
    /// Returns an error if the polling task panicked.
    pub async fn stop(self) -> Result<()> {
        let _ = self.shutdown.send(true);
        self.task
            .await
            .map_err(|e| TlsReloadError::Other(format!("TLS watcher task failed: {}", e)))?;
        self.watcher.stop();
        Ok(())
    }
}
