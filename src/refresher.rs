use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::dataset::{self, LoadError};
use crate::source::{FetchError, Source};
use crate::store::EventStore;

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Keeps an [`EventStore`] in step with the remote workbook.
///
/// Each cycle downloads to `data_path`, loads the whole file, and publishes only
/// when both steps succeed. It is the only writer of the store.
pub struct Refresher<S> {
    source: S,
    store: EventStore,
    data_path: PathBuf,
    interval: Duration,
}

impl<S: Source> Refresher<S> {
    pub fn new(source: S, store: EventStore, data_path: impl Into<PathBuf>, interval: Duration) -> Self {
        Self { source, store, data_path: data_path.into(), interval }
    }

    /// Run one download, load and publish cycle on the current thread.
    /// Returns the number of events published.
    pub fn refresh_once(&self) -> Result<usize, RefreshError> {
        let started = Instant::now();
        let bytes = self.source.fetch(&self.data_path)?;
        let snapshot = dataset::load_snapshot(&self.data_path)?;
        let events = snapshot.len();
        let duplicates = snapshot.duplicates();
        let skipped = snapshot.skipped();
        self.store.publish(snapshot);
        info!(
            bytes,
            events,
            duplicates,
            skipped,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Refreshed events"
        );
        Ok(events)
    }
}

impl<S: Source + 'static> Refresher<S> {
    /// Start the periodic loop on the Tokio runtime. The first cycle runs immediately.
    ///
    /// The loop runs until [`RefresherHandle::shutdown`] is called or the handle is dropped.
    pub fn spawn(self) -> RefresherHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(run(Arc::new(self), shutdown_rx));
        RefresherHandle { shutdown: shutdown_tx, task }
    }
}

async fn run<S: Source + 'static>(refresher: Arc<Refresher<S>>, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval(refresher.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(interval_secs = refresher.interval.as_secs(), path = %refresher.data_path.display(), "Events refresher started");

    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {}
        }

        // Download and parsing block, so they run on the blocking pool and never hold the store lock.
        let cycle = Arc::clone(&refresher);
        match tokio::task::spawn_blocking(move || cycle.refresh_once()).await {
            Ok(Ok(_)) => {}
            Ok(Err(RefreshError::Fetch(e @ FetchError::Status { .. }))) => {
                warn!(error = %e, "Events download rejected; keeping current snapshot");
            }
            Ok(Err(e)) => {
                error!(error = %e, "Events refresh failed; keeping current snapshot");
            }
            Err(e) => {
                error!(error = %e, "Events refresh cycle panicked; keeping current snapshot");
            }
        }
    }

    info!("Events refresher stopped");
}

/// Owned handle to the background refresh task.
#[derive(Debug)]
pub struct RefresherHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl RefresherHandle {
    /// Ask the loop to stop and wait for it. A cycle already in progress finishes first.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            error!(error = %e, "Events refresher task failed");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
