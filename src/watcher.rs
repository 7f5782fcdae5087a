use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::clock::{Clock, SystemClock};
use crate::config::WatcherConfig;
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::models::Catalog;
use crate::plugins::classifiers::StorefrontClassifier;
use crate::plugins::traits::{Classifier, Reporter};
use crate::poller::PollLoop;
use crate::state::StateTracker;
use crate::Result;

/// Builds the fetcher for a fresh run; called once per `start`.
pub type FetcherFactory = Arc<dyn Fn(&WatcherConfig) -> Result<Arc<dyn Fetcher>> + Send + Sync>;

fn http_fetcher(config: &WatcherConfig) -> Result<Arc<dyn Fetcher>> {
    Ok(Arc::new(HttpFetcher::new(config)?))
}

struct RunningLoop {
    cancel: CancellationToken,
    tracker: StateTracker,
    handle: JoinHandle<u64>,
}

/// Start/stop control around a single background poll loop.
///
/// Each start gets fresh tracked state (everything sold out) and a fresh
/// HTTP client; both are dropped when the loop ends. Starting while
/// running and stopping while stopped are no-ops.
pub struct Watcher {
    config: WatcherConfig,
    catalog: Arc<Catalog>,
    classifier: Arc<dyn Classifier>,
    reporter: Arc<dyn Reporter>,
    clock: Arc<dyn Clock>,
    fetcher_factory: FetcherFactory,
    running: Mutex<Option<RunningLoop>>,
}

impl Watcher {
    pub fn new(config: WatcherConfig, catalog: Catalog, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            config,
            catalog: Arc::new(catalog),
            classifier: Arc::new(StorefrontClassifier),
            reporter,
            clock: Arc::new(SystemClock),
            fetcher_factory: Arc::new(http_fetcher),
            running: Mutex::new(None),
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_fetcher_factory(mut self, factory: FetcherFactory) -> Self {
        self.fetcher_factory = factory;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Spawn the poll loop. Returns `Ok(false)` if it is already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) -> Result<bool> {
        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(current) = running.as_ref() {
            if !current.handle.is_finished() {
                tracing::debug!("Watcher already running, start ignored");
                return Ok(false);
            }
            tracing::warn!("Previous poll loop ended without a stop, starting a new one");
        }

        let fetcher = (self.fetcher_factory)(&self.config)?;
        let tracker = StateTracker::new(&self.catalog);
        let cancel = CancellationToken::new();

        let poll_loop = PollLoop::new(
            Arc::clone(&self.catalog),
            tracker.clone(),
            Arc::clone(&self.classifier),
            Arc::clone(&self.reporter),
            fetcher,
        )
        .with_clock(Arc::clone(&self.clock))
        .with_interval(self.config.poll_interval())
        .with_heartbeat(self.config.heartbeat);

        let handle = tokio::spawn(poll_loop.run(cancel.clone()));

        *running = Some(RunningLoop {
            cancel,
            tracker,
            handle,
        });

        tracing::info!("Watcher started for {} products", self.catalog.len());
        Ok(true)
    }

    /// Cancel the poll loop and wait for it to finish.
    ///
    /// Returns `false` if nothing was running.
    pub async fn stop(&self) -> bool {
        let current = {
            let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
            running.take()
        };

        let Some(current) = current else {
            tracing::debug!("Watcher not running, stop ignored");
            return false;
        };

        current.cancel.cancel();
        match current.handle.await {
            Ok(cycles) => tracing::info!("Watcher stopped after {} cycles", cycles),
            Err(e) => tracing::error!("Poll loop task ended abnormally: {}", e),
        }

        true
    }

    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|current| !current.handle.is_finished())
    }

    /// Tracked state of the current run, for display.
    pub fn tracker(&self) -> Option<StateTracker> {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|current| current.tracker.clone())
    }
}

impl Drop for Watcher {
    fn drop(&mut self) {
        let running = self.running.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(current) = running.take() {
            current.cancel.cancel();
        }
    }
}
