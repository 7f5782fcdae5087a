use chrono::Timelike;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::fetcher::Fetcher;
use crate::models::{Catalog, Product, Status, DEFAULT_ARTIST_TAG};
use crate::plugins::traits::{Classifier, LogLine, Reporter, TransitionAlert};
use crate::state::StateTracker;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Outcome of one pass over the catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CycleSummary {
    pub checked: usize,
    pub failed: usize,
    pub alerts: usize,
    pub cancelled: bool,
}

enum CheckOutcome {
    Checked { alerted: bool },
    Failed,
    Cancelled,
}

/// Fetches, classifies and compares every catalog product, over and over.
///
/// A product whose fetch fails is skipped for that pass and keeps its
/// previous status. Reporter failures are logged and dropped.
pub struct PollLoop {
    catalog: Arc<Catalog>,
    tracker: StateTracker,
    classifier: Arc<dyn Classifier>,
    reporter: Arc<dyn Reporter>,
    fetcher: Arc<dyn Fetcher>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    heartbeat: bool,
}

impl PollLoop {
    pub fn new(
        catalog: Arc<Catalog>,
        tracker: StateTracker,
        classifier: Arc<dyn Classifier>,
        reporter: Arc<dyn Reporter>,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        Self {
            catalog,
            tracker,
            classifier,
            reporter,
            fetcher,
            clock: Arc::new(SystemClock),
            interval: DEFAULT_POLL_INTERVAL,
            heartbeat: true,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_heartbeat(mut self, enabled: bool) -> Self {
        self.heartbeat = enabled;
        self
    }

    pub fn tracker(&self) -> &StateTracker {
        &self.tracker
    }

    /// Poll until `cancel` fires, then report the stop once.
    ///
    /// Returns the number of passes that ran to completion. Consumes the
    /// loop so the fetcher and its connections are released on return.
    pub async fn run(self, cancel: CancellationToken) -> u64 {
        info!(
            products = self.catalog.len(),
            interval_ms = self.interval.as_millis() as u64,
            "Poll loop started"
        );

        let mut completed = 0u64;

        while !cancel.is_cancelled() {
            let summary = self.run_cycle(&cancel).await;
            if summary.cancelled {
                break;
            }
            completed += 1;

            debug!(
                cycle = completed,
                checked = summary.checked,
                failed = summary.failed,
                alerts = summary.alerts,
                "Catalog pass complete"
            );

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        if let Err(e) = self.reporter.report_stopped().await {
            warn!("Failed to report watcher stop: {}", e);
        }

        info!(cycles = completed, "Poll loop stopped");
        completed
    }

    /// One pass over the catalog in catalog order, then the heartbeat check.
    pub async fn run_cycle(&self, cancel: &CancellationToken) -> CycleSummary {
        let mut summary = CycleSummary::default();

        for product in self.catalog.iter() {
            match self.check_product(product, cancel).await {
                CheckOutcome::Checked { alerted } => {
                    summary.checked += 1;
                    if alerted {
                        summary.alerts += 1;
                    }
                }
                CheckOutcome::Failed => summary.failed += 1,
                CheckOutcome::Cancelled => {
                    summary.cancelled = true;
                    return summary;
                }
            }
        }

        self.maybe_heartbeat().await;
        summary
    }

    async fn check_product(&self, product: &Product, cancel: &CancellationToken) -> CheckOutcome {
        let html = tokio::select! {
            biased;
            _ = cancel.cancelled() => return CheckOutcome::Cancelled,
            result = self.fetcher.fetch(&product.url) => match result {
                Ok(html) => html,
                Err(e) => {
                    debug!(product = %product.name, url = %product.url, "Skipping product this pass: {}", e);
                    return CheckOutcome::Failed;
                }
            },
        };

        let status = self.classifier.classify(&html);
        let artist_tag = if product.artist_tag.is_empty() {
            DEFAULT_ARTIST_TAG
        } else {
            product.artist_tag.as_str()
        };

        let alerted = self.record_status(product, artist_tag, status).await;

        let entry = LogLine {
            artist_tag: artist_tag.to_string(),
            line: format!("{} | {}", status, product.name),
            timestamp: self.clock.now().format("%H:%M:%S").to_string(),
        };
        if let Err(e) = self.reporter.report_log(&entry).await {
            warn!(product = %product.name, "Failed to report status line: {}", e);
        }

        CheckOutcome::Checked { alerted }
    }

    /// Compare against the tracked status, alert if warranted, then store.
    ///
    /// Any change into pre-order or in-stock alerts, including a flip
    /// between the two; a change into sold out is stored silently.
    async fn record_status(&self, product: &Product, artist_tag: &str, status: Status) -> bool {
        let previous = self.tracker.get(&product.name);
        if status == previous {
            return false;
        }

        info!(product = %product.name, from = %previous, to = %status, "Status changed");

        let mut alerted = false;
        if let Some(message) = status.alert_message() {
            let alert = TransitionAlert {
                artist_tag: artist_tag.to_string(),
                product_name: product.name.clone(),
                status,
                message: message.to_string(),
                url: product.url.clone(),
            };
            if let Err(e) = self.reporter.report_transition(&alert).await {
                warn!(product = %product.name, "Failed to deliver transition alert: {}", e);
            }
            alerted = true;
        }

        self.tracker.set(&product.name, status);
        alerted
    }

    async fn maybe_heartbeat(&self) {
        if !self.heartbeat {
            return;
        }

        // Only passes that finish on second zero emit; roughly once a minute
        let now = self.clock.now();
        if now.second() != 0 {
            return;
        }

        let text = format!("Alerts active… (last check {})", now.format("%H:%M"));
        if let Err(e) = self.reporter.report_heartbeat(&text).await {
            warn!("Failed to report heartbeat: {}", e);
        }
    }
}
