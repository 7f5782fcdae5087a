use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::models::Status;

/// Raised when a product moves into pre-order or in-stock.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransitionAlert {
    pub artist_tag: String,
    pub product_name: String,
    pub status: Status,
    pub message: String,
    pub url: String,
}

impl TransitionAlert {
    /// "name message\nurl", the expanded body of a tappable alert.
    pub fn body(&self) -> String {
        format!("{} {}\n{}", self.product_name, self.message, self.url)
    }
}

/// One per product per completed check, whether or not anything changed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogLine {
    pub artist_tag: String,
    pub line: String,
    pub timestamp: String,
}

/// Everything the poll loop can emit, for sinks that forward events as values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportEvent {
    Transition(TransitionAlert),
    Heartbeat { text: String },
    Log(LogLine),
    Stopped,
}

/// Outward sink for alerts, heartbeats and status lines.
///
/// Delivery failures are returned to the caller, which is expected to log
/// and drop them; a failing reporter never stops polling.
#[async_trait]
pub trait Reporter: Send + Sync {
    fn name(&self) -> &str;

    async fn report_transition(&self, alert: &TransitionAlert) -> Result<()>;
    async fn report_heartbeat(&self, text: &str) -> Result<()>;
    async fn report_log(&self, entry: &LogLine) -> Result<()>;
    async fn report_stopped(&self) -> Result<()>;

    /// Route an event value to the matching method.
    async fn report(&self, event: &ReportEvent) -> Result<()> {
        match event {
            ReportEvent::Transition(alert) => self.report_transition(alert).await,
            ReportEvent::Heartbeat { text } => self.report_heartbeat(text).await,
            ReportEvent::Log(entry) => self.report_log(entry).await,
            ReportEvent::Stopped => self.report_stopped().await,
        }
    }
}
