use async_trait::async_trait;
use std::sync::Arc;

use super::traits::{LogLine, ReportEvent, Reporter, TransitionAlert};
use crate::utils::error::{AppError, Result};

pub type ReporterHandle = Arc<dyn Reporter>;

/// Fans every event out to all registered reporters, in registration order.
///
/// One reporter failing does not keep the event from the others; the
/// failures are logged and folded into a single error.
#[derive(Clone, Default)]
pub struct ReporterManager {
    reporters: Vec<ReporterHandle>,
}

impl ReporterManager {
    pub fn new() -> Self {
        Self {
            reporters: Vec::new(),
        }
    }

    /// Register a reporter
    pub fn register(&mut self, reporter: ReporterHandle) {
        tracing::debug!("Registered reporter: {}", reporter.name());
        self.reporters.push(reporter);
    }

    pub fn with(mut self, reporter: ReporterHandle) -> Self {
        self.register(reporter);
        self
    }

    /// Check if a reporter exists
    pub fn has_reporter(&self, name: &str) -> bool {
        self.reporters.iter().any(|r| r.name() == name)
    }

    /// List registered reporter names
    pub fn list_reporters(&self) -> Vec<String> {
        self.reporters.iter().map(|r| r.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.reporters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reporters.is_empty()
    }

    async fn dispatch(&self, event: &ReportEvent) -> Result<()> {
        let mut failures = Vec::new();

        for reporter in &self.reporters {
            if let Err(e) = reporter.report(event).await {
                tracing::warn!("Reporter {} failed to deliver event: {}", reporter.name(), e);
                failures.push(format!("{}: {}", reporter.name(), e));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(AppError::reporter(self.name(), failures.join("; ")))
        }
    }
}

#[async_trait]
impl Reporter for ReporterManager {
    fn name(&self) -> &str {
        "manager"
    }

    async fn report_transition(&self, alert: &TransitionAlert) -> Result<()> {
        self.dispatch(&ReportEvent::Transition(alert.clone())).await
    }

    async fn report_heartbeat(&self, text: &str) -> Result<()> {
        self.dispatch(&ReportEvent::Heartbeat {
            text: text.to_string(),
        })
        .await
    }

    async fn report_log(&self, entry: &LogLine) -> Result<()> {
        self.dispatch(&ReportEvent::Log(entry.clone())).await
    }

    async fn report_stopped(&self) -> Result<()> {
        self.dispatch(&ReportEvent::Stopped).await
    }
}
