use async_trait::async_trait;
use tracing::info;

use crate::Result;
use crate::plugins::traits::{LogLine, Reporter, TransitionAlert};

/// Writes every poll loop event to the tracing subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Reporter for ConsoleReporter {
    fn name(&self) -> &str {
        "console"
    }

    async fn report_transition(&self, alert: &TransitionAlert) -> Result<()> {
        info!(
            artist = %alert.artist_tag,
            product = %alert.product_name,
            status = %alert.status,
            url = %alert.url,
            "{} {}",
            alert.product_name,
            alert.message
        );
        Ok(())
    }

    async fn report_heartbeat(&self, text: &str) -> Result<()> {
        info!("{}", text);
        Ok(())
    }

    async fn report_log(&self, entry: &LogLine) -> Result<()> {
        info!(artist = %entry.artist_tag, time = %entry.timestamp, "{}", entry.line);
        Ok(())
    }

    async fn report_stopped(&self) -> Result<()> {
        info!("Watcher stopped, alerts are no longer active");
        Ok(())
    }
}
