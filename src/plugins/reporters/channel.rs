use async_trait::async_trait;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::plugins::traits::{LogLine, ReportEvent, Reporter, TransitionAlert};
use crate::utils::error::{AppError, Result};

/// Forwards events over a bounded channel to whatever surface consumes them.
///
/// Sending never waits: a full or closed channel is reported as a delivery
/// failure and the event is dropped.
#[derive(Debug, Clone)]
pub struct ChannelReporter {
    tx: mpsc::Sender<ReportEvent>,
}

impl ChannelReporter {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<ReportEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    pub fn from_sender(tx: mpsc::Sender<ReportEvent>) -> Self {
        Self { tx }
    }

    fn send(&self, event: ReportEvent) -> Result<()> {
        self.tx.try_send(event).map_err(|e| match e {
            TrySendError::Full(_) => AppError::reporter("channel", "channel is full, event dropped"),
            TrySendError::Closed(_) => AppError::reporter("channel", "receiver has been dropped"),
        })
    }
}

#[async_trait]
impl Reporter for ChannelReporter {
    fn name(&self) -> &str {
        "channel"
    }

    async fn report_transition(&self, alert: &TransitionAlert) -> Result<()> {
        self.send(ReportEvent::Transition(alert.clone()))
    }

    async fn report_heartbeat(&self, text: &str) -> Result<()> {
        self.send(ReportEvent::Heartbeat {
            text: text.to_string(),
        })
    }

    async fn report_log(&self, entry: &LogLine) -> Result<()> {
        self.send(ReportEvent::Log(entry.clone()))
    }

    async fn report_stopped(&self) -> Result<()> {
        self.send(ReportEvent::Stopped)
    }
}
