use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::config::DisplayConfig;
use crate::plugins::traits::{LogLine, Reporter, TransitionAlert};
use crate::utils::error::{AppError, Result};

pub const NO_CHECKS_YET: &str = "no checks yet";
pub const WAITING_FOR_FIRST_CHECK: &str = "waiting for first check...";
pub const STOPPED: &str = "stopped";
pub const NO_TIME: &str = "-";

/// What one display channel currently shows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChannelView {
    pub line: String,
    pub time: String,
}

impl ChannelView {
    fn placeholder(line: &str) -> Self {
        Self {
            line: line.to_string(),
            time: NO_TIME.to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct BoardState {
    views: HashMap<String, ChannelView>,
    last_heartbeat: Option<String>,
    alerts: Vec<TransitionAlert>,
}

/// Live status display keyed by artist channel.
///
/// Log lines for a known artist tag land on that channel; any other tag is
/// shown on the default channel. Cloning shares the same board.
#[derive(Debug, Clone)]
pub struct StatusBoard {
    channels: Arc<Vec<String>>,
    default_channel: String,
    state: Arc<RwLock<BoardState>>,
}

impl StatusBoard {
    pub fn new(channels: Vec<String>, default_channel: impl Into<String>) -> Result<Self> {
        let default_channel = default_channel.into();
        if !channels.contains(&default_channel) {
            return Err(AppError::Validation(format!(
                "Default channel '{}' is not one of the display channels",
                default_channel
            )));
        }

        let views = channels
            .iter()
            .map(|channel| (channel.clone(), ChannelView::placeholder(NO_CHECKS_YET)))
            .collect();

        Ok(Self {
            channels: Arc::new(channels),
            default_channel,
            state: Arc::new(RwLock::new(BoardState {
                views,
                ..BoardState::default()
            })),
        })
    }

    pub fn from_config(config: &DisplayConfig) -> Result<Self> {
        Self::new(config.channels.clone(), config.default_channel.clone())
    }

    /// Channel a given artist tag is displayed on.
    pub fn channel_for<'a>(&'a self, artist_tag: &'a str) -> &'a str {
        if self.channels.iter().any(|channel| channel == artist_tag) {
            artist_tag
        } else {
            &self.default_channel
        }
    }

    pub fn view(&self, channel: &str) -> Option<ChannelView> {
        self.read(|state| state.views.get(channel).cloned())
    }

    /// All channels in configured order.
    pub fn views(&self) -> Vec<(String, ChannelView)> {
        self.read(|state| {
            self.channels
                .iter()
                .filter_map(|channel| {
                    state
                        .views
                        .get(channel)
                        .map(|view| (channel.clone(), view.clone()))
                })
                .collect()
        })
    }

    pub fn last_heartbeat(&self) -> Option<String> {
        self.read(|state| state.last_heartbeat.clone())
    }

    pub fn alerts(&self) -> Vec<TransitionAlert> {
        self.read(|state| state.alerts.clone())
    }

    /// Reset every channel to the waiting placeholder.
    pub fn mark_started(&self) {
        self.set_all(WAITING_FOR_FIRST_CHECK);
    }

    pub fn mark_stopped(&self) {
        self.set_all(STOPPED);
    }

    fn set_all(&self, line: &str) {
        self.write(|state| {
            for channel in self.channels.iter() {
                state
                    .views
                    .insert(channel.clone(), ChannelView::placeholder(line));
            }
        });
    }

    fn read<T>(&self, f: impl FnOnce(&BoardState) -> T) -> T {
        let guard = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    fn write<T>(&self, f: impl FnOnce(&mut BoardState) -> T) -> T {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

#[async_trait]
impl Reporter for StatusBoard {
    fn name(&self) -> &str {
        "status_board"
    }

    async fn report_transition(&self, alert: &TransitionAlert) -> Result<()> {
        self.write(|state| state.alerts.push(alert.clone()));
        Ok(())
    }

    async fn report_heartbeat(&self, text: &str) -> Result<()> {
        self.write(|state| state.last_heartbeat = Some(text.to_string()));
        Ok(())
    }

    async fn report_log(&self, entry: &LogLine) -> Result<()> {
        let channel = self.channel_for(&entry.artist_tag).to_string();
        self.write(|state| {
            state.views.insert(
                channel,
                ChannelView {
                    line: entry.line.clone(),
                    time: entry.timestamp.clone(),
                },
            );
        });
        Ok(())
    }

    async fn report_stopped(&self) -> Result<()> {
        self.mark_stopped();
        Ok(())
    }
}
