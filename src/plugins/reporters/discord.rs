use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::debug;

use crate::config::DiscordConfig;
use crate::models::Status;
use crate::plugins::traits::{LogLine, Reporter, TransitionAlert};
use crate::utils::error::{AppError, Result};

pub const DISCORD_WEBHOOK_PREFIX: &str = "https://discord.com/api/webhooks/";

#[derive(Debug, Clone)]
pub struct DiscordWebhook {
    pub webhook_url: String,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    pub mention_role: Option<String>,
    pub mention_user: Option<String>,
}

impl DiscordWebhook {
    /// `None` when no webhook is configured.
    pub fn from_config(config: &DiscordConfig) -> Option<Self> {
        let webhook_url = config.webhook_url.as_ref()?.trim();
        if webhook_url.is_empty() {
            return None;
        }

        Some(DiscordWebhook {
            webhook_url: webhook_url.to_string(),
            username: Some(config.username.clone()),
            avatar_url: config.avatar_url.clone(),
            mention_role: config.mention_role.clone(),
            mention_user: config.mention_user.clone(),
        })
    }
}

/// Posts transition alerts and the stopped notice to a Discord webhook.
///
/// Heartbeats and per-check log lines are too chatty for a webhook and are
/// accepted without sending anything.
pub struct DiscordReporter {
    client: Client,
    webhook: DiscordWebhook,
}

impl DiscordReporter {
    pub fn new(webhook: DiscordWebhook) -> Self {
        DiscordReporter {
            client: Client::new(),
            webhook,
        }
    }

    fn get_embed_color(&self, status: Status) -> u32 {
        match status {
            Status::InStock => 0x00ff00,  // Green, buy now
            Status::PreOrder => 0xff9900, // Orange, pre-order open
            Status::SoldOut => 0x808080,
        }
    }

    fn get_emoji(&self, status: Status) -> &str {
        match status {
            Status::InStock => "🛒",
            Status::PreOrder => "⏳",
            Status::SoldOut => "🚫",
        }
    }

    fn create_embed(&self, alert: &TransitionAlert) -> serde_json::Value {
        json!({
            "title": format!("{} {}", self.get_emoji(alert.status), alert.product_name),
            "url": alert.url,
            "description": format!("{} {}", alert.product_name, alert.message),
            "color": self.get_embed_color(alert.status),
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "fields": [
                {
                    "name": "Artist",
                    "value": alert.artist_tag,
                    "inline": true
                },
                {
                    "name": "Store page",
                    "value": format!("[Open product]({})", alert.url),
                    "inline": true
                }
            ],
            "footer": {
                "text": "Merch Watcher"
            }
        })
    }

    fn create_webhook_payload(&self, embeds: Vec<serde_json::Value>, content: Option<String>) -> serde_json::Value {
        let mut payload = json!({
            "embeds": embeds
        });

        if let Some(username) = &self.webhook.username {
            payload["username"] = json!(username);
        }

        if let Some(avatar_url) = &self.webhook.avatar_url {
            payload["avatar_url"] = json!(avatar_url);
        }

        let mut content_parts = Vec::new();

        if let Some(role) = &self.webhook.mention_role {
            content_parts.push(format!("<@&{}>", role));
        }

        if let Some(user) = &self.webhook.mention_user {
            content_parts.push(format!("<@{}>", user));
        }

        if let Some(content) = content {
            content_parts.push(content);
        }

        if !content_parts.is_empty() {
            payload["content"] = json!(content_parts.join(" "));
        }

        payload
    }

    async fn post(&self, payload: &serde_json::Value) -> Result<()> {
        let response = self
            .client
            .post(&self.webhook.webhook_url)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::reporter(
                self.name(),
                format!("webhook responded with HTTP {}", status.as_u16()),
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl Reporter for DiscordReporter {
    fn name(&self) -> &str {
        "discord"
    }

    async fn report_transition(&self, alert: &TransitionAlert) -> Result<()> {
        let payload = self.create_webhook_payload(vec![self.create_embed(alert)], None);
        self.post(&payload).await
    }

    async fn report_heartbeat(&self, _text: &str) -> Result<()> {
        Ok(())
    }

    async fn report_log(&self, _entry: &LogLine) -> Result<()> {
        Ok(())
    }

    async fn report_stopped(&self) -> Result<()> {
        debug!("Sending stopped notice to Discord");
        let payload = json!({
            "content": "Service stopped – watcher is no longer running.",
            "username": self.webhook.username.clone().unwrap_or_else(|| "Merch Watcher".to_string()),
        });
        self.post(&payload).await
    }
}
