use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::models::{Catalog, Product};
use crate::plugins::reporters::discord::DISCORD_WEBHOOK_PREFIX;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub watcher: WatcherConfig,
    pub display: DisplayConfig,
    pub notifications: NotificationsConfig,
    pub logging: LoggingConfig,
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherConfig {
    pub poll_interval_ms: u64,
    pub user_agent: String,
    pub request_timeout_secs: Option<u64>,
    pub heartbeat: bool,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 2000,
            user_agent: "Mozilla/5.0".to_string(),
            request_timeout_secs: None,
            heartbeat: true,
        }
    }
}

impl WatcherConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub channels: Vec<String>,
    pub default_channel: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            channels: vec!["madison".to_string(), "travis".to_string()],
            default_channel: "madison".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    pub discord: DiscordConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    pub webhook_url: Option<String>,
    pub username: String,
    pub avatar_url: Option<String>,
    pub mention_role: Option<String>,
    pub mention_user: Option<String>,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            username: "Merch Watcher".to_string(),
            avatar_url: None,
            mention_role: None,
            mention_user: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(File::with_name("config/local").required(false));

        Self::finish(builder)
    }

    /// Load from one explicit file, still letting the environment override it.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let builder = Config::builder().add_source(File::from(path));
        Self::finish(builder)
    }

    fn finish(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let s = builder
            // Environment variables with prefix "MERCH_WATCHER"
            .add_source(Environment::with_prefix("MERCH_WATCHER").separator("__"))
            .build()?;

        let config: AppConfig = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Configured products, or the built-in catalog when none are listed.
    pub fn catalog(&self) -> Result<Catalog, ConfigError> {
        if self.products.is_empty() {
            return Ok(Catalog::builtin());
        }

        Catalog::from_products(self.products.clone()).map_err(|e| ConfigError::Message(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // Watcher
        if self.watcher.poll_interval_ms == 0 {
            return Err(ConfigError::Message("Watcher poll_interval_ms must be greater than 0".into()));
        }

        if self.watcher.user_agent.trim().is_empty() {
            return Err(ConfigError::Message("Watcher user_agent must not be empty".into()));
        }

        if self.watcher.request_timeout_secs == Some(0) {
            return Err(ConfigError::Message("Watcher request_timeout_secs must be greater than 0".into()));
        }

        // Display
        if self.display.channels.is_empty() {
            return Err(ConfigError::Message("Display channels must not be empty".into()));
        }

        if !self.display.channels.contains(&self.display.default_channel) {
            return Err(ConfigError::Message(format!(
                "Display default_channel '{}' must be one of the display channels",
                self.display.default_channel
            )));
        }

        // Products
        let mut seen = HashSet::new();
        for product in &self.products {
            if product.name.trim().is_empty() {
                return Err(ConfigError::Message("Product name must not be empty".into()));
            }

            if !seen.insert(product.name.as_str()) {
                return Err(ConfigError::Message(format!("Duplicate product name: {}", product.name)));
            }

            if Url::parse(&product.url).is_err() {
                return Err(ConfigError::Message(format!(
                    "Invalid URL for product '{}': {}",
                    product.name, product.url
                )));
            }
        }

        // Discord
        if let Some(webhook_url) = &self.notifications.discord.webhook_url {
            if !webhook_url.trim().is_empty() && !webhook_url.starts_with(DISCORD_WEBHOOK_PREFIX) {
                return Err(ConfigError::Message("Invalid Discord webhook URL format".into()));
            }
        }

        Ok(())
    }
}
