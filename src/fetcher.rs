use async_trait::async_trait;
use reqwest::Client;
use std::time::Instant;

use crate::config::WatcherConfig;
use crate::utils::error::{AppError, Result};

/// Retrieves the raw HTML of a product page.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Page fetcher over one pooled `reqwest` client.
///
/// The client lives as long as the fetcher, so dropping the fetcher
/// releases its connections.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &WatcherConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.as_str());

        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let start_time = Instant::now();

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::FetchStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        tracing::trace!(
            url = %url,
            bytes = body.len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Fetched page"
        );
        Ok(body)
    }
}
