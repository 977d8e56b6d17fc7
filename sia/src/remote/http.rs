use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::ConfigSource;
use crate::error::{Result, SiaError};

#[derive(Clone, Debug)]
pub struct HttpConfigSource {
    client: Client,
    base_url: Url,
}

impl HttpConfigSource {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        // Without a trailing slash `Url::join` would replace the last segment.
        let base_url = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{base_url}/"))?
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SiaError::ConfigFetch(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl ConfigSource for HttpConfigSource {
    async fn fetch_text(&self, resource: &str) -> Result<String> {
        let url = self.base_url.join(resource)?;
        tracing::debug!(%url, "Fetching configuration resource");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| SiaError::ConfigFetch(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SiaError::ConfigFetch(format!("{url}: HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| SiaError::ConfigFetch(format!("{url}: {e}")))
    }
}
