//! Remote configuration resources.
//!
//! The character limits and the confirmation-code secret live outside the
//! binary. `ConfigSource` is the request/response seam used to read them; it
//! is backed either by an HTTP endpoint or by a local directory.

mod file;
mod http;

pub use file::FileConfigSource;
pub use http::HttpConfigSource;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::RemoteConfig;
use crate::error::Result;

#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Fetch a named resource as raw text.
    async fn fetch_text(&self, resource: &str) -> Result<String>;
}

/// Build the source selected by configuration: HTTP when a base URL is set,
/// otherwise the local directory.
pub fn from_config(config: &RemoteConfig) -> Result<Arc<dyn ConfigSource>> {
    match &config.base_url {
        Some(base_url) => {
            tracing::info!(%base_url, "Reading configuration over HTTP");
            Ok(Arc::new(HttpConfigSource::new(base_url, config.timeout_secs)?))
        }
        None => {
            tracing::info!(dir = %config.dir, "Reading configuration from directory");
            Ok(Arc::new(FileConfigSource::new(&config.dir)))
        }
    }
}
