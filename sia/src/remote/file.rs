use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::ConfigSource;
use crate::error::{Result, SiaError};

#[derive(Clone, Debug)]
pub struct FileConfigSource {
    dir: PathBuf,
}

impl FileConfigSource {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl ConfigSource for FileConfigSource {
    async fn fetch_text(&self, resource: &str) -> Result<String> {
        let path = self.dir.join(resource);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| SiaError::ConfigFetch(format!("{}: {e}", path.display())))
    }
}
