//! services/api/src/adapters/history_cache.rs
//!
//! A `HistoryCache` that keeps the history list as a JSON file on disk.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use article_quiz_core::domain::HistoryItem;
use article_quiz_core::history::HISTORY_CACHE_KEY;
use article_quiz_core::ports::{HistoryCache, PortError, PortResult};
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct JsonFileHistoryCache {
    path: PathBuf,
}

impl JsonFileHistoryCache {
    /// Stores the cache as `<dir>/article-history.json`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{HISTORY_CACHE_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl HistoryCache for JsonFileHistoryCache {
    async fn load(&self) -> PortResult<Vec<HistoryItem>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(PortError::Unexpected(e.to_string())),
        };
        serde_json::from_slice(&bytes).map_err(|e| PortError::Unexpected(e.to_string()))
    }

    async fn store(&self, items: &[HistoryItem]) -> PortResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PortError::Unexpected(e.to_string()))?;
        }
        let json =
            serde_json::to_vec_pretty(items).map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Replace atomically via rename.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }
}
