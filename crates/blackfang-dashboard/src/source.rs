//! Where a refresh gets its records from.

use std::path::PathBuf;

use async_trait::async_trait;
use blackfang_core::{load_dataset, ConfigError, Dataset};

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("dataset reload failed: {0}")]
    Reload(#[from] ConfigError),

    #[error("remote fetch failed: {0}")]
    Remote(String),
}

/// Supplies fresh records on refresh.
///
/// `Ok(None)` means "nothing new": the dashboard re-renders from what it
/// already holds.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch(&self) -> Result<Option<Dataset>, SourceError>;

    /// Label for logs.
    fn describe(&self) -> String;
}

/// Never yields new data. Refresh is a re-render of in-memory records.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticSource;

#[async_trait]
impl DataSource for StaticSource {
    async fn fetch(&self) -> Result<Option<Dataset>, SourceError> {
        Ok(None)
    }

    fn describe(&self) -> String {
        "in-memory".to_string()
    }
}

/// Re-reads a YAML dataset file on every refresh.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DataSource for FileSource {
    async fn fetch(&self) -> Result<Option<Dataset>, SourceError> {
        let path = self.path.clone();
        let dataset = tokio::task::spawn_blocking(move || load_dataset(&path))
            .await
            .map_err(|e| SourceError::Remote(format!("reload task failed: {e}")))??;
        Ok(Some(dataset))
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}
