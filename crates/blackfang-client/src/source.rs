//! Refresh the dashboard from a running API server.

use std::sync::Arc;

use async_trait::async_trait;
use blackfang_core::Dataset;
use blackfang_dashboard::{DataSource, SourceError};

use crate::client::BlackfangClient;

/// Largest page the server hands out.
const PAGE_SIZE: usize = 200;

/// Pulls the roster and the full alert feed on every refresh.
#[derive(Debug, Clone)]
pub struct RemoteSource {
    client: Arc<BlackfangClient>,
}

impl RemoteSource {
    #[must_use]
    pub fn new(client: Arc<BlackfangClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for RemoteSource {
    async fn fetch(&self) -> Result<Option<Dataset>, SourceError> {
        let remote = |e: crate::ClientError| SourceError::Remote(e.to_string());

        let dashboard = self.client.dashboard().await.map_err(remote)?;

        let mut alerts = Vec::new();
        let mut offset = 0;
        loop {
            let page = self
                .client
                .alerts(None, PAGE_SIZE, offset)
                .await
                .map_err(remote)?;
            offset += page.alerts.len();
            let done = !page.has_more || page.alerts.is_empty();
            alerts.extend(page.alerts);
            if done {
                break;
            }
        }

        tracing::debug!(
            competitors = dashboard.competitors.len(),
            alerts = alerts.len(),
            "fetched remote dataset"
        );
        let dataset = Dataset::from_parts(dashboard.user, dashboard.competitors, alerts)?;
        Ok(Some(dataset))
    }

    fn describe(&self) -> String {
        format!("api {}", self.client.base_url())
    }
}
