//! In-memory state behind the API: the record set, archived alerts, and
//! issued sessions.

use std::collections::HashSet;

use blackfang_core::wire::{AlertPage, DashboardData};
use blackfang_core::{Alert, CoreError, Dataset, Severity};

use crate::sessions::SessionStore;

/// How many alerts `GET /api/dashboard` includes.
pub const RECENT_ALERT_LIMIT: usize = 20;

#[derive(Debug)]
pub struct Backend {
    pub dataset: Dataset,
    pub sessions: SessionStore,
    archived: HashSet<i64>,
}

impl Backend {
    #[must_use]
    pub fn new(dataset: Dataset, sessions: SessionStore) -> Self {
        Self {
            dataset,
            sessions,
            archived: HashSet::new(),
        }
    }

    /// Alerts that have not been archived, in stored order.
    pub fn visible_alerts(&self) -> impl Iterator<Item = &Alert> {
        self.dataset
            .alerts()
            .iter()
            .filter(|a| !self.archived.contains(&a.id))
    }

    #[must_use]
    pub fn visible_alert(&self, id: i64) -> Option<&Alert> {
        self.visible_alerts().find(|a| a.id == id)
    }

    #[must_use]
    pub fn dashboard(&self) -> DashboardData {
        DashboardData {
            user: self.dataset.user().clone(),
            statistics: self.dataset.statistics(),
            recent_alerts: self
                .visible_alerts()
                .take(RECENT_ALERT_LIMIT)
                .cloned()
                .collect(),
            competitors: self.dataset.competitors().to_vec(),
        }
    }

    /// Filter by exact severity token, then page.
    #[must_use]
    pub fn alert_page(&self, severity: Option<&Severity>, limit: usize, offset: usize) -> AlertPage {
        let matching: Vec<&Alert> = self
            .visible_alerts()
            .filter(|a| severity.map_or(true, |s| a.severity == *s))
            .collect();
        let total = matching.len();
        let alerts = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        AlertPage {
            alerts,
            total,
            limit,
            offset,
            has_more: offset.saturating_add(limit) < total,
        }
    }

    /// Hide an alert from every listing. Returns `false` if it was already
    /// archived.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] for an unknown alert.
    pub fn archive_alert(&mut self, id: i64) -> Result<bool, CoreError> {
        if self.dataset.alert(id).is_none() {
            return Err(CoreError::NotFound {
                entity: "alert",
                id,
            });
        }
        Ok(self.archived.insert(id))
    }

    #[must_use]
    pub fn is_archived(&self, id: i64) -> bool {
        self.archived.contains(&id)
    }
}
