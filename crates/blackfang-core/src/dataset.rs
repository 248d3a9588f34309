use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, CoreError};
use crate::seed;
use crate::types::{Alert, Competitor, MonitoringStatus, Statistics, ThreatLevel, User};

/// The in-memory record set behind the dashboard.
///
/// Collections keep their load order; nothing here sorts. The only mutation
/// the dashboard performs is flipping `Alert::is_read`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    user: User,
    competitors: Vec<Competitor>,
    alerts: Vec<Alert>,
}

/// Fields accepted when registering a competitor through the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCompetitor {
    pub name: String,
    pub website: String,
    #[serde(default = "default_threat_level")]
    pub threat_level: ThreatLevel,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub location: String,
}

/// Partial update for a competitor; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompetitorPatch {
    pub name: Option<String>,
    pub website: Option<String>,
    pub threat_level: Option<ThreatLevel>,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub monitoring_status: Option<MonitoringStatus>,
}

fn default_threat_level() -> ThreatLevel {
    ThreatLevel::Medium
}

impl Dataset {
    /// The built-in sample: three competitors and six alerts, two unread.
    #[must_use]
    pub fn demo() -> Self {
        Self::demo_at(Utc::now())
    }

    /// Same as [`Dataset::demo`] with timestamps anchored at `now`.
    #[must_use]
    pub fn demo_at(now: DateTime<Utc>) -> Self {
        Self {
            user: seed::demo_user(),
            competitors: seed::demo_competitors(now),
            alerts: seed::demo_alerts(now),
        }
    }

    /// Assemble a dataset from parts, rejecting duplicate ids, blank names and
    /// out-of-range confidence scores.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] describing the first problem found.
    pub fn from_parts(
        user: User,
        competitors: Vec<Competitor>,
        alerts: Vec<Alert>,
    ) -> Result<Self, ConfigError> {
        let dataset = Self {
            user,
            competitors,
            alerts,
        };
        validate(&dataset)?;
        Ok(dataset)
    }

    #[must_use]
    pub fn user(&self) -> &User {
        &self.user
    }

    #[must_use]
    pub fn competitors(&self) -> &[Competitor] {
        &self.competitors
    }

    #[must_use]
    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    #[must_use]
    pub fn competitor(&self, id: i64) -> Option<&Competitor> {
        self.competitors.iter().find(|c| c.id == id)
    }

    #[must_use]
    pub fn alert(&self, id: i64) -> Option<&Alert> {
        self.alerts.iter().find(|a| a.id == id)
    }

    #[must_use]
    pub fn statistics(&self) -> Statistics {
        Statistics::compute(&self.competitors, &self.alerts)
    }

    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.alerts.iter().filter(|a| !a.is_read).count()
    }

    /// Set the read flag of one alert. Setting the current value again is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] if no alert has this id.
    pub fn set_alert_read_state(&mut self, id: i64, is_read: bool) -> Result<(), CoreError> {
        let alert = self
            .alerts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| CoreError::alert_not_found(id))?;
        alert.is_read = is_read;
        Ok(())
    }

    /// Flip the read flag of one alert and return the new value.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] if no alert has this id.
    pub fn toggle_alert_read(&mut self, id: i64) -> Result<bool, CoreError> {
        let current = self
            .alert(id)
            .map(|a| a.is_read)
            .ok_or_else(|| CoreError::alert_not_found(id))?;
        self.set_alert_read_state(id, !current)?;
        Ok(!current)
    }

    /// Mark every alert read, including ones that already are. Returns how
    /// many alerts actually changed.
    pub fn mark_all_read(&mut self) -> usize {
        let mut changed = 0;
        for alert in &mut self.alerts {
            if !alert.is_read {
                changed += 1;
            }
            alert.is_read = true;
        }
        changed
    }

    /// Register a competitor with the next free id.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if the name or website is blank.
    pub fn insert_competitor(
        &mut self,
        new: NewCompetitor,
        now: DateTime<Utc>,
    ) -> Result<&Competitor, ConfigError> {
        let name = new.name.trim().to_owned();
        if name.is_empty() {
            return Err(ConfigError::Validation(
                "competitor name must be non-empty".to_string(),
            ));
        }
        let website = normalize_website(&new.website)?;

        let id = self.competitors.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        self.competitors.push(Competitor {
            id,
            name,
            website,
            threat_level: new.threat_level,
            industry: new.industry,
            monitoring_status: MonitoringStatus::Active,
            location: new.location,
            alert_count: 0,
            last_scraped: now,
        });

        tracing::info!(competitor_id = id, "competitor registered");
        Ok(&self.competitors[self.competitors.len() - 1])
    }

    /// Apply a partial update to a competitor.
    ///
    /// # Errors
    ///
    /// Returns [`PatchError::Core`] for an unknown id and
    /// [`PatchError::Invalid`] for a blank name or website.
    pub fn update_competitor(
        &mut self,
        id: i64,
        patch: CompetitorPatch,
    ) -> Result<&Competitor, PatchError> {
        let website = patch
            .website
            .as_deref()
            .map(normalize_website)
            .transpose()?;
        let name = match patch.name {
            Some(name) if name.trim().is_empty() => {
                return Err(ConfigError::Validation(
                    "competitor name must be non-empty".to_string(),
                )
                .into());
            }
            other => other.map(|n| n.trim().to_owned()),
        };

        let competitor = self
            .competitors
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| CoreError::competitor_not_found(id))?;

        if let Some(name) = name {
            competitor.name = name;
        }
        if let Some(website) = website {
            competitor.website = website;
        }
        if let Some(threat_level) = patch.threat_level {
            competitor.threat_level = threat_level;
        }
        if let Some(industry) = patch.industry {
            competitor.industry = industry;
        }
        if let Some(location) = patch.location {
            competitor.location = location;
        }
        if let Some(status) = patch.monitoring_status {
            competitor.monitoring_status = status;
        }

        Ok(competitor)
    }

    /// Remove a competitor. Alerts that reference it are left as they are.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] if no competitor has this id.
    pub fn remove_competitor(&mut self, id: i64) -> Result<Competitor, CoreError> {
        let index = self
            .competitors
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| CoreError::competitor_not_found(id))?;
        Ok(self.competitors.remove(index))
    }
}

/// Failure modes of [`Dataset::update_competitor`].
#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// Prefix `https://` onto bare domains; reject blank values.
///
/// # Errors
///
/// Returns [`ConfigError::Validation`] if `raw` is blank.
pub fn normalize_website(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Validation(
            "competitor website must be non-empty".to_string(),
        ));
    }
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_owned())
    } else {
        Ok(format!("https://{trimmed}"))
    }
}

/// Load and validate a dataset from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_dataset(path: &Path) -> Result<Dataset, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::DatasetFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let dataset: Dataset = serde_yaml::from_str(&content)?;
    validate(&dataset)?;

    tracing::debug!(
        path = %path.display(),
        competitors = dataset.competitors.len(),
        alerts = dataset.alerts.len(),
        "dataset loaded"
    );
    Ok(dataset)
}

fn validate(dataset: &Dataset) -> Result<(), ConfigError> {
    let mut seen_competitors = HashSet::new();
    for competitor in &dataset.competitors {
        if competitor.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "competitor {} has an empty name",
                competitor.id
            )));
        }
        if !seen_competitors.insert(competitor.id) {
            return Err(ConfigError::Validation(format!(
                "duplicate competitor id: {}",
                competitor.id
            )));
        }
    }

    let mut seen_alerts = HashSet::new();
    for alert in &dataset.alerts {
        if !seen_alerts.insert(alert.id) {
            return Err(ConfigError::Validation(format!(
                "duplicate alert id: {}",
                alert.id
            )));
        }
        if !(0.0..=1.0).contains(&alert.confidence_score) {
            return Err(ConfigError::Validation(format!(
                "alert {} has confidence_score {}; must be between 0 and 1",
                alert.id, alert.confidence_score
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "dataset_test.rs"]
mod tests;
