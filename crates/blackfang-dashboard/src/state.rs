use std::str::FromStr;
use std::time::Duration;

use blackfang_core::{Severity, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::toast::ToastQueue;

/// Mutually exclusive top-level views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    #[default]
    Dashboard,
    Competitors,
    Alerts,
    Reports,
    Settings,
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Section::Dashboard => write!(f, "dashboard"),
            Section::Competitors => write!(f, "competitors"),
            Section::Alerts => write!(f, "alerts"),
            Section::Reports => write!(f, "reports"),
            Section::Settings => write!(f, "settings"),
        }
    }
}

impl FromStr for Section {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dashboard" => Ok(Section::Dashboard),
            "competitors" => Ok(Section::Competitors),
            "alerts" => Ok(Section::Alerts),
            "reports" => Ok(Section::Reports),
            "settings" => Ok(Section::Settings),
            _ => Err(ParseError::Section(s.to_owned())),
        }
    }
}

/// Severity predicate applied to the alert list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertFilter {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "LOW")]
    Low,
    #[serde(rename = "MEDIUM")]
    Medium,
    #[serde(rename = "HIGH")]
    High,
}

impl AlertFilter {
    /// `All` admits everything; the others require an exact severity match,
    /// so unrecognised severities only ever show under `All`.
    #[must_use]
    pub fn matches(self, severity: &Severity) -> bool {
        match self {
            AlertFilter::All => true,
            AlertFilter::Low => *severity == Severity::Low,
            AlertFilter::Medium => *severity == Severity::Medium,
            AlertFilter::High => *severity == Severity::High,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AlertFilter::All => "all",
            AlertFilter::Low => "LOW",
            AlertFilter::Medium => "MEDIUM",
            AlertFilter::High => "HIGH",
        }
    }
}

impl std::fmt::Display for AlertFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertFilter {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ALL" => Ok(AlertFilter::All),
            "LOW" => Ok(AlertFilter::Low),
            "MEDIUM" => Ok(AlertFilter::Medium),
            "HIGH" => Ok(AlertFilter::High),
            _ => Err(ParseError::Filter(s.to_owned())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown section '{0}'")]
    Section(String),
    #[error("unknown alert filter '{0}'; expected all, LOW, MEDIUM or HIGH")]
    Filter(String),
}

/// Session and view state owned by the controller.
///
/// `epoch` increases on every login and logout. Timers capture it when they
/// are scheduled and their callbacks are dropped if it has moved on.
#[derive(Debug, Clone)]
pub struct AppState {
    pub(crate) user: Option<User>,
    pub(crate) section: Section,
    pub(crate) filter: AlertFilter,
    pub(crate) login_error: Option<String>,
    pub(crate) refreshing: bool,
    pub(crate) last_refreshed: Option<DateTime<Utc>>,
    pub(crate) epoch: u64,
    pub(crate) toasts: ToastQueue,
}

impl AppState {
    #[must_use]
    pub fn new(toast_ttl: Duration) -> Self {
        Self {
            user: None,
            section: Section::default(),
            filter: AlertFilter::default(),
            login_error: None,
            refreshing: false,
            last_refreshed: None,
            epoch: 0,
            toasts: ToastQueue::new(toast_ttl),
        }
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    #[must_use]
    pub fn section(&self) -> Section {
        self.section
    }

    #[must_use]
    pub fn filter(&self) -> AlertFilter {
        self.filter
    }

    #[must_use]
    pub fn login_error(&self) -> Option<&str> {
        self.login_error.as_deref()
    }

    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    #[must_use]
    pub fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.last_refreshed
    }

    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    #[must_use]
    pub fn toasts(&self) -> &ToastQueue {
        &self.toasts
    }

    /// Back to the logged-out defaults and start a new epoch.
    pub(crate) fn reset(&mut self) {
        self.user = None;
        self.section = Section::default();
        self.filter = AlertFilter::default();
        self.login_error = None;
        self.refreshing = false;
        self.last_refreshed = None;
        self.toasts.clear();
        self.epoch += 1;
    }
}
