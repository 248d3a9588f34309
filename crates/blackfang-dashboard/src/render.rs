//! Pure projections from dashboard state and records into view models.
//!
//! Nothing here mutates. Age labels depend on the `now` passed in, so
//! rendering the same records twice can legitimately produce different
//! output.

use blackfang_core::{Alert, Competitor, Dataset, MonitoringStatus, Statistics, ThreatLevel};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::action::View;
use crate::state::{AlertFilter, AppState, Section};
use crate::time::{format_clock, format_relative};
use crate::toast::{ToastKind, ToastQueue};

/// How many HIGH alerts the dashboard summary shows.
pub const CRITICAL_ALERT_LIMIT: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoginView {
    pub logged_in: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavView {
    pub section: Section,
    pub unread_badge: usize,
    pub refreshing: bool,
    pub user_initial: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub user_name: String,
    pub company_name: String,
    pub statistics: Statistics,
    pub critical_alerts: Vec<AlertRow>,
    pub competitors: Vec<CompetitorRow>,
    pub last_refreshed: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetitorListView {
    pub competitors: Vec<CompetitorRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetitorRow {
    pub id: i64,
    pub name: String,
    pub website: String,
    pub threat_level: ThreatLevel,
    pub industry: String,
    pub monitoring_status: MonitoringStatus,
    pub location: String,
    pub alert_count: u32,
    pub last_scraped: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertListView {
    pub filter: AlertFilter,
    pub alerts: Vec<AlertRow>,
    /// Size of the unfiltered collection.
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertRow {
    pub id: i64,
    pub competitor_id: i64,
    pub competitor_name: String,
    pub title: String,
    pub severity: String,
    pub message: String,
    pub recommendation: String,
    pub confidence_pct: i64,
    pub age: String,
    pub is_read: bool,
    pub toggle_label: &'static str,
}

/// Alert counts per watched competitor, in roster order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportsView {
    pub rows: Vec<ThreatReportRow>,
    /// Alerts whose competitor is no longer on the roster.
    pub unattributed_alerts: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreatReportRow {
    pub competitor_id: i64,
    pub name: String,
    pub threat_level: ThreatLevel,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    /// Includes severities outside LOW, MEDIUM and HIGH.
    pub total: usize,
    pub unread: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToastView {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClockView {
    pub time: String,
}

/// A batch of freshly rendered views. Views that were not re-rendered are
/// `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Frame {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login: Option<LoginView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nav: Option<NavView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard: Option<DashboardView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competitors: Option<CompetitorListView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alerts: Option<AlertListView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reports: Option<ReportsView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toasts: Option<Vec<ToastView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clock: Option<ClockView>,
}

impl Frame {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.login.is_none()
            && self.nav.is_none()
            && self.dashboard.is_none()
            && self.competitors.is_none()
            && self.alerts.is_none()
            && self.reports.is_none()
            && self.toasts.is_none()
            && self.clock.is_none()
    }

    /// Overlay `update` onto an accumulated screen. A logged-out login view
    /// wipes every session view.
    pub fn merge(&mut self, update: Frame) {
        if let Some(login) = update.login {
            if !login.logged_in {
                *self = Frame::default();
            }
            self.login = Some(login);
        }
        if update.nav.is_some() {
            self.nav = update.nav;
        }
        if update.dashboard.is_some() {
            self.dashboard = update.dashboard;
        }
        if update.competitors.is_some() {
            self.competitors = update.competitors;
        }
        if update.alerts.is_some() {
            self.alerts = update.alerts;
        }
        if update.reports.is_some() {
            self.reports = update.reports;
        }
        if update.toasts.is_some() {
            self.toasts = update.toasts;
        }
        if update.clock.is_some() {
            self.clock = update.clock;
        }
    }
}

/// Render one view into `frame`.
///
/// Session views render nothing while logged out.
pub fn render_view(
    view: View,
    state: &AppState,
    dataset: &Dataset,
    now: DateTime<Utc>,
    frame: &mut Frame,
) {
    if view != View::Login && !state.is_logged_in() {
        return;
    }

    match view {
        View::Login => frame.login = Some(render_login(state)),
        View::Nav => frame.nav = Some(render_nav(state, dataset)),
        View::Dashboard => frame.dashboard = Some(render_dashboard(state, dataset, now)),
        View::Competitors => frame.competitors = Some(render_competitors(dataset, now)),
        View::Alerts => frame.alerts = Some(render_alerts(dataset, state.filter(), now)),
        View::Reports => frame.reports = Some(render_reports(dataset)),
        View::Toasts => frame.toasts = Some(render_toasts(state.toasts(), now)),
        View::Clock => frame.clock = Some(render_clock(now)),
    }
}

#[must_use]
pub fn render_login(state: &AppState) -> LoginView {
    LoginView {
        logged_in: state.is_logged_in(),
        error: state.login_error().map(ToOwned::to_owned),
    }
}

#[must_use]
pub fn render_nav(state: &AppState, dataset: &Dataset) -> NavView {
    NavView {
        section: state.section(),
        unread_badge: dataset.unread_count(),
        refreshing: state.is_refreshing(),
        user_initial: state
            .user()
            .and_then(|u| u.name.chars().next())
            .map(|c| c.to_uppercase().collect()),
    }
}

#[must_use]
pub fn render_dashboard(state: &AppState, dataset: &Dataset, now: DateTime<Utc>) -> DashboardView {
    let user = state.user().unwrap_or_else(|| dataset.user());
    DashboardView {
        user_name: user.name.clone(),
        company_name: user.company_name.clone(),
        statistics: dataset.statistics(),
        critical_alerts: critical_alerts(dataset.alerts())
            .map(|a| alert_row(a, now))
            .collect(),
        competitors: dataset
            .competitors()
            .iter()
            .map(|c| competitor_row(c, now))
            .collect(),
        last_refreshed: state.last_refreshed().map(|ts| format_relative(ts, now)),
    }
}

/// The first [`CRITICAL_ALERT_LIMIT`] HIGH alerts in collection order.
pub fn critical_alerts(alerts: &[Alert]) -> impl Iterator<Item = &Alert> {
    alerts
        .iter()
        .filter(|a| AlertFilter::High.matches(&a.severity))
        .take(CRITICAL_ALERT_LIMIT)
}

#[must_use]
pub fn render_competitors(dataset: &Dataset, now: DateTime<Utc>) -> CompetitorListView {
    CompetitorListView {
        competitors: dataset
            .competitors()
            .iter()
            .map(|c| competitor_row(c, now))
            .collect(),
    }
}

#[must_use]
pub fn render_alerts(dataset: &Dataset, filter: AlertFilter, now: DateTime<Utc>) -> AlertListView {
    AlertListView {
        filter,
        alerts: dataset
            .alerts()
            .iter()
            .filter(|a| filter.matches(&a.severity))
            .map(|a| alert_row(a, now))
            .collect(),
        total: dataset.alerts().len(),
    }
}

#[must_use]
pub fn render_reports(dataset: &Dataset) -> ReportsView {
    let mut rows: Vec<ThreatReportRow> = dataset
        .competitors()
        .iter()
        .map(|c| ThreatReportRow {
            competitor_id: c.id,
            name: c.name.clone(),
            threat_level: c.threat_level,
            high: 0,
            medium: 0,
            low: 0,
            total: 0,
            unread: 0,
        })
        .collect();

    let mut unattributed_alerts = 0;
    for alert in dataset.alerts() {
        let Some(row) = rows.iter_mut().find(|r| r.competitor_id == alert.competitor_id) else {
            unattributed_alerts += 1;
            continue;
        };
        if AlertFilter::High.matches(&alert.severity) {
            row.high += 1;
        } else if AlertFilter::Medium.matches(&alert.severity) {
            row.medium += 1;
        } else if AlertFilter::Low.matches(&alert.severity) {
            row.low += 1;
        }
        row.total += 1;
        if !alert.is_read {
            row.unread += 1;
        }
    }

    ReportsView {
        rows,
        unattributed_alerts,
    }
}

#[must_use]
pub fn render_toasts(queue: &ToastQueue, now: DateTime<Utc>) -> Vec<ToastView> {
    queue
        .active(now)
        .map(|t| ToastView {
            id: t.id,
            kind: t.kind,
            message: t.message.clone(),
        })
        .collect()
}

#[must_use]
pub fn render_clock(now: DateTime<Utc>) -> ClockView {
    ClockView {
        time: format_clock(now),
    }
}

fn competitor_row(competitor: &Competitor, now: DateTime<Utc>) -> CompetitorRow {
    CompetitorRow {
        id: competitor.id,
        name: competitor.name.clone(),
        website: competitor.website.clone(),
        threat_level: competitor.threat_level,
        industry: competitor.industry.clone(),
        monitoring_status: competitor.monitoring_status,
        location: competitor.location.clone(),
        alert_count: competitor.alert_count,
        last_scraped: format_relative(competitor.last_scraped, now),
    }
}

fn alert_row(alert: &Alert, now: DateTime<Utc>) -> AlertRow {
    AlertRow {
        id: alert.id,
        competitor_id: alert.competitor_id,
        competitor_name: alert.competitor_name.clone(),
        title: alert.title.clone(),
        severity: alert.severity.to_string(),
        message: alert.message.clone(),
        recommendation: alert.recommendation.clone(),
        confidence_pct: alert.confidence_pct(),
        age: format_relative(alert.created_at, now),
        is_read: alert.is_read,
        toggle_label: if alert.is_read {
            "Mark unread"
        } else {
            "Mark read"
        },
    }
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
