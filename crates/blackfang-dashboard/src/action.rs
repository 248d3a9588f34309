use std::time::Duration;

use blackfang_core::Dataset;
use serde::Serialize;

use crate::state::{AlertFilter, Section};
use crate::toast::ToastKind;

/// Password wrapper that never prints its contents.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[redacted]")
    }
}

/// Everything that can change dashboard state.
///
/// Timer-originated actions carry the session epoch they were scheduled in.
#[derive(Debug, Clone)]
pub enum Action {
    Login { email: String, password: Secret },
    Logout,
    Navigate(Section),
    SetFilter(AlertFilter),
    ToggleRead(i64),
    MarkAllRead,
    RefreshRequested,
    RefreshCompleted { epoch: u64, outcome: RefreshOutcome },
    Notify { kind: ToastKind, message: String },
    DismissToast { epoch: u64, id: u64 },
    Tick { epoch: u64 },
}

impl Action {
    #[must_use]
    pub fn login(email: impl Into<String>, password: impl Into<Secret>) -> Self {
        Action::Login {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Action::Login { .. } => "login",
            Action::Logout => "logout",
            Action::Navigate(_) => "navigate",
            Action::SetFilter(_) => "set_filter",
            Action::ToggleRead(_) => "toggle_read",
            Action::MarkAllRead => "mark_all_read",
            Action::RefreshRequested => "refresh_requested",
            Action::RefreshCompleted { .. } => "refresh_completed",
            Action::Notify { .. } => "notify",
            Action::DismissToast { .. } => "dismiss_toast",
            Action::Tick { .. } => "tick",
        }
    }

    pub(crate) fn requires_session(&self) -> bool {
        !matches!(self, Action::Login { .. } | Action::Logout)
    }
}

/// Result of a data refresh, fed back in through [`Action::RefreshCompleted`].
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    /// Re-render from the records already in memory.
    Unchanged,
    Replaced(Box<Dataset>),
    Failed(String),
}

/// Renderable regions of the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Login,
    /// Navigation bar: active section, unread badge, refresh indicator.
    Nav,
    Dashboard,
    Competitors,
    Alerts,
    /// Per-competitor alert breakdown.
    Reports,
    Toasts,
    Clock,
}

impl View {
    /// Every view shown while logged in.
    pub const SESSION: [View; 7] = [
        View::Nav,
        View::Dashboard,
        View::Competitors,
        View::Alerts,
        View::Reports,
        View::Toasts,
        View::Clock,
    ];
}

/// Side effects the reducer asks its host to carry out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Start session-scoped periodic timers (clock, auto-refresh).
    StartSession { epoch: u64 },
    /// Cancel every session-scoped timer.
    EndSession,
    /// Complete a refresh after the simulated round trip.
    ScheduleRefresh { epoch: u64 },
    ScheduleToastDismiss { epoch: u64, id: u64, after: Duration },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_debug_redacts_password() {
        let action = Action::login("demo@blackfangintel.com", "demo123");
        let rendered = format!("{action:?}");
        assert!(!rendered.contains("demo123"));
        assert!(rendered.contains("[redacted]"));
    }

    #[test]
    fn only_login_and_logout_run_without_session() {
        assert!(!Action::login("a", "b").requires_session());
        assert!(!Action::Logout.requires_session());
        assert!(Action::MarkAllRead.requires_session());
        assert!(Action::Tick { epoch: 1 }.requires_session());
    }
}
