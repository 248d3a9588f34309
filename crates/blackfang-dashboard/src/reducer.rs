//! The single place dashboard state changes: `(state, action) -> outcome`.
//!
//! The reducer never renders. It reports which views the action affected and
//! which timers the host has to arm or cancel; the controller renders each
//! affected view exactly once.

use std::collections::BTreeSet;

use blackfang_core::{Credentials, Dataset};
use chrono::{DateTime, Utc};

use crate::action::{Action, Effect, RefreshOutcome, View};
use crate::state::{AppState, Section};
use crate::toast::ToastKind;

/// Inline message shown for any rejected login.
pub const LOGIN_ERROR: &str = "Invalid credentials";
pub const REFRESH_OK: &str = "Dashboard data refreshed";
pub const REFRESH_FAILED: &str = "Refresh failed, showing cached data";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub views: BTreeSet<View>,
    pub effects: Vec<Effect>,
}

impl Outcome {
    fn render(views: impl IntoIterator<Item = View>) -> Self {
        Self {
            views: views.into_iter().collect(),
            effects: Vec::new(),
        }
    }

    fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Apply one action.
///
/// Actions other than login/logout are ignored while logged out, and
/// timer-originated actions from an earlier epoch are ignored always.
pub fn apply_action(
    state: &mut AppState,
    dataset: &mut Dataset,
    credentials: &Credentials,
    action: Action,
    now: DateTime<Utc>,
) -> Outcome {
    if action.requires_session() && !state.is_logged_in() {
        tracing::debug!(action = action.name(), "ignoring action while logged out");
        return Outcome::default();
    }

    match action {
        Action::Login { email, password } => {
            login(state, dataset, credentials, &email, password.expose())
        }
        Action::Logout => logout(state),
        Action::Navigate(section) => navigate(state, section),
        Action::SetFilter(filter) => {
            state.filter = filter;
            tracing::debug!(filter = %filter, "alert filter changed");
            Outcome::render([View::Alerts])
        }
        Action::ToggleRead(id) => match dataset.toggle_alert_read(id) {
            Ok(is_read) => {
                tracing::debug!(alert_id = id, is_read, "alert read state toggled");
                Outcome::render([View::Alerts, View::Nav, View::Dashboard, View::Reports])
            }
            Err(e) => {
                tracing::debug!(error = %e, "toggle skipped");
                Outcome::default()
            }
        },
        Action::MarkAllRead => {
            let changed = dataset.mark_all_read();
            tracing::debug!(changed, "marked all alerts read");
            Outcome::render([View::Alerts, View::Nav, View::Dashboard, View::Reports])
        }
        Action::RefreshRequested => {
            if state.refreshing {
                return Outcome::default();
            }
            state.refreshing = true;
            Outcome::render([View::Nav]).with_effect(Effect::ScheduleRefresh { epoch: state.epoch })
        }
        Action::RefreshCompleted { epoch, outcome } => {
            if epoch != state.epoch {
                tracing::debug!(epoch, current = state.epoch, "dropping stale refresh");
                return Outcome::default();
            }
            refresh_completed(state, dataset, outcome, now)
        }
        Action::Notify { kind, message } => notify(state, kind, message, now, [View::Toasts]),
        Action::DismissToast { epoch, id } => {
            if epoch == state.epoch && state.toasts.dismiss(id) {
                Outcome::render([View::Toasts])
            } else {
                Outcome::default()
            }
        }
        Action::Tick { epoch } => {
            if epoch != state.epoch {
                return Outcome::default();
            }
            let mut outcome = Outcome::render([View::Clock]);
            if state.toasts.prune(now) > 0 {
                outcome.views.insert(View::Toasts);
            }
            outcome
        }
    }
}

fn login(
    state: &mut AppState,
    dataset: &Dataset,
    credentials: &Credentials,
    email: &str,
    password: &str,
) -> Outcome {
    if state.is_logged_in() {
        tracing::debug!("login ignored: session already active");
        return Outcome::default();
    }

    if let Err(e) = credentials.verify(email, password) {
        tracing::warn!(error = %e, "login rejected");
        state.login_error = Some(LOGIN_ERROR.to_string());
        return Outcome::render([View::Login]);
    }

    state.user = Some(dataset.user().clone());
    state.section = Section::Dashboard;
    state.login_error = None;
    state.epoch += 1;
    tracing::info!(user_id = dataset.user().id, epoch = state.epoch, "session started");

    let mut outcome = Outcome::render(View::SESSION);
    outcome.views.insert(View::Login);
    outcome.with_effect(Effect::StartSession { epoch: state.epoch })
}

fn logout(state: &mut AppState) -> Outcome {
    let was_logged_in = state.is_logged_in();
    state.reset();

    let outcome = Outcome::render([View::Login]);
    if was_logged_in {
        tracing::info!(epoch = state.epoch, "session ended");
        outcome.with_effect(Effect::EndSession)
    } else {
        outcome
    }
}

fn navigate(state: &mut AppState, section: Section) -> Outcome {
    state.section = section;
    tracing::debug!(section = %section, "navigated");

    let mut outcome = Outcome::render([View::Nav]);
    match section {
        Section::Competitors => {
            outcome.views.insert(View::Competitors);
        }
        Section::Alerts => {
            outcome.views.insert(View::Alerts);
        }
        Section::Reports => {
            outcome.views.insert(View::Reports);
        }
        Section::Dashboard | Section::Settings => {}
    }
    outcome
}

fn refresh_completed(
    state: &mut AppState,
    dataset: &mut Dataset,
    outcome: RefreshOutcome,
    now: DateTime<Utc>,
) -> Outcome {
    state.refreshing = false;

    match outcome {
        RefreshOutcome::Unchanged => {}
        RefreshOutcome::Replaced(fresh) => *dataset = *fresh,
        RefreshOutcome::Failed(reason) => {
            tracing::warn!(reason = %reason, "refresh failed");
            return notify(state, ToastKind::Error, REFRESH_FAILED, now, [View::Nav, View::Toasts]);
        }
    }

    state.last_refreshed = Some(now);
    tracing::info!("dashboard refreshed");
    notify(state, ToastKind::Success, REFRESH_OK, now, View::SESSION)
}

fn notify(
    state: &mut AppState,
    kind: ToastKind,
    message: impl Into<String>,
    now: DateTime<Utc>,
    views: impl IntoIterator<Item = View>,
) -> Outcome {
    let id = state.toasts.push(kind, message, now);
    let mut outcome = Outcome::render(views);
    outcome.views.insert(View::Toasts);
    outcome.with_effect(Effect::ScheduleToastDismiss {
        epoch: state.epoch,
        id,
        after: state.toasts.ttl(),
    })
}

#[cfg(test)]
#[path = "reducer_test.rs"]
mod tests;
