use std::time::Duration;

use blackfang_core::{Credentials, Dataset};
use chrono::{DateTime, Utc};

use crate::action::{Action, Effect, RefreshOutcome, View};
use crate::reducer::apply_action;
use crate::render::{render_view, Frame};
use crate::state::{AlertFilter, AppState, Section};
use crate::toast::ToastKind;

/// Receives every non-empty frame the controller renders.
pub trait Observer: Send {
    fn on_frame(&mut self, frame: &Frame);
}

impl<F> Observer for F
where
    F: FnMut(&Frame) + Send,
{
    fn on_frame(&mut self, frame: &Frame) {
        self(frame);
    }
}

/// What one dispatch produced: the views it re-rendered and the timers the
/// host still has to arm or cancel.
#[derive(Debug, Default)]
pub struct Dispatch {
    pub frame: Frame,
    pub effects: Vec<Effect>,
}

/// Owns the dataset and session state; the only writer of either.
pub struct Controller {
    state: AppState,
    dataset: Dataset,
    credentials: Credentials,
    observers: Vec<Box<dyn Observer>>,
}

impl Controller {
    #[must_use]
    pub fn new(dataset: Dataset, credentials: Credentials, toast_ttl: Duration) -> Self {
        Self {
            state: AppState::new(toast_ttl),
            dataset,
            credentials,
            observers: Vec::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn subscribe(&mut self, observer: impl Observer + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Apply an action, render each affected view once, and notify
    /// observers.
    pub fn dispatch(&mut self, action: Action, now: DateTime<Utc>) -> Dispatch {
        let name = action.name();
        let outcome = apply_action(
            &mut self.state,
            &mut self.dataset,
            &self.credentials,
            action,
            now,
        );

        let mut frame = Frame::default();
        for view in &outcome.views {
            render_view(*view, &self.state, &self.dataset, now, &mut frame);
        }
        tracing::trace!(
            action = name,
            views = outcome.views.len(),
            effects = outcome.effects.len(),
            "dispatched"
        );

        self.publish(&frame);
        Dispatch {
            frame,
            effects: outcome.effects,
        }
    }

    /// Render every view from scratch, e.g. for a newly attached screen.
    #[must_use]
    pub fn render_all(&self, now: DateTime<Utc>) -> Frame {
        let mut frame = Frame::default();
        render_view(View::Login, &self.state, &self.dataset, now, &mut frame);
        for view in View::SESSION {
            render_view(view, &self.state, &self.dataset, now, &mut frame);
        }
        frame
    }

    pub fn login(&mut self, email: &str, password: &str, now: DateTime<Utc>) -> Dispatch {
        self.dispatch(Action::login(email, password), now)
    }

    pub fn logout(&mut self, now: DateTime<Utc>) -> Dispatch {
        self.dispatch(Action::Logout, now)
    }

    pub fn navigate_to(&mut self, section: Section, now: DateTime<Utc>) -> Dispatch {
        self.dispatch(Action::Navigate(section), now)
    }

    pub fn set_alert_filter(&mut self, filter: AlertFilter, now: DateTime<Utc>) -> Dispatch {
        self.dispatch(Action::SetFilter(filter), now)
    }

    pub fn toggle_alert_read(&mut self, alert_id: i64, now: DateTime<Utc>) -> Dispatch {
        self.dispatch(Action::ToggleRead(alert_id), now)
    }

    pub fn mark_all_read(&mut self, now: DateTime<Utc>) -> Dispatch {
        self.dispatch(Action::MarkAllRead, now)
    }

    pub fn notify(
        &mut self,
        kind: ToastKind,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Dispatch {
        self.dispatch(
            Action::Notify {
                kind,
                message: message.into(),
            },
            now,
        )
    }

    /// Refresh without a round trip: request and complete in one step.
    ///
    /// Used where no timer host is running. The returned effects are the
    /// completion's; the request's own refresh timer is consumed here.
    pub fn refresh_now(&mut self, outcome: RefreshOutcome, now: DateTime<Utc>) -> Dispatch {
        let requested = self.dispatch(Action::RefreshRequested, now);
        let Some(epoch) = requested.effects.iter().find_map(|e| match e {
            Effect::ScheduleRefresh { epoch } => Some(*epoch),
            _ => None,
        }) else {
            return requested;
        };

        let mut completed = self.dispatch(Action::RefreshCompleted { epoch, outcome }, now);
        let mut frame = requested.frame;
        frame.merge(std::mem::take(&mut completed.frame));
        Dispatch {
            frame,
            effects: completed.effects,
        }
    }

    fn publish(&mut self, frame: &Frame) {
        if frame.is_empty() {
            return;
        }
        for observer in &mut self.observers {
            observer.on_frame(frame);
        }
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("state", &self.state)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
