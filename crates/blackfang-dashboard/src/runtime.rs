//! Tokio host for a [`Controller`]: owns it on one task, serialises every
//! action through a channel, and runs the session timers the reducer asks
//! for.

use std::sync::Arc;
use std::time::Duration;

use blackfang_core::AppConfig;
use chrono::Utc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, WeakUnboundedSender};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::action::{Action, Effect, RefreshOutcome};
use crate::controller::Controller;
use crate::render::Frame;
use crate::source::DataSource;

pub const DEFAULT_REFRESH_DELAY: Duration = Duration::from_millis(1_500);
pub const DEFAULT_CLOCK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeSettings {
    /// Simulated round trip between a refresh request and its completion.
    pub refresh_delay: Duration,
    pub clock_interval: Duration,
    /// `None` disables periodic refresh.
    pub auto_refresh: Option<Duration>,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            refresh_delay: DEFAULT_REFRESH_DELAY,
            clock_interval: DEFAULT_CLOCK_INTERVAL,
            auto_refresh: None,
        }
    }
}

impl RuntimeSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            refresh_delay: config.refresh_delay(),
            clock_interval: DEFAULT_CLOCK_INTERVAL,
            auto_refresh: config.auto_refresh(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("dashboard runtime has stopped")]
    Closed,
}

#[derive(Debug)]
enum Command {
    Dispatch(Action),
    Shutdown,
}

/// Cloneable handle to a running dashboard.
///
/// The runtime stops once every handle is dropped or [`SessionHandle::shutdown`]
/// is called.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: UnboundedSender<Command>,
    screen: watch::Receiver<Frame>,
}

impl SessionHandle {
    /// Queue an action. Actions are applied strictly in send order.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Closed`] if the runtime task has exited.
    pub fn dispatch(&self, action: Action) -> Result<(), RuntimeError> {
        self.tx
            .send(Command::Dispatch(action))
            .map_err(|_| RuntimeError::Closed)
    }

    /// The accumulated screen, updated after every dispatch that rendered
    /// something.
    #[must_use]
    pub fn screen(&self) -> watch::Receiver<Frame> {
        self.screen.clone()
    }

    #[must_use]
    pub fn current(&self) -> Frame {
        self.screen.borrow().clone()
    }

    pub fn shutdown(&self) {
        // Already stopped is fine.
        let _ = self.tx.send(Command::Shutdown);
    }
}

/// Move `controller` onto a new task and start serving actions.
///
/// The join handle resolves to the controller once the runtime stops.
#[must_use]
pub fn spawn(
    controller: Controller,
    source: Arc<dyn DataSource>,
    settings: RuntimeSettings,
) -> (SessionHandle, JoinHandle<Controller>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let (screen_tx, screen_rx) = watch::channel(controller.render_all(Utc::now()));

    let timers = TimerSet {
        loopback: tx.downgrade(),
        source,
        settings,
        running: Vec::new(),
    };
    let task = tokio::spawn(run(controller, rx, screen_tx, timers));

    (
        SessionHandle {
            tx,
            screen: screen_rx,
        },
        task,
    )
}

async fn run(
    mut controller: Controller,
    mut rx: UnboundedReceiver<Command>,
    screen: watch::Sender<Frame>,
    mut timers: TimerSet,
) -> Controller {
    tracing::info!(source = %timers.source.describe(), "dashboard runtime started");

    while let Some(command) = rx.recv().await {
        let action = match command {
            Command::Dispatch(action) => action,
            Command::Shutdown => break,
        };

        let dispatch = controller.dispatch(action, Utc::now());
        if !dispatch.frame.is_empty() {
            screen.send_modify(|current| current.merge(dispatch.frame));
        }
        for effect in dispatch.effects {
            timers.apply(effect);
        }
    }

    timers.cancel_all();
    tracing::info!("dashboard runtime stopped");
    controller
}

/// Session-scoped background tasks. Each feeds actions back through a weak
/// sender so a pending timer never keeps the runtime alive.
struct TimerSet {
    loopback: WeakUnboundedSender<Command>,
    source: Arc<dyn DataSource>,
    settings: RuntimeSettings,
    running: Vec<JoinHandle<()>>,
}

impl TimerSet {
    fn apply(&mut self, effect: Effect) {
        self.running.retain(|task| !task.is_finished());

        match effect {
            Effect::StartSession { epoch } => {
                let clock = self.settings.clock_interval;
                self.every(clock, false, move || Action::Tick { epoch });
                if let Some(period) = self.settings.auto_refresh {
                    tracing::debug!(period_secs = period.as_secs(), "auto-refresh armed");
                    self.every(period, true, || Action::RefreshRequested);
                }
            }
            Effect::EndSession => self.cancel_all(),
            Effect::ScheduleRefresh { epoch } => {
                let source = Arc::clone(&self.source);
                let delay = self.settings.refresh_delay;
                self.after(delay, async move {
                    let outcome = match source.fetch().await {
                        Ok(Some(dataset)) => RefreshOutcome::Replaced(Box::new(dataset)),
                        Ok(None) => RefreshOutcome::Unchanged,
                        Err(e) => RefreshOutcome::Failed(e.to_string()),
                    };
                    Action::RefreshCompleted { epoch, outcome }
                });
            }
            Effect::ScheduleToastDismiss { epoch, id, after } => {
                self.after(after, async move { Action::DismissToast { epoch, id } });
            }
        }
    }

    fn cancel_all(&mut self) {
        let count = self.running.len();
        for task in self.running.drain(..) {
            task.abort();
        }
        if count > 0 {
            tracing::debug!(count, "session timers cancelled");
        }
    }

    fn every(
        &mut self,
        period: Duration,
        skip_first: bool,
        make: impl Fn() -> Action + Send + 'static,
    ) {
        let loopback = self.loopback.clone();
        self.running.push(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            if skip_first {
                interval.tick().await;
            }
            loop {
                interval.tick().await;
                if !send(&loopback, make()) {
                    break;
                }
            }
        }));
    }

    fn after<F>(&mut self, delay: Duration, action: F)
    where
        F: std::future::Future<Output = Action> + Send + 'static,
    {
        let loopback = self.loopback.clone();
        self.running.push(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            send(&loopback, action.await);
        }));
    }
}

fn send(loopback: &WeakUnboundedSender<Command>, action: Action) -> bool {
    loopback
        .upgrade()
        .is_some_and(|tx| tx.send(Command::Dispatch(action)).is_ok())
}

#[cfg(test)]
#[path = "runtime_test.rs"]
mod tests;
