//! Session state, rendering, and timers for the competitive-intelligence
//! dashboard.
//!
//! All state changes go through [`reducer::apply_action`]; the
//! [`Controller`] renders the views an action affected and the
//! [`runtime`] hosts it on tokio with the clock, refresh, and toast timers.

pub mod action;
pub mod controller;
pub mod reducer;
pub mod render;
pub mod runtime;
pub mod source;
pub mod state;
pub mod time;
pub mod toast;

pub use action::{Action, Effect, RefreshOutcome, Secret, View};
pub use controller::{Controller, Dispatch, Observer};
pub use reducer::{apply_action, Outcome, LOGIN_ERROR};
pub use render::{
    AlertListView, AlertRow, ClockView, CompetitorListView, CompetitorRow, DashboardView, Frame,
    LoginView, NavView, ReportsView, ThreatReportRow, ToastView,
};
pub use runtime::{spawn, RuntimeError, RuntimeSettings, SessionHandle};
pub use source::{DataSource, FileSource, SourceError, StaticSource};
pub use state::{AlertFilter, AppState, ParseError, Section};
pub use time::{format_clock, format_relative};
pub use toast::{Toast, ToastKind, ToastQueue};
