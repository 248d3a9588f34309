//! Commands that run the dashboard in-process over the configured dataset.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use blackfang_client::{BlackfangClient, FileSessionHook, RemoteSource};
use blackfang_core::{dataset_from_config, AppConfig};
use blackfang_dashboard::{
    spawn, Action, AlertFilter, Controller, DataSource, FileSource, Frame, RefreshOutcome,
    RuntimeSettings, Section, StaticSource, ToastKind,
};
use chrono::Utc;
use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::format::print_frame;

/// How long the REPL waits for the runtime to publish a new screen.
const SCREEN_WAIT: Duration = Duration::from_millis(250);

/// Credential overrides; the configured demo account is used otherwise.
#[derive(Debug, Clone, Default, Args)]
pub struct LocalArgs {
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub password: Option<String>,
}

/// Where a live session pulls fresh records from on refresh.
#[derive(Debug, Clone, Default, Args)]
pub struct SourceArgs {
    /// Refresh from a running API server instead of the local dataset
    #[arg(long)]
    pub api_url: Option<String>,
    /// Where the API login session is kept between runs
    #[arg(long, env = "BLACKFANG_SESSION_FILE", default_value = ".blackfang/session.json")]
    pub session_file: PathBuf,
}

impl LocalArgs {
    fn resolve<'a>(&'a self, config: &'a AppConfig) -> (&'a str, &'a str) {
        (
            self.email.as_deref().unwrap_or(&config.demo_email),
            self.password.as_deref().unwrap_or(&config.demo_password),
        )
    }
}

fn build_controller(config: &AppConfig) -> anyhow::Result<Controller> {
    let dataset = dataset_from_config(config)?;
    tracing::debug!(
        competitors = dataset.competitors().len(),
        alerts = dataset.alerts().len(),
        "dataset loaded"
    );
    Ok(Controller::new(
        dataset,
        config.credentials(),
        config.toast_ttl(),
    ))
}

/// Keep the navigation bar plus whichever region `section` shows.
fn section_frame(full: Frame, section: Section) -> Frame {
    let mut frame = Frame {
        nav: full.nav,
        clock: full.clock,
        ..Frame::default()
    };
    match section {
        Section::Dashboard => frame.dashboard = full.dashboard,
        Section::Competitors => frame.competitors = full.competitors,
        Section::Alerts => frame.alerts = full.alerts,
        Section::Reports => frame.reports = full.reports,
        Section::Settings => {}
    }
    frame
}

/// Log in, move to `section` with `filter` applied, and print it.
///
/// # Errors
///
/// Returns an error if the dataset cannot be loaded or login is rejected.
pub(crate) fn run_render(
    config: &AppConfig,
    login: &LocalArgs,
    section: Section,
    filter: AlertFilter,
    json: bool,
) -> anyhow::Result<()> {
    let mut controller = build_controller(config)?;
    let now = Utc::now();
    let (email, password) = login.resolve(config);

    controller.login(email, password, now);
    if let Some(error) = controller.state().login_error() {
        anyhow::bail!("login failed: {error}");
    }
    controller.navigate_to(section, now);
    controller.set_alert_filter(filter, now);

    print_frame(&section_frame(controller.render_all(now), section), json)
}

/// Run a fixed walkthrough and print the views each step re-rendered.
///
/// # Errors
///
/// Returns an error if the dataset cannot be loaded or a frame cannot be
/// serialized.
pub(crate) fn run_demo(config: &AppConfig, login: &LocalArgs, json: bool) -> anyhow::Result<()> {
    let mut controller = build_controller(config)?;
    let (email, password) = login.resolve(config);

    let step = |title: &str, frame: &Frame| -> anyhow::Result<()> {
        println!("\n=== {title} ===");
        print_frame(frame, json)
    };

    let now = Utc::now();
    let d = controller.login(email, "not-the-password", now);
    step("login with a wrong password", &d.frame)?;

    let d = controller.login(email, password, now);
    step("login", &d.frame)?;
    if !controller.state().is_logged_in() {
        anyhow::bail!("demo login rejected; check BLACKFANG_DEMO_EMAIL/PASSWORD");
    }

    let d = controller.navigate_to(Section::Alerts, now);
    step("open alerts", &d.frame)?;

    let d = controller.set_alert_filter(AlertFilter::High, now);
    step("filter HIGH", &d.frame)?;

    let unread = controller
        .dataset()
        .alerts()
        .iter()
        .find(|a| !a.is_read)
        .map(|a| a.id);
    if let Some(id) = unread {
        let d = controller.toggle_alert_read(id, now);
        step(&format!("toggle alert #{id}"), &d.frame)?;
    }

    let d = controller.mark_all_read(now);
    step("mark all read", &d.frame)?;

    let d = controller.refresh_now(RefreshOutcome::Unchanged, now);
    step("refresh", &d.frame)?;

    let d = controller.logout(now);
    step("logout", &d.frame)?;
    Ok(())
}

/// One line of REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ReplCommand {
    Login {
        email: Option<String>,
        password: Option<String>,
    },
    Logout,
    Go(Section),
    Filter(AlertFilter),
    Toggle(i64),
    ReadAll,
    Refresh,
    Notify(String),
    Show,
    Help,
    Quit,
}

pub(crate) const REPL_HELP: &str = "\
commands:
  login [email] [password]   sign in (defaults to the demo account)
  logout
  go <section>               dashboard, competitors, alerts, reports, settings
  filter <severity>          all, LOW, MEDIUM, HIGH
  toggle <alert id>          flip read/unread
  read-all                   mark every alert read
  refresh                    reload data after the refresh delay
  notify <message>           show an info toast
  show                       print the whole screen
  quit";

/// Parse a REPL line. Blank input yields `Ok(None)`.
pub(crate) fn parse_repl_line(line: &str) -> Result<Option<ReplCommand>, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };

    let command = match head.to_ascii_lowercase().as_str() {
        "login" => ReplCommand::Login {
            email: words.next().map(str::to_owned),
            password: words.next().map(str::to_owned),
        },
        "logout" => ReplCommand::Logout,
        "go" | "nav" => {
            let target = words.next().ok_or("usage: go <section>")?;
            ReplCommand::Go(target.parse().map_err(|e| format!("{e}"))?)
        }
        "filter" => {
            let filter = words.next().ok_or("usage: filter <severity>")?;
            ReplCommand::Filter(filter.parse().map_err(|e| format!("{e}"))?)
        }
        "toggle" => {
            let id = words.next().ok_or("usage: toggle <alert id>")?;
            ReplCommand::Toggle(id.parse().map_err(|_| format!("invalid alert id '{id}'"))?)
        }
        "read-all" => ReplCommand::ReadAll,
        "refresh" => ReplCommand::Refresh,
        "notify" => {
            let message = words.collect::<Vec<_>>().join(" ");
            if message.is_empty() {
                return Err("usage: notify <message>".to_string());
            }
            ReplCommand::Notify(message)
        }
        "show" => ReplCommand::Show,
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" => ReplCommand::Quit,
        other => return Err(format!("unknown command '{other}'; try `help`")),
    };
    Ok(Some(command))
}

/// Controller and refresh source backed by the local dataset.
fn local_session(config: &AppConfig) -> anyhow::Result<(Controller, Arc<dyn DataSource>)> {
    let controller = build_controller(config)?;
    let source: Arc<dyn DataSource> = match &config.dataset_path {
        Some(path) => Arc::new(FileSource::new(path.clone())),
        None => Arc::new(StaticSource),
    };
    Ok((controller, source))
}

/// Controller seeded from the API server at `url`, refreshing from it.
///
/// Reuses the session stored in `session_file`, or signs in with the
/// configured demo account when there is none.
async fn remote_session(
    config: &AppConfig,
    url: &str,
    session_file: PathBuf,
) -> anyhow::Result<(Controller, Arc<dyn DataSource>)> {
    let hook = Arc::new(FileSessionHook::new(session_file));
    let client = BlackfangClient::new(url)?.with_session_hook(hook)?;
    if !client.is_logged_in().await {
        client
            .login(&config.demo_email, &config.demo_password)
            .await
            .context("signing in to the API server")?;
    }

    let source = RemoteSource::new(Arc::new(client));
    let dataset = source
        .fetch()
        .await?
        .context("API server returned no records")?;
    tracing::info!(
        source = %source.describe(),
        competitors = dataset.competitors().len(),
        alerts = dataset.alerts().len(),
        "remote dataset loaded"
    );

    let controller = Controller::new(dataset, config.credentials(), config.toast_ttl());
    Ok((controller, Arc::new(source)))
}

async fn repl_session(
    config: &AppConfig,
    source: SourceArgs,
) -> anyhow::Result<(Controller, Arc<dyn DataSource>)> {
    match source.api_url {
        Some(url) => remote_session(config, &url, source.session_file).await,
        None => local_session(config),
    }
}

/// Serve a live session on the tokio runtime, reading commands from stdin.
///
/// # Errors
///
/// Returns an error if the dataset cannot be loaded, the API server cannot
/// be reached, or the runtime stops unexpectedly.
pub(crate) async fn run_repl(
    config: &AppConfig,
    source: SourceArgs,
    json: bool,
) -> anyhow::Result<()> {
    let (controller, source) = repl_session(config, source).await?;
    let (handle, task) = spawn(controller, source, RuntimeSettings::from_config(config));
    let mut screen = handle.screen();

    println!("{REPL_HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_repl_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };

        let action = match command {
            ReplCommand::Quit => break,
            ReplCommand::Help => {
                println!("{REPL_HELP}");
                continue;
            }
            ReplCommand::Show => {
                print_frame(&handle.current(), json)?;
                continue;
            }
            ReplCommand::Login { email, password } => Action::login(
                email.unwrap_or_else(|| config.demo_email.clone()),
                password.unwrap_or_else(|| config.demo_password.clone()),
            ),
            ReplCommand::Logout => Action::Logout,
            ReplCommand::Go(section) => Action::Navigate(section),
            ReplCommand::Filter(filter) => Action::SetFilter(filter),
            ReplCommand::Toggle(id) => Action::ToggleRead(id),
            ReplCommand::ReadAll => Action::MarkAllRead,
            ReplCommand::Refresh => Action::RefreshRequested,
            ReplCommand::Notify(message) => Action::Notify {
                kind: ToastKind::Info,
                message,
            },
        };

        screen.mark_unchanged();
        handle.dispatch(action)?;
        if tokio::time::timeout(SCREEN_WAIT, screen.changed()).await.is_ok() {
            let frame = screen.borrow_and_update().clone();
            print_frame(&frame, json)?;
        }
    }

    handle.shutdown();
    let controller = task.await?;
    tracing::info!(
        logged_in = controller.state().is_logged_in(),
        "repl session closed"
    );
    Ok(())
}
