//! Commands that call a running API server through `blackfang-client`.

use std::path::PathBuf;
use std::sync::Arc;

use blackfang_client::{BlackfangClient, FileSessionHook};
use blackfang_core::{Alert, Competitor};
use clap::Subcommand;

use crate::format::print_json;

#[derive(Debug, Subcommand)]
pub enum RemoteCommands {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Revoke the stored session
    Logout,
    /// Server liveness and record counts
    Health,
    /// Statistics, recent alerts, and the watchlist
    Dashboard,
    /// List competitors
    Competitors,
    /// One page of the alert feed
    Alerts {
        /// LOW, MEDIUM or HIGH; omit for every alert
        #[arg(long)]
        severity: Option<String>,
        #[arg(long, default_value = "50")]
        limit: usize,
        #[arg(long, default_value = "0")]
        offset: usize,
    },
    /// Mark one alert read
    Read { id: i64 },
    /// Mark every alert read
    ReadAll,
    /// Remove an alert from the feed
    Archive { id: i64 },
}

fn competitor_lines(competitors: &[Competitor]) {
    println!(
        "{:<5}{:<28}{:<8}{:<9}LOCATION",
        "ID", "NAME", "THREAT", "STATUS"
    );
    for c in competitors {
        println!(
            "{:<5}{:<28}{:<8}{:<9}{}",
            c.id,
            c.name,
            c.threat_level.to_string(),
            c.monitoring_status.to_string(),
            c.location
        );
    }
}

fn alert_lines(alerts: &[Alert]) {
    for a in alerts {
        let marker = if a.is_read { ' ' } else { '*' };
        println!(
            "{marker} #{:<4}{:<8}{} ({})",
            a.id,
            a.severity.to_string(),
            a.title,
            a.competitor_name
        );
    }
}

/// Execute one remote subcommand against `url`.
///
/// # Errors
///
/// Returns an error if the client cannot be built, the session file cannot
/// be read, or the server rejects the request.
pub(crate) async fn run_remote(
    url: &str,
    session_file: PathBuf,
    command: RemoteCommands,
    json: bool,
) -> anyhow::Result<()> {
    let hook = Arc::new(FileSessionHook::new(session_file));
    let client = BlackfangClient::new(url)?.with_session_hook(hook)?;
    tracing::debug!(base_url = %client.base_url(), "remote client ready");

    match command {
        RemoteCommands::Login { email, password } => {
            let user = client.login(&email, &password).await?;
            if json {
                print_json(&user)?;
            } else {
                println!("logged in as {} ({})", user.name, user.company_name);
            }
        }
        RemoteCommands::Logout => {
            let revoked = client.logout().await?;
            println!("logged out{}", if revoked { "" } else { " (no server session)" });
        }
        RemoteCommands::Health => print_json(&client.health().await?)?,
        RemoteCommands::Dashboard => {
            let data = client.dashboard().await?;
            if json {
                print_json(&data)?;
            } else {
                let s = &data.statistics;
                println!("{} ({})", data.user.name, data.user.company_name);
                println!(
                    "competitors {}   alerts {}   high {}   unread {}",
                    s.competitors, s.alerts, s.high_alerts, s.unread_alerts
                );
                println!("\nRECENT ALERTS");
                alert_lines(&data.recent_alerts);
                println!("\nWATCHLIST");
                competitor_lines(&data.competitors);
            }
        }
        RemoteCommands::Competitors => {
            let competitors = client.competitors().await?;
            if json {
                print_json(&competitors)?;
            } else {
                competitor_lines(&competitors);
            }
        }
        RemoteCommands::Alerts {
            severity,
            limit,
            offset,
        } => {
            let page = client.alerts(severity.as_deref(), limit, offset).await?;
            if json {
                print_json(&page)?;
            } else {
                println!(
                    "showing {} of {} (offset {}){}",
                    page.alerts.len(),
                    page.total,
                    page.offset,
                    if page.has_more { ", more available" } else { "" }
                );
                alert_lines(&page.alerts);
            }
        }
        RemoteCommands::Read { id } => {
            let alert = client.mark_alert_read(id).await?;
            println!("alert #{} marked read", alert.id);
        }
        RemoteCommands::ReadAll => {
            let updated = client.mark_all_read().await?;
            println!("{updated} alert(s) marked read");
        }
        RemoteCommands::Archive { id } => {
            let alert = client.archive_alert(id).await?;
            println!("alert #{} archived", alert.id);
        }
    }

    Ok(())
}
