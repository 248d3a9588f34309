//! Plain-text layout for rendered views.

use std::fmt::Write as _;

use blackfang_dashboard::{
    AlertListView, AlertRow, CompetitorRow, DashboardView, Frame, NavView, ReportsView, ToastKind,
    ToastView,
};

/// Truncate `text` to `max` characters, marking the cut with `...`.
fn clip(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", text.chars().take(max).collect::<String>())
    } else {
        text.to_owned()
    }
}

/// Print a frame as text or pretty JSON.
pub(crate) fn print_frame(frame: &Frame, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(frame)?);
    } else {
        print!("{}", frame_text(frame));
    }
    Ok(())
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Lay out every view present in `frame`, in screen order.
pub(crate) fn frame_text(frame: &Frame) -> String {
    let mut out = String::new();
    if let Some(login) = &frame.login {
        if !login.logged_in {
            out.push_str("[login] signed out\n");
        }
        if let Some(error) = &login.error {
            let _ = writeln!(out, "[login] {error}");
        }
    }
    if let Some(nav) = &frame.nav {
        out.push_str(&nav_text(nav));
    }
    if let Some(clock) = &frame.clock {
        let _ = writeln!(out, "[clock] {}", clock.time);
    }
    if let Some(dashboard) = &frame.dashboard {
        out.push_str(&dashboard_text(dashboard));
    }
    if let Some(list) = &frame.competitors {
        out.push_str("\nCOMPETITORS\n");
        out.push_str(&competitor_table(&list.competitors));
    }
    if let Some(alerts) = &frame.alerts {
        out.push_str(&alerts_text(alerts));
    }
    if let Some(reports) = &frame.reports {
        out.push_str(&reports_text(reports));
    }
    if let Some(toasts) = &frame.toasts {
        out.push_str(&toasts_text(toasts));
    }
    out
}

fn nav_text(nav: &NavView) -> String {
    let mut line = format!("[{}] unread: {}", nav.section, nav.unread_badge);
    if nav.refreshing {
        line.push_str("  (refreshing...)");
    }
    if let Some(initial) = &nav.user_initial {
        let _ = write!(line, "  [{initial}]");
    }
    line.push('\n');
    line
}

fn dashboard_text(view: &DashboardView) -> String {
    let stats = &view.statistics;
    let mut out = format!("\n{} ({})\n", view.user_name, view.company_name);
    let _ = writeln!(
        out,
        "competitors {} ({} active)   alerts {}   high {}   medium {}   low {}   unread {}",
        stats.competitors,
        stats.active_competitors,
        stats.alerts,
        stats.high_alerts,
        stats.medium_alerts,
        stats.low_alerts,
        stats.unread_alerts
    );
    if let Some(refreshed) = &view.last_refreshed {
        let _ = writeln!(out, "last refreshed {refreshed}");
    }

    out.push_str("\nCRITICAL ALERTS\n");
    if view.critical_alerts.is_empty() {
        out.push_str("  none\n");
    }
    for alert in &view.critical_alerts {
        let _ = writeln!(
            out,
            "  #{} {} ({}) {}",
            alert.id, alert.title, alert.competitor_name, alert.age
        );
    }

    out.push_str("\nWATCHLIST\n");
    out.push_str(&competitor_table(&view.competitors));
    out
}

fn competitor_table(rows: &[CompetitorRow]) -> String {
    let mut out = format!(
        "{:<5}{:<28}{:<8}{:<9}{:<8}SCRAPED\n",
        "ID", "NAME", "THREAT", "STATUS", "ALERTS"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "{:<5}{:<28}{:<8}{:<9}{:<8}{}",
            row.id,
            clip(&row.name, 25),
            row.threat_level.to_string(),
            row.monitoring_status.to_string(),
            row.alert_count,
            row.last_scraped
        );
    }
    out
}

fn alert_line(alert: &AlertRow) -> String {
    let marker = if alert.is_read { ' ' } else { '*' };
    format!(
        "{marker} #{:<4}{:<8}{:<40}{:>4}%  {}\n",
        alert.id,
        alert.severity,
        clip(&alert.title, 37),
        alert.confidence_pct,
        alert.age
    )
}

fn alerts_text(view: &AlertListView) -> String {
    let mut out = format!(
        "\nALERTS [{}] {} of {}\n",
        view.filter,
        view.alerts.len(),
        view.total
    );
    if view.alerts.is_empty() {
        out.push_str("  no alerts match this filter\n");
    }
    for alert in &view.alerts {
        out.push_str(&alert_line(alert));
    }
    out
}

fn reports_text(view: &ReportsView) -> String {
    let mut out = format!(
        "\nTHREAT REPORT\n{:<28}{:<8}{:>6}{:>8}{:>5}{:>7}{:>8}\n",
        "COMPETITOR", "THREAT", "HIGH", "MEDIUM", "LOW", "TOTAL", "UNREAD"
    );
    for row in &view.rows {
        let _ = writeln!(
            out,
            "{:<28}{:<8}{:>6}{:>8}{:>5}{:>7}{:>8}",
            clip(&row.name, 25),
            row.threat_level.to_string(),
            row.high,
            row.medium,
            row.low,
            row.total,
            row.unread
        );
    }
    if view.unattributed_alerts > 0 {
        let _ = writeln!(
            out,
            "  {} alert(s) from competitors no longer watched",
            view.unattributed_alerts
        );
    }
    out
}

fn toasts_text(toasts: &[ToastView]) -> String {
    toasts
        .iter()
        .map(|t| {
            let kind = match t.kind {
                ToastKind::Success => "ok",
                ToastKind::Info => "info",
                ToastKind::Error => "error",
            };
            format!("[{kind}] {}\n", t.message)
        })
        .collect()
}
