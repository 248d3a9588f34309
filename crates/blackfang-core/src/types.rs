use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Threat classification applied to a monitored competitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ThreatLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThreatLevel::Low => write!(f, "LOW"),
            ThreatLevel::Medium => write!(f, "MEDIUM"),
            ThreatLevel::High => write!(f, "HIGH"),
        }
    }
}

/// Alert priority.
///
/// Only `LOW`, `MEDIUM` and `HIGH` take part in severity filtering. Any other
/// token (older feeds emit `CRITICAL`) is kept verbatim in [`Severity::Other`]
/// so it still shows up under the unfiltered view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    Low,
    Medium,
    High,
    Other(String),
}

impl Severity {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Other(raw) => raw,
        }
    }
}

impl From<String> for Severity {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "LOW" => Severity::Low,
            "MEDIUM" => Severity::Medium,
            "HIGH" => Severity::High,
            _ => Severity::Other(raw),
        }
    }
}

impl From<&str> for Severity {
    fn from(raw: &str) -> Self {
        Severity::from(raw.to_owned())
    }
}

impl From<Severity> for String {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitoringStatus {
    Active,
    Paused,
}

impl std::fmt::Display for MonitoringStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonitoringStatus::Active => write!(f, "active"),
            MonitoringStatus::Paused => write!(f, "paused"),
        }
    }
}

/// A business being watched for pricing, marketing and reputation moves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    pub id: i64,
    pub name: String,
    pub website: String,
    pub threat_level: ThreatLevel,
    pub industry: String,
    pub monitoring_status: MonitoringStatus,
    pub location: String,
    /// Display counter carried with the record. Not derived from alerts.
    pub alert_count: u32,
    pub last_scraped: DateTime<Utc>,
}

/// A single intelligence finding about a competitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: i64,
    /// May point at a competitor that no longer exists.
    pub competitor_id: i64,
    /// Copied from the competitor when the alert was raised; can drift.
    pub competitor_name: String,
    pub title: String,
    pub severity: Severity,
    pub message: String,
    pub recommendation: String,
    /// Model confidence in `[0, 1]`.
    pub confidence_score: f64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_read: bool,
}

impl Alert {
    /// Confidence as a whole percentage, `round(score * 100)`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn confidence_pct(&self) -> i64 {
        (self.confidence_score * 100.0).round() as i64
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub company_name: String,
}

/// Aggregate counts over a dataset.
///
/// Always computed from the live records, so `unread_alerts` tracks every
/// read-state mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub competitors: usize,
    pub active_competitors: usize,
    pub alerts: usize,
    pub high_alerts: usize,
    pub medium_alerts: usize,
    pub low_alerts: usize,
    pub unread_alerts: usize,
}

impl Statistics {
    #[must_use]
    pub fn compute(competitors: &[Competitor], alerts: &[Alert]) -> Self {
        let mut stats = Statistics {
            competitors: competitors.len(),
            active_competitors: competitors
                .iter()
                .filter(|c| c.monitoring_status == MonitoringStatus::Active)
                .count(),
            alerts: alerts.len(),
            ..Statistics::default()
        };

        for alert in alerts {
            match alert.severity {
                Severity::High => stats.high_alerts += 1,
                Severity::Medium => stats.medium_alerts += 1,
                Severity::Low => stats.low_alerts += 1,
                Severity::Other(_) => {}
            }
            if !alert.is_read {
                stats.unread_alerts += 1;
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_parses_known_tokens() {
        assert_eq!(Severity::from("HIGH"), Severity::High);
        assert_eq!(Severity::from("MEDIUM"), Severity::Medium);
        assert_eq!(Severity::from("LOW"), Severity::Low);
    }

    #[test]
    fn severity_is_case_sensitive() {
        assert_eq!(Severity::from("high"), Severity::Other("high".to_string()));
    }

    #[test]
    fn severity_keeps_unknown_token_verbatim() {
        let severity: Severity = serde_json::from_str("\"CRITICAL\"").expect("deserialize");
        assert_eq!(severity, Severity::Other("CRITICAL".to_string()));
        assert_eq!(
            serde_json::to_string(&severity).expect("serialize"),
            "\"CRITICAL\""
        );
    }

    #[test]
    fn threat_level_serializes_uppercase() {
        let json = serde_json::to_string(&ThreatLevel::Medium).expect("serialize");
        assert_eq!(json, "\"MEDIUM\"");
    }

    #[test]
    fn monitoring_status_serializes_lowercase() {
        let json = serde_json::to_string(&MonitoringStatus::Paused).expect("serialize");
        assert_eq!(json, "\"paused\"");
    }

    #[test]
    fn confidence_pct_rounds() {
        let mut alert = crate::seed::demo_alerts(Utc::now()).remove(0);
        alert.confidence_score = 0.875;
        assert_eq!(alert.confidence_pct(), 88);
        alert.confidence_score = 0.874;
        assert_eq!(alert.confidence_pct(), 87);
    }
}
