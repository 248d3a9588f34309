//! Built-in demo records: one dealership account watching three rivals.
//!
//! Timestamps are expressed relative to the load instant so that age labels
//! read naturally ("15m ago", "2h ago") whenever the demo starts.

use chrono::{DateTime, Duration, Utc};

use crate::types::{Alert, Competitor, MonitoringStatus, Severity, ThreatLevel, User};

pub(crate) fn demo_user() -> User {
    User {
        id: 1,
        name: "Demo Automotive Dealership".to_string(),
        email: "demo@blackfangintel.com".to_string(),
        company_name: "Demo Motors Pvt Ltd".to_string(),
    }
}

pub(crate) fn demo_competitors(now: DateTime<Utc>) -> Vec<Competitor> {
    vec![
        Competitor {
            id: 1,
            name: "AutoMax Dealers".to_string(),
            website: "https://cars24.com".to_string(),
            threat_level: ThreatLevel::High,
            industry: "Automotive Retail".to_string(),
            monitoring_status: MonitoringStatus::Active,
            location: "Mumbai, Maharashtra".to_string(),
            alert_count: 3,
            last_scraped: now - Duration::minutes(12),
        },
        Competitor {
            id: 2,
            name: "Speed Motors".to_string(),
            website: "https://carwale.com".to_string(),
            threat_level: ThreatLevel::Medium,
            industry: "Automotive Retail".to_string(),
            monitoring_status: MonitoringStatus::Active,
            location: "Delhi NCR".to_string(),
            alert_count: 2,
            last_scraped: now - Duration::minutes(47),
        },
        Competitor {
            id: 3,
            name: "Elite Auto Solutions".to_string(),
            website: "https://cardekho.com".to_string(),
            threat_level: ThreatLevel::Low,
            industry: "Automotive Services".to_string(),
            monitoring_status: MonitoringStatus::Paused,
            location: "Bangalore, Karnataka".to_string(),
            alert_count: 3,
            last_scraped: now - Duration::hours(3),
        },
    ]
}

pub(crate) fn demo_alerts(now: DateTime<Utc>) -> Vec<Alert> {
    vec![
        Alert {
            id: 1,
            competitor_id: 1,
            competitor_name: "AutoMax Dealers".to_string(),
            title: "🔴 CRITICAL: Price War Detected - AutoMax Dealers".to_string(),
            severity: Severity::High,
            message: "AutoMax Dealers implemented an aggressive 8% price reduction on Honda City \
                      models (₹95,000 decrease). Market share impact imminent."
                .to_string(),
            recommendation: "IMMEDIATE ACTION: Consider price matching or launch a Premium \
                             Service Value campaign."
                .to_string(),
            confidence_score: 0.95,
            created_at: now - Duration::minutes(15),
            is_read: false,
        },
        Alert {
            id: 2,
            competitor_id: 2,
            competitor_name: "Speed Motors".to_string(),
            title: "🟡 ALERT: Marketing Campaign - Speed Motors".to_string(),
            severity: Severity::Medium,
            message: "Speed Motors launched a Monsoon Festival Special: 5% discount + free \
                      insurance + extended warranty."
                .to_string(),
            recommendation: "STRATEGIC RESPONSE: Deploy a counter-campaign within 72 hours."
                .to_string(),
            confidence_score: 0.87,
            created_at: now - Duration::hours(2),
            is_read: false,
        },
        Alert {
            id: 3,
            competitor_id: 3,
            competitor_name: "Elite Auto Solutions".to_string(),
            title: "🟡 OPPORTUNITY: Service Issues - Elite Auto".to_string(),
            severity: Severity::Medium,
            message: "Elite Auto received 4 negative reviews citing delivery delays and poor \
                      support."
                .to_string(),
            recommendation: "MARKET OPPORTUNITY: Launch a Satisfaction Guarantee campaign."
                .to_string(),
            confidence_score: 0.91,
            created_at: now - Duration::hours(5),
            is_read: true,
        },
        Alert {
            id: 4,
            competitor_id: 1,
            competitor_name: "AutoMax Dealers".to_string(),
            title: "🟡 TREND: Inventory Expansion - AutoMax Dealers".to_string(),
            severity: Severity::Medium,
            message: "AutoMax Dealers added 40 certified pre-owned SUVs to their online \
                      inventory this week."
                .to_string(),
            recommendation: "Review SUV stock levels and highlight certified inventory in \
                             upcoming promotions."
                .to_string(),
            confidence_score: 0.82,
            created_at: now - Duration::hours(20),
            is_read: true,
        },
        Alert {
            id: 5,
            competitor_id: 2,
            competitor_name: "Speed Motors".to_string(),
            title: "🟢 INFO: Website Refresh - Speed Motors".to_string(),
            severity: Severity::Low,
            message: "Speed Motors redesigned their homepage and added an online financing \
                      calculator."
                .to_string(),
            recommendation: "Monitor conversion impact; consider a similar calculator.".to_string(),
            confidence_score: 0.78,
            created_at: now - Duration::days(2),
            is_read: true,
        },
        Alert {
            id: 6,
            competitor_id: 3,
            competitor_name: "Elite Auto Solutions".to_string(),
            title: "🟢 INFO: Review Volume Steady - Elite Auto Solutions".to_string(),
            severity: Severity::Low,
            message: "Review volume for Elite Auto Solutions held steady at roughly 12 per week."
                .to_string(),
            recommendation: "No action required.".to_string(),
            confidence_score: 0.74,
            created_at: now - Duration::days(3),
            is_read: true,
        },
    ]
}
