use std::io::Write;

use chrono::TimeZone;

use super::*;
use crate::types::Severity;

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

fn write_yaml(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(content.as_bytes()).expect("write yaml");
    file
}

const VALID_YAML: &str = r#"
user:
  id: 7
  name: Test Account
  email: test@example.com
  company_name: Test Co
competitors:
  - id: 10
    name: Rival One
    website: https://rival.example.com
    threat_level: HIGH
    industry: Retail
    monitoring_status: active
    location: Pune
    alert_count: 1
    last_scraped: 2025-06-01T11:00:00Z
alerts:
  - id: 100
    competitor_id: 10
    competitor_name: Rival One
    title: Price cut
    severity: CRITICAL
    message: Prices dropped.
    recommendation: Watch closely.
    confidence_score: 0.5
    created_at: 2025-06-01T10:00:00Z
"#;

#[test]
fn demo_dataset_matches_sample_shape() {
    let dataset = Dataset::demo_at(fixed_now());
    assert_eq!(dataset.competitors().len(), 3);
    assert_eq!(dataset.alerts().len(), 6);

    let stats = dataset.statistics();
    assert_eq!(stats.high_alerts, 1);
    assert_eq!(stats.medium_alerts, 3);
    assert_eq!(stats.low_alerts, 2);
    assert_eq!(stats.unread_alerts, 2);
    assert_eq!(dataset.unread_count(), 2);
}

#[test]
fn demo_dataset_ids_are_unique() {
    let dataset = Dataset::demo_at(fixed_now());
    assert!(Dataset::from_parts(
        dataset.user().clone(),
        dataset.competitors().to_vec(),
        dataset.alerts().to_vec(),
    )
    .is_ok());
}

#[test]
fn set_alert_read_state_is_idempotent() {
    let mut dataset = Dataset::demo_at(fixed_now());
    dataset.set_alert_read_state(1, true).expect("alert 1 exists");
    let once = dataset.clone();
    dataset.set_alert_read_state(1, true).expect("alert 1 exists");
    assert_eq!(dataset, once);
}

#[test]
fn set_alert_read_state_unknown_id_is_not_found() {
    let mut dataset = Dataset::demo_at(fixed_now());
    let before = dataset.clone();
    let err = dataset.set_alert_read_state(999, true).unwrap_err();
    assert_eq!(
        err,
        CoreError::NotFound {
            entity: "alert",
            id: 999
        }
    );
    assert_eq!(dataset, before);
}

#[test]
fn toggle_twice_restores_original_state() {
    let mut dataset = Dataset::demo_at(fixed_now());
    let before = dataset.clone();
    assert!(dataset.toggle_alert_read(2).expect("alert 2 exists"));
    assert!(!dataset.toggle_alert_read(2).expect("alert 2 exists"));
    assert_eq!(dataset, before);
}

#[test]
fn mark_all_read_reports_changed_count_and_is_idempotent() {
    let mut dataset = Dataset::demo_at(fixed_now());
    assert_eq!(dataset.mark_all_read(), 2);
    let once = dataset.clone();
    assert_eq!(dataset.mark_all_read(), 0);
    assert_eq!(dataset, once);
    assert!(dataset.alerts().iter().all(|a| a.is_read));
}

#[test]
fn insert_competitor_assigns_next_id_and_normalizes_website() {
    let mut dataset = Dataset::demo_at(fixed_now());
    let created = dataset
        .insert_competitor(
            NewCompetitor {
                name: "  Turbo Cars ".to_string(),
                website: "turbocars.in".to_string(),
                threat_level: ThreatLevel::Low,
                industry: String::new(),
                location: String::new(),
            },
            fixed_now(),
        )
        .expect("valid competitor");
    assert_eq!(created.id, 4);
    assert_eq!(created.name, "Turbo Cars");
    assert_eq!(created.website, "https://turbocars.in");
    assert_eq!(created.alert_count, 0);
}

#[test]
fn insert_competitor_rejects_blank_name() {
    let mut dataset = Dataset::demo_at(fixed_now());
    let result = dataset.insert_competitor(
        NewCompetitor {
            name: "   ".to_string(),
            website: "x.com".to_string(),
            threat_level: ThreatLevel::Low,
            industry: String::new(),
            location: String::new(),
        },
        fixed_now(),
    );
    assert!(matches!(result, Err(ConfigError::Validation(_))));
}

#[test]
fn update_competitor_applies_only_present_fields() {
    let mut dataset = Dataset::demo_at(fixed_now());
    let updated = dataset
        .update_competitor(
            2,
            CompetitorPatch {
                monitoring_status: Some(MonitoringStatus::Paused),
                ..CompetitorPatch::default()
            },
        )
        .expect("competitor 2 exists");
    assert_eq!(updated.monitoring_status, MonitoringStatus::Paused);
    assert_eq!(updated.name, "Speed Motors");
}

#[test]
fn update_competitor_unknown_id_is_not_found() {
    let mut dataset = Dataset::demo_at(fixed_now());
    let err = dataset
        .update_competitor(42, CompetitorPatch::default())
        .unwrap_err();
    assert!(matches!(
        err,
        PatchError::Core(CoreError::NotFound { id: 42, .. })
    ));
}

#[test]
fn remove_competitor_leaves_alerts_dangling() {
    let mut dataset = Dataset::demo_at(fixed_now());
    let removed = dataset.remove_competitor(1).expect("competitor 1 exists");
    assert_eq!(removed.name, "AutoMax Dealers");
    assert_eq!(dataset.competitors().len(), 2);
    assert!(dataset.alerts().iter().any(|a| a.competitor_id == 1));
}

#[test]
fn normalize_website_keeps_existing_scheme() {
    assert_eq!(
        normalize_website("http://a.example").unwrap(),
        "http://a.example"
    );
    assert_eq!(normalize_website(" b.example ").unwrap(), "https://b.example");
    assert!(normalize_website("").is_err());
}

#[test]
fn load_dataset_reads_valid_yaml() {
    let file = write_yaml(VALID_YAML);
    let dataset = load_dataset(file.path()).expect("valid dataset");
    assert_eq!(dataset.user().email, "test@example.com");
    assert_eq!(dataset.competitors()[0].threat_level, ThreatLevel::High);
    let alert = &dataset.alerts()[0];
    assert_eq!(alert.severity, Severity::Other("CRITICAL".to_string()));
    assert!(!alert.is_read, "is_read defaults to false");
}

#[test]
fn load_dataset_rejects_out_of_range_confidence() {
    let file = write_yaml(&VALID_YAML.replace("confidence_score: 0.5", "confidence_score: 1.5"));
    let err = load_dataset(file.path()).unwrap_err();
    assert!(
        matches!(err, ConfigError::Validation(ref msg) if msg.contains("confidence_score")),
        "unexpected error: {err:?}"
    );
}

#[test]
fn load_dataset_rejects_duplicate_competitor_ids() {
    let duplicated = VALID_YAML.replace(
        "alerts:",
        r"  - id: 10
    name: Rival Two
    website: https://two.example.com
    threat_level: LOW
    industry: Retail
    monitoring_status: paused
    location: Pune
    alert_count: 0
    last_scraped: 2025-06-01T11:00:00Z
alerts:",
    );
    let file = write_yaml(&duplicated);
    let err = load_dataset(file.path()).unwrap_err();
    assert!(
        matches!(err, ConfigError::Validation(ref msg) if msg.contains("duplicate competitor id")),
        "unexpected error: {err:?}"
    );
}

#[test]
fn load_dataset_missing_file_is_io_error() {
    let err = load_dataset(Path::new("/nonexistent/blackfang/dataset.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::DatasetFileIo { .. }));
}

#[test]
fn load_dataset_malformed_yaml_is_parse_error() {
    let file = write_yaml("user: [not, a, user]");
    let err = load_dataset(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::DatasetFileParse(_)));
}

#[test]
fn bundled_sample_file_loads() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/dataset.yaml");
    let dataset = load_dataset(&path).expect("sample dataset is valid");
    assert_eq!(dataset.competitors().len(), 3);
    assert_eq!(dataset.alerts().len(), 6);
    assert_eq!(dataset.unread_count(), 2);
    assert_eq!(dataset.user().company_name, "Demo Motors Pvt Ltd");
}
