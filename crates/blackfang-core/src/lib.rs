pub mod app_config;
pub mod auth;
pub mod config;
pub mod dataset;
pub mod error;
mod seed;
pub mod types;
pub mod wire;

pub use app_config::{AppConfig, Environment};
pub use auth::Credentials;
pub use config::{load_app_config, load_app_config_from_env};
pub use dataset::{
    load_dataset, normalize_website, CompetitorPatch, Dataset, NewCompetitor, PatchError,
};
pub use error::{ConfigError, CoreError};
pub use types::{Alert, Competitor, MonitoringStatus, Severity, Statistics, ThreatLevel, User};

/// Load the dataset named by the config, or the built-in demo records.
///
/// # Errors
///
/// Returns `ConfigError` if a configured dataset file cannot be loaded.
pub fn dataset_from_config(config: &AppConfig) -> Result<Dataset, ConfigError> {
    match &config.dataset_path {
        Some(path) => load_dataset(path),
        None => Ok(Dataset::demo()),
    }
}
