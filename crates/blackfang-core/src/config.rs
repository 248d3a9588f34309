use crate::app_config::{AppConfig, Environment};
use crate::auth::{DEMO_EMAIL, DEMO_PASSWORD};
use crate::ConfigError;

/// One minute.
const MAX_REFRESH_DELAY_MS: u64 = 60_000;
/// One hour.
const MAX_TOAST_TTL_MS: u64 = 3_600_000;
/// One day.
const MAX_AUTO_REFRESH_SECS: u64 = 86_400;
/// Thirty days.
const MAX_SESSION_TTL_SECS: u64 = 2_592_000;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str, max: u64| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        let value = raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })?;
        if value > max {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("must be at most {max}"),
            });
        }
        Ok(value)
    };

    let env = parse_environment(&or_default("BLACKFANG_ENV", "development"))?;

    let bind_addr = or_default("BLACKFANG_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: "BLACKFANG_BIND_ADDR".to_string(),
            reason: e.to_string(),
        })?;
    let log_level = or_default("BLACKFANG_LOG_LEVEL", "info");
    let dataset_path = lookup("BLACKFANG_DATASET_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    let demo_email = or_default("BLACKFANG_DEMO_EMAIL", DEMO_EMAIL);
    let demo_password = or_default("BLACKFANG_DEMO_PASSWORD", DEMO_PASSWORD);
    if demo_email.is_empty() || demo_password.is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "BLACKFANG_DEMO_EMAIL/BLACKFANG_DEMO_PASSWORD".to_string(),
            reason: "demo credentials must be non-empty".to_string(),
        });
    }

    let refresh_delay_ms =
        parse_u64("BLACKFANG_REFRESH_DELAY_MS", "1500", MAX_REFRESH_DELAY_MS)?;
    let toast_ttl_ms = parse_u64("BLACKFANG_TOAST_TTL_MS", "3000", MAX_TOAST_TTL_MS)?;
    let auto_refresh_secs =
        parse_u64("BLACKFANG_AUTO_REFRESH_SECS", "300", MAX_AUTO_REFRESH_SECS)?;
    let session_ttl_secs =
        parse_u64("BLACKFANG_SESSION_TTL_SECS", "3600", MAX_SESSION_TTL_SECS)?;
    if session_ttl_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "BLACKFANG_SESSION_TTL_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        dataset_path,
        demo_email,
        demo_password,
        refresh_delay_ms,
        toast_ttl_ms,
        auto_refresh_secs,
        session_ttl_secs,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "BLACKFANG_ENV".to_string(),
            reason: format!("expected development, test or production, got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
