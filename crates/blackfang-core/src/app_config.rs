use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::auth::Credentials;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// YAML dataset to load instead of the built-in demo records.
    pub dataset_path: Option<PathBuf>,
    pub demo_email: String,
    pub demo_password: String,
    pub refresh_delay_ms: u64,
    pub toast_ttl_ms: u64,
    /// `0` disables the periodic auto-refresh.
    pub auto_refresh_secs: u64,
    pub session_ttl_secs: u64,
}

impl AppConfig {
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.demo_email, &self.demo_password)
    }

    #[must_use]
    pub fn refresh_delay(&self) -> Duration {
        Duration::from_millis(self.refresh_delay_ms)
    }

    #[must_use]
    pub fn toast_ttl(&self) -> Duration {
        Duration::from_millis(self.toast_ttl_ms)
    }

    #[must_use]
    pub fn auto_refresh(&self) -> Option<Duration> {
        (self.auto_refresh_secs > 0).then(|| Duration::from_secs(self.auto_refresh_secs))
    }

    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("dataset_path", &self.dataset_path)
            .field("demo_email", &self.demo_email)
            .field("demo_password", &"[redacted]")
            .field("refresh_delay_ms", &self.refresh_delay_ms)
            .field("toast_ttl_ms", &self.toast_ttl_ms)
            .field("auto_refresh_secs", &self.auto_refresh_secs)
            .field("session_ttl_secs", &self.session_ttl_secs)
            .finish()
    }
}
