use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Email/password pair did not match. Deliberately says nothing about
    /// which half was wrong.
    #[error("invalid credentials")]
    AuthenticationFailed,

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
}

impl CoreError {
    pub(crate) fn alert_not_found(id: i64) -> Self {
        CoreError::NotFound { entity: "alert", id }
    }

    pub(crate) fn competitor_not_found(id: i64) -> Self {
        CoreError::NotFound {
            entity: "competitor",
            id,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read dataset file {path}: {source}")]
    DatasetFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse dataset file: {0}")]
    DatasetFileParse(#[from] serde_yaml::Error),

    #[error("dataset validation error: {0}")]
    Validation(String),
}
