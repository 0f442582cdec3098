//! CLI-specific error types

use stremio_addon_manager::ServiceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Server(String),

    #[error("{0} of {1} user syncs failed")]
    SyncFailures(usize, usize),
}

impl CliError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) => 2,
            CliError::Service(ServiceError::UserNotFound(_))
            | CliError::Service(ServiceError::AddonNotFound(_)) => 3,
            CliError::Service(ServiceError::InvalidCredentials(_)) => 4,
            CliError::SyncFailures(..) => 5,
            _ => 1,
        }
    }
}

impl From<config::ConfigError> for CliError {
    fn from(err: config::ConfigError) -> Self {
        CliError::Config(err.to_string())
    }
}

pub type CliResult<T> = Result<T, CliError>;
