//! Error types for Gatehouse

use gatehouse_types::Role;
use thiserror::Error;

/// Main error type for Gatehouse
#[derive(Error, Debug)]
pub enum GatehouseError {
    #[error("Access denied: command contains restricted keyword {keyword}")]
    AccessDenied { keyword: String },

    #[error("Authentication required: call authenticate() first")]
    AuthRequired,

    #[error("Authorization denied: role {role} may not run '{command}'")]
    AuthorizationDenied { role: Role, command: String },

    #[error("Backend connect error: {0}")]
    BackendConnect(String),

    #[error("Backend execution error: {0}")]
    BackendExec(String),

    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration file not found in {0}")]
    ConfigNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GatehouseError {
    /// True when a proxy refused the command rather than failing to run it
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            GatehouseError::AccessDenied { .. }
                | GatehouseError::AuthRequired
                | GatehouseError::AuthorizationDenied { .. }
        )
    }

    /// True when the failure came from the backend itself
    pub fn is_backend_failure(&self) -> bool {
        matches!(
            self,
            GatehouseError::BackendConnect(_) | GatehouseError::BackendExec(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, GatehouseError>;
