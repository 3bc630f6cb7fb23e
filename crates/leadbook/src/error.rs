use thiserror::Error;

use crate::gateway::GatewayError;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Engine(#[from] engine::EngineError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("this action is reserved to administrators")]
    Forbidden,
    #[error("not signed in")]
    NotSignedIn,
    #[error("enquiry has no id")]
    MissingId,
    #[error("row {row}: {message}")]
    Import { row: usize, message: String },
}

impl AppError {
    /// `true` when the user has to sign in again before retrying.
    pub fn needs_sign_in(&self) -> bool {
        matches!(
            self,
            Self::NotSignedIn | Self::Gateway(GatewayError::Unauthorized)
        )
    }
}
