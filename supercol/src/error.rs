use thiserror::Error;

/// Failure reported by the column store client collaborator.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("unavailable: {0}")]
    Unavailable(String),

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("rejected: {0}")]
    Rejected(String),

    #[error("internal: {0}")]
    Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl<T> From<std::sync::PoisonError<T>> for ClientError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        ClientError::Unavailable(format!("Poison error: {:?}", e.to_string()))
    }
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }
}

#[derive(Debug, Error)]
pub enum AppError {

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unmappable type: {0}")]
    UnmappableType(String),

    #[error("Codec error: {0}")]
    Codec(String),

    #[error("Missing key: {0}")]
    MissingKey(String),

    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    #[error("Transport error: {0}")]
    Transport(#[from] ClientError),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),
}

impl AppError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        AppError::Configuration(msg.into())
    }

    pub fn unmappable(msg: impl Into<String>) -> Self {
        AppError::UnmappableType(msg.into())
    }
}

impl From<bincode::Error> for AppError {
    fn from(e: bincode::Error) -> Self {
        AppError::UnmappableType(format!("opaque payload: {}", e))
    }
}

