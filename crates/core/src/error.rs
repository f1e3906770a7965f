// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Generated text could not be turned into the shape a strict call site expects.
    /// `raw` keeps the full generator output for diagnostics.
    #[error("Failed to parse {context} from generated content")]
    GenerationParse { context: String, raw: String },

    #[error("Upstream error: {0}")]
    Upstream(#[from] crate::port::UpstreamError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn generation_parse(context: impl Into<String>, raw: impl Into<String>) -> Self {
        AppError::GenerationParse {
            context: context.into(),
            raw: raw.into(),
        }
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

// Note: sqlx::Error conversion is handled in infra-sqlite crate
// by converting to AppError::Database(String)
