// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid run state transition: {from} -> {to}")]
    InvalidRunTransition { from: String, to: String },

    #[error("Unknown career level: {0}")]
    UnknownLevel(String),

    #[error("Unknown trend direction: {0}")]
    UnknownDirection(String),

    #[error("Unknown demand level: {0}")]
    UnknownDemand(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
