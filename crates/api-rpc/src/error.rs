//! RPC Error Types
//!
//! Maps application errors to JSON-RPC error codes.

use jsonrpsee::types::ErrorObjectOwned;
use serde_json::json;
use thiserror::Error;
use trendline_core::error::AppError;

/// RPC Error Codes
pub mod code {
    pub const VALIDATION_ERROR: i32 = 4000;
    pub const NOT_FOUND: i32 = 4001;
    pub const CONFLICT: i32 = 4002;
    pub const THROTTLED: i32 = 4003;
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const DB_ERROR: i32 = 5001;
    pub const GENERATION_FAILED: i32 = 5003;
    pub const UPSTREAM_ERROR: i32 = 5004;
}

/// Server startup failures
#[derive(Error, Debug)]
pub enum RpcServerError {
    #[error("Failed to bind JSON-RPC server on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to register method: {0}")]
    Register(String),
}

pub fn throttled() -> ErrorObjectOwned {
    ErrorObjectOwned::owned(
        code::THROTTLED,
        "Rate limit exceeded. Please slow down.",
        None::<()>,
    )
}

/// Convert AppError to JSON-RPC ErrorObject
pub fn to_rpc_error(err: AppError) -> ErrorObjectOwned {
    match err {
        AppError::Validation(msg) => {
            ErrorObjectOwned::owned(code::VALIDATION_ERROR, msg, None::<()>)
        }
        AppError::Domain(e) => {
            ErrorObjectOwned::owned(code::VALIDATION_ERROR, e.to_string(), None::<()>)
        }
        AppError::Serialization(e) => {
            ErrorObjectOwned::owned(code::VALIDATION_ERROR, e.to_string(), None::<()>)
        }
        AppError::NotFound(msg) => ErrorObjectOwned::owned(code::NOT_FOUND, msg, None::<()>),
        AppError::Conflict(msg) => ErrorObjectOwned::owned(code::CONFLICT, msg, None::<()>),
        AppError::InvalidState(msg) => ErrorObjectOwned::owned(code::CONFLICT, msg, None::<()>),
        AppError::Database(msg) => ErrorObjectOwned::owned(code::DB_ERROR, msg, None::<()>),
        // Raw generator output stays in the server log, only the context goes out
        AppError::GenerationParse { context, .. } => ErrorObjectOwned::owned(
            code::GENERATION_FAILED,
            format!("Failed to parse {} from generated content", context),
            Some(json!({ "context": context })),
        ),
        AppError::Upstream(e) => {
            ErrorObjectOwned::owned(code::UPSTREAM_ERROR, e.to_string(), None::<()>)
        }
        AppError::Io(e) => ErrorObjectOwned::owned(code::INTERNAL_ERROR, e.to_string(), None::<()>),
        AppError::Config(msg) => ErrorObjectOwned::owned(code::INTERNAL_ERROR, msg, None::<()>),
        AppError::Internal(msg) => ErrorObjectOwned::owned(code::INTERNAL_ERROR, msg, None::<()>),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trendline_core::port::UpstreamError;

    #[test]
    fn test_error_codes() {
        let cases = [
            (AppError::Validation("x".into()), code::VALIDATION_ERROR),
            (AppError::NotFound("x".into()), code::NOT_FOUND),
            (AppError::Conflict("x".into()), code::CONFLICT),
            (AppError::Database("x".into()), code::DB_ERROR),
            (AppError::generation_parse("roadmap", "noise"), code::GENERATION_FAILED),
            (AppError::Upstream(UpstreamError::Timeout(60)), code::UPSTREAM_ERROR),
            (AppError::Internal("x".into()), code::INTERNAL_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(to_rpc_error(err).code(), expected);
        }
    }

    #[test]
    fn test_generation_parse_hides_raw_output() {
        let err = to_rpc_error(AppError::generation_parse("roadmap", "secret raw text"));
        assert!(err.message().contains("roadmap"));
        let data = err.data().map(|d| d.get().to_string()).unwrap_or_default();
        assert!(data.contains("roadmap"));
        assert!(!data.contains("secret raw text"));
    }
}
