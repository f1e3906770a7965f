//! JSON-RPC API Layer
//!
//! JSON-RPC 2.0 surface for Trendline: cache-backed insight endpoints,
//! chat-completion forwarding and scheduler administration.

pub mod error;
pub mod handler;
pub mod rate_limiter;
pub mod server;
pub mod types;

pub use error::RpcServerError;
pub use handler::RpcHandler;
pub use rate_limiter::RateLimiter;
pub use server::{RpcServer, RpcServerConfig, RunningServer, DEFAULT_RPC_HOST, DEFAULT_RPC_PORT};
