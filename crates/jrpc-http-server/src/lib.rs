//! # HTTP JSON-RPC Server
//!
//! HTTP/1.1 transport for the [`jrpc_server`] dispatcher.
//!
//! ## Routes
//! - `POST /rpc` (and sub-paths): a single request object or a batch array
//! - `/health`, `/readiness`, `/liveliness`: empty `200 OK` health checks
//!
//! Every other verb on the RPC path is answered with `405` and a
//! Method-not-found envelope; unreadable or oversized bodies and malformed
//! JSON get `400` with a Parse Error envelope.

pub mod config;
pub mod handler;
pub mod server;

#[cfg(test)]
mod tests;

// Re-export main types
pub use config::{ConfigError, DEFAULT_MAX_REQUEST_SIZE, ServerConfig};
pub use handler::RpcHttpHandler;
pub use server::{RpcServer, RpcServerBuilder};

// Re-export foundational types
pub use jrpc_server::{
    CallContext, Detail, HandlerError, JsonRpcError, MethodRegistry, RequestId, RpcHandler,
};

/// Result type for HTTP JSON-RPC operations
pub type Result<T> = std::result::Result<T, HttpRpcError>;

/// HTTP JSON-RPC server errors
#[derive(Debug, thiserror::Error)]
pub enum HttpRpcError {
    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Registration error: {0}")]
    Registry(#[from] jrpc_server::RegistryError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
