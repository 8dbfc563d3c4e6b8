//! Server options

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use jrpc_server::{DEFAULT_BATCH_PARALLELISM, DEFAULT_MAX_BATCH_SIZE};
use thiserror::Error;
use tokio::sync::Semaphore;

/// Default cap on request bodies (1 GiB)
pub const DEFAULT_MAX_REQUEST_SIZE: usize = 1024 * 1024 * 1024;

/// Configuration for the HTTP JSON-RPC server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_address: SocketAddr,
    /// Path for the RPC endpoint; sub-paths are served too
    pub rpc_path: String,
    /// Maximum request body size in bytes
    pub max_request_size: usize,
    /// Maximum batch elements dispatched concurrently
    pub batch_request_parallelism: usize,
    /// Maximum elements accepted in one batch
    pub max_batch_size: usize,
    /// Serve `/health`, `/readiness` and `/liveliness`
    pub enable_health_endpoints: bool,
    /// Deadline attached to every handler call; handlers decide whether to honor it
    pub handler_deadline: Option<Duration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from((Ipv4Addr::LOCALHOST, 8000)),
            rpc_path: "/rpc".to_string(),
            max_request_size: DEFAULT_MAX_REQUEST_SIZE,
            batch_request_parallelism: DEFAULT_BATCH_PARALLELISM,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            enable_health_endpoints: true,
            handler_deadline: None,
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.rpc_path.starts_with('/') {
            return Err(ConfigError::InvalidRpcPath(self.rpc_path.clone()));
        }
        if self.max_request_size == 0 {
            return Err(ConfigError::ZeroMaxRequestSize);
        }
        if self.batch_request_parallelism == 0 {
            return Err(ConfigError::ZeroBatchParallelism);
        }
        if self.batch_request_parallelism > Semaphore::MAX_PERMITS {
            return Err(ConfigError::BatchParallelismTooLarge(
                self.batch_request_parallelism,
            ));
        }
        if self.max_batch_size == 0 {
            return Err(ConfigError::ZeroMaxBatchSize);
        }
        Ok(())
    }
}

/// Rejected server options
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("RPC path must start with '/': {0}")]
    InvalidRpcPath(String),

    #[error("Maximum request size must be greater than zero")]
    ZeroMaxRequestSize,

    #[error("Batch request parallelism must be greater than zero")]
    ZeroBatchParallelism,

    #[error("Batch request parallelism {0} exceeds the supported maximum")]
    BatchParallelismTooLarge(usize),

    #[error("Maximum batch size must be greater than zero")]
    ZeroMaxBatchSize,
}
