//! # JSON-RPC 2.0 Dispatcher
//!
//! A transport-agnostic JSON-RPC 2.0 server core. Hosts register named
//! [`RpcHandler`]s in a [`MethodRegistry`]; the [`Dispatcher`] validates and
//! routes single requests and the [`BatchExecutor`] fans a batch out over the
//! dispatcher with bounded parallelism.
//!
//! ## Features
//! - Exact JSON-RPC 2.0 error envelopes (parse error, invalid request,
//!   method not found, application errors)
//! - Single and batch payload classification
//! - Bounded-concurrency batches with id-based correlation
//! - Notifications executed without producing batch entries
//! - Cancellation and deadlines propagated to handlers

pub mod batch;
pub mod context;
pub mod detail;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod payload;
pub mod prelude;
pub mod registry;
pub mod request;
pub mod response;
pub mod types;

#[cfg(test)]
mod test_support;

// Re-export main types
pub use batch::{BatchExecutor, DEFAULT_BATCH_PARALLELISM, DEFAULT_MAX_BATCH_SIZE};
pub use context::{CallContext, LogContext};
pub use detail::Detail;
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use error::{
    HandlerError, JsonRpcError, JsonRpcErrorCode, JsonRpcErrorObject, RegistryError,
    ToJsonRpcBytes,
};
pub use handler::RpcHandler;
pub use payload::Payload;
pub use registry::MethodRegistry;
pub use request::{BatchRequest, JsonRpcRequest};
pub use response::{BatchResponse, JsonRpcMessage, JsonRpcResponse};
pub use types::{JsonRpcVersion, RequestId};

// Handlers receive the transport's headers
pub use http::HeaderMap;

/// JSON-RPC 2.0 version constant
pub const JSONRPC_VERSION: &str = "2.0";

/// Error codes used on the wire
pub mod error_codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;

    /// Unclassified handler failure
    pub const GENERIC_FAILURE: i64 = 0;
}
