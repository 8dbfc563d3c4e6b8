//! # JSON-RPC Server Prelude
//!
//! Re-exports of the types a handler implementation usually needs.
//!
//! ```rust
//! use jrpc_server::prelude::*;
//! ```

pub use crate::context::{CallContext, LogContext};
pub use crate::detail::Detail;
pub use crate::error::{HandlerError, JsonRpcError, RegistryError, ToJsonRpcBytes};
pub use crate::handler::RpcHandler;
pub use crate::registry::MethodRegistry;
pub use crate::request::JsonRpcRequest;
pub use crate::response::{BatchResponse, JsonRpcMessage, JsonRpcResponse};
pub use crate::types::RequestId;
pub use http::HeaderMap;

// Standard error codes
pub use crate::error_codes::*;
