use async_trait::async_trait;
use http::HeaderMap;
use serde_json::Value;

use crate::context::CallContext;
use crate::detail::Detail;
use crate::error::HandlerError;
use crate::types::RequestId;

/// A remote procedure registered under one method name.
///
/// The dispatcher calls [`parameters_valid`](RpcHandler::parameters_valid)
/// first and only calls [`execute`](RpcHandler::execute) when it succeeds.
/// Handlers are shared across concurrent calls and must manage their own
/// synchronization for any state they touch.
#[async_trait]
pub trait RpcHandler: Send + Sync {
    /// Registry key; must be stable for the lifetime of the handler
    fn method_name(&self) -> &str;

    /// Check `params` without side effects.
    ///
    /// On rejection the returned details end up in the Invalid Request
    /// error's `data` object.
    async fn parameters_valid(&self, ctx: &CallContext, params: &Value) -> Result<(), Vec<Detail>>;

    /// Perform the call.
    ///
    /// Return [`HandlerError::Rpc`] to control the exact error envelope, or
    /// any other failure to have it reported with code `0`.
    async fn execute(
        &self,
        ctx: &CallContext,
        headers: &HeaderMap,
        id: Option<&RequestId>,
        params: &Value,
    ) -> Result<Value, HandlerError>;
}
