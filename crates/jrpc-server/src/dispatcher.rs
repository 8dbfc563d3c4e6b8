use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use http::HeaderMap;
use tracing::{Instrument, error, info, warn};

use crate::context::{CallContext, LogContext};
use crate::detail::Detail;
use crate::error::{JsonRpcError, ToJsonRpcBytes};
use crate::handler::RpcHandler;
use crate::registry::MethodRegistry;
use crate::request::JsonRpcRequest;
use crate::response::{JsonRpcMessage, JsonRpcResponse};

const UNSUPPORTED_VERSION: &str = "Only JSONRPC version 2 is supported";

/// Result of routing one request
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// The handler produced a result
    Response(JsonRpcResponse),
    /// The request never reached `execute`: bad version, unknown method or
    /// invalid params
    Rejected(JsonRpcError),
    /// The handler ran and failed
    Failed(JsonRpcError),
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DispatchOutcome::Response(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, DispatchOutcome::Rejected(_))
    }

    pub fn into_message(self) -> JsonRpcMessage {
        match self {
            DispatchOutcome::Response(response) => response.into(),
            DispatchOutcome::Rejected(error) | DispatchOutcome::Failed(error) => error.into(),
        }
    }

    pub fn into_result(self) -> Result<JsonRpcResponse, JsonRpcError> {
        match self {
            DispatchOutcome::Response(response) => Ok(response),
            DispatchOutcome::Rejected(error) | DispatchOutcome::Failed(error) => Err(error),
        }
    }
}

impl ToJsonRpcBytes for DispatchOutcome {
    fn to_json_rpc_bytes(&self) -> Vec<u8> {
        match self {
            DispatchOutcome::Response(response) => response.to_json_rpc_bytes(),
            DispatchOutcome::Rejected(error) | DispatchOutcome::Failed(error) => {
                error.to_json_rpc_bytes()
            }
        }
    }
}

/// Validates single requests against the protocol and the registry and
/// invokes the matching handler.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<MethodRegistry>,
}

impl Dispatcher {
    pub fn new(registry: MethodRegistry) -> Self {
        Self::from_shared(Arc::new(registry))
    }

    pub fn from_shared(registry: Arc<MethodRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &MethodRegistry {
        &self.registry
    }

    /// Route one request.
    ///
    /// Checks run in order and the first failure wins: protocol version,
    /// method lookup, parameter validation, execution. Unstructured handler
    /// failures and panics become code `0` errors echoing the request id;
    /// structured ones are returned as the handler built them.
    pub async fn route(
        &self,
        ctx: &CallContext,
        log: &LogContext,
        headers: &HeaderMap,
        request: JsonRpcRequest,
    ) -> DispatchOutcome {
        self.route_inner(ctx, headers, request)
            .instrument(log.span())
            .await
    }

    async fn route_inner(
        &self,
        ctx: &CallContext,
        headers: &HeaderMap,
        request: JsonRpcRequest,
    ) -> DispatchOutcome {
        if !request.has_supported_version() {
            warn!(
                method = %request.method,
                version = %request.jsonrpc,
                "Rejected request with unsupported protocol version"
            );
            return DispatchOutcome::Rejected(JsonRpcError::invalid_request(
                request.id,
                [Detail::rationale(UNSUPPORTED_VERSION)],
            ));
        }

        let Some(handler) = self.registry.lookup(&request.method) else {
            warn!(method = %request.method, "Rejected request for unregistered method");
            return DispatchOutcome::Rejected(
                JsonRpcError::method_not_found([Detail::new("method", request.method)])
                    .with_id(request.id),
            );
        };

        info!(method = %request.method, "Received request");

        let invocation = AssertUnwindSafe(invoke(handler.as_ref(), ctx, headers, &request))
            .catch_unwind()
            .await;

        match invocation {
            Ok(outcome) => outcome,
            Err(_) => {
                error!(method = %request.method, "Handler panicked");
                DispatchOutcome::Failed(JsonRpcError::from_failure(
                    request.id,
                    &std::io::Error::other("Handler panicked"),
                ))
            }
        }
    }
}

async fn invoke(
    handler: &dyn RpcHandler,
    ctx: &CallContext,
    headers: &HeaderMap,
    request: &JsonRpcRequest,
) -> DispatchOutcome {
    if let Err(details) = handler.parameters_valid(ctx, &request.params).await {
        warn!(method = %request.method, "Rejected request with invalid params");
        return DispatchOutcome::Rejected(JsonRpcError::invalid_request(
            request.id.clone(),
            details,
        ));
    }

    match handler
        .execute(ctx, headers, request.id.as_ref(), &request.params)
        .await
    {
        Ok(result) => DispatchOutcome::Response(JsonRpcResponse::new(request.id.clone(), result)),
        Err(err) => {
            warn!(method = %request.method, "Handler failed: {}", err);
            DispatchOutcome::Failed(err.into_json_rpc_error(request.id.clone()))
        }
    }
}
