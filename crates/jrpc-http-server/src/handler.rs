//! HTTP request handler for JSON-RPC

use std::sync::Arc;

use bytes::Bytes;
use http::header::{ALLOW, CONTENT_TYPE, HeaderValue};
use http::{HeaderMap, Method, Request, Response, StatusCode};
use http_body::Body;
use http_body_util::{BodyExt, Full, Limited};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use jrpc_server::{
    BatchExecutor, BatchRequest, CallContext, Detail, Dispatcher, JsonRpcError, JsonRpcRequest,
    LogContext, MethodRegistry, Payload, ToJsonRpcBytes,
};

use crate::ServerConfig;

const HEALTH_PATHS: [&str; 3] = ["/health", "/readiness", "/liveliness"];
const POST_REQUIRED: &str = "All RPC request should be made with a POST method.";
const UNREADABLE_BODY: &str = "Failed to read request body";

/// Turns HTTP requests into dispatcher calls and dispatcher outcomes into
/// HTTP responses.
///
/// Cheap to clone; clones share the registry.
#[derive(Debug, Clone)]
pub struct RpcHttpHandler {
    config: Arc<ServerConfig>,
    dispatcher: Dispatcher,
    batch: BatchExecutor,
}

impl RpcHttpHandler {
    pub fn new(config: ServerConfig, registry: MethodRegistry) -> Self {
        let dispatcher = Dispatcher::new(registry);
        let batch = BatchExecutor::new(dispatcher.clone())
            .with_max_batch_size(config.max_batch_size)
            .with_parallelism(config.batch_request_parallelism);

        Self {
            config: Arc::new(config),
            dispatcher,
            batch,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Handle any HTTP request
    pub async fn handle<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let path = req.uri().path();
        debug!("Handling {} {}", req.method(), path);

        // Health paths win over an RPC path that would otherwise cover them ("/")
        if self.config.enable_health_endpoints && HEALTH_PATHS.contains(&path) {
            return empty_response(StatusCode::OK);
        }
        if self.is_rpc_path(path) {
            return self.handle_rpc(req).await;
        }
        empty_response(StatusCode::NOT_FOUND)
    }

    fn is_rpc_path(&self, path: &str) -> bool {
        let base = self.config.rpc_path.trim_end_matches('/');
        match path.strip_prefix(base) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    async fn handle_rpc<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let log = LogContext::new()
            .with("request.id", Uuid::now_v7().to_string())
            .with("http.method", req.method().as_str())
            .with("http.path", req.uri().path());

        if req.method() != Method::POST {
            warn!(ctx = %log, "Rejected non-POST RPC request");
            let error = JsonRpcError::method_not_found([Detail::rationale(POST_REQUIRED)]);
            let mut response =
                json_response(StatusCode::METHOD_NOT_ALLOWED, error.to_json_rpc_bytes());
            response
                .headers_mut()
                .insert(ALLOW, HeaderValue::from_static("POST"));
            return response;
        }

        // Dropping this future (client went away) cancels every handler call
        let cancellation = CancellationToken::new();
        let _cancel_on_drop = cancellation.clone().drop_guard();
        let mut ctx = CallContext::with_cancellation(cancellation);
        if let Some(deadline) = self.config.handler_deadline {
            ctx = ctx.with_timeout(deadline);
        }

        let (parts, body) = req.into_parts();
        let bytes = match Limited::new(body, self.config.max_request_size).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(err) => {
                warn!(ctx = %log, "Failed to read request body: {}", err);
                let error = JsonRpcError::parse_error([Detail::rationale(UNREADABLE_BODY)]);
                return json_response(StatusCode::BAD_REQUEST, error.to_json_rpc_bytes());
            }
        };

        let payload = match Payload::from_slice(&bytes) {
            Ok(payload) => payload,
            Err(error) => {
                warn!(ctx = %log, "Rejected unparseable request body");
                return json_response(StatusCode::BAD_REQUEST, error.to_json_rpc_bytes());
            }
        };

        match payload {
            Payload::Single(request) => {
                self.handle_single(&ctx, log, &parts.headers, request).await
            }
            Payload::Batch(batch) => self.handle_batch(&ctx, &log, &parts.headers, batch).await,
        }
    }

    async fn handle_single(
        &self,
        ctx: &CallContext,
        log: LogContext,
        headers: &HeaderMap,
        request: JsonRpcRequest,
    ) -> Response<Full<Bytes>> {
        let notification = request.is_notification();
        let log = log.with("rpc.method", request.method.as_str());
        let outcome = self.dispatcher.route(ctx, &log, headers, request).await;

        if outcome.is_rejected() {
            return json_response(StatusCode::BAD_REQUEST, outcome.to_json_rpc_bytes());
        }
        if notification {
            return empty_response(StatusCode::NO_CONTENT);
        }
        json_response(StatusCode::OK, outcome.to_json_rpc_bytes())
    }

    async fn handle_batch(
        &self,
        ctx: &CallContext,
        log: &LogContext,
        headers: &HeaderMap,
        batch: BatchRequest,
    ) -> Response<Full<Bytes>> {
        match self.batch.execute(ctx, log, headers, batch).await {
            Ok(responses) if responses.is_empty() => empty_response(StatusCode::NO_CONTENT),
            Ok(responses) => json_response(StatusCode::OK, responses.to_json_rpc_bytes()),
            Err(error) => json_response(StatusCode::BAD_REQUEST, error.to_json_rpc_bytes()),
        }
    }
}

fn json_response(status: StatusCode, body: Vec<u8>) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

fn empty_response(status: StatusCode) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}
