//! Handlers and helpers shared by the transport tests

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use serde_json::{Value, json};

use jrpc_server::{
    CallContext, Detail, HandlerError, JsonRpcError, MethodRegistry, RequestId, RpcHandler,
};

use crate::{RpcHttpHandler, ServerConfig};

pub const INT_ARRAY_RATIONALE: &str = "parameters MUST be an int64 array";

fn int_array(params: &Value) -> Option<Vec<i64>> {
    serde_json::from_value(params.clone()).ok()
}

/// Sums an array of integers
pub struct Adder;

#[async_trait]
impl RpcHandler for Adder {
    fn method_name(&self) -> &str {
        "add"
    }

    async fn parameters_valid(
        &self,
        _ctx: &CallContext,
        params: &Value,
    ) -> Result<(), Vec<Detail>> {
        match int_array(params) {
            Some(_) => Ok(()),
            None => Err(vec![Detail::rationale(INT_ARRAY_RATIONALE)]),
        }
    }

    async fn execute(
        &self,
        _ctx: &CallContext,
        _headers: &HeaderMap,
        _id: Option<&RequestId>,
        params: &Value,
    ) -> Result<Value, HandlerError> {
        let values = int_array(params).ok_or(INT_ARRAY_RATIONALE)?;
        Ok(json!(values.iter().sum::<i64>()))
    }
}

/// Divides two integers, refusing a zero divisor with its own error
pub struct Divider;

#[async_trait]
impl RpcHandler for Divider {
    fn method_name(&self) -> &str {
        "divide"
    }

    async fn parameters_valid(
        &self,
        _ctx: &CallContext,
        params: &Value,
    ) -> Result<(), Vec<Detail>> {
        match int_array(params) {
            Some(values) if values.len() == 2 => Ok(()),
            _ => Err(vec![Detail::rationale("parameters MUST be two integers")]),
        }
    }

    async fn execute(
        &self,
        _ctx: &CallContext,
        _headers: &HeaderMap,
        id: Option<&RequestId>,
        params: &Value,
    ) -> Result<Value, HandlerError> {
        let values = int_array(params).unwrap_or_default();
        match values.as_slice() {
            [_, 0] => Err(JsonRpcError::application(
                id.cloned(),
                "Division by zero",
                1001,
                [Detail::new("divisor", 0)],
            )
            .into()),
            [dividend, divisor] => Ok(json!(dividend / divisor)),
            _ => Err("parameters MUST be two integers".into()),
        }
    }
}

/// Echoes the `x-tenant` header and whether a deadline was attached
pub struct Echo;

#[async_trait]
impl RpcHandler for Echo {
    fn method_name(&self) -> &str {
        "echo"
    }

    async fn parameters_valid(
        &self,
        _ctx: &CallContext,
        _params: &Value,
    ) -> Result<(), Vec<Detail>> {
        Ok(())
    }

    async fn execute(
        &self,
        ctx: &CallContext,
        headers: &HeaderMap,
        _id: Option<&RequestId>,
        params: &Value,
    ) -> Result<Value, HandlerError> {
        let tenant = headers
            .get("x-tenant")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        Ok(json!({
            "tenant": tenant,
            "deadline": ctx.deadline().is_some(),
            "params": params,
        }))
    }
}

/// Sleeps for `params` milliseconds
pub struct Sleeper;

#[async_trait]
impl RpcHandler for Sleeper {
    fn method_name(&self) -> &str {
        "sleep"
    }

    async fn parameters_valid(
        &self,
        _ctx: &CallContext,
        params: &Value,
    ) -> Result<(), Vec<Detail>> {
        if params.is_u64() {
            Ok(())
        } else {
            Err(vec![Detail::rationale("params MUST be a number of milliseconds")])
        }
    }

    async fn execute(
        &self,
        _ctx: &CallContext,
        _headers: &HeaderMap,
        _id: Option<&RequestId>,
        params: &Value,
    ) -> Result<Value, HandlerError> {
        let millis = params.as_u64().unwrap_or_default();
        tokio::time::sleep(Duration::from_millis(millis)).await;
        Ok(json!(millis))
    }
}

pub fn registry() -> MethodRegistry {
    let mut registry = MethodRegistry::new();
    registry.register(Adder).unwrap();
    registry.register(Divider).unwrap();
    registry.register(Echo).unwrap();
    registry.register(Sleeper).unwrap();
    registry
}

pub fn handler(config: ServerConfig) -> RpcHttpHandler {
    RpcHttpHandler::new(config, registry())
}

pub fn post(path: &str, body: impl Into<Bytes>) -> Request<Full<Bytes>> {
    Request::builder()
        .method(Method::POST)
        .uri(path)
        .header("content-type", "application/json")
        .body(Full::new(body.into()))
        .unwrap()
}

pub fn request(method: Method, path: &str) -> Request<Full<Bytes>> {
    Request::builder()
        .method(method)
        .uri(path)
        .body(Full::new(Bytes::new()))
        .unwrap()
}

/// Status and raw body of a response
pub async fn read(response: Response<Full<Bytes>>) -> (StatusCode, Bytes) {
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body)
}

/// Status and JSON body of a response
pub async fn read_json(response: Response<Full<Bytes>>) -> (StatusCode, Value) {
    let (status, body) = read(response).await;
    let value = serde_json::from_slice(&body)
        .unwrap_or_else(|err| panic!("body {:?} is not JSON: {}", body, err));
    (status, value)
}
