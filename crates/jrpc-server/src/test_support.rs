//! Handlers shared by the unit tests of this crate

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use http::HeaderMap;
use serde_json::{Value, json};

use crate::context::CallContext;
use crate::detail::Detail;
use crate::error::{HandlerError, JsonRpcError};
use crate::handler::RpcHandler;
use crate::registry::MethodRegistry;
use crate::types::RequestId;

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

/// Fails every call with an unstructured error
pub struct Broken;

#[async_trait]
impl RpcHandler for Broken {
    fn method_name(&self) -> &str {
        "broken"
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
        _ctx: &CallContext,
        _headers: &HeaderMap,
        _id: Option<&RequestId>,
        _params: &Value,
    ) -> Result<Value, HandlerError> {
        Err(HandlerError::failure(std::io::Error::other("backend unavailable")))
    }
}

/// Fails every call with its own structured error
pub struct Refuser;

#[async_trait]
impl RpcHandler for Refuser {
    fn method_name(&self) -> &str {
        "refuse"
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
        _ctx: &CallContext,
        _headers: &HeaderMap,
        id: Option<&RequestId>,
        _params: &Value,
    ) -> Result<Value, HandlerError> {
        Err(JsonRpcError::application(
            id.cloned(),
            "Refused",
            4001,
            [Detail::new("reason", "policy")],
        )
        .into())
    }
}

/// Panics inside execute
pub struct Panicker;

#[async_trait]
impl RpcHandler for Panicker {
    fn method_name(&self) -> &str {
        "panic"
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
        _ctx: &CallContext,
        _headers: &HeaderMap,
        _id: Option<&RequestId>,
        _params: &Value,
    ) -> Result<Value, HandlerError> {
        panic!("handler exploded");
    }
}

/// Reports the value of the `x-tenant` header and whether the call was cancelled
pub struct Inspector;

#[async_trait]
impl RpcHandler for Inspector {
    fn method_name(&self) -> &str {
        "inspect"
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
        id: Option<&RequestId>,
        _params: &Value,
    ) -> Result<Value, HandlerError> {
        let tenant = headers
            .get("x-tenant")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        Ok(json!({
            "tenant": tenant,
            "cancelled": ctx.is_cancelled(),
            "id": id,
        }))
    }
}

/// Sleeps for `params` milliseconds while tracking how many calls overlap
pub struct Sleeper {
    pub active: Arc<AtomicUsize>,
    pub peak: Arc<AtomicUsize>,
    pub calls: Arc<AtomicUsize>,
}

impl Sleeper {
    pub fn new() -> Self {
        Self {
            active: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

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
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let millis = params.as_u64().unwrap_or_default();
        tokio::time::sleep(Duration::from_millis(millis)).await;

        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(json!(millis))
    }
}

pub fn registry() -> MethodRegistry {
    let mut registry = MethodRegistry::new();
    registry.register(Adder).unwrap();
    registry.register(Broken).unwrap();
    registry.register(Refuser).unwrap();
    registry.register(Panicker).unwrap();
    registry.register(Inspector).unwrap();
    registry
}
