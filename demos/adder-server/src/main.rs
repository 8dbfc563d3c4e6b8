//! # Adder Server
//!
//! A minimal JSON-RPC 2.0 server with two methods:
//! - `add` sums an array of integers
//! - `divide` divides two integers and answers a zero divisor with an
//!   application error (code 1001)
//!
//! ## Usage
//! ```bash
//! cargo run --package adder-server -- --bind 127.0.0.1:1234
//! ```
//!
//! ```bash
//! curl -X POST http://127.0.0.1:1234/rpc \
//!   -H "Content-Type: application/json" \
//!   -d '{"jsonrpc":"2.0","method":"add","id":"1","params":[1,2,3]}'
//! ```

use std::net::SocketAddr;

use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use serde_json::{Value, json};
use tracing::info;
use tracing_subscriber::EnvFilter;

use jrpc_http_server::{DEFAULT_MAX_REQUEST_SIZE, RpcServer};
use jrpc_server::prelude::*;
use jrpc_server::{DEFAULT_BATCH_PARALLELISM, DEFAULT_MAX_BATCH_SIZE};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:1234")]
    bind: SocketAddr,

    /// Largest batch accepted
    #[arg(long, default_value_t = DEFAULT_MAX_BATCH_SIZE)]
    max_batch_size: usize,

    /// Batch elements dispatched concurrently
    #[arg(long, default_value_t = DEFAULT_BATCH_PARALLELISM)]
    batch_parallelism: usize,

    /// Maximum request body size in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_REQUEST_SIZE)]
    max_request_size: usize,
}

fn int_array(params: &Value) -> Option<Vec<i64>> {
    serde_json::from_value(params.clone()).ok()
}

struct Add;

#[async_trait]
impl RpcHandler for Add {
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
            None => Err(vec![Detail::rationale("parameters MUST be an int64 array")]),
        }
    }

    async fn execute(
        &self,
        _ctx: &CallContext,
        _headers: &HeaderMap,
        _id: Option<&RequestId>,
        params: &Value,
    ) -> Result<Value, HandlerError> {
        let values: Vec<i64> = serde_json::from_value(params.clone())?;
        let sum = values
            .iter()
            .try_fold(0i64, |acc, value| acc.checked_add(*value))
            .ok_or("integer overflow")?;
        Ok(json!(sum))
    }
}

struct Divide;

#[async_trait]
impl RpcHandler for Divide {
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
            Some(values) => Err(vec![
                Detail::rationale("parameters MUST be exactly two integers"),
                Detail::new("received", values.len()),
            ]),
            None => Err(vec![Detail::rationale("parameters MUST be an int64 array")]),
        }
    }

    async fn execute(
        &self,
        _ctx: &CallContext,
        _headers: &HeaderMap,
        id: Option<&RequestId>,
        params: &Value,
    ) -> Result<Value, HandlerError> {
        let values: Vec<i64> = serde_json::from_value(params.clone())?;
        match values.as_slice() {
            [_, 0] => Err(JsonRpcError::application(
                id.cloned(),
                "Division by zero",
                1001,
                [Detail::new("divisor", 0)],
            )
            .into()),
            [dividend, divisor] => {
                let quotient = dividend.checked_div(*divisor).ok_or("integer overflow")?;
                Ok(json!(quotient))
            }
            _ => Err("parameters MUST be exactly two integers".into()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let server = RpcServer::builder()
        .bind_address(args.bind)
        .max_batch_size(args.max_batch_size)
        .batch_request_parallelism(args.batch_parallelism)
        .max_request_size(args.max_request_size)
        .register(Add)?
        .register(Divide)?
        .build()?;

    info!("Starting adder server on {}", args.bind);
    server.run().await?;
    Ok(())
}
