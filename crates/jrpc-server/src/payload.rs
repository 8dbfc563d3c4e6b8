use serde_json::Value;
use tracing::debug;

use crate::detail::Detail;
use crate::error::JsonRpcError;
use crate::request::{BatchRequest, JsonRpcRequest};

const UNPARSEABLE_BODY: &str = "Failed to parse valid json from request body";

/// A request body classified by shape
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A single request object
    Single(JsonRpcRequest),
    /// A JSON array of request objects
    Batch(BatchRequest),
}

impl Payload {
    /// Decode a raw body.
    ///
    /// Anything that is neither a request object nor an array of request
    /// objects is a Parse Error; every element of an array must decode for
    /// the batch to be accepted.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, JsonRpcError> {
        let value: Value = serde_json::from_slice(bytes).map_err(|err| {
            debug!("Request body is not JSON: {}", err);
            unparseable()
        })?;

        match value {
            Value::Array(items) => items
                .into_iter()
                .map(serde_json::from_value::<JsonRpcRequest>)
                .collect::<Result<BatchRequest, _>>()
                .map(Payload::Batch)
                .map_err(|err| {
                    debug!("Batch element is not a JSON-RPC request: {}", err);
                    unparseable()
                }),
            object @ Value::Object(_) => serde_json::from_value::<JsonRpcRequest>(object)
                .map(Payload::Single)
                .map_err(|err| {
                    debug!("Request body is not a JSON-RPC request: {}", err);
                    unparseable()
                }),
            _ => {
                debug!("Request body is neither an object nor an array");
                Err(unparseable())
            }
        }
    }

    pub fn is_batch(&self) -> bool {
        matches!(self, Payload::Batch(_))
    }

    /// Number of requests carried
    pub fn len(&self) -> usize {
        match self {
            Payload::Single(_) => 1,
            Payload::Batch(batch) => batch.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn unparseable() -> JsonRpcError {
    JsonRpcError::parse_error([Detail::rationale(UNPARSEABLE_BODY)])
}
