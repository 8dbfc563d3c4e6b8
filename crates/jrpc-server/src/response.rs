use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{JsonRpcError, ToJsonRpcBytes, encode_envelope};
use crate::types::{JsonRpcVersion, RequestId};

/// A successful JSON-RPC response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(rename = "jsonrpc")]
    pub version: JsonRpcVersion,
    pub result: Value,
    #[serde(default)]
    pub id: Option<RequestId>,
}

impl JsonRpcResponse {
    pub fn new(id: Option<RequestId>, result: Value) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            result,
            id,
        }
    }
}

impl ToJsonRpcBytes for JsonRpcResponse {
    fn to_json_rpc_bytes(&self) -> Vec<u8> {
        encode_envelope(self)
    }
}

impl<T> From<(Option<RequestId>, T)> for JsonRpcResponse
where
    T: Into<Value>,
{
    fn from((id, result): (Option<RequestId>, T)) -> Self {
        Self::new(id, result.into())
    }
}

/// Either a successful response or an error response.
///
/// Exactly one of `result` / `error` ends up on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcMessage {
    /// Successful response with result field
    Response(JsonRpcResponse),
    /// Error response with error field
    Error(JsonRpcError),
}

impl JsonRpcMessage {
    /// Check if this is an error response
    pub fn is_error(&self) -> bool {
        matches!(self, JsonRpcMessage::Error(_))
    }

    /// Get the request ID from either response or error
    pub fn id(&self) -> Option<&RequestId> {
        match self {
            JsonRpcMessage::Response(resp) => resp.id.as_ref(),
            JsonRpcMessage::Error(err) => err.id.as_ref(),
        }
    }
}

impl From<JsonRpcResponse> for JsonRpcMessage {
    fn from(response: JsonRpcResponse) -> Self {
        Self::Response(response)
    }
}

impl From<JsonRpcError> for JsonRpcMessage {
    fn from(error: JsonRpcError) -> Self {
        Self::Error(error)
    }
}

impl ToJsonRpcBytes for JsonRpcMessage {
    fn to_json_rpc_bytes(&self) -> Vec<u8> {
        encode_envelope(self)
    }
}

/// Combined outcome of a batch call, serialized as a JSON array.
///
/// Entries appear in completion order, not request order; clients correlate
/// them by `id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchResponse(Vec<JsonRpcMessage>);

impl BatchResponse {
    pub fn new(messages: Vec<JsonRpcMessage>) -> Self {
        Self(messages)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, JsonRpcMessage> {
        self.0.iter()
    }

    /// Find the entry answering the request with `id`
    pub fn get(&self, id: &RequestId) -> Option<&JsonRpcMessage> {
        self.0.iter().find(|message| message.id() == Some(id))
    }

    pub fn into_inner(self) -> Vec<JsonRpcMessage> {
        self.0
    }
}

impl ToJsonRpcBytes for BatchResponse {
    fn to_json_rpc_bytes(&self) -> Vec<u8> {
        encode_envelope(self)
    }
}

impl IntoIterator for BatchResponse {
    type Item = JsonRpcMessage;
    type IntoIter = std::vec::IntoIter<JsonRpcMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
