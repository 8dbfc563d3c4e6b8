use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

use crate::detail::{Detail, details_to_data};
use crate::types::{JsonRpcVersion, RequestId};

/// JSON-RPC error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonRpcErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    /// Handler-defined code; `0` for unclassified failures
    Application(i64),
}

impl JsonRpcErrorCode {
    pub fn code(&self) -> i64 {
        match self {
            JsonRpcErrorCode::ParseError => crate::error_codes::PARSE_ERROR,
            JsonRpcErrorCode::InvalidRequest => crate::error_codes::INVALID_REQUEST,
            JsonRpcErrorCode::MethodNotFound => crate::error_codes::METHOD_NOT_FOUND,
            JsonRpcErrorCode::Application(code) => *code,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            JsonRpcErrorCode::ParseError => "Parse error",
            JsonRpcErrorCode::InvalidRequest => "Invalid Request",
            JsonRpcErrorCode::MethodNotFound => "Method not found",
            JsonRpcErrorCode::Application(_) => "Application error",
        }
    }

    /// Map a wire code back onto the taxonomy
    pub fn from_code(code: i64) -> Self {
        match code {
            crate::error_codes::PARSE_ERROR => JsonRpcErrorCode::ParseError,
            crate::error_codes::INVALID_REQUEST => JsonRpcErrorCode::InvalidRequest,
            crate::error_codes::METHOD_NOT_FOUND => JsonRpcErrorCode::MethodNotFound,
            other => JsonRpcErrorCode::Application(other),
        }
    }
}

impl fmt::Display for JsonRpcErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

/// JSON-RPC Error object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
}

impl JsonRpcErrorObject {
    pub fn new(
        code: JsonRpcErrorCode,
        message: Option<String>,
        data: Option<Map<String, Value>>,
    ) -> Self {
        Self {
            code: code.code(),
            message: message.unwrap_or_else(|| code.message().to_string()),
            data,
        }
    }

    pub fn kind(&self) -> JsonRpcErrorCode {
        JsonRpcErrorCode::from_code(self.code)
    }
}

/// Serialize an envelope for the wire.
///
/// Envelopes only hold strings, integers and `serde_json::Value`, so a
/// failure here is a bug in this crate and aborts the current task.
pub(crate) fn encode_envelope<T: Serialize>(envelope: &T) -> Vec<u8> {
    match serde_json::to_vec(envelope) {
        Ok(bytes) => bytes,
        Err(err) => panic!("JSON-RPC envelope failed to serialize: {}", err),
    }
}

/// Anything that can render itself as a complete JSON-RPC payload
pub trait ToJsonRpcBytes {
    fn to_json_rpc_bytes(&self) -> Vec<u8>;
}

/// JSON-RPC error envelope: `{"jsonrpc":"2.0","error":{..},"id":..}`
///
/// `id` is always written, as `null` when the request id is unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    #[serde(rename = "jsonrpc")]
    pub version: JsonRpcVersion,
    pub error: JsonRpcErrorObject,
    #[serde(default)]
    pub id: Option<RequestId>,
}

impl JsonRpcError {
    pub fn new(id: Option<RequestId>, error: JsonRpcErrorObject) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            error,
            id,
        }
    }

    /// The body could not be read or decoded; the id is unknowable.
    pub fn parse_error(details: impl IntoIterator<Item = Detail>) -> Self {
        Self::new(
            None,
            JsonRpcErrorObject::new(JsonRpcErrorCode::ParseError, None, details_to_data(details)),
        )
    }

    pub fn invalid_request(
        id: Option<RequestId>,
        details: impl IntoIterator<Item = Detail>,
    ) -> Self {
        Self::new(
            id,
            JsonRpcErrorObject::new(
                JsonRpcErrorCode::InvalidRequest,
                None,
                details_to_data(details),
            ),
        )
    }

    /// Built without an id; use [`JsonRpcError::with_id`] to attach one.
    pub fn method_not_found(details: impl IntoIterator<Item = Detail>) -> Self {
        Self::new(
            None,
            JsonRpcErrorObject::new(
                JsonRpcErrorCode::MethodNotFound,
                None,
                details_to_data(details),
            ),
        )
    }

    /// Structured failure reported by a handler
    pub fn application(
        id: Option<RequestId>,
        message: impl Into<String>,
        code: i64,
        details: impl IntoIterator<Item = Detail>,
    ) -> Self {
        Self::new(
            id,
            JsonRpcErrorObject {
                code,
                message: message.into(),
                data: details_to_data(details),
            },
        )
    }

    /// Wrap an unclassified handler failure as code `0`
    pub fn from_failure(id: Option<RequestId>, err: &(dyn std::error::Error + 'static)) -> Self {
        Self::new(
            id,
            JsonRpcErrorObject {
                code: crate::error_codes::GENERIC_FAILURE,
                message: err.to_string(),
                data: None,
            },
        )
    }

    pub fn with_id(mut self, id: Option<RequestId>) -> Self {
        self.id = id;
        self
    }

    pub fn code(&self) -> i64 {
        self.error.code
    }

    pub fn kind(&self) -> JsonRpcErrorCode {
        self.error.kind()
    }

    pub fn message(&self) -> &str {
        &self.error.message
    }

    pub fn data(&self) -> Option<&Map<String, Value>> {
        self.error.data.as_ref()
    }
}

impl ToJsonRpcBytes for JsonRpcError {
    fn to_json_rpc_bytes(&self) -> Vec<u8> {
        encode_envelope(self)
    }
}

impl fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "JSON-RPC Error {}: {}",
            self.error.code, self.error.message
        )
    }
}

impl std::error::Error for JsonRpcError {}

/// Failure returned from [`crate::RpcHandler::execute`]
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Already a protocol envelope; forwarded to the client untouched
    #[error(transparent)]
    Rpc(#[from] JsonRpcError),

    /// Anything else; reported as code `0` with the error's message
    #[error("{0}")]
    Failure(Box<dyn std::error::Error + Send + Sync>),
}

impl HandlerError {
    pub fn failure(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        HandlerError::Failure(err.into())
    }

    /// Normalize into the envelope sent to the client.
    ///
    /// Structured errors keep their own id, code, message and data.
    pub fn into_json_rpc_error(self, id: Option<RequestId>) -> JsonRpcError {
        match self {
            HandlerError::Rpc(error) => error,
            HandlerError::Failure(err) => JsonRpcError::from_failure(id, &*err),
        }
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        HandlerError::failure(err)
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        HandlerError::failure(message)
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        HandlerError::failure(message)
    }
}

/// Method registration failures, reported before serving starts
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Method '{0}' is already registered")]
    DuplicateMethod(String),

    #[error("Handler method name must not be empty")]
    EmptyMethodName,
}
