use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{JsonRpcVersion, RequestId};

/// A single JSON-RPC call as decoded from the wire.
///
/// `jsonrpc` and `method` default to empty strings when missing so that the
/// dispatcher, not the decoder, decides how to reject them. `params` may be
/// any JSON value and is `Value::Null` when omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub params: Value,
}

/// Decoded body of a batch call
pub type BatchRequest = Vec<JsonRpcRequest>;

impl JsonRpcRequest {
    pub fn new(id: Option<RequestId>, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: crate::JSONRPC_VERSION.to_string(),
            method: method.into(),
            id,
            params,
        }
    }

    /// Create a call that expects no response
    pub fn notification(method: impl Into<String>, params: Value) -> Self {
        Self::new(None, method, params)
    }

    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    pub fn has_supported_version(&self) -> bool {
        JsonRpcVersion::V2_0.matches(&self.jsonrpc)
    }

    /// Get a parameter by name (if params are an object)
    pub fn get_param(&self, name: &str) -> Option<&Value> {
        self.params.as_object()?.get(name)
    }

    /// Get a parameter by index (if params are an array)
    pub fn get_param_index(&self, index: usize) -> Option<&Value> {
        self.params.as_array()?.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{from_str, json, to_value};

    #[test]
    fn test_request_decoding() {
        let request: JsonRpcRequest =
            from_str(r#"{"jsonrpc":"2.0","method":"add","id":"1","params":[1,2,3]}"#).unwrap();

        assert!(request.has_supported_version());
        assert_eq!(request.method, "add");
        assert_eq!(request.id, Some(RequestId::from("1")));
        assert_eq!(request.get_param_index(2), Some(&json!(3)));
        assert!(!request.is_notification());
    }

    #[test]
    fn test_null_id_is_notification() {
        let request: JsonRpcRequest =
            from_str(r#"{"jsonrpc":"2.0","method":"log","id":null}"#).unwrap();
        assert!(request.is_notification());
        assert!(request.params.is_null());
    }

    #[test]
    fn test_missing_fields_decode_leniently() {
        let request: JsonRpcRequest = from_str(r#"{"id":5}"#).unwrap();

        assert_eq!(request.jsonrpc, "");
        assert_eq!(request.method, "");
        assert_eq!(request.id, Some(RequestId::Number(5)));
        assert!(!request.has_supported_version());
    }

    #[test]
    fn test_wrong_field_types_fail_to_decode() {
        assert!(from_str::<JsonRpcRequest>(r#"{"jsonrpc":"2.0","method":7}"#).is_err());
        assert!(from_str::<JsonRpcRequest>(r#"{"jsonrpc":"2.0","method":"a","id":true}"#).is_err());
    }

    #[test]
    fn test_object_params_lookup() {
        let request = JsonRpcRequest::new(
            Some(RequestId::Number(2)),
            "set_value",
            json!({"name": "test", "value": 42}),
        );

        assert_eq!(request.get_param("name"), Some(&json!("test")));
        assert_eq!(request.get_param("missing"), None);
        assert_eq!(request.get_param_index(0), None);
    }

    #[test]
    fn test_notification_serialization_omits_id() {
        let value = to_value(JsonRpcRequest::notification("ping", Value::Null)).unwrap();
        assert_eq!(value, json!({"jsonrpc": "2.0", "method": "ping"}));
    }
}
