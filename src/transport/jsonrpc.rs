//! JSON-RPC 2.0 message types for the stdio transport.
//!
//! Ids, params, and results are `serde_json::Value` — the adversarial
//! servers deliberately emit ids of unusual shapes, so nothing here may
//! constrain them to integers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC protocol version string.
pub const JSONRPC_VERSION: &str = "2.0";

/// Standard JSON-RPC 2.0 error codes used by the dispatcher.
pub mod error_codes {
    /// Invalid JSON was received.
    pub const PARSE_ERROR: i64 = -32700;

    /// The method (or tool) does not exist.
    pub const METHOD_NOT_FOUND: i64 = -32601;

    /// Invalid method parameter(s), including non-existent paths.
    pub const INVALID_PARAMS: i64 = -32602;

    /// Internal error.
    pub const INTERNAL_ERROR: i64 = -32603;
}

/// One inbound or outbound JSON-RPC message.
///
/// Variants are distinguished by key presence (`method` + non-null
/// `id` → request, `method` alone → notification, `result`/`error` →
/// response); `#[serde(untagged)]` cannot do this reliably, hence the
/// manual `Deserialize`.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonRpcMessage {
    /// A request expecting exactly one response.
    Request(JsonRpcRequest),
    /// A response to some request.
    Response(JsonRpcResponse),
    /// A notification; produces zero response lines.
    Notification(JsonRpcNotification),
}

impl JsonRpcMessage {
    /// The message id, if the variant carries one.
    #[must_use]
    pub const fn id(&self) -> Option<&Value> {
        match self {
            Self::Request(r) => Some(&r.id),
            Self::Response(r) => Some(&r.id),
            Self::Notification(_) => None,
        }
    }

    /// The method name, if the variant carries one.
    #[must_use]
    pub fn method(&self) -> Option<&str> {
        match self {
            Self::Request(r) => Some(&r.method),
            Self::Notification(n) => Some(&n.method),
            Self::Response(_) => None,
        }
    }
}

impl Serialize for JsonRpcMessage {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Request(r) => r.serialize(serializer),
            Self::Response(r) => r.serialize(serializer),
            Self::Notification(n) => n.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for JsonRpcMessage {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let obj = value
            .as_object()
            .ok_or_else(|| serde::de::Error::custom("JSON-RPC message must be an object"))?;

        let has_method = obj.contains_key("method");
        // A null id is the same as no id: the line is a notification.
        let has_id = obj.get("id").is_some_and(|id| !id.is_null());

        if obj.contains_key("result") || obj.contains_key("error") {
            serde_json::from_value(value)
                .map(Self::Response)
                .map_err(|e| serde::de::Error::custom(format!("invalid response: {e}")))
        } else if has_method && has_id {
            serde_json::from_value(value)
                .map(Self::Request)
                .map_err(|e| serde::de::Error::custom(format!("invalid request: {e}")))
        } else if has_method {
            serde_json::from_value(value)
                .map(Self::Notification)
                .map_err(|e| serde::de::Error::custom(format!("invalid notification: {e}")))
        } else {
            Err(serde::de::Error::custom(
                "JSON-RPC message must carry 'method' or 'result'/'error'",
            ))
        }
    }
}

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol version (must be "2.0").
    pub jsonrpc: String,

    /// Method name to invoke.
    pub method: String,

    /// Method parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,

    /// Request identifier.
    pub id: Value,
}

/// A JSON-RPC 2.0 response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Protocol version (must be "2.0").
    pub jsonrpc: String,

    /// Result value (success).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Error object (failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,

    /// Id of the request this answers — or, for the spoofing modes, an
    /// id that deliberately answers nothing.
    pub id: Value,
}

impl JsonRpcResponse {
    /// Builds a success response.
    #[must_use]
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    /// Builds an error response.
    #[must_use]
    pub fn error(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
            id,
        }
    }

    /// Whether this envelope carries an error.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// A JSON-RPC 2.0 notification (no id, no response).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    /// Protocol version (must be "2.0").
    pub jsonrpc: String,

    /// Method name.
    pub method: String,

    /// Method parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code.
    pub code: i64,

    /// Human-readable message.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_round_trips() {
        let msg = JsonRpcMessage::Request(JsonRpcRequest {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: "tools/call".to_string(),
            params: Some(json!({"name": "echo"})),
            id: json!(3),
        });
        let wire = serde_json::to_string(&msg).unwrap();
        let back: JsonRpcMessage = serde_json::from_str(&wire).unwrap();
        assert_eq!(msg, back);
    }

    #[test]
    fn notification_is_distinguished_by_missing_id() {
        let msg: JsonRpcMessage =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
                .unwrap();
        assert!(matches!(msg, JsonRpcMessage::Notification(_)));
        assert_eq!(msg.method(), Some("notifications/initialized"));
        assert_eq!(msg.id(), None);
    }

    #[test]
    fn null_id_is_classified_as_notification() {
        let msg: JsonRpcMessage = serde_json::from_str(
            r#"{"jsonrpc":"2.0","method":"notifications/initialized","id":null}"#,
        )
        .unwrap();
        assert!(matches!(msg, JsonRpcMessage::Notification(_)));
        assert_eq!(msg.id(), None);
    }

    #[test]
    fn response_is_distinguished_by_result_key() {
        let msg: JsonRpcMessage =
            serde_json::from_str(r#"{"jsonrpc":"2.0","result":null,"id":1}"#).unwrap();
        assert!(matches!(msg, JsonRpcMessage::Response(_)));
    }

    #[test]
    fn string_and_numeric_ids_are_preserved() {
        let numeric: JsonRpcMessage =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"m","id":42}"#).unwrap();
        assert_eq!(numeric.id(), Some(&json!(42)));

        let string: JsonRpcMessage =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"m","id":"req-1"}"#).unwrap();
        assert_eq!(string.id(), Some(&json!("req-1")));
    }

    #[test]
    fn error_response_shape() {
        let resp = JsonRpcResponse::error(json!(null), error_codes::PARSE_ERROR, "parse error");
        assert!(resp.is_error());
        let wire: Value = serde_json::to_value(&resp).unwrap();
        assert_eq!(wire["error"]["code"], -32700);
        assert_eq!(wire["id"], Value::Null);
        assert!(wire.get("result").is_none());
    }

    #[test]
    fn success_response_omits_error_key() {
        let resp = JsonRpcResponse::success(json!(1), json!({"ok": true}));
        assert!(!resp.is_error());
        let wire: Value = serde_json::to_value(&resp).unwrap();
        assert!(wire.get("error").is_none());
    }

    #[test]
    fn garbage_fails_to_parse() {
        assert!(serde_json::from_str::<JsonRpcMessage>("{not json").is_err());
        assert!(serde_json::from_str::<JsonRpcMessage>("[1,2]").is_err());
        assert!(serde_json::from_str::<JsonRpcMessage>("{}").is_err());
    }

    #[test]
    fn error_code_values() {
        assert_eq!(error_codes::PARSE_ERROR, -32700);
        assert_eq!(error_codes::METHOD_NOT_FOUND, -32601);
        assert_eq!(error_codes::INVALID_PARAMS, -32602);
    }
}
