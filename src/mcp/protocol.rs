//! JSON-RPC 2.0 message types for the MCP protocol.
//!
//! # Message Types
//!
//! - **Request**: has an `id`, expects a response
//! - **Notification**: no `id`, no response
//! - **Response** / **Error**: reply to a request
//!
//! MCP narrows JSON-RPC slightly: request IDs are strings or integers,
//! never `null`, and batches are not used over stdio.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Protocol versions this server understands, newest first.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2025-03-26", "2024-11-05"];

/// The protocol version offered when the client asks for an unknown one.
pub const MCP_PROTOCOL_VERSION: &str = SUPPORTED_PROTOCOL_VERSIONS[0];

/// Server name for capability negotiation.
pub const SERVER_NAME: &str = "klipper-mcp";

/// Picks the protocol version to answer `initialize` with.
///
/// The client's version is echoed if supported, otherwise the newest
/// supported version is offered.
#[must_use]
pub fn negotiate_version(requested: &str) -> &'static str {
    SUPPORTED_PROTOCOL_VERSIONS
        .iter()
        .find(|v| **v == requested)
        .copied()
        .unwrap_or(MCP_PROTOCOL_VERSION)
}

/// A JSON-RPC 2.0 request ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// Numeric request ID.
    Number(i64),
    /// String request ID.
    String(String),
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    /// Must be "2.0".
    pub jsonrpc: String,

    /// Request identifier.
    pub id: RequestId,

    /// Method to invoke.
    pub method: String,

    /// Method parameters.
    #[serde(default)]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Deserialises the request parameters into `T`.
    ///
    /// # Errors
    ///
    /// Returns an invalid-params error if the parameters are missing or do
    /// not match `T`.
    pub fn parse_params<T: serde::de::DeserializeOwned>(&self) -> Result<T, JsonRpcError> {
        let params = self
            .params
            .clone()
            .ok_or_else(|| JsonRpcError::invalid_params(self.id.clone(), "Missing params"))?;

        serde_json::from_value(params).map_err(|e| {
            JsonRpcError::invalid_params(
                self.id.clone(),
                format!("Invalid params for {}: {e}", self.method),
            )
        })
    }
}

/// A JSON-RPC 2.0 notification.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcNotification {
    /// Must be "2.0".
    pub jsonrpc: String,

    /// Notification method.
    pub method: String,

    /// Notification parameters.
    #[serde(default)]
    pub params: Option<Value>,
}

/// A successful JSON-RPC 2.0 response.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    /// Always "2.0".
    pub jsonrpc: &'static str,

    /// ID of the request being answered.
    pub id: RequestId,

    /// Method result.
    pub result: Value,
}

impl JsonRpcResponse {
    /// Creates a success response.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Value is not const-compatible
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result,
        }
    }
}

/// Standard JSON-RPC 2.0 error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Invalid JSON was received.
    ParseError,
    /// The JSON is not a valid request object.
    InvalidRequest,
    /// The method does not exist.
    MethodNotFound,
    /// Invalid method parameters.
    InvalidParams,
    /// Internal error.
    InternalError,
}

impl ErrorCode {
    /// Numeric code.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
        }
    }

    /// Default message.
    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::ParseError => "Parse error",
            Self::InvalidRequest => "Invalid Request",
            Self::MethodNotFound => "Method not found",
            Self::InvalidParams => "Invalid params",
            Self::InternalError => "Internal error",
        }
    }
}

/// The `error` member of an error response.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcErrorData {
    /// Error code.
    pub code: i32,

    /// Short description.
    pub message: String,

    /// Additional information.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcErrorData {
    /// Creates error data with a custom message.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            message: message.into(),
            data: None,
        }
    }
}

impl From<ErrorCode> for JsonRpcErrorData {
    fn from(code: ErrorCode) -> Self {
        Self::new(code, code.default_message())
    }
}

/// A JSON-RPC 2.0 error response.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    /// Always "2.0".
    pub jsonrpc: &'static str,

    /// ID of the failed request; `null` when it could not be determined.
    pub id: Option<RequestId>,

    /// Error details.
    pub error: JsonRpcErrorData,
}

impl JsonRpcError {
    /// Creates an error response.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // JsonRpcErrorData contains String
    pub fn new(id: Option<RequestId>, error: JsonRpcErrorData) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            error,
        }
    }

    /// Parse error; the request ID is unknown.
    #[must_use]
    pub fn parse_error() -> Self {
        Self::new(None, ErrorCode::ParseError.into())
    }

    /// Invalid request with a reason.
    #[must_use]
    pub fn invalid_request(id: Option<RequestId>, reason: &str) -> Self {
        Self::new(
            id,
            JsonRpcErrorData::new(ErrorCode::InvalidRequest, format!("Invalid Request: {reason}")),
        )
    }

    /// Unknown method.
    #[must_use]
    pub fn method_not_found(id: RequestId, method: &str) -> Self {
        Self::new(
            Some(id),
            JsonRpcErrorData::new(
                ErrorCode::MethodNotFound,
                format!("Method not found: {method}"),
            ),
        )
    }

    /// Invalid params.
    #[must_use]
    pub fn invalid_params(id: RequestId, message: impl Into<String>) -> Self {
        Self::new(Some(id), JsonRpcErrorData::new(ErrorCode::InvalidParams, message))
    }

    /// Internal error.
    #[must_use]
    pub fn internal_error(id: RequestId, message: impl Into<String>) -> Self {
        Self::new(Some(id), JsonRpcErrorData::new(ErrorCode::InternalError, message))
    }
}

/// Anything the server writes to the client.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum OutgoingMessage {
    /// Successful reply.
    Response(JsonRpcResponse),
    /// Error reply.
    Error(JsonRpcError),
}

impl From<Result<JsonRpcResponse, JsonRpcError>> for OutgoingMessage {
    fn from(result: Result<JsonRpcResponse, JsonRpcError>) -> Self {
        match result {
            Ok(response) => Self::Response(response),
            Err(error) => Self::Error(error),
        }
    }
}

/// A parsed incoming message.
#[derive(Debug, Clone)]
pub enum IncomingMessage {
    /// Expects a response.
    Request(JsonRpcRequest),
    /// No response expected.
    Notification(JsonRpcNotification),
}

impl IncomingMessage {
    /// Method name.
    #[must_use]
    pub fn method(&self) -> &str {
        match self {
            Self::Request(req) => &req.method,
            Self::Notification(notif) => &notif.method,
        }
    }

    /// Request ID, if this is a request.
    #[must_use]
    pub const fn id(&self) -> Option<&RequestId> {
        match self {
            Self::Request(req) => Some(&req.id),
            Self::Notification(_) => None,
        }
    }
}

/// Parses one line of input into a message.
///
/// # Errors
///
/// Returns a parse error for malformed JSON, and an invalid-request error
/// for batches, non-objects, a wrong `jsonrpc` version, an empty method, or
/// a malformed `id`.
pub fn parse_message(json: &str) -> Result<IncomingMessage, JsonRpcError> {
    let value: Value = serde_json::from_str(json).map_err(|_| JsonRpcError::parse_error())?;

    if value.is_array() {
        return Err(JsonRpcError::invalid_request(None, "batches are not supported"));
    }
    let Some(obj) = value.as_object() else {
        return Err(JsonRpcError::invalid_request(None, "expected an object"));
    };

    if obj.get("jsonrpc").and_then(Value::as_str) != Some("2.0") {
        return Err(JsonRpcError::invalid_request(
            None,
            "jsonrpc field must be \"2.0\"",
        ));
    }

    let message = if obj.contains_key("id") {
        let request: JsonRpcRequest = serde_json::from_value(value)
            .map_err(|_| JsonRpcError::invalid_request(None, "malformed request"))?;
        IncomingMessage::Request(request)
    } else {
        let notification: JsonRpcNotification = serde_json::from_value(value)
            .map_err(|_| JsonRpcError::invalid_request(None, "malformed notification"))?;
        IncomingMessage::Notification(notification)
    };

    if message.method().is_empty() {
        return Err(JsonRpcError::invalid_request(
            message.id().cloned(),
            "method field cannot be empty",
        ));
    }

    Ok(message)
}
