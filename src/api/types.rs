//! Request/response payloads that only exist on the wire

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ApiError;
use crate::domain::{Tool, UserType};

/// Body of a successful `POST /session`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Missing or empty token means the login did not really succeed
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, rename = "type")]
    pub user_type: Option<UserType>,
}

/// Result of `POST /tool`
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedTool {
    /// Confirmation text from the backend, if any
    pub message: Option<String>,
    pub tool: Tool,
}

/// Pull `key` out of a `{ "<key>": ... }` envelope, or use the body as-is
/// when it is not wrapped.
pub(crate) fn unwrap_envelope<T: DeserializeOwned>(body: Value, key: &str) -> Result<T, ApiError> {
    let inner = match body {
        Value::Object(mut map) if map.contains_key(key) => map.remove(key).unwrap_or(Value::Null),
        other => other,
    };
    serde_json::from_value(inner).map_err(|e| ApiError::InvalidResponse(format!("{}: {}", key, e)))
}

/// String `message` at the top level of a body
pub(crate) fn message_of(body: &Value) -> Option<String> {
    body.get("message").and_then(Value::as_str).map(str::to_string)
}
