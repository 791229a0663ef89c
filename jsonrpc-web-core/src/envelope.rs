//! JSON-RPC 2.0 envelopes.
//!
//! Wire shapes:
//!
//! ```text
//! request:  {"jsonrpc":"2.0","method":"ping","id":1,"params":{}}
//! response: {"jsonrpc":"2.0","id":1,"result":42}
//! response: {"jsonrpc":"2.0","id":1,"error":{"code":-32601,"message":"..."}}
//! ```
//!
//! Envelopes are plain data. A request's identifier is fixed at construction;
//! the `with_*` methods return a new envelope carrying the same id.

use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::ErrorObject;

/// Protocol version tag carried by every envelope.
pub const JSONRPC_VERSION: &str = "2.0";

/// Marker for the `"jsonrpc": "2.0"` field.
///
/// Deserialization rejects any other value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Version;

impl Serialize for Version {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(JSONRPC_VERSION)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        if tag == JSONRPC_VERSION {
            Ok(Version)
        } else {
            Err(de::Error::invalid_value(
                de::Unexpected::Str(&tag),
                &"jsonrpc version \"2.0\"",
            ))
        }
    }
}

/// Request identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Number(i64),
    String(String),
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Number(n) => write!(f, "{}", n),
            Id::String(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<i64> for Id {
    fn from(value: i64) -> Self {
        Id::Number(value)
    }
}

impl From<String> for Id {
    fn from(value: String) -> Self {
        Id::String(value)
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Id::String(value.to_owned())
    }
}

/// A JSON-RPC 2.0 request envelope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Request {
    jsonrpc: Version,
    method: String,
    id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    params: Option<Value>,
}

impl Request {
    /// Create a request without params.
    pub fn new(method: impl Into<String>, id: impl Into<Id>) -> Self {
        Self {
            jsonrpc: Version,
            method: method.into(),
            id: id.into(),
            params: None,
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn params(&self) -> Option<&Value> {
        self.params.as_ref()
    }

    /// Return a new envelope with the given params and the same id.
    pub fn with_params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }

    /// Return a new envelope without params and the same id.
    pub fn without_params(mut self) -> Self {
        self.params = None;
        self
    }

    /// Return a new envelope calling a different method with the same id.
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }
}

/// A JSON-RPC 2.0 response envelope.
///
/// `result` is `Some(Value::Null)` when the peer sent `"result": null`
/// and `None` when the field was absent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub jsonrpc: Version,
    #[serde(default)]
    pub id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub result: Option<Value>,
}

impl Response {
    /// Successful response carrying `result`.
    pub fn success(id: impl Into<Id>, result: Value) -> Self {
        Self {
            jsonrpc: Version,
            id: Some(id.into()),
            error: None,
            result: Some(result),
        }
    }

    /// Failed response carrying a protocol error object.
    pub fn failure(id: Option<Id>, error: ErrorObject) -> Self {
        Self {
            jsonrpc: Version,
            id,
            error: Some(error),
            result: None,
        }
    }

    /// Whether the response echoes the given request identifier.
    pub fn matches(&self, id: &Id) -> bool {
        self.id.as_ref() == Some(id)
    }
}

// Keeps an explicit `null` as `Some(Value::Null)`; absent fields hit `default`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_shape() {
        let req = Request::new("ping", 7).with_params(json!({"a": 1}));
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({"jsonrpc": "2.0", "method": "ping", "id": 7, "params": {"a": 1}})
        );
    }

    #[test]
    fn test_request_omits_absent_params() {
        let value = serde_json::to_value(Request::new("ping", "abc")).unwrap();
        assert_eq!(value, json!({"jsonrpc": "2.0", "method": "ping", "id": "abc"}));
    }

    #[test]
    fn test_with_methods_keep_id() {
        let req = Request::new("a", 1)
            .with_params(json!([1]))
            .with_method("b")
            .without_params();
        assert_eq!(req.id(), &Id::Number(1));
        assert_eq!(req.method(), "b");
        assert!(req.params().is_none());
    }

    #[test]
    fn test_version_rejects_other_tags() {
        let err = serde_json::from_str::<Response>(r#"{"jsonrpc":"1.0","id":1,"result":1}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_response_null_result_is_present() {
        let resp: Response = serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":null}"#).unwrap();
        assert_eq!(resp.result, Some(Value::Null));

        let resp: Response = serde_json::from_str(r#"{"jsonrpc":"2.0","id":1}"#).unwrap();
        assert_eq!(resp.result, None);
    }

    #[test]
    fn test_response_error_and_null_id() {
        let resp: Response = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32700,"message":"Parse error"}}"#,
        )
        .unwrap();
        assert!(resp.id.is_none());
        let error = resp.error.unwrap();
        assert_eq!(error.code, -32700);
        assert_eq!(error.message, "Parse error");
        assert!(error.data.is_none());
    }

    #[test]
    fn test_response_matches() {
        let resp = Response::success(3, json!(true));
        assert!(resp.matches(&Id::Number(3)));
        assert!(!resp.matches(&Id::Number(4)));
        assert!(!resp.matches(&Id::String("3".into())));
    }

    #[test]
    fn test_id_display() {
        assert_eq!(Id::Number(12).to_string(), "12");
        assert_eq!(Id::from("x").to_string(), "\"x\"");
    }
}
