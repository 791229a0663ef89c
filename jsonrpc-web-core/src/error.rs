//! Protocol error objects and the client error taxonomy.
//!
//! - [`ErrorObject`]: the `error` member of a response, produced by the peer
//! - [`Code`]: the numeric code attached to every client-side failure

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `error` member of a JSON-RPC response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ErrorObject {
    pub fn new<S: Into<String>>(code: i64, message: S) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Code attached to a client-side failure.
///
/// The first five variants form the client taxonomy with stable numeric
/// values. `Status` passes a transport status through verbatim and `Rpc`
/// passes a peer's protocol error code through verbatim.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Code {
    /// No connection could be made (offline, refused, status 0).
    Network,
    /// The response body was not a valid response envelope.
    JsonParse,
    /// The response id did not echo the request id.
    IdNotMatching,
    /// The call was cancelled, typically by an interceptor.
    Cancel,
    /// The armed timeout fired before the transport completed.
    Timeout,
    /// Non-success transport status.
    Status(u16),
    /// Error code reported by the peer in the response envelope.
    Rpc(i64),
}

impl Code {
    pub const NETWORK: i64 = 0;
    pub const JSON_PARSE: i64 = 1;
    pub const ID_NOT_MATCHING: i64 = 2;
    pub const CANCEL: i64 = 3;
    pub const TIMEOUT: i64 = 4;

    /// The numeric code as seen on the failure.
    pub fn as_i64(&self) -> i64 {
        match self {
            Code::Network => Self::NETWORK,
            Code::JsonParse => Self::JSON_PARSE,
            Code::IdNotMatching => Self::ID_NOT_MATCHING,
            Code::Cancel => Self::CANCEL,
            Code::Timeout => Self::TIMEOUT,
            Code::Status(status) => i64::from(*status),
            Code::Rpc(code) => *code,
        }
    }

    /// Get the string representation of this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Code::Network => "network",
            Code::JsonParse => "json_parse",
            Code::IdNotMatching => "id_not_matching",
            Code::Cancel => "cancel",
            Code::Timeout => "timeout",
            Code::Status(_) => "status",
            Code::Rpc(_) => "rpc",
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Code::Status(_) | Code::Rpc(_) => write!(f, "{}({})", self.as_str(), self.as_i64()),
            _ => f.write_str(self.as_str()),
        }
    }
}

impl From<Code> for i64 {
    fn from(code: Code) -> Self {
        code.as_i64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_taxonomy_values_are_stable() {
        assert_eq!(Code::Network.as_i64(), 0);
        assert_eq!(Code::JsonParse.as_i64(), 1);
        assert_eq!(Code::IdNotMatching.as_i64(), 2);
        assert_eq!(Code::Cancel.as_i64(), 3);
        assert_eq!(Code::Timeout.as_i64(), 4);
    }

    #[test]
    fn test_passthrough_codes() {
        assert_eq!(Code::Status(404).as_i64(), 404);
        assert_eq!(Code::Rpc(-32601).as_i64(), -32601);
        assert_eq!(Code::Status(503).to_string(), "status(503)");
        assert_eq!(Code::Timeout.to_string(), "timeout");
    }

    #[test]
    fn test_error_object_data_roundtrip_shape() {
        let err = ErrorObject::new(-32000, "boom").with_data(json!({"k": "v"}));
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value, json!({"code": -32000, "message": "boom", "data": {"k": "v"}}));
    }
}
