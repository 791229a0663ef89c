//! Client-side error types.
//!
//! This module provides [`RequestError`], the single failure shape every
//! call resolves to, and [`ClientError`], which wraps it alongside the
//! programming errors raised by interceptor misuse.

use jsonrpc_web_core::{Code, ErrorObject, Id, Request, Response};

/// A failed call.
///
/// Carries the failure code, a human message, the originating request and,
/// when the failure was triggered by a reply, the response envelope.
#[derive(Clone, Debug, thiserror::Error)]
#[error("{message}")]
pub struct RequestError {
    code: Code,
    message: String,
    request: Request,
    response: Option<Response>,
}

impl RequestError {
    /// Create a new request error without a response.
    pub fn new<S: Into<String>>(code: Code, message: S, request: Request) -> Self {
        Self {
            code,
            message: message.into(),
            request,
            response: None,
        }
    }

    /// Create a new request error that was triggered by `response`.
    pub fn with_response<S: Into<String>>(
        code: Code,
        message: S,
        request: Request,
        response: Response,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            request,
            response: Some(response),
        }
    }

    /// Build the failure for a protocol error object reported by the peer.
    pub fn from_rpc_error(error: &ErrorObject, request: Request, response: Response) -> Self {
        Self::with_response(Code::Rpc(error.code), error.message.clone(), request, response)
    }

    /// Create a cancellation failure, typically from an interceptor that
    /// decides not to continue the chain.
    pub fn cancelled<S: Into<String>>(message: S, request: Request) -> Self {
        Self::new(Code::Cancel, message, request)
    }

    pub fn code(&self) -> Code {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The request this failure belongs to. Pass it to
    /// [`JsonRpcClient::retry`](crate::JsonRpcClient::retry) to replay the call.
    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    /// Consume the error and return the originating request.
    pub fn into_request(self) -> Request {
        self.request
    }
}

/// Errors returned by client operations.
///
/// Every runtime failure of a call is a [`ClientError::Request`]. The other
/// variants are programming errors in interceptors or call arguments and are
/// never produced by the transport or the peer.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The call failed; see [`RequestError`].
    #[error(transparent)]
    Request(Box<RequestError>),

    /// A continuation was invoked after it (or a later one) already ran.
    #[error("next() called multiple times (step {step})")]
    NextCalledMultipleTimes { step: usize },

    /// An interceptor passed an envelope with a different id onward.
    #[error("interceptor replaced request id {expected} with {actual}")]
    IdRewritten { expected: Id, actual: Id },

    /// An interceptor panicked; the panic was converted into this error.
    #[error("interceptor panicked: {0}")]
    InterceptorPanic(String),

    /// The call arguments do not form a valid request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Params could not be serialized.
    #[error("encode error: {0}")]
    Encode(String),

    /// The reply could not be converted into the requested type.
    #[error("decode error: {0}")]
    Decode(String),

    /// The transport could not be constructed.
    #[error("transport error: {0}")]
    Transport(String),
}

impl ClientError {
    /// The request failure, if this is one.
    pub fn as_request_error(&self) -> Option<&RequestError> {
        match self {
            ClientError::Request(err) => Some(&**err),
            _ => None,
        }
    }

    /// The failure code, for request failures.
    pub fn code(&self) -> Option<Code> {
        self.as_request_error().map(RequestError::code)
    }

    /// Whether this is a misuse of the interceptor chain rather than a call failure.
    pub fn is_chain_misuse(&self) -> bool {
        matches!(
            self,
            ClientError::NextCalledMultipleTimes { .. }
                | ClientError::IdRewritten { .. }
                | ClientError::InterceptorPanic(_)
        )
    }
}

impl From<RequestError> for ClientError {
    fn from(err: RequestError) -> Self {
        ClientError::Request(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_error_new() {
        let err = RequestError::new(Code::Timeout, "request timed out", Request::new("ping", 1));
        assert_eq!(err.code(), Code::Timeout);
        assert_eq!(err.message(), "request timed out");
        assert_eq!(err.request().method(), "ping");
        assert!(err.response().is_none());
        assert_eq!(err.to_string(), "request timed out");
    }

    #[test]
    fn test_request_error_from_rpc_error() {
        let object = ErrorObject::new(-32601, "Method not found");
        let response = Response::failure(Some(Id::Number(1)), object.clone());
        let err = RequestError::from_rpc_error(&object, Request::new("nope", 1), response);
        assert_eq!(err.code(), Code::Rpc(-32601));
        assert_eq!(err.message(), "Method not found");
        assert!(err.response().is_some());
    }

    #[test]
    fn test_client_error_wraps_request_error() {
        let request = Request::new("ping", 1).with_params(json!({}));
        let err: ClientError = RequestError::cancelled("no token", request.clone()).into();
        assert_eq!(err.code(), Some(Code::Cancel));
        assert_eq!(err.as_request_error().unwrap().request(), &request);
        assert_eq!(err.to_string(), "no token");
        assert!(!err.is_chain_misuse());
    }

    #[test]
    fn test_chain_misuse_variants() {
        let err = ClientError::NextCalledMultipleTimes { step: 1 };
        assert!(err.is_chain_misuse());
        assert!(err.code().is_none());
        assert_eq!(err.to_string(), "next() called multiple times (step 1)");

        let err = ClientError::IdRewritten {
            expected: Id::Number(1),
            actual: Id::Number(2),
        };
        assert!(err.is_chain_misuse());
        assert_eq!(err.to_string(), "interceptor replaced request id 1 with 2");
    }
}
