//! Per-call transport handle and its terminal state.

use bytes::Bytes;
use http::{HeaderMap, Method};
use serde::Serialize;

use crate::ClientError;

/// Query marker appended to the endpoint. Carries the method name for
/// observability only.
#[derive(Serialize)]
struct MethodMarker<'a> {
    method: &'a str,
}

/// The transport handle for one call.
///
/// Created fresh for every dispatch and threaded through the interceptor
/// chain by value. Interceptors may edit it (e.g. add an auth header) or
/// pass a different one onward; the terminal step hands whatever it
/// receives to the [`Transport`](super::Transport).
#[derive(Debug, Clone)]
pub struct Exchange {
    method: Method,
    url: String,
    headers: HeaderMap,
}

impl Exchange {
    /// Create a POST exchange to `url`.
    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            headers: HeaderMap::new(),
        }
    }

    /// Open a POST exchange to `endpoint` with the method marker appended,
    /// e.g. `https://api.example.com/rpc?method=user.get`.
    ///
    /// The client opens the exchange from the envelope as dispatched, before
    /// any interceptor runs. An interceptor that renames the method keeps the
    /// old marker unless it also points the exchange elsewhere with
    /// [`with_url`](Self::with_url).
    pub(crate) fn open(endpoint: &str, rpc_method: &str) -> Result<Self, ClientError> {
        let marker = serde_qs::to_string(&MethodMarker { method: rpc_method })
            .map_err(|e| ClientError::Encode(format!("method marker encoding failed: {}", e)))?;
        let separator = if endpoint.contains('?') { '&' } else { '?' };
        Ok(Self::post(format!("{}{}{}", endpoint, separator, marker)))
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a mutable reference to the headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Return this exchange pointed at a different URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

/// Terminal state of an exchange.
///
/// `status == 0` means no connection was made at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub status: u16,
    pub status_text: String,
    pub body: Bytes,
}

impl Completion {
    pub fn new(status: u16, status_text: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            body: body.into(),
        }
    }

    /// A `200 OK` completion with the given body.
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::new(200, "OK", body)
    }

    /// A completion for an exchange that never reached the peer.
    pub fn network_failure(status_text: impl Into<String>) -> Self {
        Self::new(0, status_text, Bytes::new())
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
