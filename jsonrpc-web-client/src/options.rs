//! Per-call settings.

use http::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;

/// Settings for a single call, layered over the client's defaults.
///
/// Headers land on the call's [`Exchange`](crate::Exchange) before any
/// interceptor sees it, so interceptors can still override them. The
/// client always sets `content-type` last.
///
/// ```ignore
/// use jsonrpc_web_client::CallOptions;
/// use std::time::Duration;
///
/// let options = CallOptions::new()
///     .timeout(Duration::from_secs(5))
///     .header("x-request-source", "settings-page");
///
/// let user: User = client
///     .request_with_options("user.get", json!({"id": 7}), options)
///     .await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Replaces the client's default timeout when set.
    pub(crate) timeout: Option<Duration>,
    pub(crate) headers: HeaderMap,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the call with `Timeout` if it has not completed within `timeout`.
    ///
    /// The exchange itself keeps running; its reply is dropped.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn get_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Set a header on this call's exchange.
    ///
    /// # Panics
    ///
    /// Panics if the header name or value is invalid. Use
    /// [`try_header`](Self::try_header) for untrusted input.
    pub fn header<K, V>(self, name: K, value: V) -> Self
    where
        K: TryInto<HeaderName>,
        K::Error: std::fmt::Debug,
        V: TryInto<HeaderValue>,
        V::Error: std::fmt::Debug,
    {
        let name = name.try_into().expect("invalid header name");
        let value = value.try_into().expect("invalid header value");
        self.with_header(name, value)
    }

    /// Like [`header`](Self::header), but returns `None` on invalid input.
    pub fn try_header<K, V>(self, name: K, value: V) -> Option<Self>
    where
        K: TryInto<HeaderName>,
        V: TryInto<HeaderValue>,
    {
        let name = name.try_into().ok()?;
        let value = value.try_into().ok()?;
        Some(self.with_header(name, value))
    }

    /// Merge a whole header map; later values replace earlier ones.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn get_headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}
