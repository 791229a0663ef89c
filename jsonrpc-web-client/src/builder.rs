//! Client builder for the JSON-RPC client.
//!
//! Provides a fluent API for configuring and building a [`JsonRpcClient`].

use std::sync::Arc;
use std::sync::atomic::AtomicI64;
use std::time::Duration;

use crate::ClientError;
use crate::client::{DEFAULT_NETWORK_ERROR_MESSAGE, DEFAULT_TIMEOUT_ERROR_MESSAGE, JsonRpcClient};
use crate::config::{AlwaysOnline, Environment};
use crate::interceptor::{Interceptor, InterceptorChain, SharedInterceptor};
use crate::transport::{HyperTransport, Transport};

/// Builder for creating a [`JsonRpcClient`].
///
/// # Example
///
/// ```ignore
/// use jsonrpc_web_client::{ClientBuilder, HeaderInterceptor};
/// use std::time::Duration;
///
/// let client = ClientBuilder::new("https://api.example.com/rpc")
///     .timeout(Duration::from_secs(10))
///     .network_error_message("You appear to be offline")
///     .with_interceptor(HeaderInterceptor::new("authorization", "Bearer token123"))
///     .build()?;
/// ```
pub struct ClientBuilder {
    /// Endpoint every call is posted to.
    endpoint: String,
    /// Transport to use. Defaults to a [`HyperTransport`].
    transport: Option<Arc<dyn Transport>>,
    /// Connectivity signal consulted before each dispatch.
    environment: Arc<dyn Environment>,
    /// User interceptors, in insertion order.
    interceptors: InterceptorChain,
    /// Message for `Network` failures.
    network_error_message: String,
    /// Message for `Timeout` failures.
    timeout_error_message: String,
    /// Accept responses whose id does not echo the request id.
    ignore_protocol_error: bool,
    /// Default timeout for calls.
    default_timeout: Option<Duration>,
}

impl std::fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("endpoint", &self.endpoint)
            .field("transport", &self.transport.is_some())
            .field("interceptor_count", &self.interceptors.len())
            .field("network_error_message", &self.network_error_message)
            .field("timeout_error_message", &self.timeout_error_message)
            .field("ignore_protocol_error", &self.ignore_protocol_error)
            .field("default_timeout", &self.default_timeout)
            .finish()
    }
}

impl ClientBuilder {
    /// Create a new ClientBuilder for the given endpoint.
    ///
    /// The endpoint is the full URL calls are posted to, e.g.
    /// "http://localhost:3000/rpc". The method name is appended as a query
    /// parameter on every call.
    pub fn new<S: Into<String>>(endpoint: S) -> Self {
        Self {
            endpoint: endpoint.into(),
            transport: None,
            environment: Arc::new(AlwaysOnline),
            interceptors: InterceptorChain::new(),
            network_error_message: DEFAULT_NETWORK_ERROR_MESSAGE.to_owned(),
            timeout_error_message: DEFAULT_TIMEOUT_ERROR_MESSAGE.to_owned(),
            ignore_protocol_error: false,
            default_timeout: None,
        }
    }

    /// Use a custom transport.
    ///
    /// Useful for tests, or to route calls through something other than
    /// HTTP.
    pub fn transport<T: Transport>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Use a shared transport.
    pub fn shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set the connectivity signal.
    ///
    /// Any `Fn() -> bool` works; an [`OnlineFlag`](crate::OnlineFlag) can be
    /// flipped from elsewhere.
    pub fn environment<E: Environment + 'static>(mut self, environment: E) -> Self {
        self.environment = Arc::new(environment);
        self
    }

    /// Add an interceptor.
    ///
    /// Interceptors run in the order they are added, after the built-in
    /// result extraction on [`request`](JsonRpcClient::request) calls.
    pub fn with_interceptor<I: Interceptor + 'static>(mut self, interceptor: I) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Add an already shared interceptor.
    pub fn with_shared_interceptor(mut self, interceptor: SharedInterceptor) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Message used for `Network` failures (offline, or no connection made).
    pub fn network_error_message<S: Into<String>>(mut self, message: S) -> Self {
        self.network_error_message = message.into();
        self
    }

    /// Message used for `Timeout` failures.
    pub fn timeout_error_message<S: Into<String>>(mut self, message: S) -> Self {
        self.timeout_error_message = message.into();
        self
    }

    /// Accept responses whose id does not match the request id.
    pub fn ignore_protocol_error(mut self, ignore: bool) -> Self {
        self.ignore_protocol_error = ignore;
        self
    }

    /// Set a default timeout for all calls.
    ///
    /// [`CallOptions::timeout`](crate::CallOptions::timeout) overrides it.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }

    /// Build the client.
    ///
    /// Fails if the endpoint is not a valid URI or the default transport
    /// cannot be created.
    pub fn build(self) -> Result<JsonRpcClient, ClientError> {
        self.endpoint
            .parse::<http::Uri>()
            .map_err(|e| ClientError::InvalidRequest(format!("invalid endpoint {:?}: {}", self.endpoint, e)))?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HyperTransport::new()?),
        };

        Ok(JsonRpcClient {
            endpoint: self.endpoint,
            transport,
            environment: self.environment,
            interceptors: self.interceptors,
            network_error_message: self.network_error_message,
            timeout_error_message: self.timeout_error_message,
            ignore_protocol_error: self.ignore_protocol_error,
            default_timeout: self.default_timeout,
            next_id: AtomicI64::new(1),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HeaderInterceptor;

    #[test]
    fn test_builder_defaults() {
        let builder = ClientBuilder::new("http://localhost:3000/rpc");
        assert_eq!(builder.network_error_message, DEFAULT_NETWORK_ERROR_MESSAGE);
        assert_eq!(builder.timeout_error_message, DEFAULT_TIMEOUT_ERROR_MESSAGE);
        assert!(!builder.ignore_protocol_error);
        assert!(builder.default_timeout.is_none());
        assert!(builder.interceptors.is_empty());
    }

    #[test]
    fn test_builder_settings() {
        let builder = ClientBuilder::new("http://localhost:3000/rpc")
            .network_error_message("offline")
            .timeout_error_message("too slow")
            .ignore_protocol_error(true)
            .timeout(Duration::from_secs(3))
            .with_interceptor(HeaderInterceptor::new("x-a", "1"));
        assert_eq!(builder.network_error_message, "offline");
        assert_eq!(builder.timeout_error_message, "too slow");
        assert!(builder.ignore_protocol_error);
        assert_eq!(builder.default_timeout, Some(Duration::from_secs(3)));
        assert_eq!(builder.interceptors.len(), 1);
    }

    #[test]
    fn test_build_rejects_invalid_endpoint() {
        let result = ClientBuilder::new("not a uri").build();
        assert!(matches!(result, Err(ClientError::InvalidRequest(_))));
    }

    #[test]
    fn test_build_with_default_transport() {
        let client = ClientBuilder::new("http://localhost:3000/rpc").build().unwrap();
        assert_eq!(client.endpoint(), "http://localhost:3000/rpc");
    }
}
