//! Ready-made interceptors.
//!
//! - [`HeaderInterceptor`]: Sets one header on every exchange
//! - [`FnInterceptor`]: Adapts a closure to the [`Interceptor`] trait
//! - [`TracingInterceptor`]: Emits a tracing event per call (feature `tracing`)
//!
//! # Example
//!
//! ```ignore
//! use jsonrpc_web_client::{FnInterceptor, HeaderInterceptor, JsonRpcClient};
//!
//! let client = JsonRpcClient::builder("http://localhost:3000/rpc")
//!     .with_interceptor(HeaderInterceptor::new("authorization", "Bearer token123"))
//!     .with_interceptor(FnInterceptor::new(|request, exchange, next| {
//!         next.run(request.with_params(serde_json::json!({"lang": "en"})), exchange)
//!     }))
//!     .build()?;
//! ```

use jsonrpc_web_core::Request;

use crate::ClientError;
use crate::interceptor::{InterceptFuture, Interceptor, Next};
use crate::transport::Exchange;

// ============================================================================
// Header Interceptor
// ============================================================================

/// An interceptor that sets a header on every exchange.
#[derive(Clone, Debug)]
pub struct HeaderInterceptor {
    name: http::HeaderName,
    value: http::HeaderValue,
}

impl HeaderInterceptor {
    /// Create a new header interceptor.
    ///
    /// # Panics
    ///
    /// Panics if the header name or value is invalid.
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.parse().expect("invalid header name"),
            value: value.parse().expect("invalid header value"),
        }
    }

    /// Try to create a new header interceptor, returning an error if invalid.
    pub fn try_new(name: &str, value: &str) -> Result<Self, ClientError> {
        let name = name
            .parse()
            .map_err(|_| ClientError::InvalidRequest(format!("invalid header name: {}", name)))?;
        let value = value
            .parse()
            .map_err(|_| ClientError::InvalidRequest(format!("invalid header value: {}", value)))?;
        Ok(Self { name, value })
    }

    /// Create a new header interceptor from pre-parsed values.
    pub fn from_parts(name: http::HeaderName, value: http::HeaderValue) -> Self {
        Self { name, value }
    }
}

impl Interceptor for HeaderInterceptor {
    fn intercept(&self, request: Request, mut exchange: Exchange, next: Next) -> InterceptFuture {
        exchange
            .headers_mut()
            .insert(self.name.clone(), self.value.clone());
        next.run(request, exchange)
    }
}

// ============================================================================
// Closure Interceptor
// ============================================================================

/// A wrapper that adapts a closure to the [`Interceptor`] trait.
pub struct FnInterceptor<F> {
    f: F,
}

impl<F> FnInterceptor<F>
where
    F: Fn(Request, Exchange, Next) -> InterceptFuture + Send + Sync,
{
    /// Create a new interceptor from a closure.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Clone for FnInterceptor<F>
where
    F: Clone,
{
    fn clone(&self) -> Self {
        Self { f: self.f.clone() }
    }
}

impl<F> std::fmt::Debug for FnInterceptor<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnInterceptor").finish()
    }
}

impl<F> Interceptor for FnInterceptor<F>
where
    F: Fn(Request, Exchange, Next) -> InterceptFuture + Send + Sync,
{
    fn intercept(&self, request: Request, exchange: Exchange, next: Next) -> InterceptFuture {
        (self.f)(request, exchange, next)
    }
}

// ============================================================================
// Tracing Interceptor
// ============================================================================

/// Emits one event per call with its method, id, outcome and latency.
///
/// Failures carrying a [`Code`](jsonrpc_web_core::Code) are logged at
/// `warn`; successes at `debug`.
#[cfg(feature = "tracing")]
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingInterceptor;

#[cfg(feature = "tracing")]
impl Interceptor for TracingInterceptor {
    fn intercept(&self, request: Request, exchange: Exchange, next: Next) -> InterceptFuture {
        let method = request.method().to_owned();
        let id = request.id().to_string();
        let started = std::time::Instant::now();
        let pending = next.run(request, exchange);
        Box::pin(async move {
            let outcome = pending.await;
            let elapsed_ms = started.elapsed().as_millis() as u64;
            match &outcome {
                Ok(_) => tracing::debug!(method = %method, id = %id, elapsed_ms, "rpc call succeeded"),
                Err(err) => match err.code() {
                    Some(code) => tracing::warn!(
                        method = %method,
                        id = %id,
                        code = code.as_i64(),
                        kind = code.as_str(),
                        elapsed_ms,
                        error = %err,
                        "rpc call failed"
                    ),
                    None => tracing::warn!(method = %method, id = %id, elapsed_ms, error = %err, "rpc call aborted"),
                },
            }
            outcome
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use http::HeaderMap;
    use jsonrpc_web_core::Response;
    use serde_json::json;

    use crate::interceptor::{InterceptorChain, Reply, SharedInterceptor};

    fn capture_headers(seen: &Arc<Mutex<Option<HeaderMap>>>) -> SharedInterceptor {
        let seen = seen.clone();
        Arc::new(FnInterceptor::new(move |request: Request, exchange: Exchange, _next| {
            *seen.lock().unwrap() = Some(exchange.headers().clone());
            Box::pin(async move {
                Ok(Reply::Envelope(Response::success(request.id().clone(), json!(true))))
            })
        }))
    }

    #[tokio::test]
    async fn test_header_interceptor() {
        let seen = Arc::default();
        let chain: InterceptorChain = [Arc::new(HeaderInterceptor::new("x-custom-header", "test-value"))
            as SharedInterceptor]
        .into_iter()
        .collect();

        chain
            .dispatch(
                Request::new("ping", 1),
                Exchange::post("http://localhost/rpc"),
                Some(capture_headers(&seen)),
            )
            .await
            .unwrap();

        let headers = seen.lock().unwrap().take().unwrap();
        assert_eq!(headers.get("x-custom-header").unwrap(), "test-value");
    }

    #[tokio::test]
    async fn test_later_header_interceptor_wins() {
        let seen = Arc::default();
        let chain: InterceptorChain = [
            Arc::new(HeaderInterceptor::new("x-env", "staging")) as SharedInterceptor,
            Arc::new(HeaderInterceptor::new("x-env", "prod")),
        ]
        .into_iter()
        .collect();

        chain
            .dispatch(
                Request::new("ping", 1),
                Exchange::post("http://localhost/rpc"),
                Some(capture_headers(&seen)),
            )
            .await
            .unwrap();

        let headers = seen.lock().unwrap().take().unwrap();
        assert_eq!(headers.get("x-env").unwrap(), "prod");
    }

    #[test]
    fn test_header_interceptor_try_new_invalid() {
        let result = HeaderInterceptor::try_new("invalid\0name", "value");
        assert!(matches!(result, Err(ClientError::InvalidRequest(_))));
    }

    #[test]
    fn test_header_interceptor_from_parts() {
        let interceptor = HeaderInterceptor::from_parts(
            http::HeaderName::from_static("x-trace-id"),
            http::HeaderValue::from_static("abc123"),
        );
        assert_eq!(interceptor.name, "x-trace-id");
    }

    #[cfg(feature = "tracing")]
    #[tokio::test]
    async fn test_tracing_interceptor_passes_outcome_through() {
        let seen = Arc::default();
        let chain: InterceptorChain = [Arc::new(TracingInterceptor) as SharedInterceptor]
            .into_iter()
            .collect();
        let reply = chain
            .dispatch(
                Request::new("ping", 3),
                Exchange::post("http://localhost/rpc"),
                Some(capture_headers(&seen)),
            )
            .await
            .unwrap();
        assert_eq!(reply.as_envelope().unwrap().result, Some(json!(true)));
    }
}
