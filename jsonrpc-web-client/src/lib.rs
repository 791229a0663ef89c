//! JSON-RPC 2.0 client for Rust.
//!
//! This crate provides a JSON-RPC 2.0 client that sends one POST-style
//! exchange per call, validates the reply against the protocol and reports
//! every failure through a single error shape.
//!
//! ## Features
//!
//! - Typed calls: serializable params in, deserializable result out
//! - Onion-style interceptors that can rewrite the request and exchange,
//!   reshape the reply, or short-circuit the call
//! - Response validation (envelope parsing, peer errors, id echo)
//! - Per-call and client-wide timeouts
//! - A pluggable transport, with a hyper + rustls default
//!
//! ## Example
//!
//! ```ignore
//! use jsonrpc_web_client::JsonRpcClient;
//! use serde_json::json;
//!
//! let client = JsonRpcClient::new("http://localhost:3000/rpc")?;
//!
//! // `result` is extracted from the envelope and decoded
//! let sum: i64 = client.request("math.add", json!([40, 2])).await?;
//! assert_eq!(sum, 42);
//! ```
//!
//! ## Interceptors
//!
//! Each call runs through the chain `[ExtractResult, user interceptors...,
//! terminal]`. The terminal step performs the transport exchange. Every
//! interceptor may call its continuation at most once.
//!
//! ```ignore
//! use jsonrpc_web_client::{FnInterceptor, HeaderInterceptor, JsonRpcClient, RequestError};
//!
//! let mut client = JsonRpcClient::new("http://localhost:3000/rpc")?;
//! client.add_interceptor(HeaderInterceptor::new("authorization", "Bearer token123"));
//! client.add_interceptor(FnInterceptor::new(|request, exchange, next| {
//!     if request.method().starts_with("admin.") {
//!         return Box::pin(async move {
//!             Err(RequestError::cancelled("admin calls are disabled", request).into())
//!         });
//!     }
//!     next.run(request, exchange)
//! }));
//! ```
//!
//! ## Failures
//!
//! Runtime failures surface as [`ClientError::Request`] carrying a
//! [`RequestError`]: the [`Code`], a message, the originating request and,
//! when a reply triggered it, the response envelope.
//!
//! | Code | Value | Raised when |
//! |------|-------|-------------|
//! | `Network` | 0 | Offline, or no connection was made (status 0) |
//! | `JsonParse` | 1 | The body is not a valid response envelope |
//! | `IdNotMatching` | 2 | The response id does not echo the request id |
//! | `Cancel` | 3 | An interceptor cancelled the call |
//! | `Timeout` | 4 | The timeout fired before the transport completed |
//! | `Status(n)` | n | Non-success transport status |
//! | `Rpc(n)` | n | The peer returned an error object |
//!
//! Use [`error_type`] or the `is_*` functions to bucket a failure.
//!
//! ### Retrying
//!
//! There is no automatic retry. [`JsonRpcClient::retry`] replays an envelope,
//! usually one taken from a failure, through the user interceptors only:
//!
//! ```ignore
//! use jsonrpc_web_client::{ClientError, Response, is_network_error};
//!
//! match client.request::<_, User>("user.get", json!({"id": 7})).await {
//!     Err(ClientError::Request(err)) if is_network_error(&err) => {
//!         let envelope: Response = client.retry(err.into_request()).await?;
//!     }
//!     other => { /* ... */ }
//! }
//! ```
//!
//! ## Feature Flags
//!
//! ### Observability
//!
//! | Feature | Description | Dependencies |
//! |---------|-------------|--------------|
//! | `tracing` | Tracing spans for RPC calls (default) | `tracing` |
//!
//! When enabled, each call runs inside a span with:
//! - `rpc.system`: "jsonrpc"
//! - `rpc.method`: The method name
//! - `rpc.id`: The request identifier
//! - `otel.kind`: "client"

mod builder;
mod classify;
mod client;
pub mod config;
mod error;
mod extract;
pub mod interceptor;
mod options;
pub mod transport;

pub use builder::ClientBuilder;
pub use classify::{
    ErrorType, error_type, is_cancelled, is_client_error, is_network_error, is_server_error,
    request_error_type,
};
pub use client::{DEFAULT_NETWORK_ERROR_MESSAGE, DEFAULT_TIMEOUT_ERROR_MESSAGE, JsonRpcClient};
#[cfg(feature = "tracing")]
pub use config::TracingInterceptor;
pub use config::{AlwaysOnline, Environment, FnInterceptor, HeaderInterceptor, OnlineFlag};
pub use error::{ClientError, RequestError};
pub use extract::ExtractResult;
pub use interceptor::{
    BoxFuture, InterceptFuture, Interceptor, InterceptorChain, Next, Reply, SharedInterceptor,
};
pub use options::CallOptions;
pub use transport::{Completion, Exchange, HyperTransport, Transport};

// Re-export core types
pub use jsonrpc_web_core::{Code, ErrorObject, Id, JSONRPC_VERSION, Request, Response, Version};
