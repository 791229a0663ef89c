//! Configuration modules for the JSON-RPC client.
//!
//! - [`Environment`]: Connectivity signal consulted before every dispatch
//! - [`HeaderInterceptor`], [`FnInterceptor`]: Ready-made interceptors

mod environment;
mod interceptor;

pub use environment::{AlwaysOnline, Environment, OnlineFlag};
#[cfg(feature = "tracing")]
pub use interceptor::TracingInterceptor;
pub use interceptor::{FnInterceptor, HeaderInterceptor};
