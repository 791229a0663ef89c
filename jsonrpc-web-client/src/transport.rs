//! Transport layer for the JSON-RPC client.
//!
//! The client only needs one operation from a transport: send a body for an
//! [`Exchange`] and eventually report a single [`Completion`]. Connection
//! failures are reported as a completion with status `0`, never as a
//! separate error channel.
//!
//! [`HyperTransport`] is the default implementation:
//!
//! - HTTP/1.1 and HTTP/2 with ALPN negotiation
//! - TLS with rustls (ring provider, native roots)
//! - Connection pooling
//!
//! # Example
//!
//! ```ignore
//! use jsonrpc_web_client::transport::HyperTransport;
//! use std::time::Duration;
//!
//! let transport = HyperTransport::builder()
//!     .pool_idle_timeout(Duration::from_secs(60))
//!     .build()?;
//! ```

mod connector;
mod exchange;
mod hyper_transport;

use bytes::Bytes;

use crate::interceptor::BoxFuture;

pub use connector::default_tls_config;
pub use exchange::{Completion, Exchange};
pub use hyper_transport::{HyperTransport, HyperTransportBuilder};

// Re-export the rustls config type for custom TLS setups
pub use rustls::ClientConfig as TlsClientConfig;

/// Sends one serialized request and reports its terminal state.
///
/// Each call to [`send`](Transport::send) is one exchange. The returned
/// future resolves exactly once.
pub trait Transport: Send + Sync + 'static {
    fn send(&self, exchange: Exchange, body: Bytes) -> BoxFuture<'static, Completion>;
}
