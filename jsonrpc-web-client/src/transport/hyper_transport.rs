//! Default transport over hyper_util's pooled client.

use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::{Client, connect::HttpConnector};
use hyper_util::rt::{TokioExecutor, TokioTimer};
use rustls::ClientConfig;

use super::connector::{build_https_connector, default_tls_config};
use super::{Completion, Exchange, Transport};
use crate::ClientError;
use crate::interceptor::BoxFuture;

type PooledClient = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

/// Sends each exchange as one HTTP request and buffers the whole reply.
///
/// Anything that prevents a status line from arriving (refused
/// connection, TLS failure, connect timeout, a body cut short) becomes a
/// [`Completion`] with status `0`.
#[derive(Clone)]
pub struct HyperTransport {
    client: PooledClient,
    http2_only: bool,
}

impl std::fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransport")
            .field("http2_only", &self.http2_only)
            .finish_non_exhaustive()
    }
}

impl HyperTransport {
    pub fn builder() -> HyperTransportBuilder {
        HyperTransportBuilder::new()
    }

    /// Transport with native roots and default pool settings.
    pub fn new() -> Result<Self, ClientError> {
        Self::builder().build()
    }

    pub fn is_http2_only(&self) -> bool {
        self.http2_only
    }
}

impl Transport for HyperTransport {
    fn send(&self, exchange: Exchange, body: Bytes) -> BoxFuture<'static, Completion> {
        let client = self.client.clone();
        Box::pin(async move { post(&client, exchange, body).await })
    }
}

async fn post(client: &PooledClient, exchange: Exchange, body: Bytes) -> Completion {
    let mut request = match http::Request::builder()
        .method(exchange.method().clone())
        .uri(exchange.url())
        .body(Full::new(body))
    {
        Ok(request) => request,
        Err(e) => return Completion::network_failure(format!("invalid exchange: {}", e)),
    };
    *request.headers_mut() = exchange.headers().clone();

    let response = match client.request(request).await {
        Ok(response) => response,
        Err(e) => return Completion::network_failure(format!("connection failed: {}", e)),
    };

    let status = response.status();
    let status_text = status.canonical_reason().unwrap_or_default();
    match response.into_body().collect().await {
        Ok(body) => Completion::new(status.as_u16(), status_text, body.to_bytes()),
        Err(e) => Completion::network_failure(format!("response body interrupted: {}", e)),
    }
}

/// Builder for [`HyperTransport`].
///
/// ```ignore
/// use jsonrpc_web_client::transport::HyperTransport;
/// use std::time::Duration;
///
/// let transport = HyperTransport::builder()
///     .connect_timeout(Duration::from_secs(3))
///     .pool_max_idle_per_host(8)
///     .build()?;
/// ```
pub struct HyperTransportBuilder {
    tls_config: Option<ClientConfig>,
    http2_only: bool,
    connect_timeout: Option<Duration>,
    /// `None` keeps idle connections forever.
    pool_idle_timeout: Option<Duration>,
    pool_max_idle_per_host: usize,
}

impl Default for HyperTransportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HyperTransportBuilder {
    /// Defaults: native roots, HTTP/1.1 with HTTP/2 via ALPN, no connect
    /// timeout, 90s pool idle timeout, 32 idle connections per host.
    pub fn new() -> Self {
        Self {
            tls_config: None,
            http2_only: false,
            connect_timeout: None,
            pool_idle_timeout: Some(Duration::from_secs(90)),
            pool_max_idle_per_host: 32,
        }
    }

    /// Replace the default TLS configuration, e.g. for private roots.
    pub fn tls_config(mut self, config: ClientConfig) -> Self {
        self.tls_config = Some(config);
        self
    }

    /// Speak HTTP/2 only, including prior knowledge over plain `http://`.
    pub fn http2_only(mut self, enabled: bool) -> Self {
        self.http2_only = enabled;
        self
    }

    /// Give up on establishing a connection after `timeout`.
    ///
    /// An expired connect attempt is reported as status `0`, which the
    /// client turns into a `Network` failure. This is separate from the
    /// per-call timeout, which covers the whole exchange.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = Some(timeout);
        self
    }

    pub fn pool_idle_timeout_none(mut self) -> Self {
        self.pool_idle_timeout = None;
        self
    }

    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    pub fn build(self) -> Result<HyperTransport, ClientError> {
        let tls_config = match self.tls_config {
            Some(config) => config,
            None => default_tls_config()?,
        };

        let mut http = HttpConnector::new();
        http.enforce_http(false);
        http.set_connect_timeout(self.connect_timeout);
        let connector = build_https_connector(tls_config, http);

        let mut client = Client::builder(TokioExecutor::new());
        // Idle timeouts are only enforced with a timer installed
        client
            .pool_timer(TokioTimer::new())
            .pool_idle_timeout(self.pool_idle_timeout)
            .pool_max_idle_per_host(self.pool_max_idle_per_host)
            .http2_only(self.http2_only);

        Ok(HyperTransport {
            client: client.build(connector),
            http2_only: self.http2_only,
        })
    }
}

impl std::fmt::Debug for HyperTransportBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransportBuilder")
            .field("custom_tls", &self.tls_config.is_some())
            .field("http2_only", &self.http2_only)
            .field("connect_timeout", &self.connect_timeout)
            .field("pool_idle_timeout", &self.pool_idle_timeout)
            .field("pool_max_idle_per_host", &self.pool_max_idle_per_host)
            .finish()
    }
}
