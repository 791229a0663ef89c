//! JSON-RPC client implementation.
//!
//! [`JsonRpcClient`] builds request envelopes, runs each call through the
//! interceptor chain and performs the terminal exchange: one transport
//! send, then protocol validation of the reply.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use bytes::Bytes;
use http::HeaderValue;
use http::header::CONTENT_TYPE;
use jsonrpc_web_core::{Code, Request, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::oneshot;
use tokio::time::{Instant, timeout_at};
#[cfg(feature = "tracing")]
use tracing::Instrument;

use crate::builder::ClientBuilder;
use crate::config::Environment;
use crate::error::{ClientError, RequestError};
use crate::extract::ExtractResult;
use crate::interceptor::{
    InterceptFuture, Interceptor, InterceptorChain, Next, Reply, SharedInterceptor,
};
use crate::options::CallOptions;
use crate::transport::{Completion, Exchange, Transport};

/// Default message for `Network` failures.
pub const DEFAULT_NETWORK_ERROR_MESSAGE: &str = "network unavailable, please try again later";

/// Default message for `Timeout` failures.
pub const DEFAULT_TIMEOUT_ERROR_MESSAGE: &str = "request timed out";

/// Content type set on every exchange.
const CONTENT_TYPE_JSON: &str = "application/json;charset=UTF-8";

const ID_NOT_MATCHING_MESSAGE: &str = "id not match";

/// JSON-RPC 2.0 client.
///
/// Every call gets a fresh identifier from a per-client counter, a fresh
/// [`Exchange`] and its own dispatch through the interceptor chain.
///
/// # Example
///
/// ```ignore
/// use jsonrpc_web_client::JsonRpcClient;
/// use serde_json::json;
///
/// let client = JsonRpcClient::new("http://localhost:3000/rpc")?;
/// let sum: i64 = client.request("math.add", json!([1, 2])).await?;
/// ```
pub struct JsonRpcClient {
    pub(crate) endpoint: String,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) environment: Arc<dyn Environment>,
    /// User interceptors, in insertion order.
    pub(crate) interceptors: InterceptorChain,
    pub(crate) network_error_message: String,
    pub(crate) timeout_error_message: String,
    pub(crate) ignore_protocol_error: bool,
    pub(crate) default_timeout: Option<Duration>,
    pub(crate) next_id: AtomicI64,
}

impl std::fmt::Debug for JsonRpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonRpcClient")
            .field("endpoint", &self.endpoint)
            .field("interceptors", &self.interceptors)
            .field("ignore_protocol_error", &self.ignore_protocol_error)
            .field("default_timeout", &self.default_timeout)
            .finish_non_exhaustive()
    }
}

impl JsonRpcClient {
    /// Create a new [`ClientBuilder`] for the given endpoint.
    pub fn builder<S: Into<String>>(endpoint: S) -> ClientBuilder {
        ClientBuilder::new(endpoint)
    }

    /// Create a client with default settings.
    pub fn new<S: Into<String>>(endpoint: S) -> Result<Self, ClientError> {
        ClientBuilder::new(endpoint).build()
    }

    /// The endpoint calls are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn network_error_message(&self) -> &str {
        &self.network_error_message
    }

    pub fn timeout_error_message(&self) -> &str {
        &self.timeout_error_message
    }

    pub fn set_network_error_message<S: Into<String>>(&mut self, message: S) {
        self.network_error_message = message.into();
    }

    pub fn set_timeout_error_message<S: Into<String>>(&mut self, message: S) {
        self.timeout_error_message = message.into();
    }

    /// Append an interceptor. Affects calls started afterwards.
    pub fn add_interceptor<I: Interceptor + 'static>(&mut self, interceptor: I) {
        self.interceptors.push(Arc::new(interceptor));
    }

    pub fn add_shared_interceptor(&mut self, interceptor: SharedInterceptor) {
        self.interceptors.push(interceptor);
    }

    /// The user interceptors, in the order they run.
    pub fn interceptors(&self) -> &InterceptorChain {
        &self.interceptors
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Call `method` with `params`, returning the decoded `result`.
    ///
    /// `params` serializing to `null` is sent as `{}`.
    pub async fn request<P, R>(&self, method: &str, params: P) -> Result<R, ClientError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        self.request_with_options(method, params, CallOptions::default())
            .await
    }

    /// Call `method` with per-call options.
    ///
    /// The chain is the built-in [`ExtractResult`] followed by the user
    /// interceptors, so `R` is decoded from the envelope's `result`.
    pub async fn request_with_options<P, R>(
        &self,
        method: &str,
        params: P,
        options: CallOptions,
    ) -> Result<R, ClientError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let request = self.build_request(method, params)?;
        let reply = self.dispatch(request, options, true).await?;
        decode(reply)
    }

    /// Re-dispatch an existing envelope, typically one taken from a
    /// [`RequestError`].
    ///
    /// Only user interceptors run; the result is not extracted, so asking
    /// for [`Response`] yields the raw envelope.
    pub async fn retry<R>(&self, request: Request) -> Result<R, ClientError>
    where
        R: DeserializeOwned,
    {
        self.retry_with_options(request, CallOptions::default()).await
    }

    /// Re-dispatch an existing envelope with per-call options.
    pub async fn retry_with_options<R>(
        &self,
        request: Request,
        options: CallOptions,
    ) -> Result<R, ClientError>
    where
        R: DeserializeOwned,
    {
        if request.method().is_empty() {
            return Err(ClientError::InvalidRequest("method name must not be empty".to_owned()));
        }
        let reply = self.dispatch(request, options, false).await?;
        decode(reply)
    }

    fn build_request<P: Serialize>(&self, method: &str, params: P) -> Result<Request, ClientError> {
        if method.is_empty() {
            return Err(ClientError::InvalidRequest("method name must not be empty".to_owned()));
        }
        let params = match serde_json::to_value(params) {
            Ok(Value::Null) => Value::Object(serde_json::Map::new()),
            Ok(params) => params,
            Err(e) => return Err(ClientError::Encode(format!("failed to encode params: {}", e))),
        };
        Ok(Request::new(method, self.next_id()).with_params(params))
    }

    async fn dispatch(
        &self,
        request: Request,
        options: CallOptions,
        extract: bool,
    ) -> Result<Reply, ClientError> {
        let mut exchange = Exchange::open(&self.endpoint, request.method())?;
        exchange.headers_mut().extend(options.headers);

        let chain: InterceptorChain = if extract {
            std::iter::once(Arc::new(ExtractResult) as SharedInterceptor)
                .chain(self.interceptors.iter().cloned())
                .collect()
        } else {
            self.interceptors.clone()
        };

        let terminal = Terminal {
            request: request.clone(),
            transport: Arc::clone(&self.transport),
            environment: Arc::clone(&self.environment),
            network_error_message: self.network_error_message.clone(),
            timeout_error_message: self.timeout_error_message.clone(),
            ignore_protocol_error: self.ignore_protocol_error,
            timeout: options.timeout.or(self.default_timeout),
        };

        #[cfg(feature = "tracing")]
        let span = tracing::info_span!(
            "rpc.call",
            rpc.system = "jsonrpc",
            rpc.method = %request.method(),
            rpc.id = %request.id(),
            otel.kind = "client",
        );

        let pending = chain.dispatch(request, exchange, Some(Arc::new(terminal)));

        #[cfg(feature = "tracing")]
        let pending = pending.instrument(span);

        pending.await
    }
}

fn decode<R: DeserializeOwned>(reply: Reply) -> Result<R, ClientError> {
    let value = reply
        .into_value()
        .map_err(|e| ClientError::Decode(format!("failed to convert reply: {}", e)))?;
    serde_json::from_value(value)
        .map_err(|e| ClientError::Decode(format!("failed to decode result: {}", e)))
}

/// The last step of every chain: one transport exchange plus validation.
///
/// Failures carry the envelope the call was dispatched with, not any
/// rewritten copy an interceptor passed onward.
#[derive(Clone)]
struct Terminal {
    request: Request,
    transport: Arc<dyn Transport>,
    environment: Arc<dyn Environment>,
    network_error_message: String,
    timeout_error_message: String,
    ignore_protocol_error: bool,
    timeout: Option<Duration>,
}

impl Interceptor for Terminal {
    fn intercept(&self, request: Request, mut exchange: Exchange, _next: Next) -> InterceptFuture {
        let terminal = self.clone();
        Box::pin(async move {
            if !terminal.environment.is_online() {
                #[cfg(feature = "tracing")]
                tracing::debug!("offline, skipping transport");
                return Err(terminal.fail(Code::Network, &terminal.network_error_message));
            }

            exchange
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
            let body = serde_json::to_vec(&request)
                .map(Bytes::from)
                .map_err(|e| ClientError::Encode(format!("failed to encode request: {}", e)))?;

            // The receiver and the deadline exist before the send starts.
            // A timeout too large to represent means no deadline.
            let deadline = terminal.timeout.and_then(|t| Instant::now().checked_add(t));
            let (tx, rx) = oneshot::channel::<Completion>();
            let send = terminal.transport.send(exchange, body);
            tokio::spawn(async move {
                let completion = send.await;
                if tx.send(completion).is_err() {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("discarding completion that arrived after timeout");
                }
            });

            let received = match deadline {
                Some(deadline) => match timeout_at(deadline, rx).await {
                    Ok(received) => received,
                    Err(_) => {
                        #[cfg(feature = "tracing")]
                        tracing::debug!("timeout fired before transport completed");
                        return Err(terminal.fail(Code::Timeout, &terminal.timeout_error_message));
                    }
                },
                None => rx.await,
            };

            match received {
                Ok(completion) => terminal.settle(&request, completion),
                // The send task ended without reporting; the transport panicked.
                Err(_) => Err(terminal.fail(Code::Network, &terminal.network_error_message)),
            }
        })
    }
}

impl Terminal {
    fn fail(&self, code: Code, message: &str) -> ClientError {
        RequestError::new(code, message, self.request.clone()).into()
    }

    fn settle(&self, sent: &Request, completion: Completion) -> Result<Reply, ClientError> {
        if !completion.is_success() {
            if completion.status == 0 {
                return Err(self.fail(Code::Network, &self.network_error_message));
            }
            let message = if completion.status_text.is_empty() {
                format!("request failed with status {}", completion.status)
            } else {
                completion.status_text
            };
            return Err(self.fail(Code::Status(completion.status), &message));
        }

        let response: Response = match serde_json::from_slice(&completion.body) {
            Ok(response) => response,
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(error = %e, "response body is not a valid envelope");
                return Err(self.fail(Code::JsonParse, &e.to_string()));
            }
        };

        if let Some(error) = response.error.clone() {
            return Err(RequestError::from_rpc_error(&error, self.request.clone(), response).into());
        }

        if !self.ignore_protocol_error && !response.matches(sent.id()) {
            #[cfg(feature = "tracing")]
            tracing::debug!(expected = %sent.id(), "response id does not match request id");
            return Err(RequestError::with_response(
                Code::IdNotMatching,
                ID_NOT_MATCHING_MESSAGE,
                self.request.clone(),
                response,
            )
            .into());
        }

        Ok(Reply::Envelope(response))
    }
}
