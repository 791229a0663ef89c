//! Interceptor chain for JSON-RPC calls.
//!
//! Interceptors wrap a call onion-style. Each one receives the request
//! envelope, the per-call [`Exchange`] and a [`Next`] continuation, and
//! returns the eventual [`Reply`]. An interceptor may:
//!
//! - Rewrite the request or the exchange before continuing
//! - Reshape or reject the reply after the continuation resolves
//! - Short-circuit by returning without calling `next` at all
//!
//! # Continuation rules
//!
//! A dispatch keeps a cursor of the last step that ran. Running step `i`
//! again, or running an earlier step after a later one already ran, fails
//! with [`ClientError::NextCalledMultipleTimes`] and does not re-run
//! anything downstream. Step `N` (one past the last interceptor) is the
//! terminal handler; with no terminal configured it resolves to
//! [`Reply::empty`].
//!
//! # Example
//!
//! ```ignore
//! use jsonrpc_web_client::{FnInterceptor, JsonRpcClient};
//!
//! let logging = FnInterceptor::new(|request, exchange, next| {
//!     Box::pin(async move {
//!         println!("calling {}", request.method());
//!         next.run(request, exchange).await
//!     })
//! });
//!
//! let mut client = JsonRpcClient::new("http://localhost:3000/rpc")?;
//! client.add_interceptor(logging);
//! ```

use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicIsize, Ordering};

use futures::FutureExt;
use futures::future;
use jsonrpc_web_core::{Id, Request, Response};
use serde_json::Value;

use crate::ClientError;
use crate::transport::Exchange;

/// Type alias for a boxed future returning a result.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The future every chain step returns.
pub type InterceptFuture = BoxFuture<'static, Result<Reply, ClientError>>;

/// A shareable interceptor.
pub type SharedInterceptor = Arc<dyn Interceptor>;

/// What a chain resolves to.
///
/// The terminal handler produces an [`Envelope`](Reply::Envelope);
/// interceptors may replace it with a bare [`Value`](Reply::Value), as
/// [`ExtractResult`](crate::ExtractResult) does.
#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    Envelope(Response),
    Value(Value),
}

impl Reply {
    /// The reply of a chain that ran out of steps.
    pub fn empty() -> Self {
        Reply::Value(Value::Null)
    }

    pub fn as_envelope(&self) -> Option<&Response> {
        match self {
            Reply::Envelope(response) => Some(response),
            Reply::Value(_) => None,
        }
    }

    /// Convert into a JSON value. Envelopes are serialized whole.
    pub fn into_value(self) -> Result<Value, serde_json::Error> {
        match self {
            Reply::Envelope(response) => serde_json::to_value(response),
            Reply::Value(value) => Ok(value),
        }
    }
}

/// A unit of cross-cutting behavior around a call.
pub trait Interceptor: Send + Sync {
    /// Handle one call. Call [`Next::run`] at most once to continue the chain.
    fn intercept(&self, request: Request, exchange: Exchange, next: Next) -> InterceptFuture;
}

/// The continuation handed to an interceptor.
///
/// Cloning is allowed but the dispatch cursor rejects a second run.
#[derive(Clone)]
pub struct Next {
    dispatch: Arc<Dispatch>,
    step: usize,
}

impl Next {
    /// Run the rest of the chain with the given request and exchange.
    ///
    /// The request must keep the id of the envelope the dispatch started
    /// with; a different id fails with [`ClientError::IdRewritten`].
    pub fn run(self, request: Request, exchange: Exchange) -> InterceptFuture {
        if request.id() != &self.dispatch.id {
            return Box::pin(future::ready(Err(ClientError::IdRewritten {
                expected: self.dispatch.id.clone(),
                actual: request.id().clone(),
            })));
        }
        self.dispatch.invoke(self.step, request, exchange)
    }

    /// Index of the step this continuation runs.
    pub fn step(&self) -> usize {
        self.step
    }
}

impl std::fmt::Debug for Next {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next").field("step", &self.step).finish()
    }
}

/// State of one dispatch. Lives as long as any continuation for it does.
struct Dispatch {
    steps: Arc<[SharedInterceptor]>,
    terminal: Option<SharedInterceptor>,
    id: Id,
    last_invoked: AtomicIsize,
}

impl Dispatch {
    fn invoke(self: &Arc<Self>, step: usize, request: Request, exchange: Exchange) -> InterceptFuture {
        let index = step as isize;
        let previous = self.last_invoked.fetch_max(index, Ordering::SeqCst);
        if index <= previous {
            return Box::pin(future::ready(Err(ClientError::NextCalledMultipleTimes { step })));
        }

        let handler = if step == self.steps.len() {
            self.terminal.clone()
        } else {
            self.steps.get(step).cloned()
        };
        let Some(handler) = handler else {
            return Box::pin(future::ready(Ok(Reply::empty())));
        };

        let next = Next {
            dispatch: Arc::clone(self),
            step: step + 1,
        };

        // Panics, whether raised while building the future or while polling
        // it, come back through the same Err channel.
        match panic::catch_unwind(AssertUnwindSafe(|| handler.intercept(request, exchange, next))) {
            Ok(fut) => Box::pin(AssertUnwindSafe(fut).catch_unwind().map(|outcome| {
                outcome.unwrap_or_else(|payload| Err(panic_error(payload)))
            })),
            Err(payload) => Box::pin(future::ready(Err(panic_error(payload)))),
        }
    }
}

fn panic_error(payload: Box<dyn Any + Send>) -> ClientError {
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_owned()
    };
    ClientError::InterceptorPanic(message)
}

/// An ordered sequence of interceptors.
///
/// The sequence is read, never mutated, by a dispatch: [`dispatch`](Self::dispatch)
/// snapshots it, so pushing to a chain only affects later dispatches.
#[derive(Clone, Default)]
pub struct InterceptorChain {
    interceptors: Vec<SharedInterceptor>,
}

impl std::fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptorChain")
            .field("count", &self.interceptors.len())
            .finish()
    }
}

impl InterceptorChain {
    /// Create a new empty interceptor chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an interceptor to the end of the chain.
    pub fn push(&mut self, interceptor: SharedInterceptor) {
        self.interceptors.push(interceptor);
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SharedInterceptor> {
        self.interceptors.iter()
    }

    /// Run one call through the chain.
    ///
    /// Interceptors run in insertion order; `terminal` runs after the last
    /// one, at most once. The returned future settles exactly once.
    pub fn dispatch(
        &self,
        request: Request,
        exchange: Exchange,
        terminal: Option<SharedInterceptor>,
    ) -> InterceptFuture {
        let dispatch = Arc::new(Dispatch {
            steps: self.interceptors.iter().cloned().collect(),
            terminal,
            id: request.id().clone(),
            last_invoked: AtomicIsize::new(-1),
        });
        dispatch.invoke(0, request, exchange)
    }
}

impl FromIterator<SharedInterceptor> for InterceptorChain {
    fn from_iter<T: IntoIterator<Item = SharedInterceptor>>(iter: T) -> Self {
        Self {
            interceptors: iter.into_iter().collect(),
        }
    }
}
