//! The result-unwrapping interceptor installed on [`request`] calls.
//!
//! [`request`]: crate::JsonRpcClient::request

use jsonrpc_web_core::Request;
use serde_json::Value;

use crate::interceptor::{InterceptFuture, Interceptor, Next, Reply};
use crate::transport::Exchange;

/// Replaces a reply that carries a `result` member with that member.
///
/// Envelopes with a result and JSON objects with a `"result"` key are
/// unwrapped. Anything else, including errors, passes through untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExtractResult;

impl ExtractResult {
    pub fn extract(reply: Reply) -> Reply {
        match reply {
            Reply::Envelope(mut response) => match response.result.take() {
                Some(result) => Reply::Value(result),
                None => Reply::Envelope(response),
            },
            Reply::Value(Value::Object(mut map)) => match map.remove("result") {
                Some(result) => Reply::Value(result),
                None => Reply::Value(Value::Object(map)),
            },
            other => other,
        }
    }
}

impl Interceptor for ExtractResult {
    fn intercept(&self, request: Request, exchange: Exchange, next: Next) -> InterceptFuture {
        let pending = next.run(request, exchange);
        Box::pin(async move { pending.await.map(ExtractResult::extract) })
    }
}
