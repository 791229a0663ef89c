#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use http::HeaderMap;
use jsonrpc_web_client::{BoxFuture, Completion, Exchange, Transport};
use serde_json::{Value, json};

type Responder = Arc<dyn Fn(&Value) -> Completion + Send + Sync>;

/// One exchange as the transport saw it.
#[derive(Clone, Debug)]
pub struct Sent {
    pub url: String,
    pub headers: HeaderMap,
    pub body: Value,
}

/// A scripted transport that records every exchange.
#[derive(Clone)]
pub struct MockTransport {
    responder: Responder,
    delay: Option<Duration>,
    sent: Arc<Mutex<Vec<Sent>>>,
    completed: Arc<AtomicUsize>,
}

impl MockTransport {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&Value) -> Completion + Send + Sync + 'static,
    {
        Self {
            responder: Arc::new(responder),
            delay: None,
            sent: Arc::default(),
            completed: Arc::default(),
        }
    }

    /// Replies with a success envelope echoing the request id.
    pub fn result(result: Value) -> Self {
        Self::new(move |request| {
            let envelope = json!({"jsonrpc": "2.0", "id": request["id"], "result": result});
            Completion::ok(envelope.to_string())
        })
    }

    /// Replies with a fixed envelope, regardless of the request.
    pub fn envelope(envelope: Value) -> Self {
        Self::new(move |_| Completion::ok(envelope.to_string()))
    }

    /// Replies with a fixed status and body.
    pub fn status(status: u16, status_text: &'static str, body: &'static str) -> Self {
        Self::new(move |_| Completion::new(status, status_text, body))
    }

    /// Completes each exchange only after `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn send_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// Exchanges whose completion has been produced, late ones included.
    pub fn completed_count(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

impl Transport for MockTransport {
    fn send(&self, exchange: Exchange, body: Bytes) -> BoxFuture<'static, Completion> {
        let parsed: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        let completion = (self.responder)(&parsed);
        self.sent.lock().unwrap().push(Sent {
            url: exchange.url().to_owned(),
            headers: exchange.headers().clone(),
            body: parsed,
        });

        let delay = self.delay;
        let completed = self.completed.clone();
        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            completed.fetch_add(1, Ordering::SeqCst);
            completion
        })
    }
}
