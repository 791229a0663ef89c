//! Connectivity signal.
//!
//! The client asks its [`Environment`] whether it is online before every
//! dispatch. When it is not, the call fails with [`Code::Network`] without
//! touching the transport.
//!
//! [`Code::Network`]: jsonrpc_web_core::Code::Network

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Environment capabilities consulted by the client.
pub trait Environment: Send + Sync {
    fn is_online(&self) -> bool;
}

/// Default environment: always reports online.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysOnline;

impl Environment for AlwaysOnline {
    fn is_online(&self) -> bool {
        true
    }
}

impl<F> Environment for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_online(&self) -> bool {
        self()
    }
}

/// A shared, switchable online flag.
///
/// Clones share the same flag, so one handle can be given to the client
/// while another is flipped by whatever watches connectivity.
#[derive(Clone, Debug)]
pub struct OnlineFlag {
    online: Arc<AtomicBool>,
}

impl OnlineFlag {
    pub fn new(online: bool) -> Self {
        Self {
            online: Arc::new(AtomicBool::new(online)),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

impl Default for OnlineFlag {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Environment for OnlineFlag {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}
