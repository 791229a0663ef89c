//! Core protocol types for JSON-RPC 2.0.
//!
//! This crate provides the wire data model used by the client
//! (`jsonrpc-web-client`) and by anything that needs to speak the same
//! envelopes, such as test servers.
//!
//! ## Modules
//!
//! - `envelope`: Request/response envelopes and identifiers
//! - `error`: Protocol error objects and the client error taxonomy

mod envelope;
mod error;

pub use envelope::*;
pub use error::*;
