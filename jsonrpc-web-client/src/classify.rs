//! Failure classification.
//!
//! Pure functions that bucket a failure by its numeric code. The order of
//! checks matters: a failure is a server error only if it is not a
//! cancellation, not a network failure and not a client error.

use std::error::Error as StdError;

use jsonrpc_web_core::Code;

use crate::error::{ClientError, RequestError};

/// Failure bucket returned by [`error_type`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Not a request failure at all.
    Unknown,
    Cancel,
    Network,
    /// Code in `[400, 500)`.
    Client,
    /// Anything else, including parse, id-mismatch and timeout failures.
    Server,
}

pub fn is_cancelled(err: &RequestError) -> bool {
    err.code().as_i64() == Code::CANCEL
}

pub fn is_network_error(err: &RequestError) -> bool {
    err.code().as_i64() == Code::NETWORK
}

pub fn is_client_error(err: &RequestError) -> bool {
    (400..500).contains(&err.code().as_i64())
}

pub fn is_server_error(err: &RequestError) -> bool {
    !is_cancelled(err) && !is_network_error(err) && !is_client_error(err)
}

/// Classify a request failure.
pub fn request_error_type(err: &RequestError) -> ErrorType {
    if is_cancelled(err) {
        ErrorType::Cancel
    } else if is_network_error(err) {
        ErrorType::Network
    } else if is_client_error(err) {
        ErrorType::Client
    } else {
        ErrorType::Server
    }
}

/// Classify an arbitrary error value.
///
/// Returns [`ErrorType::Unknown`] unless `err` is a [`RequestError`] or a
/// [`ClientError::Request`].
pub fn error_type(err: &(dyn StdError + 'static)) -> ErrorType {
    if let Some(err) = err.downcast_ref::<RequestError>() {
        return request_error_type(err);
    }
    match err.downcast_ref::<ClientError>() {
        Some(ClientError::Request(err)) => request_error_type(err),
        _ => ErrorType::Unknown,
    }
}
