//! TLS connector setup for the hyper HTTP client.
//!
//! The default configuration uses the ring crypto provider and the system's
//! native root certificates. Pass a custom [`ClientConfig`] to
//! [`HyperTransportBuilder::tls_config`](super::HyperTransportBuilder::tls_config)
//! for private roots or mTLS.

use std::sync::Arc;

use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;
use rustls::{ClientConfig, RootCertStore};

use crate::ClientError;

/// Build the default TLS configuration.
pub fn default_tls_config() -> Result<ClientConfig, ClientError> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| ClientError::Transport(format!("invalid TLS protocol versions: {}", e)))?
        .with_root_certificates(native_root_store())
        .with_no_client_auth();
    Ok(config)
}

fn native_root_store() -> RootCertStore {
    let mut roots = RootCertStore::empty();
    let native_certs = rustls_native_certs::load_native_certs();
    if !native_certs.errors.is_empty() {
        #[cfg(feature = "tracing")]
        tracing::debug!("errors loading native certs: {:?}", native_certs.errors);
    }
    roots.add_parsable_certificates(native_certs.certs);
    roots
}

/// Wrap `http` so it speaks both `http://` and `https://`.
///
/// `http` must have `enforce_http(false)` set.
pub(crate) fn build_https_connector(
    config: ClientConfig,
    http: HttpConnector,
) -> HttpsConnector<HttpConnector> {
    HttpsConnectorBuilder::new()
        .with_tls_config(config)
        .https_or_http()
        .enable_http1()
        .enable_http2()
        .wrap_connector(http)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tls_config_builds() {
        let config = default_tls_config().unwrap();
        assert!(config.alpn_protocols.is_empty());
    }
}
