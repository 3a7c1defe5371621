//! rustls client setup, enabled by the `tls-rustls` feature.

use std::net::TcpStream;
use std::sync::{Arc, OnceLock};

use deskterm_types::error::{DesktermError, Result};
use rustls::{ClientConfig, ClientConnection, RootCertStore, StreamOwned};
use rustls_pki_types::ServerName;

/// Process-wide client configuration trusting Mozilla's root bundle.
pub(crate) fn client_config() -> Arc<ClientConfig> {
    static CONFIG: OnceLock<Arc<ClientConfig>> = OnceLock::new();
    CONFIG
        .get_or_init(|| {
            let roots = RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
            let config = ClientConfig::builder()
                .with_root_certificates(roots)
                .with_no_client_auth();
            log::debug!("TLS client config built ({} roots)", webpki_roots::TLS_SERVER_ROOTS.len());
            Arc::new(config)
        })
        .clone()
}

/// Wrap a connected socket in a TLS session for `host`.
///
/// The handshake runs lazily on the first read or write.
pub(crate) fn connect(
    config: &Arc<ClientConfig>,
    host: &str,
    sock: TcpStream,
) -> Result<StreamOwned<ClientConnection, TcpStream>> {
    let name = ServerName::try_from(host.to_owned())
        .map_err(|e| DesktermError::Network(format!("{host}: invalid server name: {e}")))?;
    let conn = ClientConnection::new(Arc::clone(config), name)
        .map_err(|e| DesktermError::Network(format!("{host}: TLS init: {e}")))?;
    Ok(StreamOwned::new(conn, sock))
}
