//! TLS configuration and certificate loading.

use axum_server::tls_rustls::RustlsConfig;
use std::path::Path;
use tokio_rustls::TlsAcceptor;

/// Load TLS configuration from certificate and key files.
///
/// The resulting server config advertises ALPN `h2` and `http/1.1`.
pub async fn load_tls_config(cert_path: &Path, key_path: &Path) -> Result<RustlsConfig, std::io::Error> {
    if !cert_path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Certificate file not found: {:?}", cert_path),
        ));
    }
    if !key_path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Private key file not found: {:?}", key_path),
        ));
    }

    RustlsConfig::from_pem_file(cert_path, key_path).await
}

/// Build an acceptor for the accept loop from PEM files.
pub async fn load_acceptor(cert_path: &Path, key_path: &Path) -> Result<TlsAcceptor, std::io::Error> {
    let config = load_tls_config(cert_path, key_path).await?;
    Ok(TlsAcceptor::from(config.get_inner()))
}
