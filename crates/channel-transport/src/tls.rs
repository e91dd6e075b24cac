//! TLS client setup for ordering-service connections

use crate::types::OrdererEndpoint;
use channel_core::{ChannelError, Result};
use rustls::pki_types::pem::PemObject;
use rustls::pki_types::{CertificateDer, ServerName};
use rustls::{ClientConfig, RootCertStore};
use std::path::Path;
use std::sync::Arc;
use tokio_rustls::TlsConnector;

/// Parse PEM-encoded certificates
fn parse_certificates(pem: &[u8]) -> Result<Vec<CertificateDer<'static>>> {
    CertificateDer::pem_slice_iter(pem)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| ChannelError::config(format!("failed to parse certificates: {e}")))
}

/// Build a trust store holding only the certificates in `pem`
pub fn root_store_from_pem(pem: &[u8]) -> Result<RootCertStore> {
    let certs = parse_certificates(pem)?;
    if certs.is_empty() {
        return Err(ChannelError::config("no CA certificates found"));
    }

    let mut roots = RootCertStore::empty();
    for cert in certs {
        roots
            .add(cert)
            .map_err(|e| ChannelError::config(format!("failed to add CA certificate: {e}")))?;
    }
    Ok(roots)
}

/// TLS connector trusting the PEM file at `ca_path`
pub fn client_connector(ca_path: &Path) -> Result<TlsConnector> {
    let pem = std::fs::read(ca_path).map_err(|e| {
        ChannelError::config(format!(
            "failed to read TLS trust root {}: {e}",
            ca_path.display()
        ))
    })?;
    let roots = root_store_from_pem(&pem)?;

    let config = ClientConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()
    .map_err(|e| ChannelError::config(format!("TLS client config error: {e}")))?
    .with_root_certificates(roots)
    .with_no_client_auth();

    Ok(TlsConnector::from(Arc::new(config)))
}

/// Name to verify the server certificate against
///
/// `override_name` replaces the endpoint host, for deployments where the
/// orderer is reached by address but certified under a host name.
pub fn server_name(
    endpoint: &OrdererEndpoint,
    override_name: Option<&str>,
) -> Result<ServerName<'static>> {
    let name = override_name.unwrap_or(endpoint.host());
    ServerName::try_from(name.to_owned())
        .map_err(|e| ChannelError::config(format!("invalid server name '{name}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use channel_core::ErrorKind;

    #[test]
    fn test_server_name_override() {
        let endpoint = OrdererEndpoint::parse("tls://127.0.0.1:7050").unwrap();
        let name = server_name(&endpoint, Some("orderer.example.com")).unwrap();
        assert_eq!(name.to_str(), "orderer.example.com");

        let name = server_name(&endpoint, None).unwrap();
        assert!(matches!(name, ServerName::IpAddress(_)));
    }

    #[test]
    fn test_missing_trust_root_is_config_error() {
        let err = client_connector(Path::new("/nonexistent/ca.pem")).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_pem_without_certificates_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ca.pem");
        std::fs::write(&path, "not a certificate\n").unwrap();

        let err = client_connector(&path).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
