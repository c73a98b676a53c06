//! TLS identity for the broker's own listener.
//!
//! Certificates are provisioned outside the broker; this module only loads
//! PEM files into a rustls server configuration.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::ServerConfig;

use crate::config::broker::ListenerTls;
use crate::error::AppError;

/// Build a rustls server configuration from the configured PEM files.
pub fn load_server_config(tls: &ListenerTls) -> Result<ServerConfig, AppError> {
    let certs = load_certs(&tls.cert_path)?;
    let key = load_private_key(&tls.key_path)?;

    ServerConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
        .with_safe_default_protocol_versions()
        .map_err(|e| AppError::config(format!("unsupported TLS protocol versions: {e}")))?
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| AppError::config(format!("invalid TLS certificate or key: {e}")))
}

fn open(path: &Path) -> Result<BufReader<File>, AppError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| AppError::config(format!("failed to open {}: {e}", path.display())))
}

fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>, AppError> {
    let certs = rustls_pemfile::certs(&mut open(path)?)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::config(format!("failed to parse {}: {e}", path.display())))?;
    if certs.is_empty() {
        return Err(AppError::config(format!(
            "no certificates found in {}",
            path.display()
        )));
    }
    Ok(certs)
}

fn load_private_key(path: &Path) -> Result<PrivateKeyDer<'static>, AppError> {
    rustls_pemfile::private_key(&mut open(path)?)
        .map_err(|e| AppError::config(format!("failed to parse {}: {e}", path.display())))?
        .ok_or_else(|| AppError::config(format!("no private key found in {}", path.display())))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_loads_self_signed_identity() {
        let rcgen::CertifiedKey { cert, signing_key } =
            rcgen::generate_simple_self_signed(vec!["vnf-broker".to_string()]).unwrap();
        let cert_file = write_temp(&cert.pem());
        let key_file = write_temp(&signing_key.serialize_pem());

        let tls = ListenerTls {
            cert_path: cert_file.path().to_path_buf(),
            key_path: key_file.path().to_path_buf(),
        };
        assert!(load_server_config(&tls).is_ok());
    }

    #[test]
    fn test_missing_files_are_config_errors() {
        let tls = ListenerTls {
            cert_path: "/nonexistent/server.crt".into(),
            key_path: "/nonexistent/server.key".into(),
        };
        let err = load_server_config(&tls).unwrap_err();
        assert!(err.detail().contains("failed to open"));
    }

    #[test]
    fn test_pem_without_key_is_rejected() {
        let rcgen::CertifiedKey { cert, .. } =
            rcgen::generate_simple_self_signed(vec!["vnf-broker".to_string()]).unwrap();
        let cert_file = write_temp(&cert.pem());
        let empty = write_temp("");

        let tls = ListenerTls {
            cert_path: cert_file.path().to_path_buf(),
            key_path: empty.path().to_path_buf(),
        };
        let err = load_server_config(&tls).unwrap_err();
        assert!(err.detail().contains("no private key found"));
    }
}
