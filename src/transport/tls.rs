//! TLS client configuration.
//!
//! Builds a rustls [`ClientConfig`] from [`TlsOptions`]: trust roots from a PEM
//! bundle or the bundled web PKI set, an optional client certificate, or no
//! verification at all in insecure mode.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{CryptoProvider, verify_tls12_signature, verify_tls13_signature};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use tracing::warn;

use super::TlsOptions;
use crate::core::{MllpError, MllpResult};

/// Build a client configuration from `options`.
pub fn client_config(options: &TlsOptions) -> MllpResult<Arc<ClientConfig>> {
    let builder = if options.insecure {
        warn!("TLS server certificate verification is disabled");
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyServerCert(provider)))
    } else {
        ClientConfig::builder().with_root_certificates(root_store(options.ca_file.as_deref())?)
    };

    let config = match (&options.cert_file, &options.key_file) {
        (Some(cert), Some(key)) => builder
            .with_client_auth_cert(load_certs(cert)?, load_key(key)?)
            .map_err(|e| MllpError::Config(format!("invalid client certificate: {e}")))?,
        (None, None) => builder.with_no_client_auth(),
        _ => {
            return Err(MllpError::Config(
                "client certificate and key must be given together".into(),
            ));
        }
    };

    Ok(Arc::new(config))
}

fn root_store(ca_file: Option<&Path>) -> MllpResult<RootCertStore> {
    let Some(path) = ca_file else {
        return Ok(RootCertStore {
            roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
        });
    };

    let mut roots = RootCertStore::empty();
    for cert in load_certs(path)? {
        roots.add(cert).map_err(|e| {
            MllpError::Config(format!("bad CA certificate in {}: {e}", path.display()))
        })?;
    }
    Ok(roots)
}

/// Load every certificate from a PEM file.
pub fn load_certs(path: &Path) -> MllpResult<Vec<CertificateDer<'static>>> {
    let mut reader = open(path)?;
    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| MllpError::Config(format!("cannot parse {}: {e}", path.display())))?;

    if certs.is_empty() {
        return Err(MllpError::Config(format!(
            "no certificates found in {}",
            path.display()
        )));
    }
    Ok(certs)
}

/// Load the first private key from a PEM file.
pub fn load_key(path: &Path) -> MllpResult<PrivateKeyDer<'static>> {
    let mut reader = open(path)?;
    rustls_pemfile::private_key(&mut reader)
        .map_err(|e| MllpError::Config(format!("cannot parse {}: {e}", path.display())))?
        .ok_or_else(|| MllpError::Config(format!("no private key found in {}", path.display())))
}

fn open(path: &Path) -> MllpResult<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| MllpError::Config(format!("cannot open {}: {e}", path.display())))
}

/// Verifier for insecure mode. Signatures are still checked, the chain is not.
#[derive(Debug)]
struct AcceptAnyServerCert(Arc<CryptoProvider>);

impl ServerCertVerifier for AcceptAnyServerCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}
