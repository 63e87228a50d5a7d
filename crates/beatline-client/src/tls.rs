/// rustls client configuration for the secure transport.
///
/// Chain trust is checked against the configured CA bundle (or the bundled
/// webpki roots). Hostname verification is deliberately not performed: the
/// protocol identifies the peer through certificate validation policy, not
/// name matching.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use rustls::client::WebPkiServerVerifier;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, ServerName, UnixTime};
use rustls::{
    CertificateError, ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme,
};

use crate::config::{TlsConfig, VerifyMode};
use crate::error::ClientError;

/// Build the rustls configuration for a [`TlsConfig`].
pub fn build_client_config(tls: &TlsConfig) -> Result<ClientConfig, ClientError> {
    let builder = ClientConfig::builder();

    let builder = match tls.verify {
        VerifyMode::None => builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyCert)),
        VerifyMode::Required | VerifyMode::Optional => {
            let roots = match &tls.ca_bundle {
                Some(path) => load_root_certs(path)?,
                None => {
                    let mut roots = RootCertStore::empty();
                    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
                    roots
                }
            };
            let verifier = WebPkiServerVerifier::builder(Arc::new(roots))
                .build()
                .map_err(|e| ClientError::Certificate(e.to_string()))?;
            builder
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(CaOnlyVerifier { inner: verifier }))
        }
    };

    let config = match &tls.client_cert {
        Some(cert_path) => {
            let certs = load_certs(cert_path)?;
            // Key in its own file, or bundled into the certificate file.
            let key_path = tls.client_key.as_deref().unwrap_or(cert_path);
            let key = load_key(key_path)?;
            builder.with_client_auth_cert(certs, key)?
        }
        None => builder.with_no_client_auth(),
    };

    Ok(config)
}

fn open_pem(path: &Path) -> Result<BufReader<File>, ClientError> {
    let file = File::open(path).map_err(|e| {
        ClientError::Certificate(format!("cannot read {}: {}", path.display(), e))
    })?;
    Ok(BufReader::new(file))
}

fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>, ClientError> {
    let mut reader = open_pem(path)?;
    let certs: Vec<_> = rustls_pemfile::certs(&mut reader)
        .filter_map(|c| c.ok())
        .collect();

    if certs.is_empty() {
        return Err(ClientError::Certificate(format!(
            "no certificates found in {}",
            path.display()
        )));
    }
    Ok(certs)
}

fn load_key(path: &Path) -> Result<PrivateKeyDer<'static>, ClientError> {
    let mut reader = open_pem(path)?;
    rustls_pemfile::private_key(&mut reader)
        .map_err(|e| {
            ClientError::Certificate(format!("failed to parse key {}: {}", path.display(), e))
        })?
        .ok_or_else(|| {
            ClientError::Certificate(format!("no private key found in {}", path.display()))
        })
}

fn load_root_certs(path: &Path) -> Result<RootCertStore, ClientError> {
    let mut reader = open_pem(path)?;
    let mut roots = RootCertStore::empty();
    for cert in rustls_pemfile::certs(&mut reader).filter_map(|c| c.ok()) {
        roots
            .add(cert)
            .map_err(|e| ClientError::Certificate(format!("failed to add root cert: {}", e)))?;
    }

    if roots.is_empty() {
        return Err(ClientError::Certificate(format!(
            "no root certificates found in {}",
            path.display()
        )));
    }
    Ok(roots)
}

/// Verifies the peer chain via webpki but accepts certificates that fail
/// only the hostname check.
#[derive(Debug)]
struct CaOnlyVerifier {
    inner: Arc<WebPkiServerVerifier>,
}

impl ServerCertVerifier for CaOnlyVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        match self.inner.verify_server_cert(
            end_entity,
            intermediates,
            server_name,
            ocsp_response,
            now,
        ) {
            Err(rustls::Error::InvalidCertificate(CertificateError::NotValidForName)) => {
                Ok(ServerCertVerified::assertion())
            }
            Err(rustls::Error::InvalidCertificate(
                CertificateError::NotValidForNameContext { .. },
            )) => Ok(ServerCertVerified::assertion()),
            other => other,
        }
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls12_signature(message, cert, dss)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls13_signature(message, cert, dss)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.inner.supported_verify_schemes()
    }
}

/// Certificate verifier that accepts any peer certificate. Selected by
/// [`VerifyMode::None`] only.
#[derive(Debug)]
struct AcceptAnyCert;

impl ServerCertVerifier for AcceptAnyCert {
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
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        vec![
            SignatureScheme::RSA_PKCS1_SHA256,
            SignatureScheme::RSA_PKCS1_SHA384,
            SignatureScheme::RSA_PKCS1_SHA512,
            SignatureScheme::ECDSA_NISTP256_SHA256,
            SignatureScheme::ECDSA_NISTP384_SHA384,
            SignatureScheme::ECDSA_NISTP521_SHA512,
            SignatureScheme::RSA_PSS_SHA256,
            SignatureScheme::RSA_PSS_SHA384,
            SignatureScheme::RSA_PSS_SHA512,
            SignatureScheme::ED25519,
        ]
    }
}
