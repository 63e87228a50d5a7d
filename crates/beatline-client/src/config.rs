/// Connection configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Certificate verification mode for the secure transport.
///
/// Hostname verification is disabled in every mode; the peer is identified
/// by chain trust against the configured roots alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerifyMode {
    /// Verify the peer chain against the CA bundle (or the bundled roots).
    #[default]
    Required,
    /// Verify against the CA bundle when one is configured. On the client
    /// side of a handshake this behaves like `Required`.
    Optional,
    /// Accept any peer certificate.
    None,
}

/// TLS settings. All paths are PEM files.
#[derive(Debug, Clone, Default)]
pub struct TlsConfig {
    pub verify: VerifyMode,
    /// Trusted root bundle; the bundled webpki roots are used when absent.
    pub ca_bundle: Option<PathBuf>,
    /// Client certificate chain presented to the collector.
    pub client_cert: Option<PathBuf>,
    /// Private key for the client certificate. When absent the key is read
    /// from the certificate file.
    pub client_key: Option<PathBuf>,
}

/// Settings for a [`Client`](crate::Client).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    /// Socket timeout applied to connect, read and write. `None` blocks
    /// indefinitely; this timeout is the only backstop for the ack wait.
    pub timeout: Option<Duration>,
    /// Secure transport; plain TCP when absent.
    pub tls: Option<TlsConfig>,
    /// Route diagnostics to `tracing` instead of the stderr fallback.
    pub use_tracing: bool,
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: None,
            tls: None,
            use_tracing: false,
        }
    }
}
