/// Beatline client: ships batches of structured log events to a Beats
/// collector over TCP (optionally TLS) and blocks until the collector has
/// acknowledged the whole batch.
///
/// Blocking I/O, one connection per client, no pooling and no reconnect on
/// failure; callers serialize access themselves and decide when to dial
/// again after an error.

pub mod client;
pub mod config;
pub mod diag;
pub mod error;
pub mod tls;
pub mod transport;

// Re-export key types for convenience.
pub use client::Client;
pub use config::{ClientConfig, TlsConfig, VerifyMode};
pub use diag::{DiagnosticEvent, DiagnosticSink, NullSink, Severity, StderrSink, TracingSink};
pub use error::{ClientError, Result};

pub use beatline_protocol::{Batch, Event, FrameError, InputError, Sequencer};
