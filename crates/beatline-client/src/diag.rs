/// Diagnostics sink for protocol progress and failures.
///
/// The engine reports events through a single trait; whether they land in
/// `tracing`, on stderr, or nowhere is the sink's business, never the
/// engine's.

use std::fmt;

/// Severity of a diagnostic event, ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        }
    }
}

/// Events the engine reports while connecting and sending.
#[derive(Debug, Clone)]
pub enum DiagnosticEvent {
    Connected {
        host: String,
        port: u16,
        tls: bool,
    },
    WindowSent {
        size: u32,
    },
    PayloadSent {
        bytes: usize,
        awaiting: u64,
    },
    AckReceived {
        sequence: u64,
    },
    /// Something other than an ACK arrived where one was expected.
    UnexpectedFrame {
        frame_type: u8,
    },
    CloseFailed {
        error: String,
    },
}

impl DiagnosticEvent {
    pub fn severity(&self) -> Severity {
        match self {
            Self::Connected { .. } => Severity::Info,
            Self::WindowSent { .. } | Self::PayloadSent { .. } | Self::AckReceived { .. } => {
                Severity::Debug
            }
            Self::UnexpectedFrame { .. } => Severity::Warning,
            Self::CloseFailed { .. } => Severity::Error,
        }
    }
}

impl fmt::Display for DiagnosticEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected { host, port, tls } => {
                write!(f, "Connected to {}:{} (tls={})", host, port, tls)
            }
            Self::WindowSent { size } => write!(f, "Sent window size: {}", size),
            Self::PayloadSent { bytes, awaiting } => {
                write!(f, "Sent payload bytes: {}, waiting for ACK: {}", bytes, awaiting)
            }
            Self::AckReceived { sequence } => write!(f, "Received ACK: {}", sequence),
            Self::UnexpectedFrame { frame_type } => write!(
                f,
                "Waited for ACK from server but received an unexpected frame: \"0x{:02X}\". Aborting.",
                frame_type
            ),
            Self::CloseFailed { error } => write!(f, "Error closing socket: {}", error),
        }
    }
}

/// Where the engine reports. Implementations can forward to `tracing`,
/// print, or discard.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, event: &DiagnosticEvent);
}

/// Sink that forwards to the `tracing` crate.
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, event: &DiagnosticEvent) {
        match event.severity() {
            Severity::Debug => tracing::debug!("{}", event),
            Severity::Info => tracing::info!("{}", event),
            Severity::Warning => tracing::warn!("{}", event),
            Severity::Error => tracing::error!("{}", event),
        }
    }
}

/// Sink that prints warnings and errors to stderr, timestamped. The default
/// when structured logging is not wired up.
pub struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn report(&self, event: &DiagnosticEvent) {
        let severity = event.severity();
        if severity < Severity::Warning {
            return;
        }
        eprintln!(
            "{} {} {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.6f"),
            severity.label(),
            event
        );
    }
}

/// Sink that discards everything.
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&self, _event: &DiagnosticEvent) {}
}
