/// Client error surface.
///
/// Three kinds, split by how callers recover: bad input (fix and resend),
/// connection failures (close, maybe dial again), protocol violations
/// (fatal to the in-progress send). Nothing is retried or swallowed; every
/// failure surfaces synchronously from `send`.

use std::io;

use thiserror::Error;

use beatline_protocol::{FrameError, InputError};

#[derive(Debug, Error)]
pub enum ClientError {
    /// The batch or one of its elements has an unsupported shape. Raised
    /// before any I/O happens.
    #[error(transparent)]
    Input(#[from] InputError),

    /// Transport-level failure: connect, timeout, short read, or a socket
    /// error on write. The connection is left for the caller to close.
    #[error("connection error: {0}")]
    Connection(#[from] io::Error),

    /// TLS handshake or configuration failure.
    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    #[error("invalid server name: {0}")]
    InvalidServerName(String),

    /// Certificate or key material could not be loaded or parsed.
    #[error("certificate error: {0}")]
    Certificate(String),

    /// The remote answered with something other than an ACK frame where one
    /// was expected. Carries the observed type byte (0x00 for silence).
    #[error(transparent)]
    Protocol(#[from] FrameError),
}

pub type Result<T> = std::result::Result<T, ClientError>;
