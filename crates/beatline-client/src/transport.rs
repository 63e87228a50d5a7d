/// Blocking transport owning the socket, plain TCP or TLS.
///
/// One physical connection at a time. Writes loop until the whole buffer is
/// out; TLS writes are fed in bounded segments because encrypted record
/// layers cap record size well below typical payload sizes. Reads never
/// retry: a short or empty read is the caller's problem to surface.

use std::io;
use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::sync::Arc;

use rustls::pki_types::ServerName;
use rustls::{ClientConnection, StreamOwned};

use crate::config::ClientConfig;
use crate::diag::{DiagnosticEvent, DiagnosticSink};
use crate::error::ClientError;
use crate::tls;

/// Upper bound for a single write on a TLS stream.
pub const TLS_WRITE_SEGMENT: usize = 8192;

enum Stream {
    Plain(TcpStream),
    Tls(Box<StreamOwned<ClientConnection, TcpStream>>),
}

/// Owns the connection to the collector.
#[derive(Default)]
pub struct Transport {
    stream: Option<Stream>,
}

impl Transport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Open the connection. No-op when already connected.
    pub fn connect(
        &mut self,
        config: &ClientConfig,
        sink: &dyn DiagnosticSink,
    ) -> Result<(), ClientError> {
        if self.stream.is_some() {
            return Ok(());
        }

        let tcp = open_tcp(config)?;

        let stream = match &config.tls {
            None => Stream::Plain(tcp),
            Some(tls_config) => {
                let client_config = tls::build_client_config(tls_config)?;
                let server_name = ServerName::try_from(config.host.clone())
                    .map_err(|_| ClientError::InvalidServerName(config.host.clone()))?;
                let conn = ClientConnection::new(Arc::new(client_config), server_name)?;
                Stream::Tls(Box::new(StreamOwned::new(conn, tcp)))
            }
        };

        self.stream = Some(stream);
        sink.report(&DiagnosticEvent::Connected {
            host: config.host.clone(),
            port: config.port,
            tls: config.tls.is_some(),
        });
        Ok(())
    }

    /// Write the whole buffer, segmenting TLS output to [`TLS_WRITE_SEGMENT`].
    pub fn write(&mut self, data: &[u8]) -> Result<(), ClientError> {
        match self.stream.as_mut() {
            Some(Stream::Plain(tcp)) => tcp.write_all(data)?,
            Some(Stream::Tls(stream)) => {
                for segment in data.chunks(TLS_WRITE_SEGMENT) {
                    stream.write_all(segment)?;
                }
            }
            None => return Err(not_connected()),
        }
        Ok(())
    }

    /// Read a single byte. `None` on clean end-of-stream; timeouts and
    /// socket errors surface as connection errors.
    pub fn read_byte(&mut self) -> Result<Option<u8>, ClientError> {
        let mut byte = [0u8; 1];
        let n = match self.stream.as_mut() {
            Some(Stream::Plain(tcp)) => tcp.read(&mut byte)?,
            Some(Stream::Tls(stream)) => stream.read(&mut byte)?,
            None => return Err(not_connected()),
        };
        Ok(if n == 0 { None } else { Some(byte[0]) })
    }

    /// Fill the buffer exactly. A short read (remote close mid-frame) is a
    /// failure, not retried here.
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), ClientError> {
        match self.stream.as_mut() {
            Some(Stream::Plain(tcp)) => tcp.read_exact(buf)?,
            Some(Stream::Tls(stream)) => stream.read_exact(buf)?,
            None => return Err(not_connected()),
        }
        Ok(())
    }

    /// Close the connection. Idempotent; shutdown failures are reported to
    /// the sink and the stream is dropped regardless.
    pub fn close(&mut self, sink: &dyn DiagnosticSink) {
        let Some(stream) = self.stream.take() else {
            return;
        };
        let result = match stream {
            Stream::Plain(tcp) => tcp.shutdown(Shutdown::Both),
            Stream::Tls(mut stream) => {
                stream.conn.send_close_notify();
                let _ = stream.flush();
                stream.sock.shutdown(Shutdown::Both)
            }
        };
        if let Err(e) = result {
            sink.report(&DiagnosticEvent::CloseFailed {
                error: e.to_string(),
            });
        }
    }
}

fn open_tcp(config: &ClientConfig) -> Result<TcpStream, ClientError> {
    let mut last_error: Option<io::Error> = None;
    let mut connected = None;

    for addr in (config.host.as_str(), config.port).to_socket_addrs()? {
        let attempt = match config.timeout {
            Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
            None => TcpStream::connect(addr),
        };
        match attempt {
            Ok(tcp) => {
                connected = Some(tcp);
                break;
            }
            Err(e) => last_error = Some(e),
        }
    }

    let tcp = match connected {
        Some(tcp) => tcp,
        None => {
            return Err(ClientError::Connection(last_error.unwrap_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, "host resolved to no addresses")
            })));
        }
    };

    tcp.set_read_timeout(config.timeout)?;
    tcp.set_write_timeout(config.timeout)?;
    Ok(tcp)
}

fn not_connected() -> ClientError {
    ClientError::Connection(io::Error::new(
        io::ErrorKind::NotConnected,
        "transport is not connected",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::NullSink;

    #[test]
    fn io_before_connect_fails() {
        let mut transport = Transport::new();
        assert!(!transport.is_connected());
        assert!(transport.write(b"x").is_err());
        assert!(transport.read_byte().is_err());
        let mut buf = [0u8; 4];
        assert!(transport.read_exact(&mut buf).is_err());
    }

    #[test]
    fn close_is_idempotent_when_disconnected() {
        let mut transport = Transport::new();
        transport.close(&NullSink);
        transport.close(&NullSink);
        assert!(!transport.is_connected());
    }

    #[test]
    fn connect_refused_is_a_connection_error() {
        // Port 1 on loopback is essentially never listening.
        let config = ClientConfig {
            timeout: Some(std::time::Duration::from_millis(200)),
            ..ClientConfig::new("127.0.0.1", 1)
        };
        let mut transport = Transport::new();
        let err = transport.connect(&config, &NullSink).unwrap_err();
        assert!(matches!(err, ClientError::Connection(_)));
        assert!(!transport.is_connected());
    }
}
