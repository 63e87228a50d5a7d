/// The batch sender: encodes a batch of events, ships it, and blocks until
/// the collector's acknowledgment catches up with the last assigned
/// sequence number.
///
/// Flow per send:
///   1. Ensure the connection (lazy, first send dials)
///   2. Reset ack tracking
///   3. Window-size frame = batch length
///   4. Sequence + encode each event into one buffer
///   5. Compress the buffer into a single envelope
///   6. Write window frame, then the envelope
///   7. Read ack frames until the terminal sequence is acknowledged
///
/// No retries anywhere: every failure surfaces to the caller, who owns the
/// decision to close and dial again.

use std::sync::Arc;

use beatline_protocol::frame::FrameError;
use beatline_protocol::{Batch, Sequencer, frame};

use crate::config::ClientConfig;
use crate::diag::{DiagnosticEvent, DiagnosticSink, StderrSink, TracingSink};
use crate::error::Result;
use crate::transport::Transport;

pub struct Client {
    config: ClientConfig,
    transport: Transport,
    sequencer: Sequencer,
    sink: Arc<dyn DiagnosticSink>,
}

impl Client {
    /// Create a disconnected client. The connection opens lazily on the
    /// first `send` (or an explicit `connect`).
    pub fn new(config: ClientConfig) -> Self {
        let sink: Arc<dyn DiagnosticSink> = if config.use_tracing {
            Arc::new(TracingSink)
        } else {
            Arc::new(StderrSink)
        };
        Self {
            config,
            transport: Transport::new(),
            sequencer: Sequencer::new(),
            sink,
        }
    }

    /// Replace the diagnostics sink.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Open the connection. No-op when already connected.
    pub fn connect(&mut self) -> Result<()> {
        self.transport.connect(&self.config, self.sink.as_ref())
    }

    /// Close the connection. Idempotent; shutdown failures are reported,
    /// not escalated, since the connection is going away regardless.
    pub fn close(&mut self) {
        self.transport.close(self.sink.as_ref());
    }

    /// Connect, run `f`, and close on every exit path.
    pub fn with_connection<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.connect()?;
        let result = f(self);
        self.close();
        result
    }

    /// Validate a dynamic JSON value as a batch, then send it. Validation
    /// failures surface before any I/O.
    pub fn send_values(&mut self, values: serde_json::Value) -> Result<()> {
        let batch = Batch::from_value(values)?;
        self.send(&batch)
    }

    /// Send one batch and block until the collector has acknowledged every
    /// event in it. An empty batch still transmits a window of 0 and an
    /// empty envelope; its ack wait is satisfied immediately when nothing
    /// is outstanding.
    pub fn send(&mut self, batch: &Batch) -> Result<()> {
        self.connect()?;
        self.sequencer.reset_ack_tracking();

        let window_size = batch.len() as u32;
        let payload = self.encode_payload(batch);
        let compressed = frame::encode_compressed_frame(&payload)?;

        self.transport
            .write(&frame::encode_window_size_frame(window_size))?;
        self.sink
            .report(&DiagnosticEvent::WindowSent { size: window_size });

        self.transport.write(&compressed)?;
        self.sink.report(&DiagnosticEvent::PayloadSent {
            bytes: compressed.len(),
            awaiting: self.sequencer.current(),
        });

        while !self.sequencer.acked_up_to_current() {
            self.read_ack()?;
        }
        Ok(())
    }

    /// Concatenated json data frames for the batch, one sequence per event.
    /// The last sequence handed out becomes the batch's ack target.
    fn encode_payload(&mut self, batch: &Batch) -> Vec<u8> {
        let mut payload = Vec::new();
        for event in batch {
            let sequence = self.sequencer.next();
            payload.extend_from_slice(&frame::encode_json_frame(sequence, &event.payload_bytes()));
        }
        payload
    }

    /// Read one frame off the wire and record it if it is an ACK. Anything
    /// else aborts the send; the caller closes and decides what comes next.
    fn read_ack(&mut self) -> Result<()> {
        // Version byte; its value is not checked.
        let _ = self.transport.read_byte()?;

        let frame_type = self.transport.read_byte()?;
        if let Err(e) = frame::require_ack_type(frame_type) {
            let FrameError::UnexpectedFrame { found } = &e;
            self.sink
                .report(&DiagnosticEvent::UnexpectedFrame { frame_type: *found });
            return Err(e.into());
        }

        let mut raw = [0u8; 4];
        self.transport.read_exact(&mut raw)?;
        let sequence = frame::decode_ack_sequence(raw);
        self.sequencer.record_ack(sequence);
        self.sink.report(&DiagnosticEvent::AckReceived { sequence });
        Ok(())
    }
}
