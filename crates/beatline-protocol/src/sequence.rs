/// Per-connection sequence counter and ack bookkeeping.
///
/// Every event gets the next value for the lifetime of the client; the
/// counter never resets between sends. The wire field is 32 bits but the
/// counter wraps at 2^62 - 1, which is what collectors expect to see
/// reflected in ack values.

use crate::frame::SEQUENCE_MAX;

#[derive(Debug, Default)]
pub struct Sequencer {
    sequence: u64,
    last_ack: u64,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance and return the next sequence value, wrapping to 0 once the
    /// counter exceeds [`SEQUENCE_MAX`].
    pub fn next(&mut self) -> u64 {
        self.sequence += 1;
        if self.sequence > SEQUENCE_MAX {
            self.sequence = 0;
        }
        self.sequence
    }

    /// The last value handed out; the terminal ack target of a batch.
    pub fn current(&self) -> u64 {
        self.sequence
    }

    /// Clear the last-acknowledged marker. Called at the start of every
    /// send, independent of the running counter.
    pub fn reset_ack_tracking(&mut self) {
        self.last_ack = 0;
    }

    /// Record an acknowledged sequence received from the remote.
    pub fn record_ack(&mut self, sequence: u64) {
        self.last_ack = sequence;
    }

    pub fn last_ack(&self) -> u64 {
        self.last_ack
    }

    /// True once the remote has acknowledged everything handed out so far.
    pub fn acked_up_to_current(&self) -> bool {
        self.last_ack == self.sequence
    }
}
