/// Beatline protocol layer: wire framing for the Beats log-shipping protocol.
///
/// Pure encode/decode over byte buffers, no I/O:
/// - `frame`: the four frame kinds (window-size, JSON data, compressed, ack)
/// - `event`: validated batch input (JSON map, text, or raw bytes)
/// - `sequence`: the per-connection sequence counter and ack bookkeeping

pub mod event;
pub mod frame;
pub mod sequence;

// Re-export key types for convenience.
pub use event::{Batch, Event, InputError};
pub use frame::{
    FRAME_TYPE_ACK, FRAME_TYPE_COMPRESSED, FRAME_TYPE_JSON, FRAME_TYPE_WINDOW_SIZE, FrameError,
    PROTOCOL_VERSION, SEQUENCE_MAX, decode_ack_sequence, encode_compressed_frame,
    encode_json_frame, encode_window_size_frame, require_ack_type,
};
pub use sequence::Sequencer;
