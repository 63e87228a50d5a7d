/// Beats wire framing (protocol version 2).
///
/// Every frame opens with a fixed version byte and an ASCII frame-type byte;
/// all multi-byte integers are big-endian. Layouts:
///
/// ```text
/// window size  [0x32]['W'][count:4]
/// json data    [0x32]['J'][sequence:4][length:4][payload:length]
/// compressed   [0x32]['C'][length:4][zlib payload:length]
/// ack          [0x32]['A'][sequence:4]
/// ```
///
/// The compressed frame's payload decompresses to a concatenation of zero or
/// more json data frames. These constants must match byte-for-byte what
/// deployed collectors parse.

use std::io;
use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use thiserror::Error;

/// Version byte sent in every frame.
pub const PROTOCOL_VERSION: u8 = 0x32;

/// Frame type byte 'A': acknowledgment, received only.
pub const FRAME_TYPE_ACK: u8 = 0x41;

/// Frame type byte 'C': compressed envelope.
pub const FRAME_TYPE_COMPRESSED: u8 = 0x43;

/// Frame type byte 'J': a single JSON-encoded event.
pub const FRAME_TYPE_JSON: u8 = 0x4A;

/// Frame type byte 'W': window size announcement.
pub const FRAME_TYPE_WINDOW_SIZE: u8 = 0x57;

/// Highest sequence value before the counter wraps back to 0 (2^62 - 1).
pub const SEQUENCE_MAX: u64 = 0x3FFF_FFFF_FFFF_FFFF;

/// Header size of a json data frame: version + type + sequence + length.
pub const JSON_FRAME_HEADER: usize = 10;

/// An incoming frame that could not be decoded as an acknowledgment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    /// `found` is the frame-type byte seen on the wire, 0x00 if the remote
    /// sent nothing at all.
    #[error("No ACK received or wrong frame type \"0x{found:02X}\"")]
    UnexpectedFrame { found: u8 },
}

/// Encode one event payload as a json data frame.
///
/// The sequence field is 32 bits on the wire while the counter is wider, so
/// the value is written truncated; collectors ack the truncated value.
pub fn encode_json_frame(sequence: u64, payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(JSON_FRAME_HEADER + payload.len());
    frame.push(PROTOCOL_VERSION);
    frame.push(FRAME_TYPE_JSON);
    frame.extend_from_slice(&(sequence as u32).to_be_bytes());
    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    frame.extend_from_slice(payload);
    frame
}

/// Encode the window-size frame announcing how many events follow.
pub fn encode_window_size_frame(count: u32) -> Vec<u8> {
    let mut frame = Vec::with_capacity(6);
    frame.push(PROTOCOL_VERSION);
    frame.push(FRAME_TYPE_WINDOW_SIZE);
    frame.extend_from_slice(&count.to_be_bytes());
    frame
}

/// Wrap a concatenation of json data frames in a compressed frame.
///
/// zlib at the default level; an empty payload still compresses to a valid
/// (if pointless) envelope, which is what an empty batch sends.
pub fn encode_compressed_frame(payload: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(payload)?;
    let compressed = encoder.finish()?;

    let mut frame = Vec::with_capacity(6 + compressed.len());
    frame.push(PROTOCOL_VERSION);
    frame.push(FRAME_TYPE_COMPRESSED);
    frame.extend_from_slice(&(compressed.len() as u32).to_be_bytes());
    frame.extend_from_slice(&compressed);
    Ok(frame)
}

/// Check the frame-type byte of an incoming frame against the ACK type.
///
/// `None` means the remote closed (or timed out) before sending the byte;
/// that is reported as 0x00.
pub fn require_ack_type(frame_type: Option<u8>) -> Result<(), FrameError> {
    match frame_type {
        Some(FRAME_TYPE_ACK) => Ok(()),
        Some(other) => Err(FrameError::UnexpectedFrame { found: other }),
        None => Err(FrameError::UnexpectedFrame { found: 0 }),
    }
}

/// Decode the big-endian sequence field of an ACK frame.
pub fn decode_ack_sequence(raw: [u8; 4]) -> u64 {
    u32::from_be_bytes(raw) as u64
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use flate2::read::ZlibDecoder;

    use super::*;

    #[test]
    fn window_size_layout() {
        let frame = encode_window_size_frame(2);
        assert_eq!(frame, [0x32, 0x57, 0x00, 0x00, 0x00, 0x02]);
    }

    #[test]
    fn json_frame_layout() {
        let frame = encode_json_frame(1, b"{}");
        assert_eq!(
            frame,
            [0x32, 0x4A, 0, 0, 0, 1, 0, 0, 0, 2, b'{', b'}']
        );
    }

    #[test]
    fn json_frame_truncates_wide_sequence() {
        let frame = encode_json_frame(u32::MAX as u64 + 7, b"x");
        assert_eq!(&frame[2..6], &6u32.to_be_bytes());
    }

    #[test]
    fn compressed_frame_roundtrip() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&encode_json_frame(1, br#"{"message":"foo"}"#));
        payload.extend_from_slice(&encode_json_frame(2, br#"{"message":"bar"}"#));

        let frame = encode_compressed_frame(&payload).unwrap();
        assert_eq!(frame[0], PROTOCOL_VERSION);
        assert_eq!(frame[1], FRAME_TYPE_COMPRESSED);
        let length = u32::from_be_bytes(frame[2..6].try_into().unwrap()) as usize;
        assert_eq!(length, frame.len() - 6);

        let mut decompressed = Vec::new();
        ZlibDecoder::new(&frame[6..])
            .read_to_end(&mut decompressed)
            .unwrap();
        assert_eq!(decompressed, payload);

        // Split the decompressed buffer back into frames and check each one.
        let mut offset = 0;
        let mut sequences = Vec::new();
        while offset < decompressed.len() {
            assert_eq!(decompressed[offset], PROTOCOL_VERSION);
            assert_eq!(decompressed[offset + 1], FRAME_TYPE_JSON);
            let seq =
                u32::from_be_bytes(decompressed[offset + 2..offset + 6].try_into().unwrap());
            let len =
                u32::from_be_bytes(decompressed[offset + 6..offset + 10].try_into().unwrap())
                    as usize;
            sequences.push(seq);
            offset += JSON_FRAME_HEADER + len;
        }
        assert_eq!(offset, decompressed.len());
        assert_eq!(sequences, vec![1, 2]);
    }

    #[test]
    fn empty_compressed_frame_is_valid() {
        let frame = encode_compressed_frame(&[]).unwrap();
        let mut decompressed = Vec::new();
        ZlibDecoder::new(&frame[6..])
            .read_to_end(&mut decompressed)
            .unwrap();
        assert!(decompressed.is_empty());
    }

    #[test]
    fn ack_type_accepted() {
        assert!(require_ack_type(Some(FRAME_TYPE_ACK)).is_ok());
    }

    #[test]
    fn wrong_ack_type_reports_byte() {
        let err = require_ack_type(Some(0x58)).unwrap_err();
        assert_eq!(err, FrameError::UnexpectedFrame { found: 0x58 });
        assert_eq!(
            err.to_string(),
            "No ACK received or wrong frame type \"0x58\""
        );
    }

    #[test]
    fn missing_ack_type_reports_zero() {
        let err = require_ack_type(None).unwrap_err();
        assert_eq!(err, FrameError::UnexpectedFrame { found: 0 });
        assert_eq!(
            err.to_string(),
            "No ACK received or wrong frame type \"0x00\""
        );
    }

    #[test]
    fn ack_sequence_is_big_endian() {
        assert_eq!(decode_ack_sequence([0x00, 0x00, 0x00, 0x02]), 2);
        assert_eq!(decode_ack_sequence([0x01, 0x00, 0x00, 0x00]), 1 << 24);
    }
}
