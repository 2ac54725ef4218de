//! Pose record codec (encode/decode)
//!
//! Decoding is pure: one fixed 32-byte window in, one record or an error out.

use bytes::{Buf, BufMut};

use super::{Error, PROTOCOL_IDENTIFIER, PoseRecord, RECORD_SIZE, Result};

/// Encode a record to its 32-byte wire form
#[must_use]
pub fn encode(record: &PoseRecord) -> [u8; RECORD_SIZE] {
    let mut bytes = [0u8; RECORD_SIZE];
    encode_into(record, &mut &mut bytes[..]);
    bytes
}

/// Append the wire form of a record to `buf`
pub fn encode_into<B: BufMut>(record: &PoseRecord, buf: &mut B) {
    buf.put_u32_le(record.protocol_identifier());
    for value in record.position() {
        buf.put_f32_le(value);
    }
    for value in record.orientation() {
        buf.put_f32_le(value);
    }
}

/// Decode a record from a 32-byte window
///
/// The identifier is checked before any float is read. Float bit patterns,
/// including NaN and infinities, are accepted as sent.
///
/// # Errors
///
/// Returns [`Error::ProtocolViolation`] if the identifier does not match.
pub fn decode(window: &[u8; RECORD_SIZE]) -> Result<PoseRecord> {
    let mut buf = &window[..];

    let found = buf.get_u32_le();
    if found != PROTOCOL_IDENTIFIER {
        return Err(Error::ProtocolViolation { found });
    }

    let position = [buf.get_f32_le(), buf.get_f32_le(), buf.get_f32_le()];
    let orientation = [
        buf.get_f32_le(),
        buf.get_f32_le(),
        buf.get_f32_le(),
        buf.get_f32_le(),
    ];

    Ok(PoseRecord::new(position, orientation))
}

/// Decode the first record of an arbitrary slice
///
/// # Errors
///
/// Returns [`Error::BufferTooSmall`] for slices shorter than one record, or
/// any error from [`decode`].
pub fn decode_slice(bytes: &[u8]) -> Result<PoseRecord> {
    let window: &[u8; RECORD_SIZE] = bytes
        .get(..RECORD_SIZE)
        .and_then(|head| head.try_into().ok())
        .ok_or(Error::BufferTooSmall {
            needed: RECORD_SIZE,
            got: bytes.len(),
        })?;
    decode(window)
}
