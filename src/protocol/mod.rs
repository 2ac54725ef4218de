//! Pose record wire format
//!
//! This module provides the fixed-size record layout, its codec, and the error
//! type shared by the rest of the crate.

mod codec;
mod error;
mod record;

pub use codec::{decode, decode_slice, encode, encode_into};
pub use error::{Error, Result};
pub use record::PoseRecord;

/// Protocol identifier carried in the first four bytes of every record
pub const PROTOCOL_IDENTIFIER: u32 = 13_371_337;

/// Size of one record on the wire: identifier plus seven `f32` fields
pub const RECORD_SIZE: usize = 4 + 7 * 4;

/// Default capacity of each reassembly buffer (one maximum network read)
pub const DEFAULT_BUFFER_CAPACITY: usize = 65_536;
