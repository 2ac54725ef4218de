//! Pose stream error types

use thiserror::Error;

/// Pose stream errors
#[derive(Error, Debug)]
pub enum Error {
    /// Record did not start with the protocol identifier
    #[error("protocol violation: expected identifier 13371337, got {found}")]
    ProtocolViolation {
        /// Identifier found on the wire
        found: u32,
    },

    /// Unconsumed bytes would exceed the reassembly buffer
    #[error("buffer overflow: {pending} pending + {incoming} incoming exceeds {capacity} bytes")]
    BufferOverflow {
        /// Bytes already waiting in the buffer
        pending: usize,
        /// Bytes offered by the caller
        incoming: usize,
        /// Buffer capacity
        capacity: usize,
    },

    /// Buffer too small
    #[error("buffer too small: need {needed} bytes, got {got}")]
    BufferTooSmall {
        /// Needed size
        needed: usize,
        /// Actual size
        got: usize,
    },

    /// Reassembler was fed after a protocol violation
    #[error("reassembler faulted by an earlier protocol violation")]
    Faulted,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
