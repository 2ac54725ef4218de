//! Double-buffer record reassembly for chunked stream reads.
//!
//! Bytes arrive in arbitrary chunks. Complete records are decoded from the
//! front of the active buffer; whatever is left behind is copied to the start
//! of the other buffer, which then becomes active. Copies never overlap.

use std::io::Read;
use std::iter::FusedIterator;

use tracing::trace;

use crate::protocol::{DEFAULT_BUFFER_CAPACITY, Error, PoseRecord, RECORD_SIZE, Result, decode};

/// Turns a chunked byte stream into whole [`PoseRecord`]s.
///
/// Create one per connection. After a protocol violation the reassembler is
/// faulted and rejects input until [`reset`](Self::reset).
#[derive(Debug)]
pub struct StreamReassembler {
    buffers: [Box<[u8]>; 2],
    active: usize,
    /// Offset of the first unconsumed byte; non-zero only while draining.
    start: usize,
    pending: usize,
    faulted: bool,
}

impl StreamReassembler {
    /// Create a reassembler with [`DEFAULT_BUFFER_CAPACITY`] per buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY)
    }

    /// Create a reassembler with `capacity` bytes per buffer.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` cannot hold a single record.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(
            capacity >= RECORD_SIZE,
            "capacity must hold at least one record"
        );

        Self {
            buffers: [
                vec![0u8; capacity].into_boxed_slice(),
                vec![0u8; capacity].into_boxed_slice(),
            ],
            active: 0,
            start: 0,
            pending: 0,
            faulted: false,
        }
    }

    /// Capacity of each buffer in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buffers[0].len()
    }

    /// Bytes received but not yet part of a complete record.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.buffers[self.active][self.start..self.start + self.pending]
    }

    /// Number of pending bytes.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending
    }

    /// Whether a protocol violation has been seen since the last reset.
    #[must_use]
    pub fn is_faulted(&self) -> bool {
        self.faulted
    }

    /// Discard pending bytes and clear the fault.
    pub fn reset(&mut self) {
        self.active = 0;
        self.start = 0;
        self.pending = 0;
        self.faulted = false;
    }

    /// Append `bytes` and return the records they complete.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Faulted`] after a protocol violation, or
    /// [`Error::BufferOverflow`] if the bytes do not fit; in that case nothing
    /// is appended. Invalid records surface as `Err` items of the iterator.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Records<'_>> {
        self.ensure_healthy()?;
        self.compact();

        let capacity = self.capacity();
        if self.pending + bytes.len() > capacity {
            return Err(Error::BufferOverflow {
                pending: self.pending,
                incoming: bytes.len(),
                capacity,
            });
        }

        let end = self.pending + bytes.len();
        self.buffers[self.active][self.pending..end].copy_from_slice(bytes);
        self.pending = end;

        Ok(self.drain())
    }

    /// Read once from `reader` straight into the spare capacity of the active
    /// buffer. Follow with [`drain`](Self::drain).
    ///
    /// Returns the number of bytes read; `0` means the reader reached its end.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Faulted`] after a protocol violation,
    /// [`Error::BufferOverflow`] if there is no spare capacity left, and
    /// [`Error::Io`] for read failures.
    pub fn fill_from<R: Read + ?Sized>(&mut self, reader: &mut R) -> Result<usize> {
        self.ensure_healthy()?;
        self.compact();

        let capacity = self.capacity();
        if self.pending == capacity {
            return Err(Error::BufferOverflow {
                pending: self.pending,
                incoming: 0,
                capacity,
            });
        }

        let read = reader.read(&mut self.buffers[self.active][self.pending..])?;
        self.pending += read;
        Ok(read)
    }

    /// Iterate over the complete records currently buffered.
    pub fn drain(&mut self) -> Records<'_> {
        Records { reassembler: self }
    }

    fn ensure_healthy(&self) -> Result<()> {
        if self.faulted {
            return Err(Error::Faulted);
        }
        Ok(())
    }

    fn next_record(&mut self) -> Option<Result<PoseRecord>> {
        if self.faulted || self.pending < RECORD_SIZE {
            return None;
        }

        let window = self.buffers[self.active][self.start..].first_chunk::<RECORD_SIZE>()?;
        match decode(window) {
            Ok(record) => {
                self.start += RECORD_SIZE;
                self.pending -= RECORD_SIZE;
                trace!(pending = self.pending, "record reassembled");
                Some(Ok(record))
            }
            Err(err) => {
                self.faulted = true;
                Some(Err(err))
            }
        }
    }

    /// Move the unconsumed tail to the start of the other buffer.
    fn compact(&mut self) {
        if self.start == 0 {
            return;
        }

        let [first, second] = &mut self.buffers;
        let (current, other) = if self.active == 0 {
            (first, second)
        } else {
            (second, first)
        };
        other[..self.pending].copy_from_slice(&current[self.start..self.start + self.pending]);

        self.active = 1 - self.active;
        self.start = 0;
    }
}

impl Default for StreamReassembler {
    fn default() -> Self {
        Self::new()
    }
}

/// Records completed by the bytes fed so far, in receipt order.
///
/// Yields at most one `Err`, after which the reassembler is faulted and the
/// iterator ends. Dropping it early keeps the remaining records buffered for
/// the next drain.
#[derive(Debug)]
pub struct Records<'a> {
    reassembler: &'a mut StreamReassembler,
}

impl Iterator for Records<'_> {
    type Item = Result<PoseRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reassembler.next_record()
    }
}

impl FusedIterator for Records<'_> {}

impl Drop for Records<'_> {
    fn drop(&mut self) {
        self.reassembler.compact();
    }
}
