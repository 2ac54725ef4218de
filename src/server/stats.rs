use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};

use super::ConnectionState;

/// Counters for one pose server, shared between its thread and handles.
#[derive(Clone, Debug, Default)]
pub struct ServerStats {
    inner: Arc<StatsInner>,
}

#[derive(Debug, Default)]
struct StatsInner {
    connections_accepted: AtomicU64,
    connections_closed: AtomicU64,
    connections_faulted: AtomicU64,
    records_decoded: AtomicU64,
    bytes_received: AtomicU64,
    protocol_violations: AtomicU64,
    buffer_overflows: AtomicU64,
    io_errors: AtomicU64,
    accept_errors: AtomicU64,
    state: AtomicU8,
}

/// Why a connection was torn down, for counting.
#[derive(Clone, Copy)]
pub(crate) enum FaultKind {
    ProtocolViolation,
    BufferOverflow,
    Io,
}

impl ServerStats {
    /// Create zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn record_accept(&self) {
        self.inner.connections_accepted.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_accept_error(&self) {
        self.inner.accept_errors.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_bytes(&self, count: usize) {
        self.inner
            .bytes_received
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_decoded(&self) {
        self.inner.records_decoded.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_closed(&self) {
        self.inner.connections_closed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_fault(&self, kind: FaultKind) {
        self.inner.connections_faulted.fetch_add(1, Ordering::Relaxed);
        let counter = match kind {
            FaultKind::ProtocolViolation => &self.inner.protocol_violations,
            FaultKind::BufferOverflow => &self.inner.buffer_overflows,
            FaultKind::Io => &self.inner.io_errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn set_state(&self, state: ConnectionState) {
        self.inner.state.store(state as u8, Ordering::Release);
    }

    /// Current connection state of the server thread.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.inner.state.load(Ordering::Acquire))
    }

    /// Copy all counters.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        let inner = &self.inner;
        StatsSnapshot {
            connections_accepted: inner.connections_accepted.load(Ordering::Relaxed),
            connections_closed: inner.connections_closed.load(Ordering::Relaxed),
            connections_faulted: inner.connections_faulted.load(Ordering::Relaxed),
            records_decoded: inner.records_decoded.load(Ordering::Relaxed),
            bytes_received: inner.bytes_received.load(Ordering::Relaxed),
            protocol_violations: inner.protocol_violations.load(Ordering::Relaxed),
            buffer_overflows: inner.buffer_overflows.load(Ordering::Relaxed),
            io_errors: inner.io_errors.load(Ordering::Relaxed),
            accept_errors: inner.accept_errors.load(Ordering::Relaxed),
        }
    }
}

/// Lightweight snapshot of server counters.
#[allow(missing_docs)]
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatsSnapshot {
    pub connections_accepted: u64,
    pub connections_closed: u64,
    pub connections_faulted: u64,
    pub records_decoded: u64,
    pub bytes_received: u64,
    pub protocol_violations: u64,
    pub buffer_overflows: u64,
    pub io_errors: u64,
    pub accept_errors: u64,
}
