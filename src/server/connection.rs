//! Per-connection state machine: read, reassemble, publish.

use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::protocol::Error;
use crate::reassembler::StreamReassembler;
use crate::sink::PoseSink;

use super::stats::{FaultKind, ServerStats};

/// Where the server thread is in its accept/serve cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ConnectionState {
    /// Not bound yet, or the server thread has exited
    Stopped = 0,
    /// Bound and waiting for a client
    Listening = 1,
    /// Serving a client
    Connected = 2,
    /// Client closed the stream cleanly
    Closed = 3,
    /// Connection dropped after a protocol, buffer or I/O fault
    Faulted = 4,
}

impl ConnectionState {
    pub(crate) const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Listening,
            2 => Self::Connected,
            3 => Self::Closed,
            4 => Self::Faulted,
            _ => Self::Stopped,
        }
    }
}

/// How a served connection ended.
#[derive(Debug)]
pub enum ConnectionOutcome {
    /// Peer closed the stream (zero-length read)
    Closed,
    /// Protocol violation, buffer overflow or read failure
    Faulted(Error),
    /// Server shutdown was requested
    Cancelled,
}

impl ConnectionOutcome {
    /// State the connection ends in.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        match self {
            Self::Closed => ConnectionState::Closed,
            Self::Faulted(_) => ConnectionState::Faulted,
            Self::Cancelled => ConnectionState::Stopped,
        }
    }

    pub(crate) fn record(&self, stats: &ServerStats) {
        match self {
            Self::Closed => stats.record_closed(),
            Self::Faulted(err) => stats.record_fault(match err {
                // A short decode window is a framing error, not a full buffer.
                Error::ProtocolViolation { .. } | Error::Faulted | Error::BufferTooSmall { .. } => {
                    FaultKind::ProtocolViolation
                }
                Error::BufferOverflow { .. } => FaultKind::BufferOverflow,
                Error::Io(_) => FaultKind::Io,
            }),
            Self::Cancelled => {}
        }
    }
}

/// Pump bytes from `reader` into `sink` until the stream ends, faults, or
/// `cancel` is set.
///
/// Every complete record is written to the sink as soon as its last byte has
/// been read. Read timeouts and interruptions are not faults; they only give
/// the loop a chance to observe `cancel`.
pub fn pump<R: Read + ?Sized>(
    reader: &mut R,
    reassembler: &mut StreamReassembler,
    sink: &PoseSink,
    stats: &ServerStats,
    cancel: &AtomicBool,
) -> ConnectionOutcome {
    loop {
        if cancel.load(Ordering::Acquire) {
            return ConnectionOutcome::Cancelled;
        }

        match reassembler.fill_from(reader) {
            Ok(0) => return ConnectionOutcome::Closed,
            Ok(read) => {
                stats.record_bytes(read);
                for item in reassembler.drain() {
                    match item {
                        Ok(record) => {
                            sink.write(record.to_pose());
                            stats.record_decoded();
                        }
                        Err(err) => return ConnectionOutcome::Faulted(err),
                    }
                }
            }
            Err(Error::Io(err)) if is_transient(&err) => {}
            Err(err) => return ConnectionOutcome::Faulted(err),
        }
    }
}

fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{PoseRecord, encode};
    use glam::Vec3;
    use std::collections::VecDeque;

    /// Reader that returns pre-arranged chunks, then EOF.
    struct Chunks(VecDeque<io::Result<Vec<u8>>>);

    impl Read for Chunks {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.pop_front() {
                None => Ok(0),
                Some(Err(err)) => Err(err),
                Some(Ok(mut chunk)) => {
                    let take = chunk.len().min(buf.len());
                    buf[..take].copy_from_slice(&chunk[..take]);
                    if take < chunk.len() {
                        self.0.push_front(Ok(chunk.split_off(take)));
                    }
                    Ok(take)
                }
            }
        }
    }

    fn record(x: f32) -> PoseRecord {
        PoseRecord::new([x, 0.0, 0.0], [0.0, 0.0, 0.0, 1.0])
    }

    fn run(chunks: Vec<io::Result<Vec<u8>>>) -> (ConnectionOutcome, PoseSink, ServerStats) {
        let sink = PoseSink::new();
        let stats = ServerStats::new();
        let mut reader = Chunks(chunks.into());
        let mut reassembler = StreamReassembler::new();
        let outcome = pump(
            &mut reader,
            &mut reassembler,
            &sink,
            &stats,
            &AtomicBool::new(false),
        );
        (outcome, sink, stats)
    }

    #[test]
    fn test_clean_close_publishes_latest() {
        let first = encode(&record(1.0));
        let second = encode(&record(2.0));
        let (outcome, sink, stats) = run(vec![
            Ok(first[..20].to_vec()),
            Ok([&first[20..], &second[..5]].concat()),
            Ok(second[5..].to_vec()),
        ]);

        assert!(matches!(outcome, ConnectionOutcome::Closed));
        assert_eq!(sink.read().map(|p| p.position), Some(Vec3::new(2.0, 0.0, 0.0)));
        assert_eq!(sink.updates(), 2);
        assert_eq!(stats.snapshot().records_decoded, 2);
        assert_eq!(stats.snapshot().bytes_received, 64);
    }

    #[test]
    fn test_violation_faults_and_keeps_last_good_pose() {
        let good = encode(&record(5.0));
        let mut bad = encode(&record(6.0));
        bad[0] ^= 0x01;
        let (outcome, sink, _) = run(vec![Ok([good, bad, good].concat())]);

        assert!(matches!(
            outcome,
            ConnectionOutcome::Faulted(Error::ProtocolViolation { .. })
        ));
        assert_eq!(sink.read().map(|p| p.position.x), Some(5.0));
        assert_eq!(sink.updates(), 1);
    }

    #[test]
    fn test_timeouts_are_not_faults() {
        let bytes = encode(&record(3.0));
        let (outcome, sink, _) = run(vec![
            Err(io::Error::from(io::ErrorKind::WouldBlock)),
            Ok(bytes[..10].to_vec()),
            Err(io::Error::from(io::ErrorKind::TimedOut)),
            Ok(bytes[10..].to_vec()),
        ]);

        assert!(matches!(outcome, ConnectionOutcome::Closed));
        assert_eq!(sink.read().map(|p| p.position.x), Some(3.0));
    }

    #[test]
    fn test_reset_is_fault() {
        let (outcome, sink, stats) =
            run(vec![Err(io::Error::from(io::ErrorKind::ConnectionReset))]);

        assert!(matches!(outcome, ConnectionOutcome::Faulted(Error::Io(_))));
        assert_eq!(sink.read(), None);

        outcome.record(&stats);
        assert_eq!(stats.snapshot().io_errors, 1);
    }

    #[test]
    fn test_faults_counted_by_kind() {
        let stats = ServerStats::new();
        for err in [
            Error::BufferTooSmall { needed: 32, got: 8 },
            Error::BufferOverflow {
                pending: 32,
                incoming: 0,
                capacity: 32,
            },
            Error::Faulted,
        ] {
            ConnectionOutcome::Faulted(err).record(&stats);
        }

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.connections_faulted, 3);
        assert_eq!(snapshot.protocol_violations, 2);
        assert_eq!(snapshot.buffer_overflows, 1);
        assert_eq!(snapshot.io_errors, 0);
    }

    #[test]
    fn test_cancel_before_read() {
        let sink = PoseSink::new();
        let mut reader = Chunks(vec![Ok(encode(&record(1.0)).to_vec())].into());
        let outcome = pump(
            &mut reader,
            &mut StreamReassembler::new(),
            &sink,
            &ServerStats::new(),
            &AtomicBool::new(true),
        );

        assert!(matches!(outcome, ConnectionOutcome::Cancelled));
        assert_eq!(sink.read(), None);
    }
}
