//! Background TCP listener serving one pose sender at a time.

use std::io;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, info_span, instrument, warn};
use uuid::Uuid;

use crate::protocol::{Error, Result};
use crate::reassembler::StreamReassembler;
use crate::sink::PoseSink;

use super::config::ServerConfig;
use super::connection::{ConnectionOutcome, ConnectionState, pump};
use super::stats::ServerStats;

/// Pose server builder: owns the configuration and the sink it publishes to.
#[derive(Debug)]
pub struct PoseServer {
    config: ServerConfig,
    sink: PoseSink,
    stats: ServerStats,
}

impl PoseServer {
    /// Create a server that publishes decoded poses into `sink`.
    #[must_use]
    pub fn new(config: ServerConfig, sink: PoseSink) -> Self {
        Self {
            config,
            sink,
            stats: ServerStats::new(),
        }
    }

    /// Counters for this server.
    #[must_use]
    pub fn stats(&self) -> &ServerStats {
        &self.stats
    }

    /// Bind the listener and start serving on a background thread.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the address cannot be bound or the thread
    /// cannot be spawned.
    #[instrument(level = "info", skip_all, fields(bind_addr = %self.config.bind_addr))]
    pub fn spawn(self) -> Result<ServerHandle> {
        let listener = TcpListener::bind(self.config.bind_addr)?;
        listener.set_nonblocking(true)?;
        let local_addr = listener.local_addr()?;
        self.stats.set_state(ConnectionState::Listening);

        let shutdown = Arc::new(AtomicBool::new(false));
        let stats = self.stats.clone();
        let thread = {
            let shutdown = Arc::clone(&shutdown);
            thread::Builder::new()
                .name("posewire-server".into())
                .spawn(move || self.run(&listener, &shutdown))?
        };

        info!(%local_addr, "pose server listening");
        Ok(ServerHandle {
            local_addr,
            shutdown,
            stats,
            thread: Some(thread),
        })
    }

    fn run(self, listener: &TcpListener, shutdown: &AtomicBool) {
        let mut reassembler = StreamReassembler::with_capacity(self.config.buffer_capacity);

        while !shutdown.load(Ordering::Acquire) {
            match listener.accept() {
                Ok((stream, peer)) => {
                    self.serve(stream, peer, &mut reassembler, shutdown);
                    self.stats.set_state(ConnectionState::Listening);
                }
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(self.config.poll_interval);
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => {
                    warn!(error = %err, "accept failed");
                    self.stats.record_accept_error();
                    thread::sleep(self.config.poll_interval);
                }
            }
        }

        self.stats.set_state(ConnectionState::Stopped);
        debug!("pose server stopped");
    }

    fn serve(
        &self,
        mut stream: TcpStream,
        peer: SocketAddr,
        reassembler: &mut StreamReassembler,
        shutdown: &AtomicBool,
    ) {
        let id = Uuid::new_v4();
        let span = info_span!("connection", %id, %peer);
        let _entered = span.enter();

        self.stats.record_accept();
        self.stats.set_state(ConnectionState::Connected);
        reassembler.reset();
        info!("sender connected");

        let outcome = match self.prepare(&stream) {
            Ok(()) => pump(&mut stream, reassembler, &self.sink, &self.stats, shutdown),
            Err(err) => ConnectionOutcome::Faulted(Error::Io(err)),
        };

        match &outcome {
            ConnectionOutcome::Closed => info!("sender closed the stream"),
            ConnectionOutcome::Faulted(err @ Error::ProtocolViolation { .. }) => {
                warn!(error = %err, "header mismatch, dropping sender");
            }
            ConnectionOutcome::Faulted(err) => warn!(error = %err, "dropping sender"),
            ConnectionOutcome::Cancelled => debug!("connection abandoned for shutdown"),
        }
        outcome.record(&self.stats);
        self.stats.set_state(outcome.state());

        if let Err(err) = stream.shutdown(Shutdown::Both) {
            debug!(error = %err, "socket already closed");
        }
        debug!(
            pending = reassembler.pending_len(),
            decoded = self.sink.updates(),
            "connection torn down"
        );
    }

    /// Blocking reads with a timeout, so shutdown is noticed while idle.
    fn prepare(&self, stream: &TcpStream) -> io::Result<()> {
        stream.set_nonblocking(false)?;
        stream.set_read_timeout(Some(self.config.poll_interval))
    }
}

/// Handle to a running pose server. Dropping it shuts the server down.
#[derive(Debug)]
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    stats: ServerStats,
    thread: Option<JoinHandle<()>>,
}

impl ServerHandle {
    /// Address the listener is bound to.
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Counters for this server.
    #[must_use]
    pub fn stats(&self) -> &ServerStats {
        &self.stats
    }

    /// Whether the server thread has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Stop accepting, close the active connection, and wait for the thread.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("pose server thread panicked");
            }
        }
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::time::Duration;

    fn local_config() -> ServerConfig {
        ServerConfig::default()
            .with_bind_addr(SocketAddr::from((Ipv4Addr::LOCALHOST, 0)))
            .with_poll_interval(Duration::from_millis(5))
    }

    #[test]
    fn test_spawn_binds_ephemeral_port() {
        let handle = PoseServer::new(local_config(), PoseSink::new())
            .spawn()
            .unwrap();

        assert_ne!(handle.local_addr().port(), 0);
        assert!(!handle.is_finished());
        handle.shutdown();
    }

    #[test]
    fn test_bind_conflict_is_error() {
        let first = PoseServer::new(local_config(), PoseSink::new())
            .spawn()
            .unwrap();
        let taken = local_config().with_bind_addr(first.local_addr());

        let result = PoseServer::new(taken, PoseSink::new()).spawn();
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_stats_shared_with_handle() {
        let server = PoseServer::new(local_config(), PoseSink::new());
        let stats = server.stats().clone();
        assert_eq!(stats.state(), ConnectionState::Stopped);

        let handle = server.spawn().unwrap();
        assert_eq!(stats.state(), ConnectionState::Listening);

        drop(handle);
        assert_eq!(stats.state(), ConnectionState::Stopped);
    }
}
