//! Server configuration.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::DEFAULT_PORT;
use crate::protocol::{DEFAULT_BUFFER_CAPACITY, RECORD_SIZE};

/// Pose server configuration options.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServerConfig {
    /// Address the listener binds to.
    pub bind_addr: SocketAddr,
    /// Size of each reassembly buffer in bytes.
    pub buffer_capacity: usize,
    /// How often the server thread checks for shutdown while idle or
    /// blocked on a read. Does not disconnect idle peers.
    pub poll_interval: Duration,
}

impl ServerConfig {
    /// Set the bind address.
    #[must_use]
    pub fn with_bind_addr(mut self, bind_addr: SocketAddr) -> Self {
        self.bind_addr = bind_addr;
        self
    }

    /// Set the reassembly buffer size, clamped to at least one record.
    #[must_use]
    pub fn with_buffer_capacity(mut self, buffer_capacity: usize) -> Self {
        self.buffer_capacity = buffer_capacity.max(RECORD_SIZE);
        self
    }

    /// Set the shutdown polling interval, clamped to at least 1 ms.
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval.max(Duration::from_millis(1));
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            poll_interval: Duration::from_millis(50),
        }
    }
}
