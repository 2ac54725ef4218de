//! TCP pose server
//!
//! A single background thread accepts one sender at a time, reassembles its
//! byte stream into records, and publishes each pose to a [`PoseSink`].
//!
//! [`PoseSink`]: crate::PoseSink

mod config;
mod connection;
mod listener;
mod stats;

pub use config::ServerConfig;
pub use connection::{ConnectionOutcome, ConnectionState, pump};
pub use listener::{PoseServer, ServerHandle};
pub use stats::{ServerStats, StatsSnapshot};
