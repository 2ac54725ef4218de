//! posewire - streaming camera pose receiver
//!
//! A sender (for example a phone tracking its own camera) streams fixed-size
//! pose records over TCP. This crate reassembles those records from arbitrary
//! chunked reads, validates them, and keeps the most recent pose available for
//! a render loop that samples it once per frame.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use posewire::{PoseServer, PoseSink, ServerConfig};
//!
//! let sink = PoseSink::new();
//! let server = PoseServer::new(ServerConfig::default(), sink.clone()).spawn()?;
//!
//! // Once per frame:
//! if let Some(pose) = sink.read() {
//!     println!("camera at {:?}", pose.position);
//! }
//!
//! server.shutdown();
//! # Ok::<(), posewire::Error>(())
//! ```
//!
//! # Wire format
//!
//! Each record is 32 little-endian bytes: the identifier `13371337` as a `u32`,
//! then position `x, y, z` and orientation `x, y, z, w` as `f32`. Records are
//! concatenated with no delimiter. A record with any other identifier ends the
//! connection; the server keeps listening for the next sender.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod pose;
pub mod protocol;
pub mod reassembler;
pub mod rig;
pub mod server;
pub mod sink;

pub use pose::{CoordinateConvention, Pose};
pub use protocol::{Error, PROTOCOL_IDENTIFIER, PoseRecord, RECORD_SIZE, Result};
pub use reassembler::{Records, StreamReassembler};
pub use rig::{CalibrationSource, StagePoseComposer};
pub use server::{ConnectionState, PoseServer, ServerConfig, ServerHandle, StatsSnapshot};
pub use sink::PoseSink;

/// Default TCP port senders connect to
pub const DEFAULT_PORT: u16 = 1337;
