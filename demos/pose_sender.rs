//! Streams a camera orbiting the origin to a pose server.
//!
//! ```text
//! cargo run --example pose_sender -- 127.0.0.1:1337
//! ```

use std::io::Write;
use std::net::TcpStream;
use std::thread;
use std::time::Duration;

use bytes::BytesMut;
use glam::{Quat, Vec3};
use posewire::protocol::encode_into;
use posewire::{DEFAULT_PORT, Pose, PoseRecord, RECORD_SIZE};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| format!("127.0.0.1:{DEFAULT_PORT}"));
    let mut stream = TcpStream::connect(&addr)?;
    stream.set_nodelay(true)?;
    println!("Connected to {addr}");

    let mut buf = BytesMut::with_capacity(RECORD_SIZE);
    for frame in 0u16..600 {
        let angle = f32::from(frame) * 0.02;
        let pose = Pose::new(
            Vec3::new(angle.cos(), 0.0, angle.sin()) * 2.0,
            Quat::from_rotation_y(-angle),
        );

        encode_into(&PoseRecord::from_pose(&pose), &mut buf);
        stream.write_all(&buf.split())?;
        thread::sleep(Duration::from_millis(16));
    }

    println!("Sent 600 poses");
    Ok(())
}
