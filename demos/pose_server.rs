//! Pose server printing the stage pose at roughly 30 frames per second.
//!
//! ```text
//! RUST_LOG=posewire=debug cargo run --example pose_server
//! ```

use std::thread;
use std::time::Duration;

use glam::{Quat, Vec3};
use posewire::{Pose, PoseServer, PoseSink, ServerConfig, StagePoseComposer};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let sink = PoseSink::new();
    let server = PoseServer::new(ServerConfig::default(), sink.clone()).spawn()?;
    println!("Listening on {}", server.local_addr());

    // Stand-in for the headset's calibrated camera extrinsics.
    let calibration = Pose::new(Vec3::new(0.0, 1.6, 0.0), Quat::IDENTITY);
    let mut composer = StagePoseComposer::new(|| Some(calibration));

    let mut last_update = 0;
    loop {
        if let Some(stage) = composer.tick(&sink) {
            let updates = sink.updates();
            if updates != last_update {
                println!(
                    "#{updates:>6} position={:?} orientation={:?}",
                    stage.position, stage.orientation
                );
                last_update = updates;
            }
        }
        thread::sleep(Duration::from_millis(33));
    }
}
