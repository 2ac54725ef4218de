//! Per-frame stage pose composition.
//!
//! Streamed poses are relative to a calibration pose reported once by the
//! camera device. The composer waits for that calibration, caches it, and on
//! every frame tick expresses the latest streamed pose in stage space.

use tracing::debug;

use crate::pose::{CoordinateConvention, Pose};
use crate::sink::PoseSink;

/// Provider of the device's calibrated camera pose.
pub trait CalibrationSource {
    /// The calibration pose, or `None` while the device is not ready yet.
    fn calibration_pose(&mut self) -> Option<Pose>;
}

impl<F> CalibrationSource for F
where
    F: FnMut() -> Option<Pose>,
{
    fn calibration_pose(&mut self) -> Option<Pose> {
        self()
    }
}

/// Combines the cached calibration pose with the latest streamed pose.
#[derive(Debug)]
pub struct StagePoseComposer<S> {
    source: S,
    calibration: Option<Pose>,
    convention: CoordinateConvention,
}

impl<S: CalibrationSource> StagePoseComposer<S> {
    /// Create a composer using [`CoordinateConvention::FlipZ`].
    pub fn new(source: S) -> Self {
        Self {
            source,
            calibration: None,
            convention: CoordinateConvention::default(),
        }
    }

    /// Use a different coordinate convention for streamed poses.
    #[must_use]
    pub fn with_convention(mut self, convention: CoordinateConvention) -> Self {
        self.convention = convention;
        self
    }

    /// Cached calibration pose, if the device has reported one.
    #[must_use]
    pub fn calibration(&self) -> Option<Pose> {
        self.calibration
    }

    /// Compute this frame's stage pose.
    ///
    /// Returns `None` until the calibration source is ready. Before any pose
    /// has been streamed the calibration pose itself is returned.
    pub fn tick(&mut self, sink: &PoseSink) -> Option<Pose> {
        if self.calibration.is_none() {
            self.calibration = self.source.calibration_pose();
            if let Some(calibration) = self.calibration {
                debug!(position = ?calibration.position, "calibration pose cached");
            }
        }

        let calibration = self.calibration?;
        let streamed = sink
            .read()
            .map_or(Pose::IDENTITY, |pose| self.convention.apply(pose));
        Some(calibration * streamed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_waits_for_calibration_and_caches_it() {
        let mut polls = 0;
        let calibration = Pose::new(Vec3::new(0.0, 1.5, 0.0), Quat::IDENTITY);
        let mut composer = StagePoseComposer::new(|| {
            polls += 1;
            (polls >= 3).then_some(calibration)
        });
        let sink = PoseSink::new();

        assert_eq!(composer.tick(&sink), None);
        assert_eq!(composer.tick(&sink), None);
        assert!(composer.tick(&sink).is_some());
        assert!(composer.tick(&sink).is_some());
        assert_eq!(composer.calibration(), Some(calibration));
        drop(composer);
        assert_eq!(polls, 3);
    }

    #[test]
    fn test_streamed_pose_is_relative_to_calibration() {
        let calibration = Pose::new(Vec3::new(1.0, 0.0, 0.0), Quat::from_rotation_y(FRAC_PI_2));
        let mut composer = StagePoseComposer::new(|| Some(calibration))
            .with_convention(CoordinateConvention::AsReceived);
        let sink = PoseSink::new();

        assert_eq!(composer.tick(&sink), Some(calibration));

        sink.write(Pose::new(Vec3::Z, Quat::IDENTITY));
        let stage = composer.tick(&sink).unwrap();
        assert!((stage.position - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_calibration_returned_before_first_pose() {
        let calibration = Pose::new(Vec3::new(0.0, 1.6, 0.0), Quat::from_rotation_y(0.5));
        let mut composer = StagePoseComposer::new(|| Some(calibration));
        let sink = PoseSink::new();

        assert_eq!(composer.tick(&sink), Some(calibration));
        assert_eq!(composer.tick(&sink), Some(calibration));
    }

    #[test]
    fn test_default_convention_flips_streamed_pose() {
        let mut composer = StagePoseComposer::new(|| Some(Pose::IDENTITY));
        let sink = PoseSink::new();
        sink.write(Pose::new(Vec3::new(1.0, 2.0, 3.0), Quat::IDENTITY));

        let stage = composer.tick(&sink).unwrap();
        assert_eq!(stage.position, Vec3::new(1.0, 2.0, -3.0));
    }
}
