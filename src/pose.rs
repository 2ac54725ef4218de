//! Rigid camera pose and the conversions applied to streamed poses.

use std::ops::Mul;

use glam::{Quat, Vec3};

/// Position plus orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pose {
    /// Translation
    pub position: Vec3,
    /// Rotation quaternion
    pub orientation: Quat,
}

impl Pose {
    /// No translation, no rotation.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        orientation: Quat::IDENTITY,
    };

    /// Create a pose from its parts
    #[must_use]
    pub const fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Mirror the pose across the XY plane.
    ///
    /// Converts between right-handed senders and a left-handed scene by
    /// negating `position.z`, `orientation.z` and `orientation.w`.
    #[must_use]
    pub fn flip_z(self) -> Self {
        let [x, y, z, w] = self.orientation.to_array();
        Self {
            position: Vec3::new(self.position.x, self.position.y, -self.position.z),
            orientation: Quat::from_xyzw(x, y, -z, -w),
        }
    }

    /// Map a point from this pose's local frame into its parent frame
    #[must_use]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.orientation * point
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// `parent * child` expresses `child` (relative to `parent`) in the parent's frame.
impl Mul for Pose {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self {
            position: self.transform_point(rhs.position),
            orientation: self.orientation * rhs.orientation,
        }
    }
}

/// How streamed poses map into the consumer's coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CoordinateConvention {
    /// Sender is right-handed; mirror Z before use.
    #[default]
    FlipZ,
    /// Use poses exactly as received.
    AsReceived,
}

impl CoordinateConvention {
    /// Apply the convention to a streamed pose
    #[must_use]
    pub fn apply(self, pose: Pose) -> Pose {
        match self {
            Self::FlipZ => pose.flip_z(),
            Self::AsReceived => pose,
        }
    }
}
