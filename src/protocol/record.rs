//! Pose record
//!
//! One record is 32 bytes with no padding and no length prefix.

use glam::{Quat, Vec3};

use super::PROTOCOL_IDENTIFIER;
use crate::pose::Pose;

/// Camera pose record as it travels on the wire.
///
/// # Wire Format
///
/// ```text
/// 0                   1                   2                   3
/// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                 Protocol Identifier (4) = 13371337            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                      Position X (f32)                         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                      Position Y (f32)                         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                      Position Z (f32)                         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                    Orientation X (f32)                        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                    Orientation Y (f32)                        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                    Orientation Z (f32)                        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                    Orientation W (f32)                        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// All fields are little-endian.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoseRecord {
    protocol_identifier: u32,
    position: [f32; 3],
    orientation: [f32; 4],
}

impl PoseRecord {
    /// Create a record stamped with the protocol identifier
    #[must_use]
    pub const fn new(position: [f32; 3], orientation: [f32; 4]) -> Self {
        Self {
            protocol_identifier: PROTOCOL_IDENTIFIER,
            position,
            orientation,
        }
    }

    /// Build a record from a typed pose
    #[must_use]
    pub fn from_pose(pose: &Pose) -> Self {
        Self::new(pose.position.to_array(), pose.orientation.to_array())
    }

    /// Get protocol identifier
    #[must_use]
    pub const fn protocol_identifier(&self) -> u32 {
        self.protocol_identifier
    }

    /// Position as `[x, y, z]`
    #[must_use]
    pub const fn position(&self) -> [f32; 3] {
        self.position
    }

    /// Orientation quaternion as `[x, y, z, w]`
    #[must_use]
    pub const fn orientation(&self) -> [f32; 4] {
        self.orientation
    }

    /// Convert to a typed pose, without any coordinate-space conversion.
    ///
    /// The quaternion is taken as sent; it is not normalized.
    #[must_use]
    pub fn to_pose(&self) -> Pose {
        let [qx, qy, qz, qw] = self.orientation;
        Pose::new(Vec3::from_array(self.position), Quat::from_xyzw(qx, qy, qz, qw))
    }
}

impl From<PoseRecord> for Pose {
    fn from(record: PoseRecord) -> Self {
        record.to_pose()
    }
}
