use glam::{DQuat, DVec3, EulerRot};
use serde::{Deserialize, Serialize};

/// Pose in the simulation convention (+X forward, +Y left, +Z up).
///
/// `angular` holds roll, pitch, yaw in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub linear: DVec3,
    pub angular: DVec3,
}

impl Pose {
    pub fn new(linear: DVec3, angular: DVec3) -> Self {
        Self { linear, angular }
    }
}

/// Pose in the renderer convention (+X right, -Y forward, +Z up).
///
/// `hpr_deg` holds heading, pitch, roll in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RenderPose {
    pub position: DVec3,
    pub hpr_deg: DVec3,
}

impl RenderPose {
    pub fn new(position: DVec3, hpr_deg: DVec3) -> Self {
        Self { position, hpr_deg }
    }

    /// Orientation as a quaternion: heading about Z, then pitch about X,
    /// then roll about Y.
    pub fn rotation(&self) -> DQuat {
        DQuat::from_euler(
            EulerRot::ZXY,
            self.hpr_deg.x.to_radians(),
            self.hpr_deg.y.to_radians(),
            self.hpr_deg.z.to_radians(),
        )
    }
}
