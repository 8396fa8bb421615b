//! Conversion between the simulation pose and the render pose.
//!
//! Position: render = (-sim.y, sim.x, sim.z).
//! Orientation: heading = -pitch, pitch = roll, roll = yaw, radians to degrees.

use crate::types::{Pose, RenderPose};
use glam::DVec3;

pub fn to_render_pose(pose: &Pose) -> RenderPose {
    let l = pose.linear;
    let a = pose.angular;
    RenderPose {
        position: DVec3::new(-l.y, l.x, l.z),
        hpr_deg: DVec3::new(-a.y.to_degrees(), a.x.to_degrees(), a.z.to_degrees()),
    }
}

/// Exact inverse of [`to_render_pose`].
pub fn to_sim_pose(position: DVec3, hpr_deg: DVec3) -> Pose {
    Pose {
        linear: DVec3::new(position.y, -position.x, position.z),
        angular: DVec3::new(
            hpr_deg.y.to_radians(),
            -hpr_deg.x.to_radians(),
            hpr_deg.z.to_radians(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn assert_close(a: DVec3, b: DVec3) {
        assert!(a.abs_diff_eq(b, 1e-6), "{a:?} != {b:?}");
    }

    #[test]
    fn known_pose_maps_component_wise() {
        let pose = Pose::new(DVec3::new(1.0, 2.0, 3.0), DVec3::new(0.1, 0.2, 0.3));
        let rp = to_render_pose(&pose);
        assert_eq!(rp.position, DVec3::new(-2.0, 1.0, 3.0));
        assert_close(
            rp.hpr_deg,
            DVec3::new(-0.2 * 180.0 / PI, 0.1 * 180.0 / PI, 0.3 * 180.0 / PI),
        );
    }

    #[test]
    fn round_trip_reproduces_sim_pose() {
        let samples = [
            Pose::default(),
            Pose::new(DVec3::new(1.0, 2.0, 3.0), DVec3::new(0.1, 0.2, 0.3)),
            Pose::new(DVec3::new(-40.5, 1e-3, 120.0), DVec3::new(-PI, PI / 2.0, 7.0)),
            Pose::new(DVec3::new(1e6, -1e6, -0.25), DVec3::new(-12.0, 0.0, -0.001)),
        ];
        for p in samples {
            let rp = to_render_pose(&p);
            let back = to_sim_pose(rp.position, rp.hpr_deg);
            assert_close(back.linear, p.linear);
            assert_close(back.angular, p.angular);
        }
    }

    #[test]
    fn render_round_trip_reproduces_render_pose() {
        let position = DVec3::new(0.5, -1.5, 2.0);
        let hpr = DVec3::new(180.0, -30.0, 45.0);
        let rp = to_render_pose(&to_sim_pose(position, hpr));
        assert_close(rp.position, position);
        assert_close(rp.hpr_deg, hpr);
    }

    #[test]
    fn position_axes_swap_with_one_negation() {
        // Sim +X (forward) lands on render +Y.
        let rp = to_render_pose(&Pose::new(DVec3::X, DVec3::ZERO));
        assert_eq!(rp.position, DVec3::Y);
        // Sim +Y (left) lands on render -X.
        let rp = to_render_pose(&Pose::new(DVec3::Y, DVec3::ZERO));
        assert_eq!(rp.position, DVec3::new(-1.0, 0.0, 0.0));
    }
}
