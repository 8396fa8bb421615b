use glam::{DVec3, Vec3};
use hakoview_common::RenderPose;

/// Ambient light plus one directional key light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightRig {
    pub ambient: [f32; 3],
    pub key_color: [f32; 3],
    /// Heading/pitch/roll of the key light, degrees. The light shines along
    /// its local +Y.
    pub key_hpr: DVec3,
    enabled: bool,
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            ambient: [0.4, 0.4, 0.45],
            key_color: [0.8, 0.8, 0.75],
            key_hpr: DVec3::new(45.0, -70.0, 0.0),
            enabled: true,
        }
    }
}

impl LightRig {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// With lighting off, surfaces show their flat colour.
    pub fn toggle(&mut self, on: bool) {
        if self.enabled != on {
            tracing::debug!(on, "lighting toggled");
        }
        self.enabled = on;
    }

    /// Unit direction the key light travels in.
    pub fn key_direction(&self) -> Vec3 {
        let rotation = RenderPose::new(DVec3::ZERO, self.key_hpr).rotation();
        (rotation * DVec3::Y).normalize().as_vec3()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_key_light_points_down() {
        let rig = LightRig::default();
        assert!(rig.is_enabled());
        let d = rig.key_direction();
        assert!(d.z < -0.9);
        assert!((d.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn key_heading_turns_light_left() {
        let rig = LightRig {
            key_hpr: DVec3::new(90.0, 0.0, 0.0),
            ..LightRig::default()
        };
        let d = rig.key_direction();
        assert!((d - Vec3::NEG_X).length() < 1e-6);
    }

    #[test]
    fn toggle_switches_lighting() {
        let mut rig = LightRig::default();
        rig.toggle(false);
        assert!(!rig.is_enabled());
        rig.toggle(true);
        assert!(rig.is_enabled());
    }
}
