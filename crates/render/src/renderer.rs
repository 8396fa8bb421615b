use crate::scene::Scene;
use glam::{DMat4, DVec3};

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: DVec3,
    /// Point the camera is looking at.
    pub target: DVec3,
    pub up: DVec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: DVec3::new(0.0, -6.0, 2.0),
            target: DVec3::ZERO,
            up: DVec3::Z,
            fov_degrees: 60.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl RenderView {
    pub fn view_projection(&self) -> DMat4 {
        let proj =
            DMat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far);
        proj * DMat4::look_at_rh(self.eye, self.target, self.up)
    }
}

/// Renderer-agnostic interface.
///
/// Renderers read the scene and a view and produce output; they never change
/// the scene.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given scene and view.
    fn render(&self, scene: &Scene, view: &RenderView) -> Self::Output;
}

/// Text dump of the scene, for headless runs and tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene, view: &RenderView) -> String {
        let drone = &scene.drone;
        let p = drone.position();
        let hpr = drone.hpr_deg();
        let (eye, target) = (view.eye, view.target);
        let lights = if scene.lights.is_enabled() { "on" } else { "off" };
        format!(
            "=== Scene ===\n\
             Drone: pos=({:.2}, {:.2}, {:.2}) hpr=({:.1}, {:.1}, {:.1}) rotor={:.1}\n\
             Camera: eye=({:.2}, {:.2}, {:.2}) target=({:.2}, {:.2}, {:.2}) fov={:.0}\n\
             Lights: {lights}\n\
             Instances: {}\n",
            p.x,
            p.y,
            p.z,
            hpr.x,
            hpr.y,
            hpr.z,
            drone.rotor_speed(),
            eye.x,
            eye.y,
            eye.z,
            target.x,
            target.y,
            target.z,
            view.fov_degrees,
            scene.instances().len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hakoview_common::RenderPose;

    #[test]
    fn debug_renderer_default_scene() {
        let scene = Scene::default();
        let output = DebugTextRenderer::new().render(&scene, &RenderView::default());
        assert!(output.contains("pos=(0.00, 0.00, 1.00)"));
        assert!(output.contains("Lights: on"));
        assert!(output.contains("fov=60"));
    }

    #[test]
    fn debug_renderer_writes_one_line_per_section() {
        let output = DebugTextRenderer::new().render(&Scene::default(), &RenderView::default());
        let heads: Vec<_> = output
            .lines()
            .map(|l| l.split(':').next().unwrap_or(""))
            .collect();
        assert_eq!(
            heads,
            ["=== Scene ===", "Drone", "Camera", "Lights", "Instances"]
        );
        assert!(output.ends_with('\n'));
    }

    #[test]
    fn debug_renderer_reflects_pose_and_lighting() {
        let mut scene = Scene::default();
        scene.drone.apply_pose(
            &RenderPose::new(DVec3::new(-2.0, 1.0, 3.0), DVec3::new(10.0, 20.0, 30.0)),
            200.0,
        );
        scene.lights.toggle(false);
        let output = DebugTextRenderer::new().render(&scene, &RenderView::default());
        assert!(output.contains("pos=(-2.00, 1.00, 3.00)"));
        assert!(output.contains("hpr=(10.0, 20.0, 30.0)"));
        assert!(output.contains("rotor=200.0"));
        assert!(output.contains("Lights: off"));
    }

    #[test]
    fn render_view_default() {
        let view = RenderView::default();
        assert_eq!(view.fov_degrees, 60.0);
        assert_eq!(view.target, DVec3::ZERO);
        assert!(!view.view_projection().col(0).x.is_nan());
    }
}
