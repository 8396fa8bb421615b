//! Orbit camera: a rig of target, distance, yaw and pitch driven by drag and
//! scroll input, with the eye placed on a sphere around the target.
//!
//! Angles are degrees. The render frame is Z-up; at yaw 0 and pitch 0 the
//! eye sits on -Y looking toward +Y.
//!
//! Gestures:
//! - modifier + primary drag, or secondary drag: orbit
//! - middle drag: pan
//! - wheel: zoom

use crate::renderer::RenderView;
use glam::{DMat3, DMat4, DQuat, DVec2, DVec3};
use hakoview_input::{InputEvent, MouseButton, PointerSource, ScrollDirection};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitConfig {
    /// Degrees per pixel of drag.
    pub rotate_sensitivity: f64,
    /// World units per pixel of drag, per unit of distance.
    pub pan_speed: f64,
    /// Distance multiplier per wheel notch.
    pub zoom_factor: f64,
    pub min_pitch: f64,
    pub max_pitch: f64,
    pub min_distance: f64,
    pub max_distance: f64,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            rotate_sensitivity: 0.25,
            pan_speed: 0.003,
            zoom_factor: 1.08,
            min_pitch: -89.0,
            max_pitch: 89.0,
            min_distance: 0.5,
            max_distance: 200.0,
        }
    }
}

/// Spherical camera rig. Yaw is never wrapped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    pub target: DVec3,
    pub distance: f64,
    pub yaw: f64,
    pub pitch: f64,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            target: DVec3::ZERO,
            distance: 6.0,
            yaw: 45.0,
            pitch: 20.0,
        }
    }
}

impl CameraRig {
    /// Close view used when the visualizer opens: 2 units out, yaw 35°,
    /// pitch 30°.
    pub fn close_up(target: DVec3) -> Self {
        Self {
            target,
            distance: 2.0,
            yaw: 35.0,
            pitch: 30.0,
        }
    }

    /// Eye offset from the target.
    pub fn offset(&self) -> DVec3 {
        let yaw = self.yaw.to_radians();
        let pitch = self.pitch.to_radians();
        DVec3::new(
            self.distance * pitch.cos() * yaw.sin(),
            -self.distance * pitch.cos() * yaw.cos(),
            self.distance * pitch.sin(),
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DragState {
    pub rotating: bool,
    pub panning: bool,
    /// Pointer position seen last tick.
    pub anchor: Option<DVec2>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

pub struct OrbitCamera {
    config: OrbitConfig,
    rig: CameraRig,
    drag: DragState,
    eye: DVec3,
    /// Columns: right, forward, up.
    orientation: DQuat,
    pub fov_degrees: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(OrbitConfig::default(), CameraRig::default())
    }
}

impl OrbitCamera {
    /// Out-of-range distance and pitch in `rig` are clamped.
    pub fn new(config: OrbitConfig, rig: CameraRig) -> Self {
        let mut cam = Self {
            config,
            rig,
            drag: DragState::default(),
            eye: DVec3::ZERO,
            orientation: DQuat::IDENTITY,
            fov_degrees: 60.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        };
        cam.rig.distance = cam.clamp_distance(cam.rig.distance);
        cam.rig.pitch = cam.clamp_pitch(cam.rig.pitch);
        cam.update_transform();
        cam
    }

    pub fn config(&self) -> &OrbitConfig {
        &self.config
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    pub fn drag(&self) -> &DragState {
        &self.drag
    }

    pub fn is_rotating(&self) -> bool {
        self.drag.rotating
    }

    pub fn is_panning(&self) -> bool {
        self.drag.panning
    }

    pub fn eye(&self) -> DVec3 {
        self.eye
    }

    pub fn orientation(&self) -> DQuat {
        self.orientation
    }

    pub fn right(&self) -> DVec3 {
        self.orientation * DVec3::X
    }

    pub fn forward(&self) -> DVec3 {
        self.orientation * DVec3::Y
    }

    pub fn up(&self) -> DVec3 {
        self.orientation * DVec3::Z
    }

    pub fn set_target(&mut self, target: DVec3) {
        self.rig.target = target;
        self.update_transform();
    }

    fn clamp_distance(&self, d: f64) -> f64 {
        d.clamp(self.config.min_distance, self.config.max_distance)
    }

    fn clamp_pitch(&self, p: f64) -> f64 {
        p.clamp(self.config.min_pitch, self.config.max_pitch)
    }

    pub fn handle_event(&mut self, event: InputEvent, pointer: &impl PointerSource) {
        match event {
            InputEvent::ButtonDown(MouseButton::Primary) => {
                if pointer.modifier_held() {
                    self.begin_rotate(pointer);
                }
            }
            // Release ends the orbit whatever the modifier is doing now, so a
            // modifier let go first cannot leave the drag stuck on.
            InputEvent::ButtonUp(MouseButton::Primary) => {
                if self.drag.rotating {
                    self.end_rotate();
                }
            }
            InputEvent::ButtonDown(MouseButton::Secondary) => self.begin_rotate(pointer),
            InputEvent::ButtonUp(MouseButton::Secondary) => self.end_rotate(),
            InputEvent::ButtonDown(MouseButton::Middle) => self.begin_pan(pointer),
            InputEvent::ButtonUp(MouseButton::Middle) => self.end_pan(),
            InputEvent::Scroll(ScrollDirection::Up) => self.zoom(ZoomDirection::In, pointer),
            InputEvent::Scroll(ScrollDirection::Down) => self.zoom(ZoomDirection::Out, pointer),
        }
    }

    fn begin_rotate(&mut self, pointer: &impl PointerSource) {
        self.drag.rotating = true;
        self.snapshot_pointer(pointer);
    }

    fn end_rotate(&mut self) {
        self.drag.rotating = false;
        self.drag.anchor = None;
    }

    fn begin_pan(&mut self, pointer: &impl PointerSource) {
        self.drag.panning = true;
        self.snapshot_pointer(pointer);
    }

    fn end_pan(&mut self) {
        self.drag.panning = false;
        self.drag.anchor = None;
    }

    fn snapshot_pointer(&mut self, pointer: &impl PointerSource) {
        if let Some(p) = pointer.pointer() {
            self.drag.anchor = Some(p);
        }
    }

    /// One wheel notch: out multiplies the distance by the zoom factor, in
    /// divides by it.
    pub fn zoom(&mut self, direction: ZoomDirection, pointer: &impl PointerSource) {
        let factor = match direction {
            ZoomDirection::Out => self.config.zoom_factor,
            ZoomDirection::In => self.config.zoom_factor.recip(),
        };
        self.rig.distance = self.clamp_distance(self.rig.distance * factor);
        self.update_transform();
        self.snapshot_pointer(pointer);
    }

    /// Per-frame update from the current pointer position.
    pub fn update(&mut self, pointer: &impl PointerSource) {
        let Some(current) = pointer.pointer() else {
            self.drag.anchor = None;
            return;
        };
        let Some(anchor) = self.drag.anchor else {
            self.drag.anchor = Some(current);
            return;
        };
        let delta = current - anchor;
        self.drag.anchor = Some(current);
        if delta == DVec2::ZERO {
            return;
        }
        if self.drag.rotating {
            self.rotate(delta.x, delta.y);
        }
        if self.drag.panning {
            self.pan(delta.x, delta.y);
        }
    }

    /// Orbit by a pointer delta in pixels.
    pub fn rotate(&mut self, dx: f64, dy: f64) {
        self.rig.yaw += dx * self.config.rotate_sensitivity;
        self.rig.pitch = self.clamp_pitch(self.rig.pitch - dy * self.config.rotate_sensitivity);
        self.update_transform();
    }

    /// Slide the target in the view plane by a pointer delta in pixels.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        let (Some(right), Some(up)) = (self.right().try_normalize(), self.up().try_normalize())
        else {
            return;
        };
        let scale = self.rig.distance * self.config.pan_speed;
        self.rig.target += right * (-dx * scale) + up * (dy * scale);
        self.update_transform();
    }

    fn update_transform(&mut self) {
        let distance = self.clamp_distance(self.rig.distance);
        let rig = CameraRig {
            distance,
            ..self.rig
        };
        self.eye = rig.target + rig.offset();

        let Some(forward) = (rig.target - self.eye).try_normalize() else {
            return;
        };
        let Some(right) = forward.cross(DVec3::Z).try_normalize() else {
            return;
        };
        let up = right.cross(forward);
        self.orientation = DQuat::from_mat3(&DMat3::from_cols(right, forward, up));
    }

    pub fn view_matrix(&self) -> DMat4 {
        DMat4::look_at_rh(self.eye, self.rig.target, self.up())
    }

    pub fn projection_matrix(&self) -> DMat4 {
        DMat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> DMat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn render_view(&self) -> RenderView {
        RenderView {
            eye: self.eye,
            target: self.rig.target,
            up: self.up(),
            fov_degrees: self.fov_degrees,
            aspect: self.aspect,
            near: self.near,
            far: self.far,
        }
    }
}
