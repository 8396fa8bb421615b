//! Scene contents: the floor and a drone assembled from primitive shapes.

use crate::light::LightRig;
use crate::shape::{Shape, ShapeKind};
use glam::{DQuat, DVec3, Mat4, Quat, Vec3};
use hakoview_common::RenderPose;
use std::f64::consts::TAU;

/// Starting position of the drone before any pose arrives.
pub const DRONE_START: DVec3 = DVec3::new(0.0, 0.0, 1.0);
pub const FLOOR_SIZE: f32 = 5.0;
pub const FLOOR_HEIGHT: f32 = -0.3;

/// One drawable: a unit shape with its full model matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Instance {
    pub kind: ShapeKind,
    pub model: Mat4,
    pub color: [f32; 4],
}

/// A shape placed in its owner's local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Part {
    pub shape: Shape,
    pub offset: Vec3,
    /// Rotation about local Z, radians.
    pub yaw: f32,
    /// Per-axis stretch applied on top of the shape size.
    pub scale: Vec3,
    pub color: [f32; 4],
    /// Rotor parts spin with the rotor angle; the sign sets the direction.
    pub spin: f32,
}

impl Part {
    fn new(shape: Shape, offset: Vec3, scale: Vec3, color: [f32; 4]) -> Self {
        Self {
            shape,
            offset,
            yaw: 0.0,
            scale,
            color,
            spin: 0.0,
        }
    }

    fn local_matrix(&self, rotor_angle: f32) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale * self.shape.size(),
            Quat::from_rotation_z(self.yaw + self.spin * rotor_angle),
            self.offset,
        )
    }
}

/// The drone model. Pose is applied from the sync thread's latest value;
/// rotors turn by the rotor speed indicator in radians per second.
#[derive(Debug, Clone)]
pub struct DroneModel {
    position: DVec3,
    rotation: DQuat,
    hpr_deg: DVec3,
    rotor_speed: f64,
    rotor_angle: f64,
    parts: Vec<Part>,
}

impl Default for DroneModel {
    fn default() -> Self {
        Self::new(DRONE_START)
    }
}

impl DroneModel {
    pub fn new(position: DVec3) -> Self {
        Self {
            position,
            rotation: DQuat::IDENTITY,
            hpr_deg: DVec3::ZERO,
            rotor_speed: 0.0,
            rotor_angle: 0.0,
            parts: quadcopter_parts(),
        }
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn hpr_deg(&self) -> DVec3 {
        self.hpr_deg
    }

    pub fn rotation(&self) -> DQuat {
        self.rotation
    }

    pub fn rotor_speed(&self) -> f64 {
        self.rotor_speed
    }

    pub fn rotor_angle(&self) -> f64 {
        self.rotor_angle
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn apply_pose(&mut self, pose: &RenderPose, rotor_speed: f64) {
        self.position = pose.position;
        self.hpr_deg = pose.hpr_deg;
        self.rotation = pose.rotation();
        self.rotor_speed = rotor_speed;
    }

    /// Advance the rotor angle by `dt` seconds.
    pub fn advance_rotors(&mut self, dt: f64) {
        self.rotor_angle = (self.rotor_angle + self.rotor_speed * dt).rem_euclid(TAU);
    }

    pub fn transform(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation.as_quat(), self.position.as_vec3())
    }

    pub fn instances(&self) -> impl Iterator<Item = Instance> + '_ {
        let body = self.transform();
        let angle = self.rotor_angle as f32;
        self.parts.iter().map(move |p| Instance {
            kind: p.shape.kind(),
            model: body * p.local_matrix(angle),
            color: p.color,
        })
    }
}

fn quadcopter_parts() -> Vec<Part> {
    const BODY: [f32; 4] = [0.15, 0.15, 0.17, 1.0];
    const ARM: [f32; 4] = [0.3, 0.3, 0.32, 1.0];
    const FRONT_ROTOR: [f32; 4] = [0.9, 0.35, 0.2, 1.0];
    const REAR_ROTOR: [f32; 4] = [0.75, 0.75, 0.78, 1.0];
    const ARM_REACH: f32 = 0.13;

    let mut parts = vec![Part::new(
        Shape::Cube { size: 0.12 },
        Vec3::ZERO,
        Vec3::new(1.0, 1.4, 0.45),
        BODY,
    )];
    for yaw in [std::f32::consts::FRAC_PI_4, -std::f32::consts::FRAC_PI_4] {
        let mut arm = Part::new(
            Shape::Cube { size: 0.38 },
            Vec3::ZERO,
            Vec3::new(1.0, 0.06, 0.05),
            ARM,
        );
        arm.yaw = yaw;
        parts.push(arm);
    }
    // Front is render +Y. Diagonal rotors alternate spin direction.
    for (x, y, spin) in [(1.0, 1.0, 1.0), (-1.0, 1.0, -1.0), (-1.0, -1.0, 1.0), (1.0, -1.0, -1.0)] {
        let mut rotor = Part::new(
            Shape::Plane { size: 0.16 },
            Vec3::new(x * ARM_REACH, y * ARM_REACH, 0.03),
            Vec3::new(1.0, 0.12, 1.0),
            if y > 0.0 { FRONT_ROTOR } else { REAR_ROTOR },
        );
        rotor.spin = spin;
        parts.push(rotor);
    }
    parts
}

/// Everything the renderers draw.
#[derive(Debug, Clone)]
pub struct Scene {
    pub drone: DroneModel,
    pub floor: Part,
    pub lights: LightRig,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            drone: DroneModel::default(),
            floor: Part::new(
                Shape::Plane { size: FLOOR_SIZE },
                Vec3::new(0.0, 0.0, FLOOR_HEIGHT),
                Vec3::ONE,
                [0.55, 0.58, 0.55, 1.0],
            ),
            lights: LightRig::default(),
        }
    }
}

impl Scene {
    pub fn instances(&self) -> Vec<Instance> {
        let floor = Instance {
            kind: self.floor.shape.kind(),
            model: self.floor.local_matrix(0.0),
            color: self.floor.color,
        };
        std::iter::once(floor).chain(self.drone.instances()).collect()
    }

    /// Status line shown in the corner of the window.
    pub fn hud_text(&self) -> String {
        let p = self.drone.position();
        format!(
            "x={:.2}  y={:.2}  z={:.2}  rotor={:.0}",
            p.x,
            p.y,
            p.z,
            self.drone.rotor_speed()
        )
    }
}
