//! Renderer-agnostic side of the visualizer: orbit camera, scene model,
//! per-frame tasks and a debug text renderer.
//!
//! # Invariants
//! - Camera position is always recomputed from the rig, never set directly.
//! - Distance and pitch stay inside their configured bounds.
//! - Renderers never mutate the scene.

mod camera;
mod light;
mod renderer;
mod scene;
mod schedule;
mod shape;

pub use camera::{CameraRig, DragState, OrbitCamera, OrbitConfig, ZoomDirection};
pub use light::LightRig;
pub use renderer::{DebugTextRenderer, RenderView, Renderer};
pub use scene::{DRONE_START, DroneModel, FLOOR_HEIGHT, FLOOR_SIZE, Instance, Part, Scene};
pub use schedule::{FrameInfo, FrameTasks, TaskStatus};
pub use shape::{Mesh, MeshVertex, Shape, ShapeKind};

pub fn crate_info() -> &'static str {
    "hakoview-render v0.1.0"
}
