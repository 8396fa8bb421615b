//! Shared pose types and the simulation <-> render coordinate frame.
//!
//! # Invariants
//! - `to_sim_pose(to_render_pose(p)) == p` up to floating-point rounding.
//! - Conversions are total over finite inputs and never fail.

pub mod frame;
pub mod types;

pub use frame::{to_render_pose, to_sim_pose};
pub use types::{Pose, RenderPose};

pub fn crate_info() -> &'static str {
    "hakoview-common v0.1.0"
}
