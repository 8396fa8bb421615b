//! wgpu render backend for the visualizer.
//!
//! Draws the floor grid and every scene instance (floor plane, drone parts)
//! with one instanced draw per shape kind.
//!
//! # Invariants
//! - The renderer reads the scene and view; it never mutates them.
//! - Render frame rate is independent of the simulation clock.

mod gpu;
mod shaders;

pub use gpu::WgpuRenderer;
