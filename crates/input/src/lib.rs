//! Input: discrete button/scroll events plus the per-tick pointer query.
//!
//! # Invariants
//! - Events are edge-triggered; pointer position and modifier state are
//!   polled once per render tick through [`PointerSource`].
//! - A pointer outside the input surface is reported as `None`, never as a
//!   stale position.

pub mod event;
pub mod pointer;

pub use event::{InputEvent, MouseButton, ScrollDirection};
pub use pointer::{PointerSource, PointerState};

pub fn crate_info() -> &'static str {
    "hakoview-input v0.1.0"
}
