//! Simulation link: pulls pose and actuator PDUs in step with the simulator
//! clock and hands the latest render pose to the render thread.
//!
//! # Invariants
//! - The sync loop blocks only inside [`SimClock::usleep`].
//! - [`PoseChannel`] never blocks a publisher on a reader or the reverse.
//! - Render state is never touched from the sync thread; everything flows
//!   through the channel.

pub mod bus;
pub mod channel;
pub mod clock;
pub mod codec;
pub mod config;
pub mod demo;
pub mod sync_loop;

pub use bus::{MemoryBus, PduBus};
pub use channel::{PoseChannel, PoseSample};
pub use clock::SimClock;
pub use codec::{ActuatorControls, DecodeError};
pub use config::{ConfigError, LinkConfig, MAX_DELTA_MSEC, PduConfig, Registration, register};
pub use demo::DemoFlight;
pub use sync_loop::{CycleOutcome, ExitReason, LoopReport, LoopState, SyncHandle, SyncLoop};

pub fn crate_info() -> &'static str {
    "hakoview-link v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("link"));
    }
}
