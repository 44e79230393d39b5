//! Sleigh Strike - a 2.5D side-scrolling arcade shooter
//!
//! Core modules:
//! - `sim`: Simulation (entities, combat, collision passes, spawning)
//! - `platform`: Collaborators the host provides (visuals, input, HUD, clock)
//! - `tuning`: Data-driven game balance

pub mod platform;
pub mod sim;
pub mod tuning;

pub use sim::Simulation;
pub use tuning::{Tuning, TuningError};

/// Host loop constants
pub mod consts {
    /// Nominal frame time used by the headless driver (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;
    /// Length of the native autopilot session
    pub const DEMO_SECONDS: f32 = 120.0;
}
