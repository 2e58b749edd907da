//! Bubble Math - falling-target arithmetic puzzle
//!
//! Core modules:
//! - `sim`: Deterministic simulation (equations, tiles, targets, lifecycle)
//! - `settings`: Per-tick player settings snapshot
//! - `tuning`: Data-driven game balance
//! - `error`: Configuration and evaluation errors

pub mod error;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{ConfigError, EquationError};
pub use settings::{Difficulty, Settings};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
}
