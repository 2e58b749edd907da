//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only advances through `tick`
//! - Seeded RNG only
//! - Stable iteration order (tiles by slot, targets by spawn order)
//! - No rendering, audio or platform dependencies

pub mod autoplay;
pub mod builder;
pub mod equation;
pub mod state;
pub mod targets;
pub mod tick;
pub mod tiles;
pub mod timer;

pub use builder::{EquationBuilder, EquationMode};
pub use equation::{Operator, evaluate};
pub use state::{ChallengeOutcome, GameEvent, GamePhase, GameState, Snapshot};
pub use targets::{FLOOR_HEIGHT, Target, TargetScheduler};
pub use tick::{PlayerAction, TickInput, tick};
pub use tiles::{Tile, TileContent, TileContentGenerator, TilePool, number_probability};
pub use timer::DeadlineTimer;
