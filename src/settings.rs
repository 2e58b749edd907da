//! Player settings snapshot
//!
//! Owned and persisted by the front end. The simulation receives a copy in
//! every `TickInput` and reacts to changes between ticks.

use serde::{Deserialize, Serialize};

/// Difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Low,
    #[default]
    Medium,
    High,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Low => "Low",
            Difficulty::Medium => "Medium",
            Difficulty::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" | "easy" => Some(Difficulty::Low),
            "medium" | "med" => Some(Difficulty::Medium),
            "high" | "hard" => Some(Difficulty::High),
            _ => None,
        }
    }

    /// Dropdown index used by the settings menu (0 = Low)
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Difficulty::Low),
            1 => Some(Difficulty::Medium),
            2 => Some(Difficulty::High),
            _ => None,
        }
    }

    /// Base target fall speed (units/s) before jitter
    pub fn base_fall_speed(&self) -> f32 {
        match self {
            Difficulty::Low => 15.0,
            Difficulty::Medium => 22.5,
            Difficulty::High => 30.0,
        }
    }

    /// Largest goal value as a multiple of the largest tile number
    pub fn goal_ceiling_factor(&self) -> i64 {
        match self {
            Difficulty::Low => 1,
            Difficulty::Medium => 2,
            Difficulty::High => 3,
        }
    }
}

/// Settings the simulation polls once per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub difficulty: Difficulty,
    /// Long (N-operand) equation mode
    pub long_equation: bool,
    /// Regenerate tiles on a timer, after correct answers and on target changes
    pub auto_reset_tiles: bool,
    /// Background music (front end only)
    pub music: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Medium,
            long_equation: false,
            auto_reset_tiles: true,
            music: true,
        }
    }
}

impl Settings {
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_long_equation(mut self, enabled: bool) -> Self {
        self.long_equation = enabled;
        self
    }

    pub fn with_auto_reset_tiles(mut self, enabled: bool) -> Self {
        self.auto_reset_tiles = enabled;
        self
    }
}
