//! Data-driven game balance
//!
//! Every tunable number lives here. Loadable from JSON, where missing fields
//! keep their defaults, and validated before a game starts.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::settings::Difficulty;
use crate::sim::Operator;

/// Widest tile number range; helpful-number search is linear in it
pub const MAX_NUMBER_SPAN: i64 = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Lifecycle ===
    pub initial_lives: u8,

    // === Target scheduling ===
    /// Base seconds between spawn attempts
    pub spawn_interval: f32,
    /// Spawn delay is drawn from `spawn_interval * (1 ± spawn_jitter)`
    pub spawn_jitter: f32,
    pub max_concurrent_targets: usize,
    /// Derive goals from the current tiles instead of a plain random range
    pub smart_goals: bool,
    /// Chance a smart goal is attempted per spawn
    pub smart_goal_chance: f32,
    pub min_goal: i64,
    /// Random fall speed spread around the difficulty base (±)
    pub fall_speed_jitter: f32,
    pub min_fall_speed: f32,

    // === Play field ===
    /// Height targets spawn at; the floor is at 0
    pub field_height: f32,
    /// Targets spawn with x in `[-field_half_width, field_half_width]`
    pub field_half_width: f32,
    /// Extra random height above the field top, `[min, max)`
    pub spawn_offset: (f32, f32),

    // === Tiles ===
    pub min_number: i64,
    pub max_number: i64,
    /// Operator symbols (`+ - * /`)
    pub operators: Vec<String>,
    /// Division is only dealt at or above this difficulty
    pub division_min_difficulty: Difficulty,
    /// Chance a tile is biased toward a live goal
    pub helpful_chance: f32,
    /// Fixed number of tile slots
    pub tile_superset: usize,
    /// Slots active at once (clamped to the superset)
    pub visible_tiles: usize,
    /// Seconds between automatic full regenerations
    pub auto_reset_interval: f32,
    /// Chance of a partial regeneration when the live goal set changes
    pub partial_regen_chance: f32,
    /// Tiles touched by a partial regeneration, inclusive range
    pub partial_regen_count: (usize, usize),
    pub partial_regen_helpful_chance: f32,
    /// Seconds a tile stays non-interactable after being picked
    pub tile_cooldown: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            initial_lives: 3,

            spawn_interval: 4.0,
            spawn_jitter: 0.3,
            max_concurrent_targets: 5,
            smart_goals: true,
            smart_goal_chance: 0.7,
            min_goal: 2,
            fall_speed_jitter: 5.0,
            min_fall_speed: 5.0,

            field_height: 600.0,
            field_half_width: 300.0,
            spawn_offset: (10.0, 50.0),

            min_number: 1,
            max_number: 11,
            operators: vec!["+".into(), "-".into(), "*".into(), "/".into()],
            division_min_difficulty: Difficulty::High,
            helpful_chance: 0.7,
            tile_superset: 20,
            visible_tiles: 15,
            auto_reset_interval: 45.0,
            partial_regen_chance: 0.4,
            partial_regen_count: (2, 3),
            partial_regen_helpful_chance: 0.7,
            tile_cooldown: 0.5,
        }
    }
}

impl Tuning {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse the configured operator symbols
    pub fn operator_set(&self) -> Result<Vec<Operator>, ConfigError> {
        if self.operators.is_empty() {
            return Err(ConfigError::NoOperators);
        }
        let mut ops = Vec::with_capacity(self.operators.len());
        for symbol in &self.operators {
            let op = Operator::from_symbol(symbol)?;
            if !ops.contains(&op) {
                ops.push(op);
            }
        }
        Ok(ops)
    }

    /// Operators dealt at a given difficulty
    pub fn operators_for(&self, all: &[Operator], difficulty: Difficulty) -> Vec<Operator> {
        let allowed: Vec<Operator> = all
            .iter()
            .copied()
            .filter(|op| *op != Operator::Div || difficulty >= self.division_min_difficulty)
            .collect();
        // A division-only set stays usable at every level
        if allowed.is_empty() {
            all.to_vec()
        } else {
            allowed
        }
    }

    /// Largest goal the scheduler hands out at a difficulty
    pub fn goal_ceiling(&self, difficulty: Difficulty) -> i64 {
        self.max_number
            .saturating_mul(difficulty.goal_ceiling_factor())
            .max(self.min_goal)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_lives == 0 {
            return Err(ConfigError::NoLives);
        }
        if self.max_concurrent_targets == 0 {
            return Err(ConfigError::NoTargetSlots);
        }
        if self.tile_superset == 0 {
            return Err(ConfigError::EmptyTileSuperset);
        }
        if self.visible_tiles == 0 {
            return Err(ConfigError::NoVisibleTiles);
        }
        if self.min_number > self.max_number {
            return Err(ConfigError::InvertedNumberRange {
                min: self.min_number,
                max: self.max_number,
            });
        }
        if self.max_number.abs_diff(self.min_number) > MAX_NUMBER_SPAN as u64 {
            return Err(ConfigError::NumberRangeTooWide {
                min: self.min_number,
                max: self.max_number,
                limit: MAX_NUMBER_SPAN,
            });
        }
        for (name, value) in [
            ("spawn_interval", self.spawn_interval),
            ("min_fall_speed", self.min_fall_speed),
            ("field_height", self.field_height),
            ("auto_reset_interval", self.auto_reset_interval),
        ] {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        for (name, value) in [
            ("spawn_jitter", self.spawn_jitter),
            ("smart_goal_chance", self.smart_goal_chance),
            ("helpful_chance", self.helpful_chance),
            ("partial_regen_chance", self.partial_regen_chance),
            ("partial_regen_helpful_chance", self.partial_regen_helpful_chance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfUnitRange { name, value });
            }
        }
        self.operator_set()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(Tuning::default().validate(), Ok(()));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let t = Tuning::from_json(r#"{ "max_number": 20, "initial_lives": 5 }"#).unwrap();
        assert_eq!(t.max_number, 20);
        assert_eq!(t.initial_lives, 5);
        assert_eq!(t.visible_tiles, Tuning::default().visible_tiles);
    }

    #[test]
    fn test_unknown_operator_rejected() {
        let err = Tuning::from_json(r#"{ "operators": ["+", "^"] }"#).unwrap_err();
        assert_eq!(err, ConfigError::UnknownOperator("^".to_string()));
    }

    #[test]
    fn test_bad_values_rejected() {
        let t = Tuning {
            tile_superset: 0,
            ..Default::default()
        };
        assert_eq!(t.validate(), Err(ConfigError::EmptyTileSuperset));

        let t = Tuning {
            min_number: 9,
            max_number: 3,
            ..Default::default()
        };
        assert!(matches!(
            t.validate(),
            Err(ConfigError::InvertedNumberRange { .. })
        ));

        let t = Tuning {
            helpful_chance: 1.5,
            ..Default::default()
        };
        assert!(matches!(t.validate(), Err(ConfigError::OutOfUnitRange { .. })));

        let t = Tuning {
            operators: Vec::new(),
            ..Default::default()
        };
        assert_eq!(t.validate(), Err(ConfigError::NoOperators));

        let t = Tuning {
            max_number: i64::MAX / 2,
            ..Default::default()
        };
        assert!(matches!(
            t.validate(),
            Err(ConfigError::NumberRangeTooWide { .. })
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_division_gated_by_difficulty() {
        let t = Tuning::default();
        let all = t.operator_set().unwrap();
        assert!(!t.operators_for(&all, Difficulty::Low).contains(&Operator::Div));
        assert!(!t.operators_for(&all, Difficulty::Medium).contains(&Operator::Div));
        assert!(t.operators_for(&all, Difficulty::High).contains(&Operator::Div));
    }

    #[test]
    fn test_goal_ceiling_scales() {
        let t = Tuning::default();
        assert_eq!(t.goal_ceiling(Difficulty::Low), 11);
        assert_eq!(t.goal_ceiling(Difficulty::Medium), 22);
        assert_eq!(t.goal_ceiling(Difficulty::High), 33);
    }

    #[test]
    fn test_goal_ceiling_saturates_on_huge_numbers() {
        let t = Tuning {
            min_number: i64::MAX / 2 - 5,
            max_number: i64::MAX / 2,
            ..Default::default()
        };
        assert_eq!(t.validate(), Ok(()));
        assert_eq!(t.goal_ceiling(Difficulty::Low), i64::MAX / 2);
        assert_eq!(t.goal_ceiling(Difficulty::High), i64::MAX);
    }
}
