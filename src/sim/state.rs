//! Game state and lifecycle
//!
//! Lives, score and the Playing/GameOver machine, wired to the tile pool,
//! the target scheduler and the player's equation builder.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::builder::{EquationBuilder, EquationMode};
use super::equation::Operator;
use super::targets::{Target, TargetScheduler};
use super::tiles::{Tile, TileContent, TilePool};
use super::timer::DeadlineTimer;
use crate::error::ConfigError;
use crate::settings::Settings;
use crate::tuning::Tuning;

/// Points for a correct short equation
pub const SHORT_CORRECT_POINTS: i64 = 10;
/// Penalty for a wrong short equation
pub const SHORT_WRONG_PENALTY: i64 = 5;
/// Points per symbol for a correct long equation
pub const LONG_POINTS_PER_SYMBOL: i64 = 3;
/// Penalty per symbol for a wrong long equation
pub const LONG_PENALTY_PER_SYMBOL: i64 = 5;
/// Seconds between autoplay moves
pub const AUTOPLAY_INTERVAL: f32 = 1.5;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    /// Terminal until restart; simulation time is frozen
    GameOver,
}

/// Discrete events for presentation (sound, animation, HUD)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    TargetSpawned { id: u32, goal: i64 },
    TargetPopped { id: u32, goal: i64 },
    TargetFloored { id: u32, goal: i64 },
    LifeLost { remaining: u8 },
    ChallengeCorrect { target: u32, points: i64 },
    ChallengeIncorrect { target: u32, penalty: i64 },
    /// Challenge with an unfinished equation
    IncompleteEquation { target: u32, penalty: i64 },
    OperatorRejected { tile: u32 },
    TilesRegenerated { full: bool },
    SelectionReset,
    GameOver { score: i64 },
    Restarted,
}

/// Result of challenging a target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeOutcome {
    /// Equation matched; target popped
    Correct { points: i64 },
    /// Equation evaluated to something else; target keeps falling
    Incorrect { result: i64, penalty: i64 },
    /// Equation incomplete; target keeps falling
    Incomplete { penalty: i64 },
    /// No such live target, or the game is over
    Ignored,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub lives: u8,
    /// May go negative
    pub score: i64,
    pub phase: GamePhase,
    /// Simulation tick counter (frozen during game over)
    pub time_ticks: u64,
    pub builder: EquationBuilder,
    pub tiles: TilePool,
    pub targets: TargetScheduler,
    /// Settings snapshot applied on the last tick
    pub settings: Settings,
    /// Events since the last drain
    pub events: Vec<GameEvent>,
    tuning: Tuning,
    operators: Vec<Operator>,
    pub(crate) autoplay_timer: DeadlineTimer,
    pub(crate) rng: Pcg32,
}

impl GameState {
    /// Create a new game. Fails on invalid tuning.
    pub fn new(seed: u64, tuning: Tuning, settings: Settings) -> Result<Self, ConfigError> {
        tuning.validate()?;
        let operators = tuning.operator_set()?;
        let mut rng = Pcg32::seed_from_u64(seed);

        let mut tiles = TilePool::new(&tuning, tuning.operators_for(&operators, settings.difficulty))?;
        tiles.regenerate_all(&mut rng, &[]);
        let targets = TargetScheduler::new(&mut rng, &tuning, settings.difficulty);
        let mode = if settings.long_equation {
            EquationMode::Long
        } else {
            EquationMode::Short
        };

        log::info!("New game: seed={} difficulty={}", seed, settings.difficulty.as_str());

        Ok(Self {
            seed,
            lives: tuning.initial_lives,
            score: 0,
            phase: GamePhase::Playing,
            time_ticks: 0,
            builder: EquationBuilder::new(mode),
            tiles,
            targets,
            settings,
            events: Vec::new(),
            tuning,
            operators,
            autoplay_timer: DeadlineTimer::new(AUTOPLAY_INTERVAL),
            rng,
        })
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Apply a settings snapshot, reacting only to what changed
    pub fn apply_settings(&mut self, settings: Settings) {
        let previous = self.settings;
        self.settings = settings;

        if settings.difficulty != previous.difficulty {
            self.targets.set_difficulty(&mut self.rng, settings.difficulty);
            self.tiles
                .set_operators(self.tuning.operators_for(&self.operators, settings.difficulty));
        }

        if settings.long_equation != previous.long_equation {
            let mode = if settings.long_equation {
                EquationMode::Long
            } else {
                EquationMode::Short
            };
            log::info!("Equation mode: {:?}", mode);
            self.builder.set_mode(mode);
            self.events.push(GameEvent::SelectionReset);
        }
    }

    /// Feed a tile's content into the equation
    pub fn select_tile(&mut self, id: u32) -> bool {
        if self.is_game_over() {
            return false;
        }
        match self.tiles.select(id) {
            Some(TileContent::Number(n)) => {
                self.builder.select_number(n);
                true
            }
            Some(TileContent::Operator(op)) => {
                let accepted = self.builder.select_operator(op);
                if !accepted {
                    self.events.push(GameEvent::OperatorRejected { tile: id });
                }
                accepted
            }
            None => false,
        }
    }

    /// Test the current equation against a live target
    pub fn challenge(&mut self, target_id: u32) -> ChallengeOutcome {
        if self.is_game_over() {
            return ChallengeOutcome::Ignored;
        }
        let Some(goal) = self.targets.target(target_id).map(|t| t.goal) else {
            return ChallengeOutcome::Ignored;
        };
        let long = self.builder.mode() == EquationMode::Long;

        let Some(result) = self.builder.result() else {
            let penalty = if long {
                self.builder.operands().len() as i64 + 1
            } else {
                1
            };
            self.score -= penalty;
            self.builder.reset();
            self.events.push(GameEvent::IncompleteEquation {
                target: target_id,
                penalty,
            });
            log::debug!("Incomplete equation: -{}", penalty);
            return ChallengeOutcome::Incomplete { penalty };
        };

        let length = self.builder.len() as i64;
        self.builder.reset();

        if result == goal {
            let points = if long {
                LONG_POINTS_PER_SYMBOL * length
            } else {
                SHORT_CORRECT_POINTS
            };
            self.score += points;
            self.targets.pop(target_id);
            self.events.push(GameEvent::TargetPopped {
                id: target_id,
                goal,
            });
            self.events.push(GameEvent::ChallengeCorrect {
                target: target_id,
                points,
            });
            log::debug!("Correct: {} = {} (+{})", result, goal, points);

            if self.settings.auto_reset_tiles {
                let goals = self.targets.live_goals();
                self.tiles.regenerate_all(&mut self.rng, &goals);
                self.events.push(GameEvent::TilesRegenerated { full: true });
            }
            ChallengeOutcome::Correct { points }
        } else {
            let penalty = if long {
                LONG_PENALTY_PER_SYMBOL * length
            } else {
                SHORT_WRONG_PENALTY
            };
            self.score -= penalty;
            self.events.push(GameEvent::ChallengeIncorrect {
                target: target_id,
                penalty,
            });
            log::debug!("Wrong: {} != {} (-{})", result, goal, penalty);
            ChallengeOutcome::Incorrect { result, penalty }
        }
    }

    /// A target hit the floor. No-op once the game is over.
    pub fn target_reached_floor(&mut self, target: &Target) {
        if self.is_game_over() {
            return;
        }
        self.events.push(GameEvent::TargetFloored {
            id: target.id,
            goal: target.goal,
        });
        self.lives = self.lives.saturating_sub(1);
        self.events.push(GameEvent::LifeLost {
            remaining: self.lives,
        });
        log::info!("Life lost! Lives remaining: {}", self.lives);

        if self.lives == 0 {
            self.phase = GamePhase::GameOver;
            self.events.push(GameEvent::GameOver { score: self.score });
            log::info!("Game over! Final score: {}", self.score);
        }
    }

    /// Fresh run on the same settings: full lives, zero score, no targets,
    /// new tiles.
    pub fn restart(&mut self) {
        self.lives = self.tuning.initial_lives;
        self.score = 0;
        self.phase = GamePhase::Playing;
        self.builder.reset();
        self.targets.reset(&mut self.rng);
        self.tiles.regenerate_all(&mut self.rng, &[]);
        self.autoplay_timer.restart();
        self.events.push(GameEvent::Restarted);
        log::info!("Game restarted");
    }

    /// Clear the equation without penalty
    pub fn reset_selection(&mut self) {
        self.builder.reset();
        self.events.push(GameEvent::SelectionReset);
    }

    /// Full tile regeneration; the selection goes with the old tiles
    pub fn reset_tiles(&mut self) {
        let goals = self.targets.live_goals();
        self.tiles.regenerate_all(&mut self.rng, &goals);
        self.events.push(GameEvent::TilesRegenerated { full: true });
        self.reset_selection();
    }

    /// Change how many tile slots are active
    pub fn set_visible_tile_count(&mut self, count: usize) {
        let goals = self.targets.live_goals();
        self.tiles.set_visible_tile_count(&mut self.rng, count, &goals);
        self.events.push(GameEvent::TilesRegenerated { full: true });
        self.reset_selection();
    }

    /// Change the tile number range
    pub fn set_number_range(&mut self, min: i64, max: i64) {
        let goals = self.targets.live_goals();
        self.tiles.set_number_range(&mut self.rng, min, max, &goals);
        self.events.push(GameEvent::TilesRegenerated { full: true });
        self.reset_selection();
    }

    /// Change how strongly tiles are biased toward live goals
    pub fn set_helpful_chance(&mut self, chance: f32) {
        let goals = self.targets.live_goals();
        self.tiles.set_helpful_chance(&mut self.rng, chance, &goals);
        self.events.push(GameEvent::TilesRegenerated { full: true });
        self.reset_selection();
    }

    /// Serializable view for presentation
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            score: self.score,
            lives: self.lives,
            phase: self.phase,
            mode: self.builder.mode(),
            equation: self.builder.display(),
            equation_complete: self.builder.is_valid(),
            tiles: self.tiles.active_tiles().cloned().collect(),
            targets: self.targets.targets().to_vec(),
        }
    }
}

/// What the presentation layer draws each frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub score: i64,
    pub lives: u8,
    pub phase: GamePhase,
    pub mode: EquationMode,
    /// e.g. `3 + _ = ?`
    pub equation: String,
    pub equation_complete: bool,
    pub tiles: Vec<Tile>,
    pub targets: Vec<Target>,
}

impl Snapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Operator;

    fn new_state(settings: Settings) -> GameState {
        GameState::new(12345, Tuning::default(), settings).unwrap()
    }

    /// Spawn a target and return its (id, goal)
    fn spawn(state: &mut GameState) -> (u32, i64) {
        let t = state.targets.spawn(&mut state.rng, &[], &[]);
        (t.id, t.goal)
    }

    fn enter(state: &mut GameState, a: i64, op: Operator, b: i64) {
        state.builder.select_number(a);
        state.builder.select_operator(op);
        state.builder.select_number(b);
    }

    #[test]
    fn test_new_state() {
        let state = new_state(Settings::default());
        assert_eq!(state.lives, 3);
        assert_eq!(state.score, 0);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.tiles.active_count(), 15);
        assert_eq!(state.builder.mode(), EquationMode::Short);
    }

    #[test]
    fn test_invalid_tuning_is_fatal() {
        let tuning = Tuning {
            operators: vec!["?".into()],
            ..Default::default()
        };
        assert!(GameState::new(1, tuning, Settings::default()).is_err());
    }

    #[test]
    fn test_three_floor_hits_end_game() {
        let mut state = new_state(Settings::default());
        let target = state.targets.spawn(&mut state.rng, &[], &[]).clone();

        state.target_reached_floor(&target);
        state.target_reached_floor(&target);
        assert_eq!(state.phase, GamePhase::Playing);
        state.target_reached_floor(&target);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.lives, 0);

        state.target_reached_floor(&target);
        assert_eq!(state.lives, 0);
        assert_eq!(
            state
                .events
                .iter()
                .filter(|e| matches!(e, GameEvent::GameOver { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn test_short_correct_adds_ten() {
        let mut state = new_state(Settings::default().with_auto_reset_tiles(false));
        let (id, goal) = spawn(&mut state);
        enter(&mut state, goal - 1, Operator::Add, 1);

        assert_eq!(state.challenge(id), ChallengeOutcome::Correct { points: 10 });
        assert_eq!(state.score, 10);
        assert!(state.targets.target(id).is_none());
        assert!(state.builder.is_empty());
    }

    #[test]
    fn test_short_wrong_subtracts_five() {
        let mut state = new_state(Settings::default());
        let (id, goal) = spawn(&mut state);
        enter(&mut state, goal, Operator::Add, 1000);

        assert!(matches!(
            state.challenge(id),
            ChallengeOutcome::Incorrect { penalty: 5, .. }
        ));
        assert_eq!(state.score, -5);
        assert!(state.targets.target(id).is_some());
        assert!(state.builder.is_empty());
    }

    #[test]
    fn test_incomplete_short_costs_one() {
        let mut state = new_state(Settings::default());
        let (id, _) = spawn(&mut state);
        state.builder.select_number(4);

        assert_eq!(state.challenge(id), ChallengeOutcome::Incomplete { penalty: 1 });
        assert_eq!(state.score, -1);
        assert!(state.targets.target(id).is_some());
        assert!(state.builder.is_empty());
    }

    #[test]
    fn test_incomplete_long_scales_with_operands() {
        let mut state = new_state(Settings::default().with_long_equation(true));
        let (id, _) = spawn(&mut state);
        state.builder.select_number(4);
        state.builder.select_operator(Operator::Add);
        state.builder.select_number(5);
        state.builder.select_operator(Operator::Add);

        assert_eq!(state.challenge(id), ChallengeOutcome::Incomplete { penalty: 3 });
        assert_eq!(state.score, -3);
    }

    #[test]
    fn test_long_scoring_by_length() {
        let mut state = new_state(
            Settings::default()
                .with_long_equation(true)
                .with_auto_reset_tiles(false),
        );
        let (id, goal) = spawn(&mut state);
        // goal - 2 + 1 + 1 : five symbols
        state.builder.select_number(goal - 2);
        state.builder.select_operator(Operator::Add);
        state.builder.select_number(1);
        state.builder.select_operator(Operator::Add);
        state.builder.select_number(1);
        assert_eq!(state.challenge(id), ChallengeOutcome::Correct { points: 15 });

        let (id, goal) = spawn(&mut state);
        enter(&mut state, goal, Operator::Add, 1);
        assert!(matches!(
            state.challenge(id),
            ChallengeOutcome::Incorrect { penalty: 15, .. }
        ));
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_correct_regenerates_tiles_when_auto_reset() {
        let mut state = new_state(Settings::default());
        let (id, goal) = spawn(&mut state);
        state.events.clear();
        enter(&mut state, goal, Operator::Sub, 0);

        state.challenge(id);
        assert!(state
            .events
            .contains(&GameEvent::TilesRegenerated { full: true }));
    }

    #[test]
    fn test_challenge_unknown_target_ignored() {
        let mut state = new_state(Settings::default());
        state.builder.select_number(1);
        assert_eq!(state.challenge(999), ChallengeOutcome::Ignored);
        assert_eq!(state.score, 0);
        assert!(!state.builder.is_empty());
    }

    #[test]
    fn test_restart() {
        let mut state = new_state(Settings::default());
        let target = state.targets.spawn(&mut state.rng, &[], &[]).clone();
        state.score = -40;
        for _ in 0..3 {
            state.target_reached_floor(&target);
        }
        assert!(state.is_game_over());

        state.restart();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.lives, 3);
        assert_eq!(state.score, 0);
        assert_eq!(state.targets.live_count(), 0);
        assert!(state.builder.is_empty());
    }

    #[test]
    fn test_mode_switch_resets_builder() {
        let mut state = new_state(Settings::default());
        state.builder.select_number(3);
        state.apply_settings(Settings::default().with_long_equation(true));
        assert!(state.builder.is_empty());
        assert_eq!(state.builder.mode(), EquationMode::Long);
    }

    #[test]
    fn test_snapshot_json() {
        let mut state = new_state(Settings::default());
        spawn(&mut state);
        let snap = state.snapshot();
        assert_eq!(snap.tiles.len(), 15);
        assert_eq!(snap.targets.len(), 1);
        assert_eq!(snap.equation, "_ _ _ = ?");
        let json = snap.to_json().unwrap();
        assert!(json.contains("\"score\":0"));
    }
}
