//! Per-frame simulation step
//!
//! Order within a tick: settings, target motion and floor hits, spawning,
//! tile pool reactions and timers, then player actions. A target that
//! reaches the floor is gone before any click on it is resolved.

use super::autoplay;
use super::state::{GameEvent, GamePhase, GameState};
use crate::settings::Settings;

/// One player action, applied in order after the simulation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    /// Click a tile slot by id
    SelectTile(u32),
    /// Test the current equation against a target by id
    Challenge(u32),
    /// Clear the equation
    ResetSelection,
    /// Regenerate every tile
    ResetTiles,
    /// Start over (the only action accepted after game over)
    Restart,
}

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Settings snapshot for this tick
    pub settings: Settings,
    pub actions: Vec<PlayerAction>,
    /// Let the built-in solver play
    pub autoplay: bool,
}

impl TickInput {
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }
}

/// Advance the game by `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.apply_settings(input.settings);

    if state.phase == GamePhase::GameOver {
        // Frozen: only a restart gets through
        if input.actions.contains(&PlayerAction::Restart) {
            state.restart();
        }
        return;
    }

    state.time_ticks += 1;

    // Motion first, so floor hits resolve before this tick's clicks
    for target in state.targets.advance_motion(dt) {
        state.target_reached_floor(&target);
    }
    if state.phase == GamePhase::GameOver {
        if input.actions.contains(&PlayerAction::Restart) {
            state.restart();
        }
        return;
    }

    let numbers = state.tiles.numbers();
    let operators = state.tiles.operators();
    if let Some(target) = state
        .targets
        .advance_spawning(&mut state.rng, dt, &numbers, &operators)
    {
        state.events.push(GameEvent::TargetSpawned {
            id: target.id,
            goal: target.goal,
        });
    }

    // Single snapshot of live goals for every tile reader this tick
    let goals = state.targets.live_goals();
    if state.tiles.observe_goals(&mut state.rng, &goals) {
        state.events.push(GameEvent::TilesRegenerated { full: false });
    }
    if state
        .tiles
        .advance_auto_reset(dt, state.settings.auto_reset_tiles)
    {
        log::info!("Auto-reset tiles");
        state.tiles.regenerate_all(&mut state.rng, &goals);
        state.events.push(GameEvent::TilesRegenerated { full: true });
        state.reset_selection();
    }
    state.tiles.advance_cooldowns(dt);

    let planned;
    let actions = if input.autoplay && input.actions.is_empty() {
        planned = if state.autoplay_timer.advance(dt) {
            state.autoplay_timer.restart();
            autoplay::plan(state)
        } else {
            Vec::new()
        };
        &planned
    } else {
        &input.actions
    };

    for action in actions {
        apply_action(state, *action);
    }
}

fn apply_action(state: &mut GameState, action: PlayerAction) {
    if state.phase == GamePhase::GameOver && action != PlayerAction::Restart {
        return;
    }
    match action {
        PlayerAction::SelectTile(id) => {
            state.select_tile(id);
        }
        PlayerAction::Challenge(id) => {
            state.challenge(id);
        }
        PlayerAction::ResetSelection => state.reset_selection(),
        PlayerAction::ResetTiles => state.reset_tiles(),
        PlayerAction::Restart => state.restart(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::tuning::Tuning;

    fn new_state() -> GameState {
        GameState::new(99999, Tuning::default(), Settings::default()).unwrap()
    }

    #[test]
    fn test_targets_spawn_over_time() {
        let mut state = new_state();
        let input = TickInput::default();
        for _ in 0..(6.0 / SIM_DT) as usize {
            tick(&mut state, &input, SIM_DT);
        }
        assert!(state.targets.live_count() >= 1);
        assert!(state
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::TargetSpawned { .. })));
    }

    #[test]
    fn test_game_over_freezes_time() {
        let mut state = new_state();
        let target = state.targets.spawn(&mut state.rng, &[], &[]).clone();
        for _ in 0..3 {
            state.target_reached_floor(&target);
        }
        let ticks = state.time_ticks;
        let spawn_left = state.targets.spawn_remaining();

        let input = TickInput::default();
        for _ in 0..1000 {
            tick(&mut state, &input, SIM_DT);
        }
        assert_eq!(state.time_ticks, ticks);
        assert_eq!(state.targets.spawn_remaining(), spawn_left);
    }

    #[test]
    fn test_restart_action_after_game_over() {
        let mut state = new_state();
        let target = state.targets.spawn(&mut state.rng, &[], &[]).clone();
        for _ in 0..3 {
            state.target_reached_floor(&target);
        }
        let input = TickInput {
            actions: vec![PlayerAction::Challenge(1), PlayerAction::Restart],
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_determinism() {
        let mut a = new_state();
        let mut b = new_state();
        let input = TickInput {
            autoplay: true,
            ..Default::default()
        };
        for _ in 0..3000 {
            tick(&mut a, &input, SIM_DT);
            tick(&mut b, &input, SIM_DT);
        }
        assert_eq!(a.score, b.score);
        assert_eq!(a.lives, b.lives);
        assert_eq!(a.targets.targets(), b.targets.targets());
        assert_eq!(a.events, b.events);
    }
}
