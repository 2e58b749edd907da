//! Built-in solver for demo/idle play
//!
//! Looks for a two-number equation on the current tiles that matches the
//! lowest target it can solve. Plays at a human-ish pace; see
//! `AUTOPLAY_INTERVAL`.

use super::equation::Operator;
use super::state::GameState;
use super::tick::PlayerAction;
use super::tiles::TileContent;

/// Below this share of the field height an unsolvable target triggers a tile reset
const PANIC_HEIGHT_FRACTION: f32 = 0.25;

/// Tile ids `(lhs, op, rhs)` forming `lhs op rhs == goal`
pub fn find_equation(state: &GameState, goal: i64) -> Option<(u32, u32, u32)> {
    let mut numbers: Vec<(u32, i64)> = Vec::new();
    let mut operators: Vec<(u32, Operator)> = Vec::new();
    for tile in state.tiles.active_tiles().filter(|t| t.interactable) {
        match tile.content {
            Some(TileContent::Number(n)) => numbers.push((tile.id, n)),
            Some(TileContent::Operator(op)) => operators.push((tile.id, op)),
            None => {}
        }
    }

    for &(lhs_id, lhs) in &numbers {
        for &(rhs_id, rhs) in &numbers {
            if lhs_id == rhs_id {
                continue;
            }
            if let Some(&(op_id, _)) = operators.iter().find(|(_, op)| op.apply(lhs, rhs) == goal) {
                return Some((lhs_id, op_id, rhs_id));
            }
        }
    }
    None
}

/// Actions for one autoplay move
pub fn plan(state: &GameState) -> Vec<PlayerAction> {
    let mut targets: Vec<_> = state.targets.targets().iter().collect();
    targets.sort_by(|a, b| a.height().total_cmp(&b.height()));

    for target in &targets {
        if let Some((lhs, op, rhs)) = find_equation(state, target.goal) {
            return vec![
                PlayerAction::ResetSelection,
                PlayerAction::SelectTile(lhs),
                PlayerAction::SelectTile(op),
                PlayerAction::SelectTile(rhs),
                PlayerAction::Challenge(target.id),
            ];
        }
    }

    let panic_height = state.tuning().field_height * PANIC_HEIGHT_FRACTION;
    match targets.first() {
        Some(lowest) if lowest.height() < panic_height => vec![PlayerAction::ResetTiles],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::state::ChallengeOutcome;
    use crate::tuning::Tuning;

    #[test]
    fn test_found_equation_is_correct() {
        let mut state = GameState::new(7, Tuning::default(), Settings::default()).unwrap();
        let numbers = state.tiles.numbers();
        let operators = state.tiles.operators();
        let target = state
            .targets
            .spawn(&mut state.rng, &numbers, &operators)
            .clone();

        if let Some((lhs, op, rhs)) = find_equation(&state, target.goal) {
            assert!(state.select_tile(lhs));
            assert!(state.select_tile(op));
            assert!(state.select_tile(rhs));
            assert!(matches!(
                state.challenge(target.id),
                ChallengeOutcome::Correct { .. }
            ));
        }
    }

    #[test]
    fn test_no_targets_no_plan() {
        let state = GameState::new(7, Tuning::default(), Settings::default()).unwrap();
        assert!(plan(&state).is_empty());
    }
}
