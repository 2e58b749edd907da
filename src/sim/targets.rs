//! Falling targets
//!
//! The scheduler spawns targets on a jittered cadence up to a concurrency
//! cap, assigns goals and fall speeds, moves them each tick and reports the
//! ones that reach the floor.

use glam::Vec2;
use rand::Rng;
use rand::seq::{IndexedRandom, index};
use serde::{Deserialize, Serialize};

use super::equation::Operator;
use super::timer::DeadlineTimer;
use crate::settings::Difficulty;
use crate::tuning::Tuning;

/// Height at which a target is lost
pub const FLOOR_HEIGHT: f32 = 0.0;

/// A falling target carrying a goal value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub id: u32,
    pub goal: i64,
    /// x is the lateral lane, y the fall height above the floor
    pub pos: Vec2,
    pub fall_speed: f32,
}

impl Target {
    pub fn height(&self) -> f32 {
        self.pos.y
    }

    /// Move down by one step. Returns true once the floor is reached.
    fn fall(&mut self, dt: f32) -> bool {
        self.pos.y -= self.fall_speed * dt;
        self.pos.y <= FLOOR_HEIGHT
    }
}

/// Owns the target lifecycle
#[derive(Debug, Clone)]
pub struct TargetScheduler {
    targets: Vec<Target>,
    spawn_timer: DeadlineTimer,
    difficulty: Difficulty,
    tuning: Tuning,
    next_id: u32,
}

impl TargetScheduler {
    pub fn new<R: Rng>(rng: &mut R, tuning: &Tuning, difficulty: Difficulty) -> Self {
        let mut scheduler = Self {
            targets: Vec::new(),
            spawn_timer: DeadlineTimer::disarmed(),
            difficulty,
            tuning: tuning.clone(),
            next_id: 1,
        };
        scheduler.arm_spawn_timer(rng);
        scheduler
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn target(&self, id: u32) -> Option<&Target> {
        self.targets.iter().find(|t| t.id == id)
    }

    pub fn live_count(&self) -> usize {
        self.targets.len()
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Deduplicated, sorted goals of every live target
    pub fn live_goals(&self) -> Vec<i64> {
        let mut goals: Vec<i64> = self.targets.iter().map(|t| t.goal).collect();
        goals.sort_unstable();
        goals.dedup();
        goals
    }

    pub fn spawn_remaining(&self) -> f32 {
        self.spawn_timer.remaining()
    }

    fn arm_spawn_timer<R: Rng>(&mut self, rng: &mut R) {
        let delay = self.next_spawn_delay(rng);
        self.spawn_timer.restart_with(delay);
    }

    /// Base interval scaled by a random factor in `[1 - jitter, 1 + jitter]`
    pub fn next_spawn_delay<R: Rng>(&self, rng: &mut R) -> f32 {
        let jitter = self.tuning.spawn_jitter.clamp(0.0, 1.0);
        let factor = if jitter > 0.0 {
            rng.random_range((1.0 - jitter)..=(1.0 + jitter))
        } else {
            1.0
        };
        self.tuning.spawn_interval * factor
    }

    /// Difficulty base plus jitter, never below the minimum speed
    pub fn fall_speed<R: Rng>(&self, rng: &mut R) -> f32 {
        let jitter = self.tuning.fall_speed_jitter.abs();
        let offset = if jitter > 0.0 {
            rng.random_range(-jitter..=jitter)
        } else {
            0.0
        };
        (self.difficulty.base_fall_speed() + offset).max(self.tuning.min_fall_speed)
    }

    /// Switch difficulty and re-roll the speed of every live target
    pub fn set_difficulty<R: Rng>(&mut self, rng: &mut R, difficulty: Difficulty) -> bool {
        if difficulty == self.difficulty {
            return false;
        }
        self.difficulty = difficulty;
        for i in 0..self.targets.len() {
            let speed = self.fall_speed(rng);
            self.targets[i].fall_speed = speed;
        }
        log::info!(
            "Difficulty {} applied to {} live targets",
            difficulty.as_str(),
            self.targets.len()
        );
        true
    }

    /// Goal for a new target.
    ///
    /// Smart goals combine two of `numbers` with one of `operators` and are
    /// kept only if the result lands in `[min_goal, ceiling]`. Anything else
    /// falls back to a uniform draw from that range.
    pub fn generate_goal<R: Rng>(&self, rng: &mut R, numbers: &[i64], operators: &[Operator]) -> i64 {
        let min_goal = self.tuning.min_goal;
        let ceiling = self.tuning.goal_ceiling(self.difficulty);

        if self.tuning.smart_goals
            && numbers.len() >= 2
            && rng.random_bool(self.tuning.smart_goal_chance.clamp(0.0, 1.0) as f64)
        {
            let picks = index::sample(rng, numbers.len(), 2);
            if let Some(&op) = operators.choose(rng) {
                let value = op.apply(numbers[picks.index(0)], numbers[picks.index(1)]);
                if (min_goal..=ceiling).contains(&value) {
                    return value;
                }
                log::debug!("Rejected smart goal {} (range {}..={})", value, min_goal, ceiling);
            }
        }

        rng.random_range(min_goal..=ceiling)
    }

    /// Create a target at the top of the field
    pub fn spawn<R: Rng>(&mut self, rng: &mut R, numbers: &[i64], operators: &[Operator]) -> &Target {
        let goal = self.generate_goal(rng, numbers, operators);
        let fall_speed = self.fall_speed(rng);

        let (lo, hi) = self.tuning.spawn_offset;
        let offset = if lo < hi { rng.random_range(lo..hi) } else { lo };
        let half_width = self.tuning.field_half_width.abs();
        let x = if half_width > 0.0 {
            rng.random_range(-half_width..=half_width)
        } else {
            0.0
        };

        let id = self.next_id;
        self.next_id += 1;
        log::debug!("Spawned target {} goal={} speed={:.1}", id, goal, fall_speed);

        let index = self.targets.len();
        self.targets.push(Target {
            id,
            goal,
            pos: Vec2::new(x, self.tuning.field_height + offset),
            fall_speed,
        });
        &self.targets[index]
    }

    /// Advance the spawn cadence. On each deadline a target is spawned if
    /// there is room, and the next delay is drawn.
    pub fn advance_spawning<R: Rng>(
        &mut self,
        rng: &mut R,
        dt: f32,
        numbers: &[i64],
        operators: &[Operator],
    ) -> Option<Target> {
        if !self.spawn_timer.advance(dt) {
            return None;
        }
        self.arm_spawn_timer(rng);
        if self.targets.len() >= self.tuning.max_concurrent_targets {
            return None;
        }
        Some(self.spawn(rng, numbers, operators).clone())
    }

    /// Move every target. Targets reaching the floor are removed and returned.
    pub fn advance_motion(&mut self, dt: f32) -> Vec<Target> {
        let mut floored = Vec::new();
        let mut i = 0;
        while i < self.targets.len() {
            if self.targets[i].fall(dt) {
                floored.push(self.targets.remove(i));
            } else {
                i += 1;
            }
        }
        floored
    }

    /// Remove a matched target
    pub fn pop(&mut self, id: u32) -> Option<Target> {
        let index = self.targets.iter().position(|t| t.id == id)?;
        Some(self.targets.remove(index))
    }

    /// Drop all targets and restart the spawn cadence
    pub fn reset<R: Rng>(&mut self, rng: &mut R) {
        self.targets.clear();
        self.arm_spawn_timer(rng);
    }
}
