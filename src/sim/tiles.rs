//! Tile pool and content generation
//!
//! The pool owns a fixed superset of tile slots. A subset is active at any
//! time; regeneration rewrites content in place so slot identity survives.
//! Content is biased toward live target goals so the board stays solvable.

use rand::Rng;
use rand::seq::{IndexedRandom, index};
use serde::{Deserialize, Serialize};

use super::equation::Operator;
use super::timer::DeadlineTimer;
use crate::error::ConfigError;
use crate::tuning::{MAX_NUMBER_SPAN, Tuning};

/// Share of active tiles the mix controller steers toward being numbers
pub const TARGET_NUMBER_RATIO: f32 = 0.7;

/// What a tile shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileContent {
    Number(i64),
    Operator(Operator),
}

impl TileContent {
    pub fn is_number(&self) -> bool {
        matches!(self, TileContent::Number(_))
    }

    pub fn label(&self) -> String {
        match self {
            TileContent::Number(n) => n.to_string(),
            TileContent::Operator(op) => op.symbol().to_string(),
        }
    }
}

/// A selectable tile slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    pub id: u32,
    /// `None` while the slot is hidden
    pub content: Option<TileContent>,
    pub interactable: bool,
    /// Re-enables the tile after a selection
    #[serde(skip, default = "DeadlineTimer::disarmed")]
    cooldown: DeadlineTimer,
}

impl Tile {
    fn new(id: u32) -> Self {
        Self {
            id,
            content: None,
            interactable: false,
            cooldown: DeadlineTimer::disarmed(),
        }
    }

    fn hide(&mut self) {
        self.content = None;
        self.interactable = false;
        self.cooldown.disarm();
    }

    fn set_content(&mut self, content: TileContent) {
        self.content = Some(content);
        self.interactable = true;
        self.cooldown.disarm();
    }

    pub fn is_number(&self) -> bool {
        self.content.is_some_and(|c| c.is_number())
    }

    pub fn is_operator(&self) -> bool {
        self.content.is_some_and(|c| !c.is_number())
    }
}

/// Mix controller: probability the next tile is a number.
///
/// Steers toward [`TARGET_NUMBER_RATIO`] with a coarse high/low response and
/// forces the missing category whenever one side is empty.
pub fn number_probability(numbers: usize, operators: usize) -> f32 {
    match (numbers, operators) {
        (0, 0) => TARGET_NUMBER_RATIO,
        (_, 0) => 0.2,
        (0, _) => 0.9,
        _ => {
            let ratio = numbers as f32 / (numbers + operators) as f32;
            if ratio < TARGET_NUMBER_RATIO { 0.8 } else { 0.2 }
        }
    }
}

/// Produces tile contents from a number range and operator set
#[derive(Debug, Clone, PartialEq)]
pub struct TileContentGenerator {
    pub min_number: i64,
    pub max_number: i64,
    pub operators: Vec<Operator>,
}

impl TileContentGenerator {
    pub fn new(min_number: i64, max_number: i64, operators: Vec<Operator>) -> Result<Self, ConfigError> {
        if operators.is_empty() {
            return Err(ConfigError::NoOperators);
        }
        if min_number > max_number {
            return Err(ConfigError::InvertedNumberRange {
                min: min_number,
                max: max_number,
            });
        }
        Ok(Self {
            min_number,
            max_number,
            operators,
        })
    }

    /// Results outside `[0, 2 * max_number]` never count as reaching a goal
    fn reasonable(&self, value: i64) -> bool {
        (0..=self.max_number.saturating_mul(2)).contains(&value)
    }

    /// Every in-range number that can reach `goal` with one operator and one
    /// other in-range number, on either side of the operator.
    ///
    /// The partner is solved for directly, so the cost is linear in the
    /// range size.
    pub fn helpful_numbers(&self, goal: i64) -> Vec<i64> {
        if !self.reasonable(goal) {
            return Vec::new();
        }
        (self.min_number..=self.max_number)
            .filter(|&n| self.operators.iter().any(|&op| self.has_partner(op, n, goal)))
            .collect()
    }

    fn in_range(&self, value: i128) -> bool {
        (self.min_number as i128..=self.max_number as i128).contains(&value)
    }

    /// True if the range intersects `[lo, hi]`
    fn overlaps(&self, lo: i128, hi: i128) -> bool {
        lo <= hi && lo <= self.max_number as i128 && hi >= self.min_number as i128
    }

    /// Whether some in-range `other` gives `n op other == goal` or
    /// `other op n == goal`
    fn has_partner(&self, op: Operator, n: i64, goal: i64) -> bool {
        let (n, g) = (n as i128, goal as i128);
        match op {
            Operator::Add => self.in_range(g - n),
            Operator::Sub => self.in_range(n - g) || self.in_range(g + n),
            Operator::Mul => {
                if n == 0 {
                    g == 0
                } else {
                    g % n == 0 && self.in_range(g / n)
                }
            }
            Operator::Div => self.divides_to(n, g) || self.divided_to(n, g),
        }
    }

    /// Some in-range `d` with `n / d == g`
    fn divides_to(&self, n: i128, g: i128) -> bool {
        // Division by zero leaves the dividend
        if n == g && self.in_range(0) {
            return true;
        }
        let a = n.abs();
        if g == 0 {
            // Any divisor larger in magnitude truncates to zero
            return self.overlaps(a + 1, i128::MAX) || self.overlaps(i128::MIN, -(a + 1));
        }
        if n == 0 {
            return false;
        }
        // |n| / |d| == |g|  <=>  |n| / (|g| + 1) < |d| <= |n| / |g|
        let b = g.abs();
        let (lo, hi) = (a / (b + 1) + 1, a / b);
        if lo > hi {
            return false;
        }
        if (n < 0) == (g < 0) {
            self.overlaps(lo, hi)
        } else {
            self.overlaps(-hi, -lo)
        }
    }

    /// Some in-range `x` with `x / n == g`
    fn divided_to(&self, n: i128, g: i128) -> bool {
        if n == 0 {
            return self.in_range(g);
        }
        let span = n.abs() - 1;
        if g == 0 {
            return self.overlaps(-span, span);
        }
        let base = g * n;
        if base > 0 {
            self.overlaps(base, base + span)
        } else {
            self.overlaps(base - span, base)
        }
    }

    pub fn random_number<R: Rng>(&self, rng: &mut R) -> i64 {
        rng.random_range(self.min_number..=self.max_number)
    }

    pub fn random_operator<R: Rng>(&self, rng: &mut R) -> Operator {
        self.operators.choose(rng).copied().unwrap_or(Operator::Add)
    }

    /// Content biased toward one of `goals`. Falls back to random content
    /// when there are no goals or no number reaches the chosen goal.
    pub fn helpful<R: Rng>(&self, rng: &mut R, goals: &[i64], p_number: f32) -> TileContent {
        let Some(&goal) = goals.choose(rng) else {
            return self.random(rng, p_number);
        };
        if !rng.random_bool(p_number.clamp(0.0, 1.0) as f64) {
            return TileContent::Operator(self.random_operator(rng));
        }
        let candidates = self.helpful_numbers(goal);
        match candidates.choose(rng) {
            Some(&n) => TileContent::Number(n),
            None => {
                log::debug!("No helpful number for goal {}, using random", goal);
                TileContent::Number(self.random_number(rng))
            }
        }
    }

    /// Uniform content, split between numbers and operators by `p_number`
    pub fn random<R: Rng>(&self, rng: &mut R, p_number: f32) -> TileContent {
        if rng.random_bool(p_number.clamp(0.0, 1.0) as f64) {
            TileContent::Number(self.random_number(rng))
        } else {
            TileContent::Operator(self.random_operator(rng))
        }
    }

    /// One tile: helpful with probability `helpful_chance` when goals exist,
    /// random otherwise.
    pub fn generate<R: Rng>(
        &self,
        rng: &mut R,
        goals: &[i64],
        helpful_chance: f32,
        p_number: f32,
    ) -> TileContent {
        let helpful = !goals.is_empty() && rng.random_bool(helpful_chance.clamp(0.0, 1.0) as f64);
        if helpful {
            self.helpful(rng, goals, p_number)
        } else {
            self.random(rng, p_number)
        }
    }
}

/// Sorted, deduplicated copy of `goals`
fn goal_set(goals: &[i64]) -> Vec<i64> {
    let mut set = goals.to_vec();
    set.sort_unstable();
    set.dedup();
    set
}

/// Owns tile content: which slots are active and what they show
#[derive(Debug, Clone)]
pub struct TilePool {
    tiles: Vec<Tile>,
    /// Indices into `tiles`, in activation order
    active: Vec<usize>,
    generator: TileContentGenerator,
    visible: usize,
    helpful_chance: f32,
    partial_chance: f32,
    partial_count: (usize, usize),
    partial_helpful_chance: f32,
    cooldown: f32,
    /// Live goals seen on the previous observation, sorted and deduplicated
    goals: Vec<i64>,
    auto_reset: DeadlineTimer,
    auto_reset_enabled: bool,
}

impl TilePool {
    pub fn new(tuning: &Tuning, operators: Vec<Operator>) -> Result<Self, ConfigError> {
        if tuning.tile_superset == 0 {
            return Err(ConfigError::EmptyTileSuperset);
        }
        if tuning.visible_tiles == 0 {
            return Err(ConfigError::NoVisibleTiles);
        }
        let generator = TileContentGenerator::new(tuning.min_number, tuning.max_number, operators)?;
        let tiles = (0..tuning.tile_superset as u32).map(Tile::new).collect();

        Ok(Self {
            tiles,
            active: Vec::new(),
            generator,
            visible: tuning.visible_tiles,
            helpful_chance: tuning.helpful_chance.clamp(0.0, 1.0),
            partial_chance: tuning.partial_regen_chance.clamp(0.0, 1.0),
            partial_count: tuning.partial_regen_count,
            partial_helpful_chance: tuning.partial_regen_helpful_chance.clamp(0.0, 1.0),
            cooldown: tuning.tile_cooldown,
            goals: Vec::new(),
            auto_reset: DeadlineTimer::new(tuning.auto_reset_interval),
            auto_reset_enabled: true,
        })
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, id: u32) -> Option<&Tile> {
        self.tiles.get(id as usize)
    }

    pub fn active_tiles(&self) -> impl Iterator<Item = &Tile> {
        self.active.iter().map(|&i| &self.tiles[i])
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// (numbers, operators) among active tiles
    pub fn mix(&self) -> (usize, usize) {
        let numbers = self.active_tiles().filter(|t| t.is_number()).count();
        (numbers, self.active.len() - numbers)
    }

    /// Values on active number tiles
    pub fn numbers(&self) -> Vec<i64> {
        self.active_tiles()
            .filter_map(|t| match t.content {
                Some(TileContent::Number(n)) => Some(n),
                _ => None,
            })
            .collect()
    }

    /// Operators on active operator tiles
    pub fn operators(&self) -> Vec<Operator> {
        self.active_tiles()
            .filter_map(|t| match t.content {
                Some(TileContent::Operator(op)) => Some(op),
                _ => None,
            })
            .collect()
    }

    pub fn generator(&self) -> &TileContentGenerator {
        &self.generator
    }

    pub fn helpful_chance(&self) -> f32 {
        self.helpful_chance
    }

    /// Goals the pool last reacted to
    pub fn observed_goals(&self) -> &[i64] {
        &self.goals
    }

    pub fn auto_reset_remaining(&self) -> f32 {
        self.auto_reset.remaining()
    }

    /// Replace the operator set (e.g. after a difficulty change). Takes effect
    /// on the next regeneration.
    pub fn set_operators(&mut self, operators: Vec<Operator>) {
        if operators.is_empty() {
            log::warn!("Ignoring empty operator set");
            return;
        }
        self.generator.operators = operators;
    }

    /// Change the active slot count (clamped to the superset) and regenerate
    pub fn set_visible_tile_count<R: Rng>(&mut self, rng: &mut R, count: usize, goals: &[i64]) {
        self.visible = count.clamp(1, self.tiles.len());
        self.regenerate_all(rng, goals);
    }

    /// Change the number range and regenerate. Inverted ranges are swapped
    /// and the span is capped at `MAX_NUMBER_SPAN`.
    pub fn set_number_range<R: Rng>(&mut self, rng: &mut R, min: i64, max: i64, goals: &[i64]) {
        let (min, max) = (min.min(max), min.max(max));
        let capped = max.min(min.saturating_add(MAX_NUMBER_SPAN));
        if capped != max {
            log::warn!("Number range {}..={} capped to {}..={}", min, max, min, capped);
        }
        self.generator.min_number = min;
        self.generator.max_number = capped;
        self.regenerate_all(rng, goals);
    }

    pub fn set_helpful_chance<R: Rng>(&mut self, rng: &mut R, chance: f32, goals: &[i64]) {
        self.helpful_chance = chance.clamp(0.0, 1.0);
        self.regenerate_all(rng, goals);
    }

    /// Pick a fresh active subset and rewrite every active tile.
    ///
    /// At most `round(active * helpful_chance)` tiles take the helpful path.
    pub fn regenerate_all<R: Rng>(&mut self, rng: &mut R, goals: &[i64]) {
        for tile in &mut self.tiles {
            tile.hide();
        }

        let count = self.visible.min(self.tiles.len());
        self.active = index::sample(rng, self.tiles.len(), count).into_vec();
        self.active.sort_unstable();

        let max_helpful = (count as f32 * self.helpful_chance).round() as usize;
        let mut helpful_used = 0;
        let (mut numbers, mut operators) = (0, 0);

        for &slot in &self.active {
            let p_number = number_probability(numbers, operators);
            let helpful = helpful_used < max_helpful
                && !goals.is_empty()
                && rng.random_bool(self.helpful_chance as f64);
            let content = if helpful {
                helpful_used += 1;
                self.generator.helpful(rng, goals, p_number)
            } else {
                self.generator.random(rng, p_number)
            };
            if content.is_number() {
                numbers += 1;
            } else {
                operators += 1;
            }
            self.tiles[slot].set_content(content);
        }

        self.enforce_mix_minimum(rng);
        self.goals = goal_set(goals);
        self.auto_reset.restart();
        log::info!(
            "Regenerated {} tiles ({} helpful, {} numbers)",
            count,
            helpful_used,
            self.mix().0
        );
    }

    /// Rewrite a few random active tiles, mostly helpful
    pub fn regenerate_some<R: Rng>(&mut self, rng: &mut R, goals: &[i64]) -> usize {
        let (lo, hi) = self.partial_count;
        let wanted = rng.random_range(lo..=hi.max(lo));
        let count = wanted.min(self.active.len());
        let picks: Vec<usize> = self
            .active
            .choose_multiple(rng, count)
            .copied()
            .collect();

        for slot in &picks {
            let (numbers, operators) = self.mix_excluding(*slot);
            let p_number = number_probability(numbers, operators);
            let content =
                self.generator
                    .generate(rng, goals, self.partial_helpful_chance, p_number);
            self.tiles[*slot].set_content(content);
        }

        self.enforce_mix_minimum(rng);
        log::debug!("Regenerated {} tiles after goal change", count);
        count
    }

    fn mix_excluding(&self, slot: usize) -> (usize, usize) {
        let mut numbers = 0;
        let mut operators = 0;
        for &i in self.active.iter().filter(|&&i| i != slot) {
            if self.tiles[i].is_number() {
                numbers += 1;
            } else if self.tiles[i].is_operator() {
                operators += 1;
            }
        }
        (numbers, operators)
    }

    /// With two or more active tiles, guarantee at least one number and one operator
    fn enforce_mix_minimum<R: Rng>(&mut self, rng: &mut R) {
        if self.active.len() < 2 {
            return;
        }
        let (numbers, operators) = self.mix();
        let forced = if numbers == 0 {
            TileContent::Number(self.generator.random_number(rng))
        } else if operators == 0 {
            TileContent::Operator(self.generator.random_operator(rng))
        } else {
            return;
        };
        if let Some(&slot) = self.active.choose(rng) {
            self.tiles[slot].set_content(forced);
        }
    }

    /// React to the current live goal set. Returns true when tiles were regenerated.
    ///
    /// Only a change in the deduplicated set counts; a change triggers a
    /// partial regeneration with `partial_regen_chance` while auto-reset is on.
    pub fn observe_goals<R: Rng>(&mut self, rng: &mut R, goals: &[i64]) -> bool {
        let sorted = goal_set(goals);
        if sorted == self.goals {
            return false;
        }
        log::debug!("Live goals changed: {:?} -> {:?}", self.goals, sorted);
        self.goals = sorted;

        if self.auto_reset_enabled && rng.random_bool(self.partial_chance as f64) {
            let goals = self.goals.clone();
            self.regenerate_some(rng, &goals) > 0
        } else {
            false
        }
    }

    /// Update the auto-reset flag and advance its timer. Returns true when a
    /// full reset is due. Turning the flag on restarts the timer.
    pub fn advance_auto_reset(&mut self, dt: f32, enabled: bool) -> bool {
        if enabled != self.auto_reset_enabled {
            self.auto_reset_enabled = enabled;
            log::info!("Auto-reset tiles: {}", enabled);
            if enabled {
                self.auto_reset.restart();
            }
        }
        enabled && self.auto_reset.advance(dt)
    }

    /// Take a tile's content for the equation. Inactive, hidden or cooling
    /// tiles yield nothing.
    pub fn select(&mut self, id: u32) -> Option<TileContent> {
        let slot = id as usize;
        if !self.active.contains(&slot) {
            return None;
        }
        let tile = self.tiles.get_mut(slot)?;
        if !tile.interactable {
            return None;
        }
        let content = tile.content?;
        tile.interactable = false;
        tile.cooldown.restart_with(self.cooldown);
        Some(content)
    }

    /// Advance per-tile selection cooldowns
    pub fn advance_cooldowns(&mut self, dt: f32) {
        for &slot in &self.active {
            let tile = &mut self.tiles[slot];
            if tile.cooldown.advance(dt) && tile.content.is_some() {
                tile.interactable = true;
            }
        }
    }
}
