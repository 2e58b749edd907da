//! Bubble Math headless driver
//!
//! Runs the simulation with the built-in solver at a fixed timestep and logs
//! what happens. Useful for balance checks; set `RUST_LOG=debug` for detail.
//!
//! Usage: `bubble-math [--seed N] [--frames N] [--difficulty low|medium|high]
//! [--long] [--no-auto-reset] [--tuning FILE]`

use std::process::ExitCode;

use bubble_math::consts::*;
use bubble_math::sim::{GameEvent, GameState, TickInput, tick};
use bubble_math::{Difficulty, Settings, Tuning};

/// Frame length of the simulated display
const FRAME_DT: f32 = 1.0 / 30.0;

struct Options {
    seed: u64,
    frames: u64,
    settings: Settings,
    tuning_path: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            seed: 1,
            frames: 30 * 60 * 5,
            settings: Settings::default(),
            tuning_path: None,
        }
    }
}

fn parse_args() -> Result<Options, String> {
    let mut opts = Options::default();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--seed" => {
                let v = args.next().ok_or("--seed needs a value")?;
                opts.seed = v.parse().map_err(|_| format!("bad seed: {}", v))?;
            }
            "--frames" => {
                let v = args.next().ok_or("--frames needs a value")?;
                opts.frames = v.parse().map_err(|_| format!("bad frame count: {}", v))?;
            }
            "--difficulty" => {
                let v = args.next().ok_or("--difficulty needs a value")?;
                let d = Difficulty::from_str(&v).ok_or(format!("unknown difficulty: {}", v))?;
                opts.settings = opts.settings.with_difficulty(d);
            }
            "--long" => opts.settings = opts.settings.with_long_equation(true),
            "--no-auto-reset" => opts.settings = opts.settings.with_auto_reset_tiles(false),
            "--tuning" => {
                opts.tuning_path = Some(args.next().ok_or("--tuning needs a path")?);
            }
            other => return Err(format!("unknown argument: {}", other)),
        }
    }
    Ok(opts)
}

/// Fixed-timestep runner
struct Game {
    state: GameState,
    input: TickInput,
    accumulator: f32,
}

impl Game {
    fn update(&mut self, dt: f32) {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut self.state, &self.input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }

        for event in self.state.drain_events() {
            match event {
                GameEvent::TargetSpawned { id, goal } => {
                    log::debug!("target {} spawned: = {}", id, goal)
                }
                GameEvent::ChallengeCorrect { target, points } => {
                    log::info!("target {} popped (+{}) score={}", target, points, self.state.score)
                }
                GameEvent::ChallengeIncorrect { target, penalty } => {
                    log::info!("target {} missed (-{}) score={}", target, penalty, self.state.score)
                }
                GameEvent::LifeLost { remaining } => log::warn!("life lost, {} left", remaining),
                other => log::trace!("{:?}", other),
            }
        }
    }
}

fn main() -> ExitCode {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    let opts = match parse_args() {
        Ok(opts) => opts,
        Err(msg) => {
            eprintln!("{}", msg);
            return ExitCode::from(2);
        }
    };

    let tuning = match &opts.tuning_path {
        Some(path) => match std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|json| Tuning::from_json(&json).map_err(|e| e.to_string()))
        {
            Ok(tuning) => tuning,
            Err(msg) => {
                log::error!("Failed to load tuning from {}: {}", path, msg);
                return ExitCode::FAILURE;
            }
        },
        None => Tuning::default(),
    };

    let state = match GameState::new(opts.seed, tuning, opts.settings) {
        Ok(state) => state,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    log::info!("Bubble Math (headless) starting, seed {}", opts.seed);
    let mut game = Game {
        state,
        input: TickInput {
            settings: opts.settings,
            autoplay: true,
            ..Default::default()
        },
        accumulator: 0.0,
    };

    let mut frame = 0;
    while frame < opts.frames && !game.state.is_game_over() {
        game.update(FRAME_DT);
        frame += 1;
    }

    let snapshot = game.state.snapshot();
    println!(
        "frames={} score={} lives={} phase={:?}",
        frame, snapshot.score, snapshot.lives, snapshot.phase
    );
    match snapshot.to_json() {
        Ok(json) => log::debug!("final snapshot: {}", json),
        Err(e) => log::warn!("snapshot serialization failed: {}", e),
    }
    ExitCode::SUCCESS
}
