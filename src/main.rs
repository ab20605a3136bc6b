//! Skulk headless runner
//!
//! Plays a level against a seeded random input script and logs what the
//! simulation reports.

use std::path::PathBuf;

use clap::Parser;
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use skulk::consts::{MAX_FRAME_DT, SIM_DT};
use skulk::settings::{EnemySpawn, LadderZone, Region, Surface};
use skulk::sim::{FrameClock, GameEvent, GameState, LevelPhase, TickInput, tick};
use skulk::stage::Stage;
use skulk::{ConfigError, Facing, HudSnapshot, LevelData, Settings, logging};

/// Headless stealth-platformer session
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
    /// Tuning file (JSON)
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Level file (JSON); defaults to a built-in room
    #[arg(long)]
    level: Option<PathBuf>,
    /// Seed for the input script and frame timing
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Frames to run before giving up
    #[arg(long, default_value_t = 3000)]
    frames: u32,
}

fn demo_level() -> LevelData {
    let span = |y: f32, min_x: f32, max_x: f32| Surface { y, min_x, max_x };
    LevelData {
        player_spawn: Vec2::new(0.0, 0.75),
        enemies: vec![
            EnemySpawn {
                pos: Vec2::new(9.0, 0.75),
                start_direction: Facing::Left,
            },
            EnemySpawn {
                pos: Vec2::new(-12.0, 0.75),
                start_direction: Facing::Right,
            },
        ],
        ladders: vec![LadderZone {
            center_x: 4.0,
            half_width: 0.5,
            bottom: 0.0,
            top: 3.5,
        }],
        floors: vec![span(0.0, -20.0, 20.0)],
        ceilings: vec![span(4.0, -16.0, 16.0)],
        hazards: vec![Region {
            center: Vec2::new(0.0, -6.0),
            size: Vec2::new(80.0, 4.0),
        }],
    }
}

/// Random button mashing, held for a few frames at a time
struct InputScript {
    rng: Pcg32,
    held: TickInput,
    frames_left: u32,
}

impl InputScript {
    fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            held: TickInput::default(),
            frames_left: 0,
        }
    }

    fn next(&mut self) -> TickInput {
        if self.frames_left > 0 {
            self.frames_left -= 1;
            // Buttons are edges; only axes stay held
            return TickInput {
                attack: false,
                interact: false,
                ..self.held.clone()
            };
        }
        let axis = |rng: &mut Pcg32| [-1.0, 0.0, 0.0, 1.0][rng.random_range(0..4)];
        self.held = TickInput {
            horizontal: axis(&mut self.rng),
            vertical: axis(&mut self.rng),
            attack: self.rng.random_bool(0.08),
            interact: self.rng.random_bool(0.05),
        };
        self.frames_left = self.rng.random_range(5..40);
        self.held.clone()
    }

    /// Jittery frame times between 30 and 120 fps
    fn frame_dt(&mut self) -> f32 {
        self.rng.random_range(1.0 / 120.0..1.0 / 30.0)
    }
}

fn report(event: &GameEvent) {
    match event {
        GameEvent::Scene(change) => log::info!("Scene change: {change:?}"),
        GameEvent::PlayerDied(cause) => log::info!("Player died: {cause:?}"),
        GameEvent::EnemyDied(id) => log::info!("Archer {id} died"),
        other => log::debug!("{other:?}"),
    }
}

fn run(args: &Args) -> Result<(), ConfigError> {
    let settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let level = match &args.level {
        Some(path) => LevelData::load(path)?,
        None => demo_level(),
    };

    let mut state = GameState::new(settings, &level);
    let mut stage = Stage::new(&level);
    let mut clock = FrameClock::new();
    let mut script = InputScript::new(args.seed);

    let mut frames = 0;
    while frames < args.frames && state.phase == LevelPhase::Playing {
        let input = script.next();
        let frame_dt = script.frame_dt().min(MAX_FRAME_DT);

        for _ in 0..clock.advance(frame_dt) {
            stage.substep(&mut state, &input, SIM_DT);
        }
        tick(&mut state, &input, frame_dt);

        for event in state.drain_events() {
            report(&event);
        }
        frames += 1;
    }

    let hud = HudSnapshot::capture(&state);
    log::info!(
        "Finished after {frames} frames ({:.1}s): {:?}, stamina {:.2}/{:.2}, {} archers left",
        state.elapsed,
        hud.phase,
        hud.stamina,
        hud.max_stamina,
        hud.living_enemies
    );
    Ok(())
}

fn main() {
    let args = Args::parse();
    logging::init(args.verbose);
    log::info!("Skulk starting (seed {})", args.seed);

    if let Err(err) = run(&args) {
        log::error!("{err}");
        std::process::exit(1);
    }
}
