//! World state and the game-mode enumeration
//!
//! Every mutable thing the simulation touches hangs off the single [`World`]
//! struct passed explicitly into every update function; there are no ambient
//! globals. The renderer reads the world only after a tick has fully
//! completed.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::audio::SoundCue;
use crate::consts;
use crate::tuning::Tuning;

use super::asteroid::Asteroid;
use super::boss::Boss;
use super::effects::{DashTrail, Particle, ThrusterTrail};
use super::player::Player;
use super::pool::Pool;
use super::projectile::Projectile;

/// Sub-stages of the boss introduction sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntroStage {
    /// Camera flies from the player toward the boss
    Beginning,
    /// Camera holds on the boss while the arena border reveals
    Focus,
    /// Boss name card, on a countdown
    Info,
}

/// Top-level game mode. Exactly one is active; the transition helpers in
/// `tick` are the only mutators, and most subsystems no-op unless the mode
/// matches their expected range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    Menu,
    Tutorial,
    Intro(IntroStage),
    Fight,
    BossDead,
    PlayerDead,
    Stats,
}

/// What the renderer should frame
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Camera {
    pub pos: Vec2,
    pub zoom: f32,
}

impl Camera {
    pub fn centered_on(pos: Vec2) -> Self {
        Self { pos, zoom: 1.0 }
    }

    /// Exponential approach toward a target framing
    pub fn approach(&mut self, target: Vec2, zoom: f32, rate: f32, dt: f32) {
        let t = (rate * dt).min(1.0);
        self.pos = self.pos.lerp(target, t);
        self.zoom += (zoom - self.zoom) * t;
    }
}

/// Per-run counters surfaced on the stats screen
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RunStats {
    pub ticks: u64,
    pub shots_fired: u64,
    pub damage_dealt: f32,
    pub damage_taken: f32,
    pub dashes: u32,
    pub asteroids_launched: u32,
    pub bosses_defeated: u32,
}

/// Input milestones the tutorial waits for
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TutorialProgress {
    pub moved: bool,
    pub fired: bool,
    pub dashed: bool,
}

impl TutorialProgress {
    pub fn complete(&self) -> bool {
        self.moved && self.fired && self.dashed
    }
}

/// The whole mutable simulation state, exclusively owned by the tick
/// function for the duration of a tick
pub struct World {
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,

    pub mode: GameMode,
    /// Freeze flag layered over Tutorial/Fight; not a mode of its own
    pub paused: bool,
    /// Outcome of the last encounter, read by the stats screen to route
    /// onward
    pub encounter_won: bool,
    /// Generic countdown for timed modes (Info card, death pauses)
    pub mode_timer: f32,
    /// Arena-border reveal factor driven by the intro, 0..1
    pub intro_reveal: f32,
    pub tick_count: u64,

    pub camera: Camera,
    pub player: Player,
    pub boss: Option<Boss>,
    /// Next roster entry to introduce
    pub boss_index: usize,

    pub projectiles: Pool<Projectile>,
    pub particles: Pool<Particle>,
    pub asteroids: Pool<Asteroid>,
    pub thruster_trails: Pool<ThrusterTrail>,
    pub dash_trails: Pool<DashTrail>,

    /// Sound cues emitted this tick, drained by the embedding layer
    pub cues: Vec<SoundCue>,
    pub stats: RunStats,
    pub tutorial: TutorialProgress,
    /// Highlighted entry on the title screen
    pub menu_focus: usize,
}

impl World {
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let player_spawn = Self::player_spawn();

        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            player: Player::new(player_spawn, &tuning.player),
            tuning,
            mode: GameMode::Menu,
            paused: false,
            encounter_won: false,
            mode_timer: 0.0,
            intro_reveal: 0.0,
            tick_count: 0,
            camera: Camera::centered_on(player_spawn),
            boss: None,
            boss_index: 0,
            projectiles: Pool::new(consts::MAX_PROJECTILES),
            particles: Pool::new(consts::MAX_PARTICLES),
            asteroids: Pool::new(consts::MAX_ASTEROIDS),
            thruster_trails: Pool::new(consts::MAX_THRUSTER_TRAILS),
            dash_trails: Pool::new(consts::MAX_DASH_TRAILS),
            cues: Vec::new(),
            stats: RunStats::default(),
            tutorial: TutorialProgress::default(),
            menu_focus: 0,
        }
    }

    pub fn arena() -> Vec2 {
        Vec2::new(consts::ARENA_WIDTH, consts::ARENA_HEIGHT)
    }

    pub fn player_spawn() -> Vec2 {
        let arena = Self::arena();
        Vec2::new(arena.x / 2.0, arena.y - arena.y / 6.0)
    }
}
