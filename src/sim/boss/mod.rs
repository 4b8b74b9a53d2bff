//! Boss state machines
//!
//! Two mutually exclusive boss variants behind one sum type. The outer
//! driver matches on the variant once per tick; each variant keeps its own
//! enumerated-state machine and bounding geometry.

pub mod gunner;
pub mod orbital;

pub use gunner::{GunnerAttack, GunnerBoss};
pub use orbital::{OrbitalBoss, WeaponKind, WeaponSocket, SOCKET_COUNT};

use glam::Vec2;
use rand_pcg::Pcg32;

use crate::audio::SoundCue;
use crate::tuning::Tuning;

use super::asteroid::Asteroid;
use super::effects::Particle;
use super::player::Player;
use super::pool::Pool;
use super::projectile::Projectile;
use super::state::RunStats;

/// Everything a boss may touch during its tick, borrowed disjointly from the
/// world
pub struct BossEnv<'w> {
    pub player: &'w mut Player,
    pub projectiles: &'w mut Pool<Projectile>,
    pub particles: &'w mut Pool<Particle>,
    pub asteroids: &'w mut Pool<Asteroid>,
    pub rng: &'w mut Pcg32,
    pub cues: &'w mut Vec<SoundCue>,
    pub stats: &'w mut RunStats,
    pub tuning: &'w Tuning,
    pub arena: Vec2,
    pub dt: f32,
}

/// The active boss for the current encounter
#[derive(Debug, Clone)]
pub enum Boss {
    Gunner(GunnerBoss),
    Orbital(OrbitalBoss),
}

/// Encounter order for a full run
pub const ROSTER_LEN: usize = 2;

impl Boss {
    /// Instantiate the roster entry for `index`, centered in the arena's
    /// upper half
    pub fn from_roster(index: usize, arena: Vec2, tuning: &Tuning) -> Option<Self> {
        let spawn = Vec2::new(arena.x / 2.0, arena.y / 4.0);
        match index {
            0 => Some(Boss::Gunner(GunnerBoss::new(spawn, &tuning.gunner))),
            1 => Some(Boss::Orbital(OrbitalBoss::new(spawn, &tuning.orbital))),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Boss::Gunner(_) => "VERMILION WARDEN",
            Boss::Orbital(_) => "CORONA CARRIER",
        }
    }

    pub fn position(&self) -> Vec2 {
        match self {
            Boss::Gunner(b) => b.pos,
            Boss::Orbital(b) => b.pos,
        }
    }

    pub fn health(&self) -> f32 {
        match self {
            Boss::Gunner(b) => b.health,
            Boss::Orbital(b) => b.health,
        }
    }

    pub fn max_health(&self, tuning: &Tuning) -> f32 {
        match self {
            Boss::Gunner(_) => tuning.gunner.max_health,
            Boss::Orbital(_) => tuning.orbital.max_health,
        }
    }

    pub fn health_fraction(&self, tuning: &Tuning) -> f32 {
        (self.health() / self.max_health(tuning)).clamp(0.0, 1.0)
    }

    pub fn is_dead(&self) -> bool {
        self.health() <= 0.0
    }

    /// One behavior tick; only called in fight mode
    pub fn update(&mut self, env: &mut BossEnv) {
        match self {
            Boss::Gunner(b) => gunner::update(b, env),
            Boss::Orbital(b) => orbital::update(b, env),
        }
    }

    /// Boss-specific projectile hit-testing, run after the asteroid and
    /// player passes so mutual destruction wins over boss damage
    pub fn collide_projectiles(&mut self, env: &mut BossEnv) {
        match self {
            Boss::Gunner(b) => gunner::collide_projectiles(b, env),
            Boss::Orbital(b) => orbital::collide_projectiles(b, env),
        }
    }

    /// Asteroid contact: push-apart always, damage only from player-launched
    /// bodies
    pub fn collide_asteroids(&mut self, env: &mut BossEnv) {
        match self {
            Boss::Gunner(b) => gunner::collide_asteroids(b, env),
            Boss::Orbital(b) => orbital::collide_asteroids(b, env),
        }
    }
}

/// Clamped damage intake shared by both variants. Health never goes
/// observable-negative; transition checks read the clamped value.
pub(crate) fn apply_damage(health: &mut f32, max: f32, damage: f32, cues: &mut Vec<SoundCue>) {
    *health = (*health - damage).clamp(0.0, max);
    cues.push(SoundCue::BossHurt);
}
