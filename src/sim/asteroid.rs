//! Free-floating asteroid bodies
//!
//! Asteroids drift for the whole encounter. A dash shoves one onto a
//! boss-bound trajectory (`launched_by_player`), which is the only thing
//! that authorizes it to damage a boss; a wall bounce cools that back off.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::audio::SoundCue;
use crate::consts;
use crate::tuning::AsteroidTuning;
use crate::{angle_between, bearing_to_vec};

use super::effects::{self, Particle};
use super::geom::{self, Circle};
use super::player::Player;
use super::pool::{Pool, PoolSlot};

/// One asteroid slot
#[derive(Debug, Clone, Default)]
pub struct Asteroid {
    pub active: bool,
    /// Index into the immutable shape descriptor table
    pub shape_index: usize,
    pub pos: Vec2,
    pub vel: Vec2,
    pub angle_deg: f32,
    /// Angular velocity, degrees per second
    pub spin_deg: f32,
    pub scale: f32,
    pub launched_by_player: bool,
    /// World-space bounding-circle cluster, recomputed from the descriptor
    /// every tick (rotated by the body angle, uniformly scaled)
    pub world_circles: Vec<Circle>,
}

impl PoolSlot for Asteroid {
    fn is_active(&self) -> bool {
        self.active
    }
}

impl Asteroid {
    /// Rebuild the world-space cluster from the relative descriptor
    pub fn refresh_world_circles(&mut self, tuning: &AsteroidTuning) {
        let shape = &tuning.shapes[self.shape_index];
        self.world_circles.clear();
        self.world_circles.extend(
            shape
                .circles
                .iter()
                .map(|c| c.transformed(self.angle_deg, self.scale).offset(self.pos)),
        );
    }

    /// Circle test against the whole cluster
    pub fn hit_test_circle(&self, center: Vec2, radius: f32) -> bool {
        self.world_circles
            .iter()
            .any(|c| geom::circles_overlap(c.center, c.radius, center, radius))
    }

    /// Single-circle stand-in for penetration resolution
    pub fn bounding_radius(&self, tuning: &AsteroidTuning) -> f32 {
        tuning.shapes[self.shape_index]
            .circles
            .iter()
            .map(|c| c.center.length() + c.radius)
            .fold(0.0, f32::max)
            * self.scale
    }
}

/// Spawn one asteroid into a free slot
pub fn spawn_at(
    pool: &mut Pool<Asteroid>,
    tuning: &AsteroidTuning,
    shape_index: usize,
    pos: Vec2,
    vel: Vec2,
    spin_deg: f32,
    scale: f32,
) {
    if let Some(slot) = pool.try_acquire() {
        *slot = Asteroid {
            active: true,
            shape_index,
            pos,
            vel,
            angle_deg: 0.0,
            spin_deg,
            scale,
            launched_by_player: false,
            world_circles: Vec::new(),
        };
        slot.refresh_world_circles(tuning);
    }
}

/// Populate the field at encounter start: randomized count, position, spin,
/// kept clear of the listed exclusion circles (player and boss spawns)
pub fn spawn_field(
    pool: &mut Pool<Asteroid>,
    tuning: &AsteroidTuning,
    rng: &mut Pcg32,
    arena: Vec2,
    exclusions: &[(Vec2, f32)],
) {
    pool.clear();
    let count = rng.random_range(tuning.count_min..=tuning.count_max);

    for _ in 0..count {
        // A few placement attempts per asteroid; a crowded arena just gets
        // fewer rocks
        for _attempt in 0..8 {
            let pos = Vec2::new(
                rng.random_range(0.0..arena.x),
                rng.random_range(0.0..arena.y),
            );
            if exclusions
                .iter()
                .any(|&(center, radius)| pos.distance(center) < radius)
            {
                continue;
            }

            let dir = bearing_to_vec(rng.random_range(0.0..360.0));
            spawn_at(
                pool,
                tuning,
                rng.random_range(0..tuning.shapes.len()),
                pos,
                dir * rng.random_range(tuning.speed_min..tuning.speed_max),
                rng.random_range(tuning.spin_min_deg..tuning.spin_max_deg),
                rng.random_range(tuning.scale_min..tuning.scale_max),
            );
            break;
        }
    }
}

/// Integrate motion, bounce off the arena walls, refresh clusters
pub fn update(pool: &mut Pool<Asteroid>, tuning: &AsteroidTuning, arena: Vec2, dt: f32) {
    for a in pool.iter_active_mut() {
        a.pos += a.vel * dt;
        a.angle_deg = crate::normalize_bearing(a.angle_deg + a.spin_deg * dt);

        let r = a.bounding_radius(tuning);
        let mut wall_normal = None;
        if a.pos.x - r <= 0.0 {
            wall_normal = Some(Vec2::new(1.0, 0.0));
        } else if a.pos.x + r >= arena.x {
            wall_normal = Some(Vec2::new(-1.0, 0.0));
        } else if a.pos.y - r <= 0.0 {
            wall_normal = Some(Vec2::new(0.0, 1.0));
        } else if a.pos.y + r >= arena.y {
            wall_normal = Some(Vec2::new(0.0, -1.0));
        }

        if let Some(normal) = wall_normal {
            a.vel = geom::reflect(a.vel, normal);
            a.pos = a.pos.clamp(Vec2::splat(r), arena - r);
            // A wall bounce cools a player-launched asteroid back into a
            // plain hazard
            a.launched_by_player = false;
        }

        a.refresh_world_circles(tuning);
    }
}

/// Pairwise elastic resolution over the whole field.
///
/// For an overlapping pair the later slot is pushed apart along the
/// center-to-center bearing and gains a velocity kick; the slot that won the
/// exchange keeps its place and takes over the launched flag, while the
/// pushed one loses it.
pub fn resolve_pairs(pool: &mut Pool<Asteroid>, tuning: &AsteroidTuning) {
    let n = pool.slots().len();
    for i in 0..n {
        for j in (i + 1)..n {
            let (a, b) = pool.pair_mut(i, j);
            if !a.active || !b.active {
                continue;
            }

            let ra = a.bounding_radius(tuning);
            let rb = b.bounding_radius(tuning);
            let dist = a.pos.distance(b.pos);
            if dist >= ra + rb {
                continue;
            }

            let away = bearing_to_vec(angle_between(b.pos, a.pos));
            let push = away * (ra + rb - dist);
            b.pos += push;
            b.vel += push * (tuning.elastic_kick / consts::SIM_DT);

            a.launched_by_player = a.launched_by_player || b.launched_by_player;
            b.launched_by_player = false;
        }
    }
}

/// Push one asteroid out of a circular body (boss or player), without any
/// velocity exchange
pub fn push_out_of_circle(a: &mut Asteroid, tuning: &AsteroidTuning, center: Vec2, radius: f32) {
    let r = a.bounding_radius(tuning);
    let dist = a.pos.distance(center);
    if dist >= r + radius {
        return;
    }
    let away = bearing_to_vec(angle_between(a.pos, center));
    a.pos += away * (r + radius - dist);
}

/// Player contact: a dashing player shoves the asteroid onto a boss-bound
/// trajectory; otherwise the asteroid just displaces the player
pub fn collide_player(
    pool: &mut Pool<Asteroid>,
    player: &mut Player,
    player_radius: f32,
    tuning: &AsteroidTuning,
    arena: Vec2,
    cues: &mut Vec<SoundCue>,
    stats: &mut super::state::RunStats,
) {
    for a in pool.iter_active_mut() {
        let r = a.bounding_radius(tuning);
        if !geom::circles_overlap(a.pos, r, player.pos, player_radius) {
            continue;
        }

        if player.is_invincible() {
            let away = bearing_to_vec(angle_between(a.pos, player.pos));
            a.vel = away * tuning.launch_speed;
            if !a.launched_by_player {
                a.launched_by_player = true;
                stats.asteroids_launched += 1;
                cues.push(SoundCue::AsteroidLaunch);
            }
            // Kick it clear of the ship so the launch reads as one impact
            a.pos += away * (r + player_radius - a.pos.distance(player.pos));
        } else {
            let away = bearing_to_vec(angle_between(player.pos, a.pos));
            let dist = a.pos.distance(player.pos);
            player.pos += away * (r + player_radius - dist);
            player.pos = player.pos.clamp(Vec2::ZERO, arena);
        }
    }
}

/// Shockwave-dash perk: shatter every asteroid near the dash origin
pub fn shockwave(
    pool: &mut Pool<Asteroid>,
    center: Vec2,
    radius: f32,
    particles: &mut Pool<Particle>,
    rng: &mut Pcg32,
    cues: &mut Vec<SoundCue>,
) {
    for a in pool.iter_active_mut() {
        if a.pos.distance(center) < radius {
            a.active = false;
            effects::spawn_burst(particles, rng, a.pos, 12, 110.0, 3);
            cues.push(SoundCue::AsteroidImpact);
        }
    }
}
