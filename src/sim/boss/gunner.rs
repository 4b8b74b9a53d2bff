//! The gunner boss: a walking weapons platform
//!
//! One explicit state machine over its attack patterns, selected with a
//! no-repeat-until-exhausted random policy, plus a concurrent movement
//! behavior that holds a preferred distance band around the player.

use glam::Vec2;
use rand::Rng;

use crate::audio::SoundCue;
use crate::tuning::GunnerTuning;
use crate::{angle_between, bearing_to_vec, normalize_bearing};

use super::BossEnv;
use super::super::effects;
use super::super::geom::{self, Circle};
use super::super::projectile::{self, Projectile, ProjectileKind};

/// Attack patterns; `Idle` is the between-attacks rest state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GunnerAttack {
    Idle,
    SineSpray,
    AimedBurst,
    Shotgun,
    WaveRing,
}

/// The non-idle patterns, in used-flag order
const ATTACK_POOL: [GunnerAttack; 4] = [
    GunnerAttack::SineSpray,
    GunnerAttack::AimedBurst,
    GunnerAttack::Shotgun,
    GunnerAttack::WaveRing,
];

#[derive(Debug, Clone)]
pub struct GunnerBoss {
    pub pos: Vec2,
    pub health: f32,
    /// Horizontal mirror of the body circles: -1 faces left, +1 faces right
    pub facing_sign: f32,
    /// Bearing toward the player, refreshed every tick
    pub aim_bearing: f32,
    pub attack: GunnerAttack,
    /// Time left in the current attack or idle state
    pub attack_timer: f32,
    pub fire_cooldown: f32,
    /// Round-robin used flags, reset once every pattern has run
    pub used_attacks: [bool; ATTACK_POOL.len()],
    /// Signed orbit direction inside the distance band
    pub walk_dir: f32,
    /// Sinusoidal spray oscillator
    pub spray_phase: f32,
}

impl GunnerBoss {
    pub fn new(pos: Vec2, tuning: &GunnerTuning) -> Self {
        Self {
            pos,
            health: tuning.max_health,
            facing_sign: 1.0,
            aim_bearing: 0.0,
            attack: GunnerAttack::Idle,
            attack_timer: 1.0,
            fire_cooldown: 0.0,
            used_attacks: [false; ATTACK_POOL.len()],
            walk_dir: 1.0,
            spray_phase: 0.0,
        }
    }

    /// World-space bounding circles, mirrored by the facing sign
    pub fn body_circles<'t>(
        &self,
        tuning: &'t GunnerTuning,
    ) -> impl Iterator<Item = Circle> + use<'t> {
        let pos = self.pos;
        let sign = self.facing_sign;
        tuning.body_circles.iter().map(move |c| {
            Circle::new(
                pos + Vec2::new(c.center.x * sign, c.center.y),
                c.radius,
            )
        })
    }

    pub fn hit_test_circle(&self, tuning: &GunnerTuning, center: Vec2, radius: f32) -> bool {
        self.body_circles(tuning)
            .any(|c| geom::circles_overlap(c.center, c.radius, center, radius))
    }

    /// Weapon muzzle, offset along the current aim
    pub fn muzzle(&self, tuning: &GunnerTuning) -> Vec2 {
        self.pos + bearing_to_vec(self.aim_bearing) * tuning.weapon_offset
    }

    /// No-repeat random selection: excludes attacks already used in the
    /// current cycle; the used flags reset once all have run
    fn pick_attack(&mut self, rng: &mut rand_pcg::Pcg32) -> GunnerAttack {
        if self.used_attacks.iter().all(|&used| used) {
            self.used_attacks = [false; ATTACK_POOL.len()];
        }
        loop {
            let i = rng.random_range(0..ATTACK_POOL.len());
            if !self.used_attacks[i] {
                self.used_attacks[i] = true;
                return ATTACK_POOL[i];
            }
        }
    }
}

pub fn update(boss: &mut GunnerBoss, env: &mut BossEnv) {
    let tuning = &env.tuning.gunner;

    boss.aim_bearing = angle_between(env.player.pos, boss.pos);
    boss.facing_sign = if env.player.pos.x < boss.pos.x { -1.0 } else { 1.0 };

    walk(boss, env, tuning);
    advance_attack_state(boss, env, tuning);
    run_attack(boss, env, tuning);
}

/// Distance-band movement: close in below the band, retreat above it, orbit
/// inside it
fn walk(boss: &mut GunnerBoss, env: &mut BossEnv, tuning: &GunnerTuning) {
    let to_boss = boss.pos - env.player.pos;
    let dist = to_boss.length();

    if dist < 1.0 {
        // Degenerate overlap; sidestep instead of normalizing a zero vector
        boss.pos += Vec2::new(tuning.walk_speed * env.dt, 0.0);
        return;
    }

    if dist < tuning.preferred_distance_min {
        boss.pos += (to_boss / dist) * tuning.walk_speed * env.dt;
    } else if dist > tuning.preferred_distance_max {
        boss.pos -= (to_boss / dist) * tuning.walk_speed * env.dt;
    } else {
        // Orbit: rotate the relative-position vector by the signed walking
        // direction
        let step = (boss.walk_dir * tuning.orbit_rate_deg * env.dt).to_radians();
        boss.pos = env.player.pos + Vec2::from_angle(step).rotate(to_boss);

        // Rare direction flips keep the orbit from being a metronome
        if env.rng.random_bool((0.25 * env.dt as f64).min(1.0)) {
            boss.walk_dir = -boss.walk_dir;
        }
    }

    let clamped = boss.pos.clamp(Vec2::splat(40.0), env.arena - 40.0);
    if clamped != boss.pos {
        boss.pos = clamped;
        boss.walk_dir = -boss.walk_dir;
    }
}

/// Timer-driven transitions: idle picks the next pattern, a finished pattern
/// drops back to a short random idle
fn advance_attack_state(boss: &mut GunnerBoss, env: &mut BossEnv, tuning: &GunnerTuning) {
    boss.attack_timer -= env.dt;
    boss.fire_cooldown = (boss.fire_cooldown - env.dt).max(0.0);
    if boss.attack_timer > 0.0 {
        return;
    }

    if boss.attack == GunnerAttack::Idle {
        let next = boss.pick_attack(env.rng);
        log::debug!("gunner attack -> {next:?}");
        boss.attack = next;
        boss.fire_cooldown = 0.0;
        boss.spray_phase = 0.0;

        match next {
            GunnerAttack::SineSpray => boss.attack_timer = tuning.spray_duration,
            GunnerAttack::AimedBurst => boss.attack_timer = tuning.burst_duration,
            // Volley patterns fire once on entry, then sit out their
            // attack-level recovery
            GunnerAttack::Shotgun => {
                fire_shotgun(boss, env, tuning);
                boss.attack_timer = tuning.shotgun_recovery;
            }
            GunnerAttack::WaveRing => {
                fire_wave_ring(boss, env, tuning);
                boss.attack_timer = tuning.ring_recovery;
            }
            GunnerAttack::Idle => unreachable!(),
        }
    } else {
        boss.attack = GunnerAttack::Idle;
        boss.attack_timer = env
            .rng
            .random_range(tuning.idle_duration_min..tuning.idle_duration_max);
    }
}

/// Per-tick spawn logic of the continuous patterns
fn run_attack(boss: &mut GunnerBoss, env: &mut BossEnv, tuning: &GunnerTuning) {
    match boss.attack {
        GunnerAttack::SineSpray => {
            boss.spray_phase += tuning.spray_rate * env.dt;
            if boss.fire_cooldown <= 0.0 {
                let bearing = normalize_bearing(
                    boss.aim_bearing + boss.spray_phase.sin() * tuning.spray_amplitude_deg,
                );
                fire_round(boss, env, tuning, bearing, tuning.projectile_speed, false);
                boss.fire_cooldown = tuning.spray_fire_cooldown;
            }
        }
        GunnerAttack::AimedBurst => {
            if boss.fire_cooldown <= 0.0 {
                let jitter = env
                    .rng
                    .random_range(-tuning.burst_jitter_deg..tuning.burst_jitter_deg);
                let bearing = normalize_bearing(boss.aim_bearing + jitter);
                fire_square(boss, env, tuning, bearing);
                boss.fire_cooldown = tuning.burst_fire_cooldown;
            }
        }
        // Volley patterns already fired on entry
        GunnerAttack::Shotgun | GunnerAttack::WaveRing | GunnerAttack::Idle => {}
    }
}

fn fire_round(
    boss: &GunnerBoss,
    env: &mut BossEnv,
    tuning: &GunnerTuning,
    bearing: f32,
    speed: f32,
    can_bounce: bool,
) {
    projectile::spawn(
        env.projectiles,
        Projectile {
            kind: ProjectileKind::Round { radius: 7.0 },
            pos: boss.muzzle(tuning),
            vel: bearing_to_vec(bearing) * speed,
            lifetime: tuning.projectile_lifetime,
            hurts_player: true,
            damage: tuning.projectile_damage,
            can_bounce,
            ..Default::default()
        },
    );
}

/// Squared shells for the aimed burst, rotated to their flight bearing
fn fire_square(boss: &GunnerBoss, env: &mut BossEnv, tuning: &GunnerTuning, bearing: f32) {
    let dir = bearing_to_vec(bearing);
    projectile::spawn(
        env.projectiles,
        Projectile {
            kind: ProjectileKind::Box {
                size: Vec2::new(14.0, 14.0),
                angle_deg: bearing,
            },
            pos: boss.muzzle(tuning),
            vel: dir * tuning.projectile_speed * 1.25,
            lifetime: tuning.projectile_lifetime,
            hurts_player: true,
            damage: tuning.projectile_damage,
            ..Default::default()
        },
    );
    env.cues.push(SoundCue::BossShot);
}

/// ~30 simultaneous spread shots; one cue for the whole volley
fn fire_shotgun(boss: &GunnerBoss, env: &mut BossEnv, tuning: &GunnerTuning) {
    let count = tuning.shotgun_count.max(1);
    for i in 0..count {
        let t = i as f32 / (count - 1).max(1) as f32 - 0.5;
        let bearing = normalize_bearing(boss.aim_bearing + t * tuning.shotgun_spread_deg);
        let speed = tuning.projectile_speed * env.rng.random_range(0.85..1.15);
        fire_round(boss, env, tuning, bearing, speed, false);
    }
    env.cues.push(SoundCue::BossShot);
    effects::spawn_burst(env.particles, env.rng, boss.muzzle(tuning), 6, 80.0, 1);
}

/// Dense fan of bounce-enabled shots; they keep ricocheting until the
/// post-bounce lifetime cap burns them out
fn fire_wave_ring(boss: &GunnerBoss, env: &mut BossEnv, tuning: &GunnerTuning) {
    let count = tuning.ring_count.max(1);
    for i in 0..count {
        let bearing = normalize_bearing(
            boss.aim_bearing + (i as f32 / count as f32 - 0.5) * tuning.ring_arc_deg,
        );
        fire_round(boss, env, tuning, bearing, tuning.ring_projectile_speed, true);
    }
    env.cues.push(SoundCue::BossShot);
}

/// Projectiles vs the mirrored body-circle cluster
pub fn collide_projectiles(boss: &mut GunnerBoss, env: &mut BossEnv) {
    let tuning = &env.tuning.gunner;

    for p in env.projectiles.iter_active_mut() {
        if !p.is_live() || !p.hurts_boss {
            continue;
        }

        let hit = match p.kind {
            ProjectileKind::Round { radius } => boss.hit_test_circle(tuning, p.pos, radius),
            ProjectileKind::Box { size, angle_deg } => boss
                .body_circles(tuning)
                .any(|c| geom::circle_rect_overlap(p.pos, angle_deg, size, c.center, c.radius)),
            ProjectileKind::None => false,
        };

        if hit {
            p.begin_destruction();
            super::apply_damage(&mut boss.health, tuning.max_health, p.damage, env.cues);
            env.stats.damage_dealt += p.damage;
            effects::spawn_burst(env.particles, env.rng, p.pos, 6, 80.0, 4);
        }
    }
}

/// Asteroid contact: launched rocks are the player's heavy weapon
pub fn collide_asteroids(boss: &mut GunnerBoss, env: &mut BossEnv) {
    let gunner = &env.tuning.gunner;
    let asteroid_tuning = &env.tuning.asteroid;

    for a in env.asteroids.iter_active_mut() {
        let r = a.bounding_radius(asteroid_tuning);
        if !boss.hit_test_circle(gunner, a.pos, r) {
            continue;
        }

        if a.launched_by_player {
            let damage = asteroid_tuning.launch_damage * a.scale;
            super::apply_damage(&mut boss.health, gunner.max_health, damage, env.cues);
            env.stats.damage_dealt += damage;
            a.launched_by_player = false;
            env.cues.push(SoundCue::AsteroidImpact);
            effects::spawn_burst(env.particles, env.rng, a.pos, 10, 120.0, 4);
        }

        super::super::asteroid::push_out_of_circle(a, asteroid_tuning, boss.pos, 30.0);
    }
}
