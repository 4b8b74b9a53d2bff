//! Projectile pool: spawning, integration, boundary policy, homing,
//! collisions against asteroids and the player
//!
//! Boss-side hit-testing lives with each boss (`sim::boss`), since the
//! bounding geometry is boss-specific.

use glam::Vec2;
use rand_pcg::Pcg32;

use crate::audio::SoundCue;
use crate::consts;
use crate::tuning::PlayerTuning;
use crate::{angle_between, bearing_to_vec, normalize_bearing};

use super::asteroid::Asteroid;
use super::effects::{self, Particle};
use super::geom::{self, OrientedRect};
use super::player::Player;
use super::pool::{Pool, PoolSlot};
use super::state::RunStats;

/// Shape variant; `None` is the pool's free sentinel
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ProjectileKind {
    #[default]
    None,
    Round {
        radius: f32,
    },
    /// Oriented box, rotated to its flight bearing
    Box {
        size: Vec2,
        angle_deg: f32,
    },
}

/// A single projectile slot
#[derive(Debug, Clone, Copy, Default)]
pub struct Projectile {
    pub kind: ProjectileKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub lifetime: f32,
    /// Lethal hit or expiry happened; the grace timer is running
    pub will_be_destroyed: bool,
    pub destruction_timer: f32,
    /// Affiliation flags: who this projectile can harm
    pub hurts_player: bool,
    pub hurts_boss: bool,
    pub damage: f32,
    pub can_bounce: bool,
    /// Steers toward its designated target (the side it can harm)
    pub homing: bool,
    /// Capped turn rate for homing steering (per second)
    pub turn_rate: f32,
}

impl PoolSlot for Projectile {
    fn is_active(&self) -> bool {
        self.kind != ProjectileKind::None
    }
}

impl Projectile {
    /// Radius used for wall tests and circle-vs-circle checks
    pub fn bounding_radius(&self) -> f32 {
        match self.kind {
            ProjectileKind::None => 0.0,
            ProjectileKind::Round { radius } => radius,
            ProjectileKind::Box { size, .. } => size.x.max(size.y) / 2.0,
        }
    }

    /// Flag for destruction and start the grace window. The projectile is
    /// excluded from further collision checks but keeps rendering until the
    /// timer elapses.
    pub fn begin_destruction(&mut self) {
        if !self.will_be_destroyed {
            self.will_be_destroyed = true;
            self.destruction_timer = consts::DESTRUCTION_GRACE;
        }
    }

    /// Collision-eligible this tick
    pub fn is_live(&self) -> bool {
        self.is_active() && !self.will_be_destroyed
    }

    /// Oriented rect for box projectiles (used for mutual destruction and
    /// beam overlap tests)
    pub fn as_rect(&self) -> Option<OrientedRect> {
        match self.kind {
            ProjectileKind::Box { size, angle_deg } => {
                Some(OrientedRect::new(self.pos, size, angle_deg))
            }
            _ => None,
        }
    }
}

/// Spawn into the first free slot; a saturated pool silently drops the spawn
pub fn spawn(pool: &mut Pool<Projectile>, projectile: Projectile) {
    if let Some(slot) = pool.try_acquire() {
        *slot = projectile;
    }
}

/// Player trigger pull: perk-scaled damage/size/spread, sets the fire
/// cooldown, counts the shots
pub fn spawn_player_shots(
    pool: &mut Pool<Projectile>,
    player: &mut Player,
    tuning: &PlayerTuning,
    cues: &mut Vec<SoundCue>,
    stats: &mut RunStats,
) {
    if player.fire_cooldown > 0.0 || player.looking_dir == Vec2::ZERO {
        return;
    }

    let perks = player.perks;
    let count = perks.shots_per_trigger();
    let base_bearing = angle_between(player.aim_point, player.pos);
    let origin = player.pos + player.looking_dir * (tuning.hitbox_radius + 9.0);

    let radius = tuning.projectile_radius * perks.projectile_radius_multiplier();

    for i in 0..count {
        // Fan out symmetrically around the aim bearing
        let offset = (i as f32 - (count as f32 - 1.0) / 2.0) * tuning.spread_step_deg;
        let bearing = normalize_bearing(base_bearing + offset);
        let dir = bearing_to_vec(bearing);

        // Heavy rounds fly as squared shells, which makes them eligible for
        // mutual destruction against enemy shells
        let kind = if perks.has(super::player::PERK_BIG_BULLETS) {
            ProjectileKind::Box {
                size: Vec2::splat(radius * 2.0),
                angle_deg: bearing,
            }
        } else {
            ProjectileKind::Round { radius }
        };

        spawn(
            pool,
            Projectile {
                kind,
                pos: origin,
                vel: dir * tuning.projectile_speed,
                lifetime: tuning.projectile_lifetime,
                hurts_boss: true,
                damage: tuning.projectile_damage * perks.damage_multiplier(),
                ..Default::default()
            },
        );
        stats.shots_fired += 1;
    }

    player.fire_cooldown = tuning.fire_cooldown * perks.fire_cooldown_multiplier();
    cues.push(SoundCue::PlayerShot);
}

/// Integration, homing steering, lifetime countdown, boundary policy and the
/// destruction grace window, for every active slot
pub fn update(
    pool: &mut Pool<Projectile>,
    player_pos: Vec2,
    boss_pos: Option<Vec2>,
    arena: Vec2,
    dt: f32,
) {
    for p in pool.iter_active_mut() {
        if p.will_be_destroyed {
            // Destruction animation grace: inert, still decaying
            p.destruction_timer -= dt;
            if p.destruction_timer <= 0.0 {
                *p = Projectile::default();
            }
            continue;
        }

        // Homing: lerp the normalized direction toward the target with a
        // capped turn rate, renormalized to preserve speed. Never snaps.
        if p.homing {
            let target = if p.hurts_player {
                Some(player_pos)
            } else {
                boss_pos
            };
            if let Some(target) = target {
                let speed = p.vel.length();
                let current = p.vel.normalize_or_zero();
                let wanted = (target - p.pos).normalize_or_zero();
                if speed > 0.0 && wanted != Vec2::ZERO {
                    let steered = current
                        .lerp(wanted, (p.turn_rate * dt).min(1.0))
                        .normalize_or_zero();
                    if steered != Vec2::ZERO {
                        p.vel = steered * speed;
                        if let ProjectileKind::Box { ref mut angle_deg, .. } = p.kind {
                            *angle_deg = angle_between(p.pos + p.vel, p.pos);
                        }
                    }
                }
            }
        }

        p.pos += p.vel * dt;

        p.lifetime -= dt;
        if p.lifetime <= 0.0 {
            p.begin_destruction();
            continue;
        }

        apply_boundary(p, arena);
    }
}

/// Two boundary policies: reflect for bounce-enabled projectiles (with the
/// post-bounce lifetime cap), clamp+destroy for everything else
fn apply_boundary(p: &mut Projectile, arena: Vec2) {
    let r = p.bounding_radius();

    let mut wall_normal = None;
    if p.pos.x - r <= 0.0 {
        wall_normal = Some(Vec2::new(1.0, 0.0));
    } else if p.pos.x + r >= arena.x {
        wall_normal = Some(Vec2::new(-1.0, 0.0));
    } else if p.pos.y - r <= 0.0 {
        wall_normal = Some(Vec2::new(0.0, 1.0));
    } else if p.pos.y + r >= arena.y {
        wall_normal = Some(Vec2::new(0.0, -1.0));
    }

    let Some(normal) = wall_normal else { return };

    if p.can_bounce {
        p.vel = geom::reflect(p.vel, normal);
        p.pos = p.pos.clamp(Vec2::splat(r), arena - r);
        p.lifetime = p.lifetime.min(consts::PROJECTILE_BOUNCE_LIFETIME);
        if let ProjectileKind::Box { ref mut angle_deg, .. } = p.kind {
            *angle_deg = angle_between(p.pos + p.vel, p.pos);
        }
    } else {
        p.pos = p.pos.clamp(Vec2::splat(r), arena - r);
        p.begin_destruction();
    }
}

/// Mutual destruction of opposing squared shells.
///
/// Uses the corner-ray rotated-rect overlap, whose false-negative rate for
/// thin fast bodies is part of the shipped balance; see
/// [`geom::rotated_rects_overlap`].
pub fn collide_mutual(pool: &mut Pool<Projectile>, cues: &mut Vec<SoundCue>) {
    let slots = pool.slots_mut();
    for i in 0..slots.len() {
        for j in (i + 1)..slots.len() {
            let (left, right) = slots.split_at_mut(j);
            let a = &mut left[i];
            let b = &mut right[0];
            if !a.is_live() || !b.is_live() {
                continue;
            }
            let opposed =
                (a.hurts_boss && b.hurts_player) || (a.hurts_player && b.hurts_boss);
            if !opposed {
                continue;
            }
            let (Some(rect_a), Some(rect_b)) = (a.as_rect(), b.as_rect()) else {
                continue;
            };

            if geom::rotated_rects_overlap(&rect_a, &rect_b) {
                a.begin_destruction();
                b.begin_destruction();
                cues.push(SoundCue::ProjectileBreak);
            }
        }
    }
}

/// Projectile vs asteroid bounding-circle clusters: any hit destroys the
/// projectile without dealing damage to anyone
pub fn collide_asteroids(
    pool: &mut Pool<Projectile>,
    asteroids: &Pool<Asteroid>,
    particles: &mut Pool<Particle>,
    rng: &mut Pcg32,
    cues: &mut Vec<SoundCue>,
) {
    for p in pool.iter_active_mut() {
        if !p.is_live() {
            continue;
        }

        let radius = p.bounding_radius();
        let hit = asteroids
            .iter_active()
            .any(|a| a.hit_test_circle(p.pos, radius));

        if hit {
            p.begin_destruction();
            effects::spawn_burst(particles, rng, p.pos, 4, 60.0, 1);
            cues.push(SoundCue::ProjectileBreak);
        }
    }
}

/// Projectile vs player: iframe-gated damage, opens the hit window
pub fn collide_player(
    pool: &mut Pool<Projectile>,
    player: &mut Player,
    tuning: &PlayerTuning,
    particles: &mut Pool<Particle>,
    rng: &mut Pcg32,
    cues: &mut Vec<SoundCue>,
    stats: &mut RunStats,
) {
    for p in pool.iter_active_mut() {
        if !p.is_live() || !p.hurts_player || player.damage_gated() {
            continue;
        }

        let hit = match p.kind {
            ProjectileKind::Round { radius } => geom::circles_overlap(
                p.pos,
                radius,
                player.pos,
                tuning.hitbox_radius,
            ),
            ProjectileKind::Box { size, angle_deg } => geom::circle_rect_overlap(
                p.pos,
                angle_deg,
                size,
                player.pos,
                tuning.hitbox_radius,
            ),
            ProjectileKind::None => false,
        };

        if hit {
            p.begin_destruction();
            stats.damage_taken += player.hurt(p.damage, tuning, cues);
            effects::spawn_burst(particles, rng, p.pos, 8, 90.0, 2);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::asteroid;
    use crate::tuning::AsteroidTuning;
    use rand::SeedableRng;

    fn round(pos: Vec2, vel: Vec2, radius: f32) -> Projectile {
        Projectile {
            kind: ProjectileKind::Round { radius },
            pos,
            vel,
            lifetime: 5.0,
            hurts_boss: true,
            damage: 4.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_wall_bounce_flips_velocity_and_caps_lifetime() {
        let mut pool: Pool<Projectile> = Pool::new(4);
        let arena = Vec2::new(1280.0, 720.0);

        spawn(
            &mut pool,
            Projectile {
                can_bounce: true,
                ..round(Vec2::new(1.0, 360.0), Vec2::new(-5.0, 0.0), 4.0)
            },
        );

        update(&mut pool, Vec2::ZERO, None, arena, consts::SIM_DT);

        let p = pool.iter_active().next().unwrap();
        assert!(p.vel.x > 0.0, "x velocity must flip sign");
        assert!(p.lifetime <= consts::PROJECTILE_BOUNCE_LIFETIME);
        assert!(!p.will_be_destroyed);
    }

    #[test]
    fn test_wall_destroys_non_bouncer() {
        let mut pool: Pool<Projectile> = Pool::new(4);
        let arena = Vec2::new(1280.0, 720.0);

        spawn(&mut pool, round(Vec2::new(1.0, 360.0), Vec2::new(-300.0, 0.0), 4.0));
        update(&mut pool, Vec2::ZERO, None, arena, consts::SIM_DT);

        let p = pool.iter_active().next().unwrap();
        assert!(p.will_be_destroyed);
        // Clamped to the arena box, not left outside
        assert!(p.pos.x >= p.bounding_radius());
    }

    #[test]
    fn test_destruction_grace_frees_slot() {
        let mut pool: Pool<Projectile> = Pool::new(4);
        let arena = Vec2::new(1280.0, 720.0);

        spawn(&mut pool, round(Vec2::new(100.0, 100.0), Vec2::ZERO, 4.0));
        pool.iter_active_mut().next().unwrap().begin_destruction();

        // Still occupying its slot during the grace window
        update(&mut pool, Vec2::ZERO, None, arena, consts::SIM_DT);
        assert_eq!(pool.active_count(), 1);

        for _ in 0..20 {
            update(&mut pool, Vec2::ZERO, None, arena, consts::SIM_DT);
        }
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn test_projectile_vs_asteroid_destroys_without_damage() {
        let mut pool: Pool<Projectile> = Pool::new(4);
        let mut asteroids: Pool<Asteroid> = Pool::new(4);
        let mut particles: Pool<Particle> = Pool::new(32);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut cues = Vec::new();
        let arena = Vec2::new(1280.0, 720.0);

        // Asteroid bounding circle at (110, 100) radius 8
        let tuning = AsteroidTuning {
            shapes: vec![crate::tuning::AsteroidShape {
                sprite: crate::tuning::SpriteRect {
                    x: 0.0,
                    y: 0.0,
                    width: 16.0,
                    height: 16.0,
                },
                circles: vec![super::super::geom::Circle::new(Vec2::ZERO, 8.0)],
            }],
            ..AsteroidTuning::default()
        };
        asteroid::spawn_at(
            &mut asteroids,
            &tuning,
            0,
            Vec2::new(110.0, 100.0),
            Vec2::ZERO,
            0.0,
            1.0,
        );
        for a in asteroids.iter_active_mut() {
            a.refresh_world_circles(&tuning);
        }

        // Projectile at (100, 100) radius 5 moving toward the asteroid
        spawn(&mut pool, round(Vec2::new(100.0, 100.0), Vec2::new(120.0, 0.0), 5.0));

        update(&mut pool, Vec2::ZERO, None, arena, consts::SIM_DT);
        collide_asteroids(&mut pool, &asteroids, &mut particles, &mut rng, &mut cues);

        let p = pool.iter_active().next().unwrap();
        assert!(p.will_be_destroyed);
        assert!(cues.contains(&SoundCue::ProjectileBreak));
    }

    #[test]
    fn test_homing_preserves_speed() {
        let mut pool: Pool<Projectile> = Pool::new(4);
        let arena = Vec2::new(1280.0, 720.0);

        spawn(
            &mut pool,
            Projectile {
                homing: true,
                hurts_player: true,
                turn_rate: 2.0,
                ..round(Vec2::new(200.0, 200.0), Vec2::new(120.0, 0.0), 4.0)
            },
        );

        let target = Vec2::new(200.0, 600.0);
        for _ in 0..30 {
            update(&mut pool, target, None, arena, consts::SIM_DT);
        }

        let p = pool.iter_active().next().unwrap();
        assert!((p.vel.length() - 120.0).abs() < 0.5, "speed preserved");
        // Steered downward toward the target
        assert!(p.vel.y > 0.0);
    }

    #[test]
    fn test_mutual_destruction_of_opposing_shells() {
        let mut pool: Pool<Projectile> = Pool::new(8);
        let mut cues = Vec::new();

        // Two squared shells crossing at the same spot, opposite affiliations
        spawn(
            &mut pool,
            Projectile {
                kind: ProjectileKind::Box {
                    size: Vec2::new(14.0, 14.0),
                    angle_deg: 0.0,
                },
                pos: Vec2::new(200.0, 200.0),
                vel: Vec2::new(0.0, -100.0),
                lifetime: 3.0,
                hurts_boss: true,
                damage: 4.0,
                ..Default::default()
            },
        );
        spawn(
            &mut pool,
            Projectile {
                kind: ProjectileKind::Box {
                    size: Vec2::new(14.0, 14.0),
                    angle_deg: 45.0,
                },
                pos: Vec2::new(204.0, 200.0),
                vel: Vec2::new(0.0, 100.0),
                lifetime: 3.0,
                hurts_player: true,
                damage: 4.0,
                ..Default::default()
            },
        );
        // A same-side shell right there too: it must survive
        spawn(
            &mut pool,
            Projectile {
                kind: ProjectileKind::Box {
                    size: Vec2::new(14.0, 14.0),
                    angle_deg: 10.0,
                },
                pos: Vec2::new(198.0, 202.0),
                vel: Vec2::ZERO,
                lifetime: 3.0,
                hurts_boss: true,
                damage: 4.0,
                ..Default::default()
            },
        );

        collide_mutual(&mut pool, &mut cues);

        let destroyed: Vec<bool> = pool.iter_active().map(|p| p.will_be_destroyed).collect();
        assert_eq!(destroyed.iter().filter(|&&d| d).count(), 2);
        assert!(cues.contains(&SoundCue::ProjectileBreak));
    }

    #[test]
    fn test_player_shot_spawn_respects_cooldown() {
        let mut pool: Pool<Projectile> = Pool::new(16);
        let tuning = PlayerTuning::default();
        let mut player = Player::new(Vec2::new(640.0, 360.0), &tuning);
        let mut cues = Vec::new();
        let mut stats = RunStats::default();

        spawn_player_shots(&mut pool, &mut player, &tuning, &mut cues, &mut stats);
        assert_eq!(pool.active_count(), 1);
        assert_eq!(stats.shots_fired, 1);
        assert!(player.fire_cooldown > 0.0);

        // Second pull during cooldown is a no-op
        spawn_player_shots(&mut pool, &mut player, &tuning, &mut cues, &mut stats);
        assert_eq!(pool.active_count(), 1);
    }

    #[test]
    fn test_spread_perk_fans_three_shots() {
        use crate::sim::player::PERK_TRIPLE_SPREAD;

        let mut pool: Pool<Projectile> = Pool::new(16);
        let tuning = PlayerTuning::default();
        let mut player = Player::new(Vec2::new(640.0, 360.0), &tuning);
        player.perks.0 |= PERK_TRIPLE_SPREAD;
        let mut cues = Vec::new();
        let mut stats = RunStats::default();

        spawn_player_shots(&mut pool, &mut player, &tuning, &mut cues, &mut stats);
        assert_eq!(pool.active_count(), 3);

        // The fan must not be three identical velocities
        let vels: Vec<Vec2> = pool.iter_active().map(|p| p.vel).collect();
        assert!(vels[0].distance(vels[1]) > 0.1);
    }
}
