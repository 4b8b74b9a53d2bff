//! Fixed timestep simulation tick
//!
//! One call per rendered frame advances the whole world. Exactly one game
//! mode's update path executes per tick, selected by the current mode value;
//! the transition helpers here are the only code that writes `World::mode`.

use glam::Vec2;

use crate::audio::SoundCue;

use super::asteroid;
use super::boss::{Boss, BossEnv, ROSTER_LEN};
use super::effects::{self, DashTrail, ThrusterTrail};
use super::projectile;
use super::state::{GameMode, IntroStage, RunStats, TutorialProgress, World};

/// Input sample for one tick: a movement-intent vector from held keys, a
/// pointer delta, and press edges. Supplied once at tick start and immutable
/// for the tick's duration; the core never queries devices itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    pub movement: Vec2,
    pub pointer_delta: Vec2,
    /// Held fire button
    pub fire_down: bool,
    /// Press edges
    pub dash_pressed: bool,
    pub confirm_pressed: bool,
    pub pause_pressed: bool,
}

/// Advance the world by one tick
pub fn tick(world: &mut World, input: &TickInput, dt: f32) {
    world.cues.clear();
    world.tick_count += 1;

    if input.pause_pressed && matches!(world.mode, GameMode::Tutorial | GameMode::Fight) {
        world.paused = !world.paused;
        world.cues.push(SoundCue::ButtonClick);
    }
    if world.paused {
        if !matches!(world.mode, GameMode::Tutorial | GameMode::Fight) {
            world.paused = false;
        } else {
            return;
        }
    }

    match world.mode {
        GameMode::Menu => tick_menu(world, input, dt),
        GameMode::Tutorial => tick_tutorial(world, input, dt),
        GameMode::Intro(stage) => tick_intro(world, stage, dt),
        GameMode::Fight => tick_fight(world, input, dt),
        GameMode::BossDead => tick_boss_dead(world, dt),
        GameMode::PlayerDead => tick_player_dead(world, dt),
        GameMode::Stats => tick_stats(world, input, dt),
    }
}

// ---------------------------------------------------------------------------
// Transitions (the only mutators of `World::mode`)

fn enter_tutorial(world: &mut World) {
    log::info!("mode -> tutorial");
    world.tutorial = TutorialProgress::default();
    world.cues.push(SoundCue::ButtonClick);
    world.mode = GameMode::Tutorial;
}

/// Set up the next encounter and start the fly-over
fn enter_intro(world: &mut World) {
    let arena = World::arena();

    world.projectiles.clear();
    world.particles.clear();
    world.thruster_trails.clear();
    world.dash_trails.clear();

    world.player.pos = World::player_spawn();
    world.player.dash_delta = Vec2::ZERO;
    world.player.health = world.player.max_health(&world.tuning.player);

    world.boss = Boss::from_roster(world.boss_index, arena, &world.tuning);
    let boss_spawn = world.boss.as_ref().map(Boss::position).unwrap_or(arena / 2.0);

    asteroid::spawn_field(
        &mut world.asteroids,
        &world.tuning.asteroid,
        &mut world.rng,
        arena,
        &[(world.player.pos, 160.0), (boss_spawn, 200.0)],
    );

    world.intro_reveal = 0.0;
    world.cues.push(SoundCue::IntroSting);
    log::info!(
        "mode -> intro ({})",
        world.boss.as_ref().map(Boss::name).unwrap_or("?")
    );
    world.mode = GameMode::Intro(IntroStage::Beginning);
}

fn enter_fight(world: &mut World) {
    log::info!("mode -> fight");
    world.mode = GameMode::Fight;
}

fn enter_boss_dead(world: &mut World) {
    log::info!("mode -> boss dead");
    world.encounter_won = true;
    world.stats.bosses_defeated += 1;
    world.mode_timer = world.tuning.intro.boss_dead_duration;
    world.cues.push(SoundCue::BossDeath);

    // Victory spoils: one new perk per felled boss, never re-granted, no
    // more grants once every perk is held
    let World { player, rng, cues, .. } = world;
    if let Some(spec) = player.perks.grant_random(rng) {
        log::info!("perk granted: {}", spec.name);
        cues.push(SoundCue::PerkPickup);
    }

    world.mode = GameMode::BossDead;
}

fn enter_player_dead(world: &mut World) {
    log::info!("mode -> player dead");
    world.encounter_won = false;
    world.mode_timer = world.tuning.intro.player_dead_duration;
    world.cues.push(SoundCue::PlayerDeath);
    world.mode = GameMode::PlayerDead;
}

fn enter_stats(world: &mut World) {
    log::info!("mode -> stats");
    world.boss = None;
    world.mode = GameMode::Stats;
}

/// Back to the title; a fresh run starts from scratch
fn enter_menu(world: &mut World) {
    log::info!("mode -> menu");
    world.boss = None;
    world.boss_index = 0;
    world.stats = RunStats::default();
    world.player = super::player::Player::new(World::player_spawn(), &world.tuning.player);
    world.projectiles.clear();
    world.asteroids.clear();
    world.mode = GameMode::Menu;
}

// ---------------------------------------------------------------------------
// Per-mode updates

/// Title entries; the second one is handled by the embedding shell
const MENU_ITEMS: usize = 2;

fn tick_menu(world: &mut World, input: &TickInput, dt: f32) {
    // Debounced focus movement so a held key steps instead of spinning
    world.mode_timer -= dt;
    if input.movement.y != 0.0 && world.mode_timer <= 0.0 {
        world.menu_focus = (world.menu_focus + 1) % MENU_ITEMS;
        world.cues.push(SoundCue::ButtonFocus);
        world.mode_timer = 0.25;
    }

    if input.confirm_pressed {
        if world.menu_focus == 0 {
            enter_tutorial(world);
        } else {
            // Quit entry: the core only announces the click; the shell owns
            // process teardown
            world.cues.push(SoundCue::ButtonClick);
        }
    }
}

/// Sandbox until the player has moved, fired and dashed (or skips)
fn tick_tutorial(world: &mut World, input: &TickInput, dt: f32) {
    run_player_systems(world, input, dt);

    if input.movement != Vec2::ZERO {
        world.tutorial.moved = true;
    }
    if input.fire_down {
        world.tutorial.fired = true;
    }
    if input.dash_pressed {
        world.tutorial.dashed = true;
    }

    let World { projectiles, player, .. } = world;
    projectile::update(projectiles, player.pos, None, World::arena(), dt);

    decay_effects(world, dt);
    world
        .camera
        .approach(world.player.pos, 1.0, 3.0, dt);

    if world.tutorial.complete() || input.confirm_pressed {
        enter_intro(world);
    }
}

/// Camera fly-over, arena reveal, then the name card countdown
fn tick_intro(world: &mut World, stage: IntroStage, dt: f32) {
    let intro = world.tuning.intro.clone();
    let boss_pos = world.boss.as_ref().map(Boss::position).unwrap_or_default();

    decay_effects(world, dt);

    match stage {
        IntroStage::Beginning => {
            world.camera.approach(boss_pos, 1.15, intro.camera_rate, dt);
            // Stage gating is positional, not timed: hold until the camera
            // has actually arrived
            if world.camera.pos.distance(boss_pos) < intro.focus_distance {
                world.mode = GameMode::Intro(IntroStage::Focus);
            }
        }
        IntroStage::Focus => {
            world.camera.approach(boss_pos, 1.15, intro.camera_rate, dt);
            world.intro_reveal += (1.0 - world.intro_reveal) * (intro.reveal_rate * dt).min(1.0);
            if world.intro_reveal > 0.995 {
                world.intro_reveal = 1.0;
                world.mode_timer = intro.info_duration;
                world.mode = GameMode::Intro(IntroStage::Info);
            }
        }
        IntroStage::Info => {
            world.mode_timer -= dt;
            if world.mode_timer <= 0.0 {
                enter_fight(world);
            }
        }
    }
}

fn tick_fight(world: &mut World, input: &TickInput, dt: f32) {
    let arena = World::arena();

    run_player_systems(world, input, dt);

    // Asteroid field: motion, elastic pair resolution, player contact
    {
        let World {
            asteroids,
            player,
            tuning,
            cues,
            stats,
            ..
        } = world;
        asteroid::update(asteroids, &tuning.asteroid, arena, dt);
        asteroid::resolve_pairs(asteroids, &tuning.asteroid);
        asteroid::collide_player(
            asteroids,
            player,
            tuning.player.hitbox_radius,
            &tuning.asteroid,
            arena,
            cues,
            stats,
        );
    }

    // Boss behavior
    with_boss_env(world, arena, dt, |boss, env| boss.update(env));

    // Projectile integration, then the fixed collision order: asteroids
    // swallow shots first, the player is next, boss geometry last
    {
        let World {
            projectiles,
            player,
            boss,
            ..
        } = world;
        projectile::update(
            projectiles,
            player.pos,
            boss.as_ref().map(Boss::position),
            arena,
            dt,
        );
    }
    {
        let World {
            projectiles,
            asteroids,
            particles,
            rng,
            cues,
            ..
        } = world;
        projectile::collide_mutual(projectiles, cues);
        projectile::collide_asteroids(projectiles, asteroids, particles, rng, cues);
    }
    {
        let World {
            projectiles,
            player,
            tuning,
            particles,
            rng,
            cues,
            stats,
            ..
        } = world;
        projectile::collide_player(
            projectiles,
            player,
            &tuning.player,
            particles,
            rng,
            cues,
            stats,
        );
    }
    with_boss_env(world, arena, dt, |boss, env| {
        boss.collide_projectiles(env);
        boss.collide_asteroids(env);
    });

    decay_effects(world, dt);
    world.camera.approach(world.player.pos, 1.0, 3.0, dt);
    world.stats.ticks += 1;

    // Health is clamped at every mutation site, so these reads never see
    // negative values
    if world.player.health <= 0.0 {
        enter_player_dead(world);
    } else if world.boss.as_ref().is_some_and(Boss::is_dead) {
        enter_boss_dead(world);
    }
}

fn tick_boss_dead(world: &mut World, dt: f32) {
    let boss_pos = world.boss.as_ref().map(Boss::position).unwrap_or_default();

    // Slow-motion blowout: scatter debris while the timer runs
    if world.tick_count % 6 == 0 {
        let World { particles, rng, .. } = world;
        effects::spawn_burst(particles, rng, boss_pos, 6, 140.0, 4);
    }

    decay_effects(world, dt);
    world.camera.approach(boss_pos, 1.1, 2.0, dt);

    world.mode_timer -= dt;
    if world.mode_timer <= 0.0 {
        enter_stats(world);
    }
}

fn tick_player_dead(world: &mut World, dt: f32) {
    decay_effects(world, dt);
    world.camera.approach(world.player.pos, 1.2, 2.0, dt);

    world.mode_timer -= dt;
    if world.mode_timer <= 0.0 {
        enter_stats(world);
    }
}

/// Stats screen: confirm routes onward to the next encounter or the title
fn tick_stats(world: &mut World, input: &TickInput, dt: f32) {
    decay_effects(world, dt);

    if !input.confirm_pressed {
        return;
    }
    world.cues.push(SoundCue::ButtonClick);

    if world.encounter_won && world.boss_index + 1 < ROSTER_LEN {
        world.boss_index += 1;
        enter_intro(world);
    } else {
        enter_menu(world);
    }
}

// ---------------------------------------------------------------------------
// Shared helpers

/// Aim, movement, dash and fire: everything the player does directly
fn run_player_systems(world: &mut World, input: &TickInput, dt: f32) {
    let arena = World::arena();
    let World {
        player,
        tuning,
        cues,
        stats,
        projectiles,
        asteroids,
        particles,
        thruster_trails,
        dash_trails,
        rng,
        ..
    } = world;

    player.update_aim(input.pointer_delta, tuning.player.pointer_sensitivity, arena);
    player.update(input.movement, &tuning.player, arena, dt);

    if input.dash_pressed && player.try_dash(input.movement, &tuning.player, cues) {
        stats.dashes += 1;
        if player.perks.has(super::player::PERK_SHOCKWAVE_DASH) {
            asteroid::shockwave(
                asteroids,
                player.pos,
                tuning.player.shockwave_radius,
                particles,
                rng,
                cues,
            );
        }
    }

    // Ghost images while the dash impulse is still live
    if player.is_invincible() {
        if let Some(ghost) = dash_trails.try_acquire() {
            *ghost = DashTrail {
                pos: player.pos,
                angle_deg: crate::angle_between(player.aim_point, player.pos),
                alpha: 0.8,
            };
        }
    }

    // Thruster flames leave a fading trail while the ship is under power
    let thrusters = player.active_thrusters();
    if thrusters != 0 {
        if let Some(trail) = thruster_trails.try_acquire() {
            *trail = ThrusterTrail {
                pos: player.pos,
                angle_deg: crate::angle_between(player.aim_point, player.pos),
                thrusters,
                alpha: 0.85,
            };
        }
    }

    if input.fire_down {
        projectile::spawn_player_shots(projectiles, player, &tuning.player, cues, stats);
    }
}

/// Borrow the boss and its environment disjointly and run `f` on them
fn with_boss_env(
    world: &mut World,
    arena: Vec2,
    dt: f32,
    f: impl FnOnce(&mut Boss, &mut BossEnv),
) {
    let World {
        boss,
        player,
        projectiles,
        particles,
        asteroids,
        rng,
        cues,
        stats,
        tuning,
        ..
    } = world;

    let Some(boss) = boss.as_mut() else { return };
    let mut env = BossEnv {
        player,
        projectiles,
        particles,
        asteroids,
        rng,
        cues,
        stats,
        tuning,
        arena,
        dt,
    };
    f(boss, &mut env);
}

fn decay_effects(world: &mut World, dt: f32) {
    let World {
        particles,
        thruster_trails,
        dash_trails,
        ..
    } = world;
    effects::update(particles, thruster_trails, dash_trails, dt);
}
