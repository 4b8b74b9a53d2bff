//! Voidfall headless driver
//!
//! Runs the simulation core without a window: a scripted pilot advances
//! through the menu, tutorial and boss fights while the world state is
//! logged. Useful for soak-testing balance changes and profiling the sim in
//! isolation; the real game embeds `voidfall::sim` behind a renderer.

use glam::Vec2;

use voidfall::consts::SIM_DT;
use voidfall::sim::{GameMode, TickInput, World, tick};
use voidfall::tuning::Tuning;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed: u64 = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0xC0FFEE);
    let tuning = match args.next() {
        Some(path) => Tuning::load_or_default(&path),
        None => Tuning::default(),
    };

    log::info!("soak run, seed {seed:#x}");
    let mut world = World::new(seed, tuning);

    // Ten simulated minutes is plenty to see both bosses
    let max_ticks = 10 * 60 * 60;
    for i in 0..max_ticks {
        let input = scripted_input(&world, i);
        tick(&mut world, &input, SIM_DT);

        if i % (10 * 60) == 0 {
            log::info!(
                "t={:>4}s mode={:?} hp={:>5.1} boss={:?}",
                i / 60,
                world.mode,
                world.player.health,
                world.boss.as_ref().map(|b| (b.name(), b.health())),
            );
        }

        // One full roster clear (or a death) ends the run at the stats
        // screen after the final confirm returns to the menu
        if world.mode == GameMode::Menu && i > 60 {
            break;
        }
    }

    match serde_json::to_string_pretty(&world.stats) {
        Ok(json) => println!("{json}"),
        Err(err) => log::error!("stats serialization failed: {err}"),
    }
}

/// A crude but lively pilot: strafes in a loop, keeps the trigger held,
/// dashes on a cadence and confirms through every screen
fn scripted_input(world: &World, i: usize) -> TickInput {
    let t = i as f32 * SIM_DT;

    match world.mode {
        GameMode::Menu | GameMode::Stats => TickInput {
            confirm_pressed: i % 30 == 0,
            ..Default::default()
        },
        GameMode::Tutorial => TickInput {
            movement: Vec2::new(1.0, 0.0),
            fire_down: true,
            dash_pressed: i % 90 == 0,
            ..Default::default()
        },
        _ => TickInput {
            movement: Vec2::new((t * 0.7).sin(), (t * 0.9).cos()),
            pointer_delta: world
                .boss
                .as_ref()
                .map(|b| (b.position() - world.player.aim_point) * 0.2)
                .unwrap_or(Vec2::ZERO),
            fire_down: true,
            dash_pressed: i % 150 == 0,
            ..Default::default()
        },
    }
}
