//! Cosmetic entity pools: particles, thruster trails, dash ghosts
//!
//! None of these feed back into gameplay; they only decay. A slot is free
//! when its life/alpha has drained to zero, which doubles as the pool's
//! inactive sentinel.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::pool::{Pool, PoolSlot};

/// Thruster flame bitmask, combined per tick from the facing/movement rules
pub const THRUSTER_BOTTOM: u8 = 0b0001;
pub const THRUSTER_TOP: u8 = 0b0010;
pub const THRUSTER_RIGHT: u8 = 0b0100;
pub const THRUSTER_LEFT: u8 = 0b1000;

/// A spark/debris particle
#[derive(Debug, Clone, Copy, Default)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    /// 1 -> 0; the slot frees itself at 0
    pub life: f32,
    /// Palette index for the renderer
    pub palette: u8,
}

impl PoolSlot for Particle {
    fn is_active(&self) -> bool {
        self.life > 0.0
    }
}

/// Ghost image of the player's thruster flames, left behind while moving
#[derive(Debug, Clone, Copy, Default)]
pub struct ThrusterTrail {
    pub pos: Vec2,
    pub angle_deg: f32,
    pub thrusters: u8,
    pub alpha: f32,
}

impl PoolSlot for ThrusterTrail {
    fn is_active(&self) -> bool {
        self.alpha > 0.0
    }
}

/// Ghost image of the whole ship, emitted along a dash
#[derive(Debug, Clone, Copy, Default)]
pub struct DashTrail {
    pub pos: Vec2,
    pub angle_deg: f32,
    pub alpha: f32,
}

impl PoolSlot for DashTrail {
    fn is_active(&self) -> bool {
        self.alpha > 0.0
    }
}

/// Scatter a burst of particles around `pos`
pub fn spawn_burst(
    particles: &mut Pool<Particle>,
    rng: &mut Pcg32,
    pos: Vec2,
    count: usize,
    speed: f32,
    palette: u8,
) {
    for _ in 0..count {
        let Some(slot) = particles.try_acquire() else {
            // Saturated pool drops the remainder of the burst
            return;
        };
        let dir = crate::bearing_to_vec(rng.random_range(0.0..360.0));
        *slot = Particle {
            pos,
            vel: dir * rng.random_range(speed * 0.3..speed),
            size: rng.random_range(1.5..4.0),
            life: rng.random_range(0.5..1.0),
            palette,
        };
    }
}

/// Per-tick decay of all cosmetic pools
pub fn update(
    particles: &mut Pool<Particle>,
    thruster_trails: &mut Pool<ThrusterTrail>,
    dash_trails: &mut Pool<DashTrail>,
    dt: f32,
) {
    for p in particles.iter_active_mut() {
        p.pos += p.vel * dt;
        p.vel *= 0.96;
        p.life -= dt * 1.8;
        p.size *= 0.995;
    }

    for t in thruster_trails.iter_active_mut() {
        t.alpha = (t.alpha - 12.0 * dt).max(0.0);
    }

    for d in dash_trails.iter_active_mut() {
        d.alpha = (d.alpha - 4.0 * dt).max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_particle_slot_frees_at_zero_life() {
        let mut particles: Pool<Particle> = Pool::new(8);
        let mut rng = Pcg32::seed_from_u64(7);

        spawn_burst(&mut particles, &mut rng, Vec2::ZERO, 8, 100.0, 0);
        assert_eq!(particles.active_count(), 8);

        // Enough decay ticks to drain every life value
        for _ in 0..200 {
            update(
                &mut particles,
                &mut Pool::new(0),
                &mut Pool::new(0),
                1.0 / 60.0,
            );
        }
        assert_eq!(particles.active_count(), 0);
        assert!(particles.try_acquire().is_some());
    }

    #[test]
    fn test_burst_saturation_drops_silently() {
        let mut particles: Pool<Particle> = Pool::new(4);
        let mut rng = Pcg32::seed_from_u64(7);

        spawn_burst(&mut particles, &mut rng, Vec2::ZERO, 50, 100.0, 0);
        assert_eq!(particles.active_count(), 4);
    }
}
