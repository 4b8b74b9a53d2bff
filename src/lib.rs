//! Voidfall - a 2D arcade boss-fight game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, bosses, game state)
//! - `tuning`: Data-driven game balance
//! - `audio`: Sound cue ids emitted by the simulation
//!
//! Rendering, audio playback and input sampling live outside this crate; the
//! sim consumes a [`sim::TickInput`] once per tick and exposes the post-tick
//! [`sim::World`] read-only.

pub mod audio;
pub mod sim;
pub mod tuning;

pub use audio::SoundCue;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, matching the original frame cadence)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Arena dimensions (world units; origin at top-left, +Y down)
    pub const ARENA_WIDTH: f32 = 1280.0;
    pub const ARENA_HEIGHT: f32 = 720.0;

    /// Entity pool capacities
    pub const MAX_PROJECTILES: usize = 256;
    pub const MAX_PARTICLES: usize = 512;
    pub const MAX_ASTEROIDS: usize = 20;
    pub const MAX_THRUSTER_TRAILS: usize = 10;
    pub const MAX_DASH_TRAILS: usize = 12;

    /// Grace window between a lethal hit and the slot being freed, during
    /// which the entity is collision-inert but still rendered/decayed
    pub const DESTRUCTION_GRACE: f32 = 0.15;

    /// Bounce-enabled projectiles expire shortly after their first bounce
    pub const PROJECTILE_BOUNCE_LIFETIME: f32 = 1.5;
}

/// Normalize a bearing in degrees to [0, 360)
#[inline]
pub fn normalize_bearing(mut deg: f32) -> f32 {
    while deg >= 360.0 {
        deg -= 360.0;
    }
    while deg < 0.0 {
        deg += 360.0;
    }
    deg
}

/// Bearing in degrees from `p2` toward `p1`, in [0, 360).
///
/// Uses `asin` of the normalized X component with a quadrant correction from
/// the Y sign, then a +180° offset. This is NOT `atan2`: boss aim and
/// thruster-facing logic are tuned to this exact wrap-around behavior, so the
/// convention must not be "simplified".
pub fn angle_between(p1: Vec2, p2: Vec2) -> f32 {
    let dir = (p1 - p2).normalize_or_zero();
    if dir == Vec2::ZERO {
        return 0.0;
    }

    let mut deg = dir.x.clamp(-1.0, 1.0).asin().to_degrees();
    if dir.y > 0.0 {
        deg = 180.0 - deg;
    }

    normalize_bearing(deg + 180.0)
}

/// Unit vector for a bearing produced by [`angle_between`]:
/// `bearing_to_vec(angle_between(p1, p2))` points from `p2` toward `p1`.
#[inline]
pub fn bearing_to_vec(deg: f32) -> Vec2 {
    let rad = deg.to_radians();
    Vec2::new(-rad.sin(), rad.cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearing_cardinals() {
        let origin = Vec2::new(100.0, 100.0);

        // +Y (screen down) is bearing 0, then counter-sin ordering per the
        // asin formula: left = 90, -Y = 180, right = 270
        let below = angle_between(origin + Vec2::new(0.0, 10.0), origin);
        assert!((below - 0.0).abs() < 0.01 || (below - 360.0).abs() < 0.01);

        let left = angle_between(origin + Vec2::new(-10.0, 0.0), origin);
        assert!((left - 90.0).abs() < 0.01);

        let above = angle_between(origin + Vec2::new(0.0, -10.0), origin);
        assert!((above - 180.0).abs() < 0.01);

        let right = angle_between(origin + Vec2::new(10.0, 0.0), origin);
        assert!((right - 270.0).abs() < 0.01);
    }

    #[test]
    fn test_bearing_roundtrip() {
        let origin = Vec2::new(640.0, 360.0);
        for i in 0..24 {
            let deg = i as f32 * 15.0;
            let target = origin + bearing_to_vec(deg) * 50.0;
            let back = angle_between(target, origin);
            let diff = (back - deg).abs();
            assert!(
                diff < 0.01 || (diff - 360.0).abs() < 0.01,
                "bearing {deg} came back as {back}"
            );
        }
    }

    #[test]
    fn test_bearing_zero_distance() {
        let p = Vec2::new(5.0, 5.0);
        // Degenerate input must not NaN
        assert_eq!(angle_between(p, p), 0.0);
    }
}
