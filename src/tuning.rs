//! Data-driven game balance
//!
//! Every gameplay-tunable number (speeds, cooldowns, radii, damage) and the
//! immutable shape descriptors (bounding-circle clusters, sprite rects) live
//! here. Loaded once at startup; the sim treats the values as read-only for
//! the whole run. `Default` is the shipped balance; a JSON file can override
//! any subset of fields.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::geom::Circle;

/// Sprite-sheet source rectangle for a drawable shape descriptor
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpriteRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Immutable asteroid descriptor: sprite source plus a bounding-circle
/// cluster relative to the body center. The cluster is rotated/scaled with
/// the body every tick; the descriptor itself never changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsteroidShape {
    pub sprite: SpriteRect,
    pub circles: Vec<Circle>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub max_health: f32,
    pub movement_speed: f32,
    pub hitbox_radius: f32,
    pub fire_cooldown: f32,
    pub projectile_speed: f32,
    pub projectile_radius: f32,
    pub projectile_damage: f32,
    pub projectile_lifetime: f32,
    /// Angular spread between shots when a spread perk is active (degrees)
    pub spread_step_deg: f32,
    pub iframe_duration: f32,
    pub dash_impulse: f32,
    pub dash_cooldown: f32,
    /// Exponential decay rate of the dash impulse (per second)
    pub dash_decay_rate: f32,
    /// Health restored per regeneration pulse, and the cooldown between
    /// pulses, while the regeneration perk is held
    pub regen_amount: f32,
    pub regen_interval: f32,
    /// Asteroid-destruction radius of a shockwave dash
    pub shockwave_radius: f32,
    pub pointer_sensitivity: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            movement_speed: 180.0,
            hitbox_radius: 16.0,
            fire_cooldown: 0.15,
            projectile_speed: 420.0,
            projectile_radius: 9.0,
            projectile_damage: 4.0,
            projectile_lifetime: 3.0,
            spread_step_deg: 6.0,
            iframe_duration: 0.8,
            dash_impulse: 900.0,
            dash_cooldown: 1.2,
            dash_decay_rate: 8.0,
            regen_amount: 1.0,
            regen_interval: 0.5,
            shockwave_radius: 120.0,
            pointer_sensitivity: 0.7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AsteroidTuning {
    pub count_min: usize,
    pub count_max: usize,
    pub speed_min: f32,
    pub speed_max: f32,
    pub spin_min_deg: f32,
    pub spin_max_deg: f32,
    pub scale_min: f32,
    pub scale_max: f32,
    /// Damage a player-launched asteroid deals to a boss, scaled by body size
    pub launch_damage: f32,
    /// Velocity an asteroid gains when shoved by a dash
    pub launch_speed: f32,
    /// Fraction of the push-apart offset fed back into velocity on elastic
    /// contacts
    pub elastic_kick: f32,
    pub shapes: Vec<AsteroidShape>,
}

impl Default for AsteroidTuning {
    fn default() -> Self {
        Self {
            count_min: 4,
            count_max: 8,
            speed_min: 20.0,
            speed_max: 70.0,
            spin_min_deg: -40.0,
            spin_max_deg: 40.0,
            scale_min: 2.0,
            scale_max: 4.0,
            launch_damage: 9.0,
            launch_speed: 320.0,
            elastic_kick: 0.25,
            shapes: default_asteroid_shapes(),
        }
    }
}

/// Shipped asteroid sprite descriptors. Offsets are in unscaled sprite-local
/// units around the body center.
fn default_asteroid_shapes() -> Vec<AsteroidShape> {
    vec![
        AsteroidShape {
            sprite: SpriteRect {
                x: 48.0,
                y: 0.0,
                width: 19.0,
                height: 19.0,
            },
            circles: vec![
                Circle::new(Vec2::new(0.0, -2.0), 6.0),
                Circle::new(Vec2::new(-3.0, 4.0), 5.0),
                Circle::new(Vec2::new(4.0, 3.0), 5.0),
            ],
        },
        AsteroidShape {
            sprite: SpriteRect {
                x: 67.0,
                y: 0.0,
                width: 14.0,
                height: 15.0,
            },
            circles: vec![
                Circle::new(Vec2::new(0.0, 0.0), 6.0),
                Circle::new(Vec2::new(3.0, -3.0), 4.0),
            ],
        },
        AsteroidShape {
            sprite: SpriteRect {
                x: 81.0,
                y: 0.0,
                width: 9.0,
                height: 9.0,
            },
            circles: vec![Circle::new(Vec2::new(0.0, 0.0), 4.0)],
        },
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GunnerTuning {
    pub max_health: f32,
    pub walk_speed: f32,
    /// Preferred distance band from the player
    pub preferred_distance_min: f32,
    pub preferred_distance_max: f32,
    /// Orbit rate inside the band (degrees per second)
    pub orbit_rate_deg: f32,
    pub idle_duration_min: f32,
    pub idle_duration_max: f32,
    pub projectile_speed: f32,
    pub projectile_damage: f32,
    pub projectile_lifetime: f32,
    /// Sinusoidal spray: oscillation amplitude (degrees) and rate
    pub spray_amplitude_deg: f32,
    pub spray_rate: f32,
    pub spray_fire_cooldown: f32,
    pub spray_duration: f32,
    pub burst_fire_cooldown: f32,
    pub burst_jitter_deg: f32,
    pub burst_duration: f32,
    pub shotgun_count: usize,
    pub shotgun_spread_deg: f32,
    pub shotgun_recovery: f32,
    pub ring_count: usize,
    pub ring_arc_deg: f32,
    pub ring_projectile_speed: f32,
    pub ring_recovery: f32,
    /// Weapon muzzle offset from the body center
    pub weapon_offset: f32,
    /// Body-relative bounding circles, mirrored horizontally by facing
    pub body_circles: Vec<Circle>,
}

impl Default for GunnerTuning {
    fn default() -> Self {
        Self {
            max_health: 300.0,
            walk_speed: 110.0,
            preferred_distance_min: 180.0,
            preferred_distance_max: 320.0,
            orbit_rate_deg: 40.0,
            idle_duration_min: 0.6,
            idle_duration_max: 1.6,
            projectile_speed: 260.0,
            projectile_damage: 8.0,
            projectile_lifetime: 4.0,
            spray_amplitude_deg: 35.0,
            spray_rate: 5.0,
            spray_fire_cooldown: 0.07,
            spray_duration: 2.4,
            burst_fire_cooldown: 0.22,
            burst_jitter_deg: 4.0,
            burst_duration: 1.8,
            shotgun_count: 30,
            shotgun_spread_deg: 70.0,
            shotgun_recovery: 3.5,
            ring_count: 36,
            ring_arc_deg: 360.0,
            ring_projectile_speed: 170.0,
            ring_recovery: 3.0,
            weapon_offset: 28.0,
            body_circles: vec![
                Circle::new(Vec2::new(0.0, -10.0), 14.0),
                Circle::new(Vec2::new(-6.0, 8.0), 12.0),
                Circle::new(Vec2::new(8.0, 10.0), 10.0),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitalTuning {
    pub max_health: f32,
    pub body_radius: f32,
    pub socket_radius: f32,
    /// Orbit radius of connected sockets around the body
    pub socket_orbit_radius: f32,
    /// Max angular offset of a connected socket from the player bearing
    pub socket_cone_deg: f32,
    /// Per-second lerp rate of a connected socket toward the player bearing
    pub socket_aim_rate: f32,
    /// Body spin for the movement animation (degrees per second)
    pub spin_rate_deg: f32,
    pub drift_speed: f32,
    /// Player proximity that charges the disconnect timer
    pub proximity_distance: f32,
    pub proximity_limit: f32,
    /// Disconnected socket roaming
    pub roam_speed: f32,
    pub roam_distance: f32,
    pub walk_duration_min: f32,
    pub walk_duration_max: f32,
    pub stand_duration_min: f32,
    pub stand_duration_max: f32,
    pub deactivated_duration: f32,
    /// Cosmetic fade rate toward full darkness while deactivated
    pub darkness_rate: f32,
    pub turret_cooldown: f32,
    pub turret_pair_gap: f32,
    pub turret_projectile_speed: f32,
    pub turret_damage: f32,
    pub laser_charge_rate: f32,
    pub laser_duration: f32,
    pub laser_cooldown: f32,
    pub laser_length: f32,
    pub laser_width: f32,
    pub laser_damage_per_tick: f32,
    pub rocket_cooldown: f32,
    pub rocket_speed: f32,
    pub rocket_damage: f32,
    pub rocket_turn_rate: f32,
    pub projectile_lifetime: f32,
}

impl Default for OrbitalTuning {
    fn default() -> Self {
        Self {
            max_health: 360.0,
            body_radius: 34.0,
            socket_radius: 12.0,
            socket_orbit_radius: 58.0,
            socket_cone_deg: 55.0,
            socket_aim_rate: 3.0,
            spin_rate_deg: 25.0,
            drift_speed: 35.0,
            proximity_distance: 140.0,
            proximity_limit: 2.5,
            roam_speed: 90.0,
            roam_distance: 160.0,
            walk_duration_min: 0.8,
            walk_duration_max: 2.0,
            stand_duration_min: 0.5,
            stand_duration_max: 1.4,
            deactivated_duration: 6.0,
            darkness_rate: 2.5,
            turret_cooldown: 1.1,
            turret_pair_gap: 8.0,
            turret_projectile_speed: 300.0,
            turret_damage: 6.0,
            laser_charge_rate: 0.55,
            laser_duration: 1.6,
            laser_cooldown: 2.8,
            laser_length: 420.0,
            laser_width: 10.0,
            laser_damage_per_tick: 0.6,
            rocket_cooldown: 3.2,
            rocket_speed: 120.0,
            rocket_damage: 14.0,
            rocket_turn_rate: 2.2,
            projectile_lifetime: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntroTuning {
    /// Camera focus speed during the fly-over
    pub camera_rate: f32,
    /// Camera-to-boss distance that ends the Beginning stage
    pub focus_distance: f32,
    /// Arena border reveal interpolation rate
    pub reveal_rate: f32,
    /// Countdown of the final Info card
    pub info_duration: f32,
    pub boss_dead_duration: f32,
    pub player_dead_duration: f32,
}

impl Default for IntroTuning {
    fn default() -> Self {
        Self {
            camera_rate: 2.2,
            focus_distance: 12.0,
            reveal_rate: 1.4,
            info_duration: 2.5,
            boss_dead_duration: 3.0,
            player_dead_duration: 2.2,
        }
    }
}

/// Root of all tunable balance data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub player: PlayerTuning,
    pub asteroid: AsteroidTuning,
    pub gunner: GunnerTuning,
    pub orbital: OrbitalTuning,
    pub intro: IntroTuning,
}

impl Tuning {
    /// Parse a JSON override; unspecified fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load from a file, falling back to the shipped balance on any error
    pub fn load_or_default(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => match Self::from_json_str(&text) {
                Ok(tuning) => {
                    log::info!("loaded tuning overrides from {path}");
                    tuning
                }
                Err(err) => {
                    log::warn!("bad tuning file {path}: {err}; using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let t = Tuning::default();
        assert!(t.player.max_health > 0.0);
        assert!(!t.asteroid.shapes.is_empty());
        assert!(t.asteroid.count_min <= t.asteroid.count_max);
        assert!(t.gunner.preferred_distance_min < t.gunner.preferred_distance_max);
        assert!(!t.gunner.body_circles.is_empty());
    }

    #[test]
    fn test_partial_override() {
        let t = Tuning::from_json_str(r#"{"player": {"max_health": 150.0}}"#).unwrap();
        assert_eq!(t.player.max_health, 150.0);
        // Untouched fields keep the shipped balance
        assert_eq!(t.player.fire_cooldown, Tuning::default().player.fire_cooldown);
        assert_eq!(t.gunner.shotgun_count, Tuning::default().gunner.shotgun_count);
    }

    #[test]
    fn test_round_trip() {
        let t = Tuning::default();
        let json = serde_json::to_string(&t).unwrap();
        let back = Tuning::from_json_str(&json).unwrap();
        assert_eq!(back.orbital.laser_length, t.orbital.laser_length);
    }
}
