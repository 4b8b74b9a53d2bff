//! Player state: movement, dash, perks, invulnerability windows

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::audio::SoundCue;
use crate::consts;
use crate::tuning::PlayerTuning;

/// Perk bits. Cumulative for the whole run; never removed once granted.
pub const PERK_DOUBLE_DAMAGE: u32 = 1 << 0;
pub const PERK_FAST_BULLETS: u32 = 1 << 1;
pub const PERK_BIG_BULLETS: u32 = 1 << 2;
pub const PERK_TRIPLE_SPREAD: u32 = 1 << 3;
pub const PERK_SWIFT_FEET: u32 = 1 << 4;
pub const PERK_VITALITY: u32 = 1 << 5;
pub const PERK_REGENERATION: u32 = 1 << 6;
pub const PERK_SHOCKWAVE_DASH: u32 = 1 << 7;

/// One row of the perk table
#[derive(Debug, Clone, Copy)]
pub struct PerkSpec {
    pub bit: u32,
    pub name: &'static str,
    pub blurb: &'static str,
}

/// Every grantable perk, scanned at runtime for grants and UI
pub static PERK_TABLE: [PerkSpec; 8] = [
    PerkSpec {
        bit: PERK_DOUBLE_DAMAGE,
        name: "Glass Cannon",
        blurb: "Double damage dealt... and taken",
    },
    PerkSpec {
        bit: PERK_FAST_BULLETS,
        name: "Hair Trigger",
        blurb: "Fire twice as fast",
    },
    PerkSpec {
        bit: PERK_BIG_BULLETS,
        name: "Heavy Rounds",
        blurb: "Big squared shells that can block enemy fire",
    },
    PerkSpec {
        bit: PERK_TRIPLE_SPREAD,
        name: "Fan of Fire",
        blurb: "Three shots per trigger pull",
    },
    PerkSpec {
        bit: PERK_SWIFT_FEET,
        name: "Swift Feet",
        blurb: "Move faster",
    },
    PerkSpec {
        bit: PERK_VITALITY,
        name: "Vitality",
        blurb: "Raised maximum health",
    },
    PerkSpec {
        bit: PERK_REGENERATION,
        name: "Regeneration",
        blurb: "Slowly recover health",
    },
    PerkSpec {
        bit: PERK_SHOCKWAVE_DASH,
        name: "Shockwave Dash",
        blurb: "Dashing shatters nearby asteroids",
    },
];

/// Held-perk bitset with the multiplier composition rules.
///
/// Independent perks stack multiplicatively into the effective damage, fire
/// rate, projectile size, speed and max-health values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Perks(pub u32);

impl Perks {
    #[inline]
    pub fn has(self, bit: u32) -> bool {
        self.0 & bit != 0
    }

    pub fn all_held(self) -> bool {
        PERK_TABLE.iter().all(|p| self.has(p.bit))
    }

    /// Grant a uniformly random perk not yet held. `None` once all are held;
    /// the caller must not re-roll.
    pub fn grant_random(&mut self, rng: &mut Pcg32) -> Option<&'static PerkSpec> {
        let missing: Vec<&'static PerkSpec> =
            PERK_TABLE.iter().filter(|p| !self.has(p.bit)).collect();
        if missing.is_empty() {
            return None;
        }
        let pick = missing[rng.random_range(0..missing.len())];
        self.0 |= pick.bit;
        Some(pick)
    }

    pub fn damage_multiplier(self) -> f32 {
        if self.has(PERK_DOUBLE_DAMAGE) { 2.0 } else { 1.0 }
    }

    pub fn fire_cooldown_multiplier(self) -> f32 {
        if self.has(PERK_FAST_BULLETS) { 0.5 } else { 1.0 }
    }

    pub fn projectile_radius_multiplier(self) -> f32 {
        if self.has(PERK_BIG_BULLETS) { 1.5 } else { 1.0 }
    }

    pub fn speed_multiplier(self) -> f32 {
        if self.has(PERK_SWIFT_FEET) { 1.3 } else { 1.0 }
    }

    pub fn max_health_multiplier(self) -> f32 {
        if self.has(PERK_VITALITY) { 1.5 } else { 1.0 }
    }

    pub fn shots_per_trigger(self) -> usize {
        if self.has(PERK_TRIPLE_SPREAD) { 3 } else { 1 }
    }

    /// Incoming damage scaling; the glass-cannon perk cuts both ways
    pub fn incoming_damage_multiplier(self) -> f32 {
        if self.has(PERK_DOUBLE_DAMAGE) { 2.0 } else { 1.0 }
    }
}

/// Four-directional movement/facing bits
pub const DIR_UP: u8 = 0b0001;
pub const DIR_DOWN: u8 = 0b0010;
pub const DIR_LEFT: u8 = 0b0100;
pub const DIR_RIGHT: u8 = 0b1000;

/// Which thruster flame to light for a facing/movement pair
#[derive(Debug, Clone, Copy)]
pub struct ThrustRule {
    pub facing: u8,
    pub moving: u8,
    pub thruster: u8,
}

use super::effects::{THRUSTER_BOTTOM, THRUSTER_LEFT, THRUSTER_RIGHT, THRUSTER_TOP};

/// Facing × movement -> thruster side. The ship sprite rotates with the aim
/// direction, so the flame that visually points against the travel direction
/// depends on both.
pub static THRUST_RULES: [ThrustRule; 16] = [
    ThrustRule { facing: DIR_UP, moving: DIR_UP, thruster: THRUSTER_BOTTOM },
    ThrustRule { facing: DIR_UP, moving: DIR_LEFT, thruster: THRUSTER_RIGHT },
    ThrustRule { facing: DIR_UP, moving: DIR_DOWN, thruster: THRUSTER_TOP },
    ThrustRule { facing: DIR_UP, moving: DIR_RIGHT, thruster: THRUSTER_LEFT },
    ThrustRule { facing: DIR_LEFT, moving: DIR_UP, thruster: THRUSTER_LEFT },
    ThrustRule { facing: DIR_LEFT, moving: DIR_LEFT, thruster: THRUSTER_BOTTOM },
    ThrustRule { facing: DIR_LEFT, moving: DIR_DOWN, thruster: THRUSTER_RIGHT },
    ThrustRule { facing: DIR_LEFT, moving: DIR_RIGHT, thruster: THRUSTER_TOP },
    ThrustRule { facing: DIR_DOWN, moving: DIR_UP, thruster: THRUSTER_TOP },
    ThrustRule { facing: DIR_DOWN, moving: DIR_LEFT, thruster: THRUSTER_LEFT },
    ThrustRule { facing: DIR_DOWN, moving: DIR_DOWN, thruster: THRUSTER_BOTTOM },
    ThrustRule { facing: DIR_DOWN, moving: DIR_RIGHT, thruster: THRUSTER_RIGHT },
    ThrustRule { facing: DIR_RIGHT, moving: DIR_UP, thruster: THRUSTER_RIGHT },
    ThrustRule { facing: DIR_RIGHT, moving: DIR_LEFT, thruster: THRUSTER_TOP },
    ThrustRule { facing: DIR_RIGHT, moving: DIR_DOWN, thruster: THRUSTER_LEFT },
    ThrustRule { facing: DIR_RIGHT, moving: DIR_RIGHT, thruster: THRUSTER_BOTTOM },
];

/// The player's ship
#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    /// Keyboard contribution to this tick's movement (already dt-scaled)
    pub move_delta: Vec2,
    /// Dash impulse (units/sec), exponentially decaying toward zero
    pub dash_delta: Vec2,
    /// Movement direction bits held this tick
    pub move_dirs: u8,
    pub health: f32,
    pub fire_cooldown: f32,
    pub dash_cooldown: f32,
    pub iframe_timer: f32,
    /// Cooldown between regeneration pulses
    pub heal_cooldown: f32,
    pub perks: Perks,
    /// Pointer position in world space (clamped to the arena)
    pub aim_point: Vec2,
    /// Unit vector toward the aim point; zero only if aim sits on the ship
    pub looking_dir: Vec2,
}

impl Player {
    pub fn new(spawn: Vec2, tuning: &PlayerTuning) -> Self {
        Self {
            pos: spawn,
            move_delta: Vec2::ZERO,
            dash_delta: Vec2::ZERO,
            move_dirs: 0,
            health: tuning.max_health,
            fire_cooldown: 0.0,
            dash_cooldown: 0.0,
            iframe_timer: 0.0,
            heal_cooldown: 0.0,
            perks: Perks::default(),
            aim_point: spawn + Vec2::new(0.0, -100.0),
            looking_dir: Vec2::new(0.0, -1.0),
        }
    }

    pub fn max_health(&self, tuning: &PlayerTuning) -> f32 {
        tuning.max_health * self.perks.max_health_multiplier()
    }

    /// Dash invincibility is derived, never cached: the window lasts exactly
    /// as long as the decaying impulse still rounds to a non-zero per-tick
    /// displacement.
    pub fn is_invincible(&self) -> bool {
        (self.dash_delta * consts::SIM_DT).round() != Vec2::ZERO
    }

    /// Whether incoming damage is currently ignored (dash or hit iframes)
    pub fn damage_gated(&self) -> bool {
        self.is_invincible() || self.iframe_timer > 0.0
    }

    /// Integrate pointer delta into the aim point and refresh the looking
    /// direction
    pub fn update_aim(&mut self, pointer_delta: Vec2, sensitivity: f32, arena: Vec2) {
        self.aim_point += pointer_delta * sensitivity;
        self.aim_point = self.aim_point.clamp(Vec2::ZERO, arena);
        self.looking_dir = (self.aim_point - self.pos).normalize_or_zero();
    }

    /// Apply held-key movement and advance all timers for one tick
    pub fn update(&mut self, movement: Vec2, tuning: &PlayerTuning, arena: Vec2, dt: f32) {
        self.move_dirs = direction_bits(movement);

        let speed = tuning.movement_speed * self.perks.speed_multiplier();
        self.move_delta = movement.normalize_or_zero() * speed * dt;

        self.pos += self.move_delta + self.dash_delta * dt;
        self.pos = self.pos.clamp(Vec2::ZERO, arena);

        // Exponential approach to zero; see is_invincible
        self.dash_delta *= (-tuning.dash_decay_rate * dt).exp();

        self.fire_cooldown = (self.fire_cooldown - dt).max(0.0);
        self.dash_cooldown = (self.dash_cooldown - dt).max(0.0);
        self.iframe_timer = (self.iframe_timer - dt).max(0.0);

        if self.perks.has(PERK_REGENERATION) {
            self.heal_cooldown = (self.heal_cooldown - dt).max(0.0);
            if self.heal_cooldown <= 0.0 {
                let max = self.max_health(tuning);
                self.health = (self.health + tuning.regen_amount).clamp(0.0, max);
                self.heal_cooldown = tuning.regen_interval;
            }
        }
    }

    /// Dash on a button edge: requires an off-cooldown state and a non-zero
    /// movement direction (the normalization guard; no direction, no dash).
    /// Returns true if the dash fired.
    pub fn try_dash(&mut self, movement: Vec2, tuning: &PlayerTuning, cues: &mut Vec<SoundCue>) -> bool {
        if self.dash_cooldown > 0.0 {
            return false;
        }
        let dir = movement.normalize_or_zero();
        if dir == Vec2::ZERO {
            return false;
        }

        self.dash_delta = dir * tuning.dash_impulse;
        self.dash_cooldown = tuning.dash_cooldown;
        cues.push(SoundCue::Dash);
        true
    }

    /// Apply damage through the invulnerability gates; clamps health into
    /// [0, max] and opens the hit-iframe window on a connect. Returns the
    /// damage actually applied.
    pub fn hurt(&mut self, damage: f32, tuning: &PlayerTuning, cues: &mut Vec<SoundCue>) -> f32 {
        if self.damage_gated() {
            return 0.0;
        }

        let applied = damage * self.perks.incoming_damage_multiplier();
        let max = self.max_health(tuning);
        self.health = (self.health - applied).clamp(0.0, max);
        self.iframe_timer = tuning.iframe_duration;
        cues.push(SoundCue::PlayerHurt);
        applied
    }

    /// Thruster flames to light this tick, from the facing quadrant of the
    /// aim bearing crossed with the held movement directions
    pub fn active_thrusters(&self) -> u8 {
        if self.move_dirs == 0 {
            return 0;
        }

        let facing = facing_quadrant(crate::angle_between(self.aim_point, self.pos));
        let mut thrusters = 0;
        for rule in THRUST_RULES.iter() {
            if rule.facing == facing && self.move_dirs & rule.moving != 0 {
                thrusters |= rule.thruster;
            }
        }
        thrusters
    }
}

/// Movement-intent vector to direction bits
pub fn direction_bits(movement: Vec2) -> u8 {
    let mut bits = 0;
    if movement.y < 0.0 {
        bits |= DIR_UP;
    }
    if movement.y > 0.0 {
        bits |= DIR_DOWN;
    }
    if movement.x < 0.0 {
        bits |= DIR_LEFT;
    }
    if movement.x > 0.0 {
        bits |= DIR_RIGHT;
    }
    bits
}

/// Bucket a bearing into the four facing quadrants, offset by 45° so each
/// cardinal sits in the middle of its bucket
fn facing_quadrant(bearing_deg: f32) -> u8 {
    let shifted = crate::normalize_bearing(bearing_deg + 45.0);
    // Bearing 0 points down (+Y), 90 left, 180 up, 270 right
    if shifted < 90.0 {
        DIR_DOWN
    } else if shifted < 180.0 {
        DIR_LEFT
    } else if shifted < 270.0 {
        DIR_UP
    } else {
        DIR_RIGHT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::PlayerTuning;
    use proptest::prelude::*;
    use rand::SeedableRng;

    fn test_player() -> (Player, PlayerTuning) {
        let tuning = PlayerTuning::default();
        let player = Player::new(Vec2::new(640.0, 360.0), &tuning);
        (player, tuning)
    }

    #[test]
    fn test_dash_requires_direction() {
        let (mut player, tuning) = test_player();
        let mut cues = Vec::new();

        // No movement direction: the normalization guard skips the dash
        assert!(!player.try_dash(Vec2::ZERO, &tuning, &mut cues));
        assert!(!player.is_invincible());

        assert!(player.try_dash(Vec2::new(1.0, 0.0), &tuning, &mut cues));
        assert!(player.is_invincible());
        assert_eq!(cues, vec![SoundCue::Dash]);

        // On cooldown now
        assert!(!player.try_dash(Vec2::new(1.0, 0.0), &tuning, &mut cues));
    }

    #[test]
    fn test_dash_invincibility_decays() {
        let (mut player, tuning) = test_player();
        let mut cues = Vec::new();
        player.try_dash(Vec2::new(0.0, -1.0), &tuning, &mut cues);
        assert!(player.is_invincible());

        // One second of decay takes the impulse far below the rounding
        // threshold
        for _ in 0..60 {
            player.update(Vec2::ZERO, &tuning, Vec2::new(1280.0, 720.0), 1.0 / 60.0);
        }
        assert!(!player.is_invincible());
    }

    #[test]
    fn test_hurt_opens_iframes() {
        let (mut player, tuning) = test_player();
        let mut cues = Vec::new();

        let applied = player.hurt(10.0, &tuning, &mut cues);
        assert_eq!(applied, 10.0);
        assert_eq!(player.health, 90.0);
        assert!(player.iframe_timer > 0.0);

        // Gated while iframes last
        assert_eq!(player.hurt(10.0, &tuning, &mut cues), 0.0);
        assert_eq!(player.health, 90.0);
    }

    #[test]
    fn test_glass_cannon_doubles_incoming() {
        let (mut player, tuning) = test_player();
        let mut cues = Vec::new();
        player.perks.0 |= PERK_DOUBLE_DAMAGE;

        player.hurt(10.0, &tuning, &mut cues);
        assert_eq!(player.health, 80.0);
    }

    #[test]
    fn test_regeneration_pulses() {
        let (mut player, tuning) = test_player();
        player.perks.0 |= PERK_REGENERATION;
        player.health = 50.0;

        for _ in 0..60 {
            player.update(Vec2::ZERO, &tuning, Vec2::new(1280.0, 720.0), 1.0 / 60.0);
        }

        // One second covers two half-second pulses
        assert!(player.health > 50.0);
        assert!(player.health <= 50.0 + 3.0 * tuning.regen_amount);
    }

    #[test]
    fn test_perk_composition() {
        let perks = Perks(PERK_DOUBLE_DAMAGE | PERK_FAST_BULLETS);

        let base_damage = 4.0;
        let base_cooldown = 0.15;
        assert_eq!(base_damage * perks.damage_multiplier(), 8.0);
        assert!((base_cooldown * perks.fire_cooldown_multiplier() - 0.075).abs() < 1e-6);
    }

    #[test]
    fn test_perk_grants_exhaust() {
        let mut perks = Perks::default();
        let mut rng = Pcg32::seed_from_u64(3);

        let mut granted = Vec::new();
        while let Some(spec) = perks.grant_random(&mut rng) {
            // Never re-granted
            assert!(!granted.contains(&spec.bit));
            granted.push(spec.bit);
        }
        assert_eq!(granted.len(), PERK_TABLE.len());
        assert!(perks.all_held());
        assert!(perks.grant_random(&mut rng).is_none());
    }

    #[test]
    fn test_thruster_rules() {
        let (mut player, _tuning) = test_player();

        // Aim straight up, move up: the bottom thruster burns
        player.aim_point = player.pos + Vec2::new(0.0, -100.0);
        player.move_dirs = DIR_UP;
        assert_eq!(player.active_thrusters(), THRUSTER_BOTTOM);

        // Aim up, strafe left: the right-side thruster burns
        player.move_dirs = DIR_LEFT;
        assert_eq!(player.active_thrusters(), THRUSTER_RIGHT);

        player.move_dirs = 0;
        assert_eq!(player.active_thrusters(), 0);
    }

    use rand_pcg::Pcg32;

    proptest! {
        /// Health stays in [0, max] under any damage/heal sequence
        #[test]
        fn prop_health_clamped(ops in prop::collection::vec(-50.0f32..50.0, 0..64)) {
            let (mut player, tuning) = test_player();
            let mut cues = Vec::new();
            let max = player.max_health(&tuning);

            for op in ops {
                if op >= 0.0 {
                    player.iframe_timer = 0.0;
                    player.hurt(op, &tuning, &mut cues);
                } else {
                    player.health = (player.health - op).clamp(0.0, max);
                }
                prop_assert!(player.health >= 0.0);
                prop_assert!(player.health <= max);
            }
        }
    }
}
