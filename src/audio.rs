//! Sound cue ids emitted by the simulation
//!
//! The sim never plays audio. It pushes cues into `World::cues` at
//! well-defined moments; the embedding layer drains the queue after each tick
//! and triggers playback fire-and-forget. Playback completion is never
//! tracked.

use serde::{Deserialize, Serialize};

/// One audible moment in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    /// Player fired a shot
    PlayerShot,
    /// A boss or socket fired
    BossShot,
    /// Orbital laser finished charging
    LaserFire,
    /// Player took a hit
    PlayerHurt,
    /// Boss took a hit
    BossHurt,
    /// Dash triggered
    Dash,
    /// Asteroid shoved onto a boss-bound trajectory
    AsteroidLaunch,
    /// Asteroid struck the boss
    AsteroidImpact,
    /// Projectile destroyed without dealing damage
    ProjectileBreak,
    /// A weapon socket disconnected from the orbital boss
    SocketDisconnect,
    /// A roaming socket was knocked out by an asteroid
    SocketDeactivate,
    /// Boss defeated
    BossDeath,
    /// Player defeated
    PlayerDeath,
    /// A perk was granted
    PerkPickup,
    /// Menu/stats button focus moved
    ButtonFocus,
    /// Menu/stats button confirmed
    ButtonClick,
    /// Boss introduction sting
    IntroSting,
}
