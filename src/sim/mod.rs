//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering, audio or platform dependencies
//!
//! The embedding layer feeds a [`TickInput`] into [`tick`] once per frame and
//! reads the [`World`] afterwards.

pub mod asteroid;
pub mod boss;
pub mod effects;
pub mod geom;
pub mod player;
pub mod pool;
pub mod projectile;
pub mod state;
pub mod tick;

pub use boss::{Boss, GunnerAttack, GunnerBoss, OrbitalBoss, WeaponKind};
pub use geom::{
    Circle, OrientedRect, circle_rect_overlap, circles_overlap, reflect, rotated_rects_overlap,
};
pub use player::{Perks, Player};
pub use pool::{Pool, PoolSlot};
pub use projectile::{Projectile, ProjectileKind};
pub use state::{Camera, GameMode, IntroStage, RunStats, World};
pub use tick::{TickInput, tick};
