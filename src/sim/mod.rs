//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One tick per frame, no wall-clock time
//! - Seeded RNG only
//! - Stable iteration order (by pool slot)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod difficulty;
pub mod entity;
pub mod geometry;
pub mod player;
pub mod pool;
pub mod powerup;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{RemovalSet, flush_removals, resolve_collisions};
pub use difficulty::{Difficulty, Tier, TierParams};
pub use entity::{
    EnemyVariant, Entity, EntityKind, EntityTag, Layer, MeteorVariant, StarVariant, XDirection,
    YDirection,
};
pub use geometry::{Rect, intersects};
pub use player::PlayerController;
pub use pool::{EntityId, EntityPool};
pub use powerup::{PowerUpTimer, PowerUpTransition};
pub use spawn::{SpawnTimer, Spawner, spawn_step, target_in_range};
pub use state::{
    GameEvent, GamePhase, GameState, Hud, MUSIC_TRACKS, SessionConfig, SessionStats,
    SessionSummary, SoundCue, Viewport,
};
pub use tick::{TickInput, tick};
